//! Command implementations.
//!
//! - [`query`] - Export rule hits from SLS per 30-day window (network)
//! - [`summarize`] - Roll a summary CSV up to per-rule totals and list unused rules
//! - [`windows`] - Print the window plan a `query` run would use
//! - [`regions`] - List the built-in regional endpoints

pub mod query;
pub mod regions;
pub mod summarize;
pub mod windows;
