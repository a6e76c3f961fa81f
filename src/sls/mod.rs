//! Strata Logging Service query model, pagination and exports.
//!
//! - [`types`] - page decoding, per-window results, first/last-seen tracking
//! - [`query`] - filter expression, query parameters, pagination loop
//! - [`export`] - JSONL and summary CSV writers

pub mod export;
pub mod query;
pub mod types;
