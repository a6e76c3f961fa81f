//! # SLS Rule Activity
//!
//! Command-line tool that answers "when was this firewall rule last hit?" for
//! a list of security rules, using the Strata Logging Service (SLS) query API.
//!
//! ## Overview
//!
//! For each rule uuid in a lookup CSV the tool queries SLS across twelve
//! contiguous 30-day windows ending at the time of the run, follows the API's
//! continuation tokens, and writes:
//!
//! - the raw records of every (rule, window) pair as JSONL, an empty file
//!   meaning "queried, nothing found"
//! - one summary CSV row per pair with hit count and first/last seen
//!
//! A `summarize` command turns that CSV into per-rule totals and lists rules
//! with no hits at all.
//!
//! Requests are issued one at a time with a short pause between pages. A
//! failing window is logged and recorded with whatever it returned; failures
//! to load the lookup table or to obtain a token stop the run.
//!
//! ## Architecture
//!
//! - [`rules`] - Lookup table loading and validation
//! - [`sls_api`] - Token exchange and the authenticated logs client
//! - [`sls`] - Page decoding, pagination, JSONL/CSV exports
//! - [`commands`] - Command implementations
//! - [`config`] - Regions, defaults and credential resolution
//! - [`error`] - Typed errors of the library layer
//! - [`utils`] - Time windows, progress bar, formatting
//!
//! ## Example Usage
//!
//! ```bash
//! export SLS_CLIENT_ID=svc-account@tenant
//! export SLS_CLIENT_SECRET_FILE=~/.sls/secret
//!
//! sls-rule-activity query --input rule_uuid_lookup.csv --region eu
//! sls-rule-activity summarize sls_rule_activity_20251018_142530.csv
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod rules;
pub mod sls;
pub mod sls_api;
pub mod utils;
