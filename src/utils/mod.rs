//! Utility functions and helpers.
//!
//! - [`progress`] - Progress bar over the query grid
//! - [`time`] - Window construction and timestamp formatting/ordering
//! - [`format`] - Number and console text helpers
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use sls_rule_activity::utils::time::build_time_windows;
//!
//! let now = Utc.with_ymd_and_hms(2025, 10, 18, 0, 0, 0).unwrap();
//! let windows = build_time_windows(now, 12, 30).unwrap();
//! assert_eq!(windows.len(), 12);
//! assert_eq!(windows[0].end, now);
//! ```

pub mod format;
pub mod progress;
pub mod time;
