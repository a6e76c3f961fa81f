//! Security-rule lookup table.
//!
//! The input is a small CSV exported from the firewall manager, one row per
//! rule with at least `uuid`, `name` and `device_group` columns. It is read
//! once per run and never modified.

mod loader;

pub use loader::{load_rules, read_rules, RuleRow, REQUIRED_COLUMNS};
