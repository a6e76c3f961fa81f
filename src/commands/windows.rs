//! Print the query window plan without touching the network.
//!
//! Handy for checking which date ranges (and export file names) a `query` run
//! would produce. Passing `--now` pins the reference time, so the same plan
//! can be reproduced later.
//!
//! ```bash
//! sls-rule-activity windows
//! sls-rule-activity windows --now 2025-10-01T00:00:00Z --format json
//! ```

use crate::config::check_window_plan;
use crate::utils::time::{build_time_windows, parse_timestamp, TimeWindow};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

pub fn plan(now: Option<&str>, count: usize, days: i64) -> Result<Vec<TimeWindow>> {
    check_window_plan(count, days)?;
    let now: DateTime<Utc> = match now {
        Some(ts) => parse_timestamp(ts)?,
        None => Utc::now(),
    };
    build_time_windows(now, count, days)
}

pub fn run(now: Option<&str>, count: usize, days: i64, format: &str) -> Result<()> {
    let windows = plan(now, count, days)?;

    match format.to_lowercase().as_str() {
        "json" => {
            let rows: Vec<_> = windows
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    serde_json::json!({
                        "index": i + 1,
                        "start": w.start_iso(),
                        "end": w.end_iso(),
                        "file_label": w.file_label(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        "table" => {
            println!("{:>3}  {:<22} {:<22} File label", "#", "Start", "End");
            println!("{}", "-".repeat(70));
            for (i, w) in windows.iter().enumerate() {
                println!(
                    "{:>3}  {:<22} {:<22} {}",
                    i + 1,
                    w.start_iso(),
                    w.end_iso(),
                    w.file_label()
                );
            }
        }
        _ => bail!("Invalid format '{}'. Use 'table' or 'json'", format),
    }

    Ok(())
}
