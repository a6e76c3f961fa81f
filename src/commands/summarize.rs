//! Per-rule totals from a summary CSV.
//!
//! Rolls the per-window rows written by `query` up to one line per rule and
//! lists the rules that had no hits in any window, which are the candidates
//! for clean-up.
//!
//! # Usage
//!
//! ```bash
//! sls-rule-activity summarize sls_rule_activity_20251018_142530.csv
//! sls-rule-activity summarize sls_rule_activity_20251018_142530.csv --output rule_totals.csv
//! ```

use crate::sls::export::{SummaryRow, SUMMARY_COLUMNS};
use crate::sls::types::SeenRange;
use crate::utils::format::{fit, format_number};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Activity of one rule across all windows of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTotals {
    pub uuid: String,
    pub rule_name: String,
    pub device_group: String,
    pub windows: usize,
    pub active_windows: usize,
    pub total_hits: usize,
    pub first_seen: String,
    pub last_seen: String,
}

/// Read a summary CSV and aggregate it per rule, in first-appearance order.
pub fn aggregate(path: &Path) -> Result<Vec<RuleTotals>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open summary file: {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = SUMMARY_COLUMNS
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h.trim() == *c))
        .collect();
    if !missing.is_empty() {
        bail!("Summary CSV missing required columns: {}", missing.join(", "));
    }

    let mut order: Vec<String> = Vec::new();
    let mut by_uuid: HashMap<String, (RuleTotals, SeenRange)> = HashMap::new();

    for (line, result) in reader.deserialize::<SummaryRow>().enumerate() {
        // +2: header line, 1-based numbering
        let row = result.with_context(|| {
            format!("Invalid summary row at line {} of {}", line + 2, path.display())
        })?;

        let (totals, seen) = by_uuid.entry(row.uuid.clone()).or_insert_with(|| {
            order.push(row.uuid.clone());
            (
                RuleTotals {
                    uuid: row.uuid.clone(),
                    rule_name: row.rule_name.clone(),
                    device_group: row.device_group.clone(),
                    windows: 0,
                    active_windows: 0,
                    total_hits: 0,
                    first_seen: String::new(),
                    last_seen: String::new(),
                },
                SeenRange::default(),
            )
        });

        totals.windows += 1;
        totals.total_hits += row.hit_count;
        if row.hit_count > 0 {
            totals.active_windows += 1;
        }
        if !row.first_seen.is_empty() {
            seen.observe(&row.first_seen);
        }
        if !row.last_seen.is_empty() {
            seen.observe(&row.last_seen);
        }
    }

    Ok(order
        .into_iter()
        .filter_map(|uuid| by_uuid.remove(&uuid))
        .map(|(mut totals, seen)| {
            totals.first_seen = seen.first.unwrap_or_default();
            totals.last_seen = seen.last.unwrap_or_default();
            totals
        })
        .collect())
}

pub fn run(summary_csv: &str, output: Option<&str>) -> Result<()> {
    let totals = aggregate(Path::new(summary_csv))?;

    println!("{}", "=".repeat(120));
    println!(
        "{:<38} {:<28} {:<16} {:>10} {:>8}  {:<22}",
        "UUID", "Rule", "Device Group", "Hits", "Active", "Last Seen"
    );
    println!("{}", "=".repeat(120));

    for t in &totals {
        println!(
            "{:<38} {} {} {:>10} {:>8}  {:<22}",
            fit(&t.uuid, 38),
            fit(&t.rule_name, 28),
            fit(&t.device_group, 16),
            format_number(t.total_hits),
            format!("{}/{}", t.active_windows, t.windows),
            if t.last_seen.is_empty() { "-" } else { t.last_seen.as_str() }
        );
    }

    let total_hits: usize = totals.iter().map(|t| t.total_hits).sum();
    let unused: Vec<&RuleTotals> = totals.iter().filter(|t| t.total_hits == 0).collect();

    println!("{}", "=".repeat(120));
    println!(
        "Rules: {}   Total hits: {}   Rules without hits: {}",
        format_number(totals.len()),
        format_number(total_hits),
        format_number(unused.len())
    );

    if !unused.is_empty() {
        println!("\nRules with no hits in any window:");
        println!("{}", "-".repeat(60));
        for t in &unused {
            println!("  {}  {} ({})", t.uuid, t.rule_name, t.device_group);
        }
    }

    if let Some(output_path) = output {
        let mut writer = csv::Writer::from_path(output_path)
            .with_context(|| format!("Failed to create output file: {}", output_path))?;
        for t in &totals {
            writer.serialize(t)?;
        }
        writer.flush()?;
        eprintln!("\nCSV written to: {}", output_path);
    }

    Ok(())
}
