//! Rule activity export.
//!
//! Queries SLS for every rule in the lookup table across the configured
//! windows (12 × 30 days by default, ending now) and writes one raw JSONL
//! file per rule and window plus a summary CSV.
//!
//! # Usage
//!
//! ```bash
//! export SLS_CLIENT_ID=my-service-account
//! export SLS_CLIENT_SECRET_FILE=~/.sls/secret
//!
//! # Default lookup table, EU region
//! sls-rule-activity query
//!
//! # Another region, traffic logs only, output elsewhere
//! sls-rule-activity query --input rules.csv --region us --log-type traffic --output-dir out/
//!
//! # Custom tenant URL and lab TLS
//! sls-rule-activity query --base-url https://sls.lab.example --insecure
//! ```
//!
//! # Output
//!
//! - `rawlogs/<uuid>/<uuid>_<start>_<end>.jsonl` - raw records, one per line;
//!   empty when the rule had no hits in that window
//! - `sls_rule_activity_<timestamp>.csv` - one row per rule and window with
//!   hit count and first/last seen timestamps
//!
//! A window whose query fails is reported and kept with whatever records
//! arrived before the failure; the run carries on with the next window.

use crate::config::{resolve_credentials, QueryConfig};
use crate::rules::load_rules;
use crate::sls::export::{export_all, ExportStats, OutputLayout, SummaryWriter};
use crate::sls_api::{acquire_token, http_client, SlsClient};
use crate::utils::format::{format_number, mask_secret};
use crate::utils::progress::ProgressBar;
use crate::utils::time::{build_time_windows, TimeWindow};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::info;

/// What a finished run produced.
#[derive(Debug)]
pub struct QueryReport {
    pub summary_path: PathBuf,
    pub rawlogs_dir: PathBuf,
    pub windows: Vec<TimeWindow>,
    pub stats: ExportStats,
}

pub async fn run(
    config: &QueryConfig,
    client_id: Option<&str>,
    client_secret: Option<&str>,
    now: DateTime<Utc>,
) -> Result<QueryReport> {
    config.validate()?;

    eprintln!("=== SLS Rule Activity Export ===");

    // Everything that can fail locally fails before the first request.
    let rules = load_rules(&config.input)
        .with_context(|| format!("Failed to load rule table: {}", config.input.display()))?;
    eprintln!(
        "Loaded {} rule rows from {}",
        format_number(rules.len()),
        config.input.display()
    );
    let credentials = resolve_credentials(client_id, client_secret)?;
    let windows = build_time_windows(now, config.windows, config.window_days)?;
    eprintln!(
        "Built {} time windows ({}-day increments)",
        windows.len(),
        config.window_days
    );

    eprintln!("SLS base URL: {}", config.base_url);
    eprintln!("Client ID: {}", mask_secret(credentials.client_id()));
    if let Some(log_type) = config.log_type() {
        eprintln!("Log type filter: {}", log_type);
    }
    if config.skip_verify {
        eprintln!("⚠️  TLS certificate verification is DISABLED");
    }
    eprintln!();

    eprintln!("Obtaining access token...");
    let http = http_client(config.skip_verify)?;
    let token = acquire_token(&http, &config.token_url, credentials)
        .await
        .context("Failed to obtain access token")?;
    let client = SlsClient::with_http(http, config.base_url.clone(), token, config.skip_verify);
    eprintln!("Token acquired.");
    eprintln!();
    info!(
        base_url = client.base_url(),
        verify_ssl = client.verify_ssl(),
        "SLS client ready"
    );

    let layout = OutputLayout::new(&config.output_dir);
    let mut summary = SummaryWriter::create(&layout.summary_path(&now))?;

    let total = rules.len() * windows.len();
    let progress = if std::io::stderr().is_terminal() {
        ProgressBar::new(total, "Querying SLS")
    } else {
        ProgressBar::hidden(total)
    };

    let log_type = config.log_type();
    let page_size = config.page_size;
    let page_delay = config.page_delay;
    let client = &client;
    let stats = export_all(
        &rules,
        &windows,
        &layout,
        &mut summary,
        &progress,
        move |uuid, window| async move {
            client
                .query_window(&uuid, &window, log_type, page_size, page_delay)
                .await
        },
    )
    .await?;
    progress.finish_with_message("Querying SLS... done");

    let report = QueryReport {
        summary_path: summary.path().to_path_buf(),
        rawlogs_dir: layout.rawlogs_dir(),
        windows,
        stats,
    };
    print_report(&report);

    Ok(report)
}

fn print_report(report: &QueryReport) {
    let stats = &report.stats;

    eprintln!();
    eprintln!("=== Complete ===");
    eprintln!("Rule/window pairs queried: {}", format_number(stats.pairs));
    eprintln!("Records exported: {}", format_number(stats.records));
    eprintln!("Rules with hits: {}", format_number(stats.rules_with_hits));
    eprintln!();
    eprintln!("{:<60} Notes", "File");
    eprintln!("{}", "-".repeat(100));
    eprintln!(
        "{:<60} Per-rule per-window counts ({} windows)",
        absolute(&report.summary_path).display(),
        report.windows.len()
    );
    eprintln!(
        "{:<60} Raw JSONL logs per rule per window",
        absolute(&report.rawlogs_dir).display()
    );

    if !stats.failures.is_empty() {
        eprintln!();
        eprintln!(
            "⚠️  {} window(s) returned errors; their counts may be incomplete:",
            format_number(stats.failures.len())
        );
        for failure in &stats.failures {
            eprintln!(
                "  {} [{} → {}]: {}",
                failure.uuid,
                failure.window.start_iso(),
                failure.window.end_iso(),
                failure.error
            );
        }
    }
}

fn absolute(path: &std::path::Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
