//! Per-window JSONL exports and the run summary CSV.
//!
//! Layout under the output directory:
//!
//! ```text
//! rawlogs/<uuid>/<uuid>_<YYYYMMDD>_<YYYYMMDD>.jsonl
//! sls_rule_activity_<YYYYmmdd_HHMMSS>.csv
//! ```

use super::types::{QueryResult, Record};
use crate::rules::RuleRow;
use crate::utils::progress::ProgressBar;
use crate::utils::time::{run_label, TimeWindow};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::{self, File};
use std::future::Future;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const RAWLOGS_DIR: &str = "rawlogs";

/// Header of the summary CSV, matching the field order of [`SummaryRow`].
pub const SUMMARY_COLUMNS: [&str; 8] = [
    "uuid",
    "rule_name",
    "device_group",
    "window_start",
    "window_end",
    "hit_count",
    "first_seen",
    "last_seen",
];

/// Where a run writes its files.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn rawlogs_dir(&self) -> PathBuf {
        self.root.join(RAWLOGS_DIR)
    }

    /// Uuids are used as path components unchanged; the loader has already
    /// rejected any that could not be.
    pub fn rule_dir(&self, uuid: &str) -> PathBuf {
        self.rawlogs_dir().join(uuid)
    }

    pub fn jsonl_path(&self, uuid: &str, window: &TimeWindow) -> PathBuf {
        self.rule_dir(uuid)
            .join(format!("{}_{}.jsonl", uuid, window.file_label()))
    }

    pub fn summary_path(&self, now: &DateTime<Utc>) -> PathBuf {
        self.root
            .join(format!("sls_rule_activity_{}.csv", run_label(now)))
    }
}

/// Write records one per line, exactly as received. An empty slice still
/// creates the file.
pub fn write_jsonl(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut out = BufWriter::new(file);

    for record in records {
        out.write_all(single_line(record.get()).as_bytes())
            .and_then(|_| out.write_all(b"\n"))
            .with_context(|| format!("Failed to write JSON to: {}", path.display()))?;
    }
    out.flush()
        .with_context(|| format!("Failed to flush: {}", path.display()))?;
    Ok(())
}

/// Drop line breaks from a pretty-printed record so it fits on one JSONL line.
/// Breaks can only occur between tokens (inside strings they are escaped), so
/// nothing else about the text changes.
fn single_line(json: &str) -> Cow<'_, str> {
    if json.contains(['\n', '\r']) {
        Cow::Owned(json.chars().filter(|c| !matches!(c, '\n' | '\r')).collect())
    } else {
        Cow::Borrowed(json)
    }
}

/// One line of the summary CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub uuid: String,
    pub rule_name: String,
    pub device_group: String,
    pub window_start: String,
    pub window_end: String,
    pub hit_count: usize,
    pub first_seen: String,
    pub last_seen: String,
}

impl SummaryRow {
    pub fn new(rule: &RuleRow, window: &TimeWindow, result: &QueryResult) -> Self {
        Self {
            uuid: rule.uuid.clone(),
            rule_name: rule.name.clone(),
            device_group: rule.device_group.clone(),
            window_start: window.start_iso(),
            window_end: window.end_iso(),
            hit_count: result.count(),
            first_seen: result.first_seen().unwrap_or_default().to_string(),
            last_seen: result.last_seen().unwrap_or_default().to_string(),
        }
    }
}

/// Append-only summary CSV, flushed after every row so a partial run still
/// leaves a usable file.
pub struct SummaryWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl SummaryWriter {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(SUMMARY_COLUMNS)?;
        writer.flush()?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }

    pub fn append(&mut self, row: &SummaryRow) -> Result<()> {
        self.writer
            .serialize(row)
            .with_context(|| format!("Failed to write summary row to: {}", self.path.display()))?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A window whose query stopped early.
#[derive(Debug, Clone)]
pub struct WindowFailure {
    pub uuid: String,
    pub window: TimeWindow,
    pub error: String,
}

/// Totals for a finished export.
#[derive(Debug, Default)]
pub struct ExportStats {
    pub pairs: usize,
    pub records: usize,
    pub files: usize,
    pub rules_with_hits: usize,
    pub failures: Vec<WindowFailure>,
}

/// Query every (rule, window) pair in order, writing one JSONL file and one
/// summary row per pair as soon as it completes.
///
/// `query` receives the rule uuid and the window; a failed query is recorded
/// in [`ExportStats::failures`] but still produces its file and row.
pub async fn export_all<F, Fut>(
    rules: &[RuleRow],
    windows: &[TimeWindow],
    layout: &OutputLayout,
    summary: &mut SummaryWriter,
    progress: &ProgressBar,
    mut query: F,
) -> Result<ExportStats>
where
    F: FnMut(String, TimeWindow) -> Fut,
    Fut: Future<Output = QueryResult>,
{
    let mut stats = ExportStats::default();

    for rule in rules {
        let rule_dir = layout.rule_dir(&rule.uuid);
        fs::create_dir_all(&rule_dir)
            .with_context(|| format!("Failed to create directory: {}", rule_dir.display()))?;
        progress.set_message(&rule.uuid);

        let mut rule_hits = 0;
        for window in windows {
            let result = query(rule.uuid.clone(), *window).await;

            write_jsonl(&layout.jsonl_path(&rule.uuid, window), &result.records)?;
            summary.append(&SummaryRow::new(rule, window, &result))?;

            if let Some(error) = &result.error {
                progress.println(format!(
                    "⚠️  {} [{} → {}]: {}",
                    rule.uuid,
                    window.start_iso(),
                    window.end_iso(),
                    error
                ));
                stats.failures.push(WindowFailure {
                    uuid: rule.uuid.clone(),
                    window: *window,
                    error: error.clone(),
                });
            }

            rule_hits += result.count();
            stats.pairs += 1;
            stats.files += 1;
            stats.records += result.count();
            progress.inc();
        }

        if rule_hits > 0 {
            stats.rules_with_hits += 1;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::value::RawValue;
    use tempfile::TempDir;

    fn raw(json: &str) -> Record {
        RawValue::from_string(json.to_string()).unwrap()
    }

    fn window() -> TimeWindow {
        let end = Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap();
        TimeWindow {
            start: end - chrono::Duration::days(30),
            end,
        }
    }

    #[test]
    fn test_jsonl_path_layout() {
        let layout = OutputLayout::new("/out");
        assert_eq!(
            layout.jsonl_path("u-1", &window()),
            PathBuf::from("/out/rawlogs/u-1/u-1_20250918_20251018.jsonl")
        );
    }

    #[test]
    fn test_summary_path() {
        let layout = OutputLayout::new("out");
        let now = Utc.with_ymd_and_hms(2025, 10, 18, 14, 25, 30).unwrap();
        assert_eq!(
            layout.summary_path(&now),
            PathBuf::from("out/sls_rule_activity_20251018_142530.csv")
        );
    }

    #[test]
    fn test_write_jsonl_lines_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/out.jsonl");
        let first = r#"{"time":"2024-01-01T00:00:00Z","action":"allow","bytes":123456789012345678901234}"#;
        let second = r#"{"msg": "h\u00e9llo",  "n": 1.50}"#;
        write_jsonl(&path, &[raw(first), raw(second)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{}\n{}\n", first, second));
    }

    #[test]
    fn test_write_jsonl_folds_pretty_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pretty.jsonl");
        let pretty = "{\n  \"z\": \"line\\nbreak\",\r\n  \"a\": [1,\n 2]\n}";
        write_jsonl(&path, &[raw(pretty)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{  \"z\": \"line\\nbreak\",  \"a\": [1, 2]}\n");
        let value: serde_json::Value = serde_json::from_str(content.trim_end()).unwrap();
        assert_eq!(value["z"], "line\nbreak");
    }

    #[test]
    fn test_write_jsonl_empty_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.jsonl");
        write_jsonl(&path, &[]).unwrap();
        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_summary_writer_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");
        let mut writer = SummaryWriter::create(&path).unwrap();

        let rule = RuleRow {
            uuid: "u-1".into(),
            name: "Allow, DNS".into(),
            device_group: "DG".into(),
        };
        writer
            .append(&SummaryRow::new(&rule, &window(), &QueryResult::default()))
            .unwrap();

        // Rows are flushed immediately, so the file is readable while open.
        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some(SUMMARY_COLUMNS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("u-1,\"Allow, DNS\",DG,2025-09-18T12:00:00Z,2025-10-18T12:00:00Z,0,,")
        );
    }
}
