use chrono::{TimeZone, Utc};
use serde_json::value::RawValue;
use sls_rule_activity::commands::summarize;
use sls_rule_activity::rules::RuleRow;
use sls_rule_activity::sls::export::{OutputLayout, SummaryRow, SummaryWriter};
use sls_rule_activity::sls::types::QueryResult;
use sls_rule_activity::utils::time::build_time_windows;
use tempfile::TempDir;

fn rule(uuid: &str, name: &str) -> RuleRow {
    RuleRow {
        uuid: uuid.to_string(),
        name: name.to_string(),
        device_group: "DG-Core".to_string(),
    }
}

/// Writes a summary the way a `query` run would and returns its path.
fn write_run(dir: &TempDir) -> std::path::PathBuf {
    let now = Utc.with_ymd_and_hms(2025, 10, 18, 0, 0, 0).unwrap();
    let windows = build_time_windows(now, 3, 30).unwrap();
    let layout = OutputLayout::new(dir.path());
    let mut writer = SummaryWriter::create(&layout.summary_path(&now)).unwrap();

    let active = rule("u-active", "Allow web");
    let idle = rule("u-idle", "Legacy NAT");

    for (i, w) in windows.iter().enumerate() {
        let mut result = QueryResult::default();
        if i != 1 {
            result.absorb(vec![
                RawValue::from_string(format!(r#"{{"receive_time":"{}"}}"#, w.start_iso()))
                    .unwrap(),
                RawValue::from_string(format!(r#"{{"receive_time":"{}"}}"#, w.end_iso()))
                    .unwrap(),
            ]);
        }
        writer.append(&SummaryRow::new(&active, w, &result)).unwrap();
        writer
            .append(&SummaryRow::new(&idle, w, &QueryResult::default()))
            .unwrap();
    }

    writer.path().to_path_buf()
}

#[test]
fn test_aggregate_query_output() {
    let dir = TempDir::new().unwrap();
    let path = write_run(&dir);

    let totals = summarize::aggregate(&path).unwrap();
    assert_eq!(totals.len(), 2);

    let active = &totals[0];
    assert_eq!(active.uuid, "u-active");
    assert_eq!(active.windows, 3);
    assert_eq!(active.active_windows, 2);
    assert_eq!(active.total_hits, 4);
    assert_eq!(active.first_seen, "2025-07-20T00:00:00Z");
    assert_eq!(active.last_seen, "2025-10-18T00:00:00Z");

    let idle = &totals[1];
    assert_eq!(idle.uuid, "u-idle");
    assert_eq!(idle.total_hits, 0);
    assert_eq!(idle.last_seen, "");
}

#[test]
fn test_run_writes_totals_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_run(&dir);
    let output = dir.path().join("rule_totals.csv");

    summarize::run(path.to_str().unwrap(), Some(output.to_str().unwrap())).unwrap();

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "uuid");
    assert_eq!(&headers[5], "total_hits");

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][5], "4");
    assert_eq!(&records[1][5], "0");
}

#[test]
fn test_missing_summary_file() {
    let dir = TempDir::new().unwrap();
    let err = summarize::run(dir.path().join("nope.csv").to_str().unwrap(), None).unwrap_err();
    assert!(err.to_string().contains("Failed to open summary file"));
}
