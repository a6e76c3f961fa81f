use chrono::{DateTime, Duration, TimeZone, Utc};
use sls_rule_activity::utils::time::{build_time_windows, iso8601, parse_timestamp, TimeWindow};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_windows_cover_360_days_without_gaps() {
    let windows = build_time_windows(now(), 12, 30).unwrap();

    assert_eq!(windows.len(), 12);
    assert_eq!(windows.first().unwrap().end, now());
    assert_eq!(windows.last().unwrap().start, now() - Duration::days(360));

    let covered: i64 = windows.iter().map(|w| (w.end - w.start).num_days()).sum();
    assert_eq!(covered, 360);
}

#[test]
fn test_windows_do_not_overlap() {
    let windows = build_time_windows(now(), 12, 30).unwrap();
    for (i, a) in windows.iter().enumerate() {
        for b in windows.iter().skip(i + 1) {
            assert!(a.start >= b.end, "{:?} overlaps {:?}", a, b);
        }
    }
}

#[test]
fn test_windows_reproducible_for_same_now() {
    assert_eq!(
        build_time_windows(now(), 12, 30).unwrap(),
        build_time_windows(now(), 12, 30).unwrap()
    );
}

#[test]
fn test_window_strings_are_contiguous() {
    let windows = build_time_windows(now() + Duration::microseconds(123_456), 12, 30).unwrap();
    for pair in windows.windows(2) {
        assert_eq!(pair[0].start_iso(), pair[1].end_iso());
    }
}

#[test]
fn test_month_boundary_labels() {
    let w: TimeWindow = build_time_windows(now(), 1, 30).unwrap()[0];
    // 2025-03-01 minus 30 days
    assert_eq!(w.start_iso(), "2025-01-30T00:00:00Z");
    assert_eq!(w.file_label(), "20250130_20250301");
}

#[test]
fn test_iso8601_uses_z_suffix() {
    let dt = parse_timestamp("2025-10-07T12:30:45+02:00").unwrap();
    assert_eq!(iso8601(&dt), "2025-10-07T10:30:45Z");
}

#[test]
fn test_parse_invalid_timestamp() {
    assert!(parse_timestamp("not-a-timestamp").is_err());
    assert!(parse_timestamp("").is_err());
}

#[test]
fn test_window_plan_outside_calendar_is_an_error() {
    let err = build_time_windows(now(), 12, 200_000_000).unwrap_err();
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn test_record_times_order_independent_of_format() {
    use sls_rule_activity::utils::time::compare_timestamps;
    use std::cmp::Ordering;

    let values = [
        "2025-01-01T00:00:00+02:00",
        "2024-12-31T23:00:00Z",
        "2024-12-31T23:30",
        "2025-01-01",
    ];
    for a in values {
        for b in values {
            assert_eq!(
                compare_timestamps(a, b),
                compare_timestamps(b, a).reverse(),
                "{a} vs {b}"
            );
            for c in values {
                if compare_timestamps(a, b) == Ordering::Less
                    && compare_timestamps(b, c) == Ordering::Less
                {
                    assert_eq!(compare_timestamps(a, c), Ordering::Less, "{a} < {b} < {c}");
                }
            }
        }
    }
}
