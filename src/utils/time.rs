use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};
use std::borrow::Cow;
use std::cmp::Ordering;

/// One bounded query range. `start` is inclusive, `end` exclusive as far as
/// the API is concerned; both are whole seconds in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn start_iso(&self) -> String {
        iso8601(&self.start)
    }

    pub fn end_iso(&self) -> String {
        iso8601(&self.end)
    }

    /// `YYYYMMDD_YYYYMMDD`, used in export file names.
    pub fn file_label(&self) -> String {
        format!("{}_{}", file_date(&self.start), file_date(&self.end))
    }
}

/// Build `count` contiguous windows of `days` days each, walking backwards
/// from `now`. The first window ends at `now` (truncated to the second).
///
/// Fails when the plan reaches outside the range chrono can represent.
pub fn build_time_windows(
    now: DateTime<Utc>,
    count: usize,
    days: i64,
) -> Result<Vec<TimeWindow>> {
    let span = Duration::try_days(days)
        .ok_or_else(|| anyhow!("Window length of {} days is out of range", days))?;
    let mut end = truncate_to_second(now);
    let mut windows = Vec::new();

    for _ in 0..count {
        let start = end.checked_sub_signed(span).ok_or_else(|| {
            anyhow!(
                "{} windows of {} days before {} reach past the supported date range",
                count,
                days,
                iso8601(&now)
            )
        })?;
        windows.push(TimeWindow { start, end });
        end = start;
    }

    Ok(windows)
}

fn truncate_to_second(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// ISO-8601 UTC at second precision with a `Z` suffix, the form the SLS API
/// expects for `startTime`/`endTime`.
pub fn iso8601(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn file_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%d").to_string()
}

/// Label for the summary file name, e.g. `20251018_142530`.
pub fn run_label(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%d_%H%M%S").to_string()
}

/// Parse an RFC 3339 timestamp, as accepted on the command line.
pub fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .with_context(|| format!("Failed to parse timestamp: {}", ts))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Sort key of a record timestamp: RFC 3339 values become fixed-width UTC
/// text with nanoseconds, anything else is used as is.
fn timestamp_key(ts: &str) -> Cow<'_, str> {
    match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => Cow::Owned(
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Nanos, true),
        ),
        Err(_) => Cow::Borrowed(ts),
    }
}

/// Order two record timestamps.
///
/// Both sides are mapped to [`timestamp_key`] and compared as strings, ties
/// broken by the original text. Offsets are therefore honoured, and values in
/// other formats still get a consistent place in the order.
pub fn compare_timestamps(a: &str, b: &str) -> Ordering {
    timestamp_key(a)
        .cmp(&timestamp_key(b))
        .then_with(|| a.cmp(b))
}
