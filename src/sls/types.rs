//! Response shapes of the SLS logs endpoint and the per-window result.
//!
//! Tenants differ in how they name the record list, the continuation token
//! and the timestamp field, so pages are read loosely. Records themselves are
//! kept as [`RawValue`] slices of the response body and never re-encoded.

use crate::utils::time::compare_timestamps;
use serde::de::IgnoredAny;
use serde_json::value::RawValue;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Keys that may hold the record array, in lookup order.
pub const RECORD_KEYS: [&str; 3] = ["logs", "items", "data"];

/// Keys that may hold the continuation token, in lookup order.
pub const PAGE_TOKEN_KEYS: [&str; 3] = ["nextPageToken", "pageToken", "next_token"];

/// Record fields that may carry the event time, in lookup order.
pub const TIMESTAMP_KEYS: [&str; 4] = ["receive_time", "time", "_time", "event_time"];

/// A log record exactly as the server sent it.
pub type Record = Box<RawValue>;

/// One decoded page of query results.
#[derive(Debug, Clone, Default)]
pub struct LogPage {
    pub records: Vec<Record>,
    pub next_token: Option<String>,
}

impl LogPage {
    /// Pick the records and the continuation token out of a response body.
    ///
    /// Records come from the first key in [`RECORD_KEYS`] holding a non-empty
    /// array; the token from the first non-empty string in [`PAGE_TOKEN_KEYS`].
    /// A well-formed body that is not an object yields an empty, final page;
    /// malformed JSON is an error.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let fields: HashMap<String, Record> = match serde_json::from_str(body) {
            Ok(fields) => fields,
            Err(e) => {
                return serde_json::from_str::<IgnoredAny>(body)
                    .map(|_| Self::default())
                    .map_err(|_| e)
            }
        };

        let records = RECORD_KEYS
            .iter()
            .find_map(|key| {
                let items: Vec<Record> = serde_json::from_str(fields.get(*key)?.get()).ok()?;
                (!items.is_empty()).then_some(items)
            })
            .unwrap_or_default();

        let next_token = PAGE_TOKEN_KEYS.iter().find_map(|key| {
            serde_json::from_str::<String>(fields.get(*key)?.get())
                .ok()
                .filter(|s| !s.is_empty())
        });

        Ok(Self {
            records,
            next_token,
        })
    }

    /// True when pagination should stop after this page.
    pub fn is_last(&self) -> bool {
        self.next_token.is_none() || self.records.is_empty()
    }
}

/// Best-effort event time of a record.
pub fn record_timestamp(record: &RawValue) -> Option<String> {
    let value: Value = serde_json::from_str(record.get()).ok()?;
    let obj = value.as_object()?;
    TIMESTAMP_KEYS.iter().find_map(|key| {
        obj.get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Earliest and latest timestamp seen so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenRange {
    pub first: Option<String>,
    pub last: Option<String>,
}

impl SeenRange {
    pub fn observe(&mut self, ts: &str) {
        if self
            .first
            .as_deref()
            .map_or(true, |cur| compare_timestamps(ts, cur) == Ordering::Less)
        {
            self.first = Some(ts.to_string());
        }
        if self
            .last
            .as_deref()
            .map_or(true, |cur| compare_timestamps(ts, cur) == Ordering::Greater)
        {
            self.last = Some(ts.to_string());
        }
    }
}

/// Everything collected for one (rule, window) pair.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub records: Vec<Record>,
    pub seen: SeenRange,
    pub pages: usize,
    /// Why pagination stopped early, if it did. The records gathered before
    /// the failure are kept.
    pub error: Option<String>,
}

impl QueryResult {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn first_seen(&self) -> Option<&str> {
        self.seen.first.as_deref()
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.seen.last.as_deref()
    }

    /// Append a page's records, updating the seen range.
    pub fn absorb(&mut self, records: Vec<Record>) {
        for record in &records {
            if let Some(ts) = record_timestamp(record) {
                self.seen.observe(&ts);
            }
        }
        self.records.extend(records);
        self.pages += 1;
    }
}
