//! Query construction and the pagination loop.
//!
//! [`paginate`] is independent of HTTP: it is driven by any fetcher that
//! turns an optional continuation token into a page, which is how
//! [`crate::sls_api::SlsClient::query_window`] uses it and how tests feed it
//! canned pages.

use super::types::{LogPage, QueryResult};
use crate::error::QueryError;
use crate::utils::time::TimeWindow;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Filter expression selecting one rule, optionally narrowed to a log type.
pub fn build_filter(rule_uuid: &str, log_type: Option<&str>) -> String {
    let mut filter = format!("(rule_uuid eq '{}')", rule_uuid);
    if let Some(log_type) = log_type.filter(|t| !t.is_empty()) {
        filter.push_str(&format!(" and (log_type eq '{}')", log_type));
    }
    filter
}

/// Fixed query parameters for one (rule, window) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowQuery {
    pub start_time: String,
    pub end_time: String,
    pub filter: String,
    pub max_results: usize,
}

impl WindowQuery {
    pub fn new(
        rule_uuid: &str,
        window: &TimeWindow,
        log_type: Option<&str>,
        max_results: usize,
    ) -> Self {
        Self {
            start_time: window.start_iso(),
            end_time: window.end_iso(),
            filter: build_filter(rule_uuid, log_type),
            max_results,
        }
    }

    /// Query-string pairs, with `pageToken` appended on follow-up pages.
    pub fn params(&self, page_token: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("startTime", self.start_time.clone()),
            ("endTime", self.end_time.clone()),
            ("filter", self.filter.clone()),
            ("maxResults", self.max_results.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        params
    }
}

/// Fetch pages until the server stops returning a continuation token or a
/// page comes back empty.
///
/// A failed page ends the loop; what was collected up to that point is
/// returned with [`QueryResult::error`] set. `delay` is slept between pages.
pub async fn paginate<F, Fut>(mut fetch: F, delay: Duration) -> QueryResult
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<LogPage, QueryError>>,
{
    let mut result = QueryResult::default();
    let mut page_token: Option<String> = None;

    loop {
        let page = match fetch(page_token.take()).await {
            Ok(page) => page,
            Err(e) => {
                warn!(pages = result.pages, records = result.count(), "{}", e);
                result.error = Some(e.to_string());
                break;
            }
        };

        let last = page.is_last();
        debug!(
            page = result.pages + 1,
            records = page.records.len(),
            more = !last,
            "fetched page"
        );
        result.absorb(page.records);

        if last {
            break;
        }
        page_token = page.next_token;

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    result
}
