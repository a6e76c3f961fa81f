//! HTTP access to the Strata Logging Service.
//!
//! [`acquire_token`] performs the one-off OAuth2 client-credentials exchange;
//! [`SlsClient`] then carries the bearer token, base URL and TLS setting for
//! the rest of the run. There is no token refresh: a run is expected to finish
//! well within the token lifetime.

use crate::error::{AuthError, QueryError};
use crate::sls::query::{paginate, WindowQuery};
use crate::sls::types::{LogPage, QueryResult};
use crate::utils::time::TimeWindow;
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Default OAuth2 token endpoint.
pub const TOKEN_URL: &str = "https://api.strata.paloaltonetworks.com/oauth2/access_token";

/// Logs query path, joined to the regional base URL.
pub const ENDPOINT_PATH: &str = "/logging-service/v2/logs";

const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);
const QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the shared HTTP client.
pub fn http_client(skip_verify: bool) -> Result<Client> {
    Client::builder()
        .danger_accept_invalid_certs(skip_verify)
        .build()
        .context("Failed to create HTTP client")
}

/// Service-account credentials. Consumed by [`acquire_token`] so they do not
/// outlive the exchange; `Debug` never shows the secret.
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Exchange client credentials for a bearer token.
///
/// Any status other than 200, a non-JSON body, or a body without a non-empty
/// `access_token`/`accessToken` is an error. Exactly one attempt is made.
pub async fn acquire_token(
    http: &Client,
    token_url: &str,
    credentials: ClientCredentials,
) -> Result<String, AuthError> {
    let ClientCredentials {
        client_id,
        client_secret,
    } = credentials;

    let response = http
        .post(token_url)
        .basic_auth(client_id, Some(client_secret))
        .form(&[("grant_type", "client_credentials")])
        .timeout(TOKEN_TIMEOUT)
        .send()
        .await
        .map_err(AuthError::Transport)?;

    let status = response.status();
    let body = response.text().await.map_err(AuthError::Transport)?;

    if status != StatusCode::OK {
        return Err(AuthError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let payload: Value = serde_json::from_str(&body).map_err(AuthError::Decode)?;
    let token = ["access_token", "accessToken"]
        .iter()
        .find_map(|key| {
            payload
                .get(*key)
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
        })
        .ok_or(AuthError::MissingToken)?;

    info!("access token acquired");
    Ok(token.to_string())
}

/// Authenticated context for log queries.
#[derive(Clone)]
pub struct SlsClient {
    base_url: String,
    token: String,
    verify_ssl: bool,
    client: Client,
}

impl fmt::Debug for SlsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlsClient")
            .field("base_url", &self.base_url)
            .field("verify_ssl", &self.verify_ssl)
            .finish_non_exhaustive()
    }
}

impl SlsClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(base_url: String, token: String, skip_verify: bool) -> Result<Self> {
        let client = http_client(skip_verify)?;
        Ok(Self::with_http(client, base_url, token, skip_verify))
    }

    /// Create a client reusing an existing HTTP client, e.g. the one used for
    /// the token exchange.
    pub fn with_http(client: Client, base_url: String, token: String, skip_verify: bool) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            verify_ssl: !skip_verify,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    pub fn logs_url(&self) -> String {
        format!("{}{}", self.base_url, ENDPOINT_PATH)
    }

    /// Fetch one page. 200 and 206 are accepted; 206 is what some gateways
    /// answer for a partial result set.
    pub async fn fetch_page(
        &self,
        query: &WindowQuery,
        page_token: Option<&str>,
    ) -> Result<LogPage, QueryError> {
        let response = self
            .client
            .get(self.logs_url())
            .bearer_auth(&self.token)
            .query(&query.params(page_token))
            .timeout(QUERY_TIMEOUT)
            .send()
            .await
            .map_err(QueryError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(QueryError::Transport)?;

        if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
            return Err(QueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        LogPage::parse(&body).map_err(QueryError::Decode)
    }

    /// Collect every page for one rule and window.
    pub async fn query_window(
        &self,
        rule_uuid: &str,
        window: &TimeWindow,
        log_type: Option<&str>,
        page_size: usize,
        page_delay: Duration,
    ) -> QueryResult {
        let query = WindowQuery::new(rule_uuid, window, log_type, page_size);
        debug!(rule_uuid, start = %query.start_time, end = %query.end_time, "querying window");

        let query = &query;
        paginate(
            move |token: Option<String>| async move { self.fetch_page(query, token.as_deref()).await },
            page_delay,
        )
        .await
    }
}
