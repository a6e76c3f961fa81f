//! Run configuration.
//!
//! Everything the tool needs is resolved once at startup from command-line
//! flags, falling back to environment variables, into a [`QueryConfig`].
//! Credentials are kept apart from it so they can be dropped right after the
//! token exchange.

use crate::sls_api::{ClientCredentials, TOKEN_URL};
use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INPUT: &str = "rule_uuid_lookup.csv";
pub const DEFAULT_WINDOWS: usize = 12;
pub const DEFAULT_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_PAGE_DELAY_MS: u64 = 200;

/// Upper bounds for the window plan: ten years of monthly windows, and one
/// window spanning at most ten years.
pub const MAX_WINDOWS: usize = 120;
pub const MAX_WINDOW_DAYS: i64 = 3660;

pub const ENV_CLIENT_ID: &str = "SLS_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SLS_CLIENT_SECRET";
pub const ENV_CLIENT_SECRET_FILE: &str = "SLS_CLIENT_SECRET_FILE";
pub const ENV_SKIP_VERIFY: &str = "SLS_SKIP_VERIFY";

/// Known SLS regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Region {
    Us,
    #[default]
    Eu,
    Uk,
    Ca,
    Au,
    Jp,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Us,
        Region::Eu,
        Region::Uk,
        Region::Ca,
        Region::Au,
        Region::Jp,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
            Region::Uk => "uk",
            Region::Ca => "ca",
            Region::Au => "au",
            Region::Jp => "jp",
        }
    }

    pub fn base_url(self) -> String {
        format!("https://api.{}.logging-service.prismaaccess.com", self.code())
    }
}

/// A custom base URL wins over the region table.
pub fn resolve_base_url(region: Region, custom: Option<&str>) -> String {
    custom
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_else(|| region.base_url())
}

/// Check if TLS verification should be skipped based on the flag or
/// `SLS_SKIP_VERIFY`.
pub fn should_skip_verify(insecure_flag: bool) -> bool {
    insecure_flag || env::var(ENV_SKIP_VERIFY).map_or(false, |v| parse_truthy(&v))
}

fn parse_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

/// Resolve client credentials: flag, then environment, then secret file.
pub fn resolve_credentials(
    client_id: Option<&str>,
    client_secret: Option<&str>,
) -> Result<ClientCredentials> {
    let id = client_id
        .map(str::to_string)
        .or_else(|| env::var(ENV_CLIENT_ID).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            anyhow!(
                "SLS client id is required. Provide it via:\n\
                 - Command-line: --client-id <ID>\n\
                 - Environment variable: export {}=<ID>",
                ENV_CLIENT_ID
            )
        })?;

    let secret = if let Some(s) = client_secret {
        s.to_string()
    } else if let Ok(s) = env::var(ENV_CLIENT_SECRET) {
        s
    } else if let Ok(path) = env::var(ENV_CLIENT_SECRET_FILE) {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read client secret from file: {}", path))?
    } else {
        String::new()
    };
    let secret = secret.trim().to_string();
    if secret.is_empty() {
        return Err(anyhow!(
            "SLS client secret is required. Provide it via:\n\
             - Environment variable: export {}=<SECRET>\n\
             - Secret file: export {}=/path/to/secret\n\
             - Command-line: --client-secret <SECRET> (visible in shell history)",
            ENV_CLIENT_SECRET,
            ENV_CLIENT_SECRET_FILE
        ));
    }

    Ok(ClientCredentials::new(id, secret))
}

/// Settings for one `query` run.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub input: PathBuf,
    pub base_url: String,
    pub token_url: String,
    pub skip_verify: bool,
    pub log_type: Option<String>,
    pub output_dir: PathBuf,
    pub windows: usize,
    pub window_days: i64,
    pub page_size: usize,
    pub page_delay: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            base_url: Region::default().base_url(),
            token_url: TOKEN_URL.to_string(),
            skip_verify: false,
            log_type: None,
            output_dir: PathBuf::from("."),
            windows: DEFAULT_WINDOWS,
            window_days: DEFAULT_WINDOW_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
        }
    }
}

impl QueryConfig {
    /// Reject settings that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        check_window_plan(self.windows, self.window_days)?;
        if self.page_size == 0 {
            return Err(anyhow!("--page-size must be at least 1"));
        }
        Ok(())
    }

    /// The log type filter, if a non-blank one was given.
    pub fn log_type(&self) -> Option<&str> {
        self.log_type.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Check `--windows` and `--window-days` against their bounds.
pub fn check_window_plan(windows: usize, window_days: i64) -> Result<()> {
    if !(1..=MAX_WINDOWS).contains(&windows) {
        return Err(anyhow!(
            "--windows must be between 1 and {}, got {}",
            MAX_WINDOWS,
            windows
        ));
    }
    if !(1..=MAX_WINDOW_DAYS).contains(&window_days) {
        return Err(anyhow!(
            "--window-days must be between 1 and {}, got {}",
            MAX_WINDOW_DAYS,
            window_days
        ));
    }
    Ok(())
}
