//! Typed errors for the library layer.
//!
//! Commands wrap these with `anyhow::Context` and let `main` report them.
//! Only [`QueryError`] is recoverable: it ends pagination for one window and
//! the run moves on.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the rule lookup table. All of them are fatal.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("CSV missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No UUID rows found in {}", .0.display())]
    Empty(PathBuf),

    #[error("UUID {uuid:?} on line {line} cannot be used as a file name")]
    UnusableUuid { line: u64, uuid: String },

    #[error("Failed to read CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Failures of the client-credentials token exchange. All of them are fatal.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Token request failed ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Token response is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("No access_token in token response")]
    MissingToken,
}

/// Failures of a single page request. These stop pagination for the current
/// window only.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("SLS query error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("SLS request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("SLS response is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
}
