// Error types shared by the library modules. The binaries wrap these in
// `anyhow` for reporting; the library keeps them typed so callers can tell
// an unreachable store apart from a failed query, or an HTTP status apart
// from a transport failure.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failures raised by the user store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be opened, created or read as a database.
    #[error("cannot open database at {}: {source}", .path.display())]
    Connection {
        path: PathBuf,
        source: rusqlite::Error,
    },

    /// Any storage fault after the store was opened.
    #[error("database query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Failures raised while fetching a quote.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Error: no API key configured (set WHISPERER_API_KEY)")]
    MissingApiKey,

    /// The service answered with a non-success status.
    #[error("Error: {status} {body}")]
    Status { status: StatusCode, body: String },

    #[error("Error: request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Error: unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Error: no quotes returned")]
    Empty,
}
