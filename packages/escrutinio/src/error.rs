//! Typed errors for the scrutiny watcher.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors raised by a page-accessor backend.
///
/// Extraction itself never fails; an unrecognizable snapshot is an empty
/// result. These errors cover the backend being unreachable or the page
/// missing the controls the acquisition loop drives.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The backend (browser session, HTTP client) is gone or unusable.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// A control the acquisition loop needs was not found on the page.
    #[error("control not found: {control}")]
    MissingControl { control: String },

    /// HTTP request failed (direct-payload probe).
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised by the result store (cache, markers, historical log).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache document could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Historical log line did not match the expected record shape.
    #[error("malformed history record at line {line}: {reason}")]
    MalformedHistory { line: usize, reason: String },
}

/// Top-level errors for an acquisition run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Page access failed
    #[error("access failed: {0}")]
    Access(#[from] AccessError),

    /// Store operation failed
    #[error("store failed: {0}")]
    Store(#[from] StoreError),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type alias for page-accessor operations.
pub type AccessResult<T> = std::result::Result<T, AccessError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for top-level operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;
