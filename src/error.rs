//! Error types shared by the search, media and answer modules

use thiserror::Error;

/// Errors surfaced by providers, media lookups and the answer stream
#[derive(Debug, Error)]
pub enum Error {
    /// Configured provider name matches none of the known adapters
    #[error("Unsupported search provider: {0}")]
    UnsupportedProvider(String),

    /// Upstream answered with a non-success status
    #[error("HTTP error! status: {status}, details: {body}")]
    Http { status: u16, body: String },

    /// Body parsed but lacks an expected field
    #[error("Invalid API response format: {0}")]
    InvalidResponseFormat(String),

    /// Credential env var is unset or empty
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// Network-level failure from the HTTP client
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Operation aborted through its cancellation token
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the error came from a request deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;
