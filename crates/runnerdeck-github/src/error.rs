//! Error type for the GitHub fetch boundary.

use thiserror::Error;

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Any failure of a whole list operation. The poller treats each of these as
/// "this tick failed", never as an empty result.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("GitHub API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// No token in the environment; construction-time failure.
    #[error("no GitHub token found: set GH_TOKEN or GITHUB_TOKEN")]
    MissingToken,

    /// The token cannot be sent as an HTTP header.
    #[error("GitHub token is not a valid header value")]
    InvalidToken,
}

impl FetchError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
