//! Error types for Web API calls

/// Errors from resource requests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The access token was rejected (expired or revoked).
    #[error("access token rejected: {0}")]
    Unauthorized(String),

    #[error("Web API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Result alias for Web API operations.
pub type Result<T> = std::result::Result<T, Error>;
