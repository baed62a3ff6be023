//! Error types for authorization and token operations

/// Errors from the authorization flow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("state mismatch: {0}")]
    StateMismatch(&'static str),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
