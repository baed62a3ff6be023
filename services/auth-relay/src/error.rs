//! Relay error types and JSON error bodies

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

/// Startup errors (configuration loading).
///
/// Per-request failures never propagate as Rust errors; handlers turn
/// them into redirects or JSON responses directly.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using the relay Error
pub type Result<T> = std::result::Result<T, Error>;

/// `{"error": "...", "request_id": "req_..."}` with the given status.
///
/// The request id is logged alongside the message so a user-reported id
/// can be matched to the server-side cause.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
    warn!(request_id, status = status.as_u16(), message, "request failed");
    (
        status,
        Json(serde_json::json!({
            "error": message,
            "request_id": request_id,
        })),
    )
        .into_response()
}
