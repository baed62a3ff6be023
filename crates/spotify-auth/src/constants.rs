//! Spotify accounts service constants
//!
//! Endpoint paths are joined onto a configurable accounts base URL so the
//! relay can be pointed at a local stand-in during tests.

/// Production accounts service (authorize + token endpoints)
pub const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

/// Production Web API base for resource calls
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Consent page path, relative to the accounts base URL
pub const AUTHORIZE_PATH: &str = "/authorize";

/// Token endpoint path for code exchange and refresh
pub const TOKEN_PATH: &str = "/api/token";

/// Callback used when no redirect URI is configured (local development)
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8888/callback";

/// Length of the anti-forgery state nonce in characters
pub const STATE_LENGTH: usize = 16;

/// Read-only profile scopes requested by the fragment relay.
pub const BASIC_SCOPES: &[&str] = &["user-read-private", "user-read-email"];

/// Scopes requested by the cookie relay: profile plus listening activity.
pub const FULL_SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-top-read",
    "user-read-currently-playing",
    "user-read-recently-played",
];
