//! Spotify Authorization Code flow
//!
//! Provides the anti-forgery state nonce, authorization URL construction,
//! client credentials and the two token endpoint calls used by the auth
//! relay. The crate holds no per-user state; callers keep the nonce and
//! the tokens wherever the browser lets them (cookies or URL fragments).
//!
//! Flow:
//! 1. Relay calls `state::generate_state()` and stores the nonce client-side
//! 2. User is redirected to `AuthClient::authorization_url()`
//! 3. Callback checks the echoed value with `state::verify_state()`
//! 4. Relay calls `AuthClient::exchange_code()` with the authorization code
//! 5. Later, `AuthClient::refresh_token()` mints a new access token

pub mod authorize;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod secret;
pub mod state;
pub mod token;

pub use authorize::build_authorization_url;
pub use constants::*;
pub use credentials::ClientCredentials;
pub use error::{Error, Result};
pub use secret::Secret;
pub use state::{generate_state, verify_state};
pub use token::{AuthClient, TokenPair, TokenResponse};
