//! Cookies set by the relay
//!
//! All per-user state lives in these cookies; the relay keeps nothing
//! between requests.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Anti-forgery nonce issued at `/login`, consumed at `/callback`
pub const STATE_KEY: &str = "spotify_auth_state";
pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";

/// Lifetime of the state cookie; a login left open longer must restart.
const STATE_TTL: Duration = Duration::minutes(10);

/// State nonce cookie.
///
/// `SameSite=Lax` rather than `Strict`: the callback arrives as a
/// cross-site top-level navigation from the provider, and a `Strict`
/// cookie would not be sent with it.
pub fn state_cookie(nonce: &str) -> Cookie<'static> {
    Cookie::build((STATE_KEY, nonce.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(STATE_TTL)
        .build()
}

/// Removal cookie for the state nonce.
pub fn clear_state_cookie() -> Cookie<'static> {
    Cookie::build((STATE_KEY, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Access or refresh token cookie: `HttpOnly; Secure; SameSite=Strict`.
pub fn token_cookie(name: &'static str, value: &str) -> Cookie<'static> {
    Cookie::build((name, value.to_string()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .build()
}

/// Non-empty cookie value by name.
pub fn value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
