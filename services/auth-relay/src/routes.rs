//! Login, callback and refresh handlers
//!
//! Login → callback is the only sequence with state: the nonce issued at
//! `/login` travels in a cookie and must come back unchanged as `state`
//! before the code is exchanged. Everything else is a single request.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::AppState;
use crate::config::Delivery;
use crate::cookies::{self, ACCESS_TOKEN, REFRESH_TOKEN, STATE_KEY};
use crate::error::error_response;
use crate::{metrics, render};

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Fragment string with percent-encoded values: `a=1&b=2`.
fn fragment(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Redirect to the landing page with `#error=<code>`.
fn error_redirect(code: &str) -> Response {
    found(&format!("/#{}", fragment(&[("error", code)])))
}

/// GET /: landing page
pub async fn index() -> Html<String> {
    Html(render::index_page())
}

/// GET /login: issue a state nonce and send the browser to the consent page.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let nonce = spotify_auth::generate_state();
    let authorization_url = state.auth.authorization_url(&state.scope, &nonce);

    info!(scope = %state.scope, "redirecting to authorization endpoint");

    (jar.add(cookies::state_cookie(&nonce)), found(&authorization_url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// GET /callback: verify state, exchange the code, deliver the tokens.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> Response {
    // A query that does not parse cannot carry a usable state
    let Query(params) = match params {
        Ok(params) => params,
        Err(e) => {
            warn!(error = %e, "rejecting callback with malformed query");
            return error_redirect("state_mismatch");
        }
    };

    let stored = cookies::value(&jar, STATE_KEY);
    if let Err(e) = spotify_auth::verify_state(params.state.as_deref(), stored.as_deref()) {
        warn!(error = %e, "rejecting callback");
        return error_redirect("state_mismatch");
    }

    // The nonce is single use regardless of how the exchange goes
    let jar = jar.add(cookies::clear_state_cookie());

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        warn!(
            provider_error = params.error.as_deref().unwrap_or("none"),
            "callback carried no authorization code"
        );
        return (jar, error_redirect("invalid_token")).into_response();
    };

    let tokens = match state.auth.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            error!(error = %e, "authorization code exchange failed");
            metrics::record_upstream_error("token_exchange");
            return (jar, error_redirect("invalid_token")).into_response();
        }
    };

    info!(delivery = state.delivery.as_str(), "login completed");

    match state.delivery {
        Delivery::Cookie => {
            let jar = jar
                .add(cookies::token_cookie(ACCESS_TOKEN, &tokens.access_token))
                .add(cookies::token_cookie(REFRESH_TOKEN, &tokens.refresh_token));
            (jar, found("/profile")).into_response()
        }
        Delivery::Fragment => {
            let location = format!(
                "/#{}",
                fragment(&[
                    ("access_token", tokens.access_token.as_str()),
                    ("refresh_token", tokens.refresh_token.as_str()),
                ])
            );
            (jar, found(&location)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    refresh_token: Option<String>,
}

const REFRESH_FAILED: &str = "failed_to_refresh_token";

/// GET /refresh_token: mint a new access token.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    params: Result<Query<RefreshParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(e) => {
            warn!(error = %e, "refresh requested with malformed query");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, REFRESH_FAILED);
        }
    };

    let presented = match state.delivery {
        Delivery::Cookie => cookies::value(&jar, REFRESH_TOKEN),
        Delivery::Fragment => params.refresh_token.filter(|t| !t.is_empty()),
    };

    let Some(presented) = presented else {
        warn!(
            delivery = state.delivery.as_str(),
            "refresh requested without a refresh token"
        );
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, REFRESH_FAILED);
    };

    let token = match state.auth.refresh_token(&presented).await {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "token refresh failed");
            metrics::record_upstream_error("token_refresh");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, REFRESH_FAILED);
        }
    };

    match state.delivery {
        Delivery::Cookie => {
            let mut jar = jar.add(cookies::token_cookie(ACCESS_TOKEN, &token.access_token));
            if let Some(rotated) = &token.refresh_token {
                jar = jar.add(cookies::token_cookie(REFRESH_TOKEN, rotated));
            }
            (
                jar,
                Json(serde_json::json!({ "access_token": token.access_token })),
            )
                .into_response()
        }
        Delivery::Fragment => Json(serde_json::json!({
            "access_token": token.access_token,
            "refresh_token": token.refresh_token.unwrap_or(presented),
        }))
        .into_response(),
    }
}
