//! GET /profile: listening summary for the cookie-authenticated user
//!
//! Only routed when tokens are delivered as cookies; in fragment mode the
//! relay never sees the access token again after the callback.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, warn};

use crate::AppState;
use crate::cookies::{self, ACCESS_TOKEN};
use crate::error::error_response;
use crate::{metrics, render};

const TOKEN_MISSING: &str = "Access token missing or expired";
const FETCH_FAILED: &str = "Failed to fetch profile data";

pub async fn profile(State(state): State<AppState>, jar: CookieJar, headers: HeaderMap) -> Response {
    let Some(access_token) = cookies::value(&jar, ACCESS_TOKEN) else {
        return error_response(StatusCode::UNAUTHORIZED, TOKEN_MISSING);
    };

    let view = match spotify_api::fetch_profile(&state.api, &access_token).await {
        Ok(view) => view,
        Err(spotify_api::Error::Unauthorized(detail)) => {
            warn!(detail = %detail, "access token rejected by web api");
            return error_response(StatusCode::UNAUTHORIZED, TOKEN_MISSING);
        }
        Err(e) => {
            error!(error = %e, "profile fetch failed");
            metrics::record_upstream_error("profile");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED);
        }
    };

    if wants_json(&headers) {
        Json(view).into_response()
    } else {
        Html(render::profile_page(&view)).into_response()
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}
