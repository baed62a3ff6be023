//! In-process Spotify stand-in and router helpers for handler tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Body;
use axum::extract::{Form, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use spotify_auth::Secret;
use tokio::net::TcpListener;
use tower::ServiceExt;

use crate::config::{Config, Delivery};
use crate::{AppState, build_router, metrics};

/// Access token the mock accepts on Web API calls.
pub const VALID_TOKEN: &str = "at_valid";

#[derive(Debug, Clone, Copy, Default)]
pub struct MockBehavior {
    /// Token endpoint answers 400 `invalid_grant`
    pub fail_token: bool,
    /// Refresh responses carry a new refresh token
    pub rotate_refresh: bool,
    /// Web API endpoints answer 500
    pub fail_api: bool,
}

#[derive(Clone)]
struct MockState {
    behavior: MockBehavior,
    token_calls: Arc<AtomicUsize>,
    api_calls: Arc<AtomicUsize>,
}

pub struct MockSpotify {
    /// Accounts service base URL
    pub url: String,
    /// Web API base URL
    pub api_url: String,
    token_calls: Arc<AtomicUsize>,
    api_calls: Arc<AtomicUsize>,
}

impl MockSpotify {
    pub async fn start(behavior: MockBehavior) -> Self {
        let state = MockState {
            behavior,
            token_calls: Arc::new(AtomicUsize::new(0)),
            api_calls: Arc::new(AtomicUsize::new(0)),
        };
        let token_calls = state.token_calls.clone();
        let api_calls = state.api_calls.clone();

        let app = Router::new()
            .route("/api/token", post(token))
            .fallback(web_api)
            .with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            api_url: format!("http://{addr}/v1"),
            token_calls,
            api_calls,
        }
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::SeqCst)
    }
}

async fn token(
    State(state): State<MockState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_calls.fetch_add(1, Ordering::SeqCst);

    if state.behavior.fail_token {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant"})),
        )
            .into_response();
    }

    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => Json(json!({
            "access_token": VALID_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "rt_issued",
            "scope": "user-read-private user-read-email"
        }))
        .into_response(),
        Some("refresh_token") => {
            let mut body = json!({
                "access_token": "at_refreshed",
                "token_type": "Bearer",
                "expires_in": 3600
            });
            if state.behavior.rotate_refresh {
                body["refresh_token"] = json!("rt_rotated");
            }
            Json(body).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        )
            .into_response(),
    }
}

async fn web_api(State(state): State<MockState>, request: Request) -> Response {
    state.api_calls.fetch_add(1, Ordering::SeqCst);

    let authorized = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {VALID_TOKEN}"));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"status": 401, "message": "The access token expired"}})),
        )
            .into_response();
    }

    if state.behavior.fail_api {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }

    match request.uri().path() {
        "/v1/me" => Json(json!({"id": "ada", "display_name": "Ada Lovelace"})).into_response(),
        "/v1/me/top/tracks" => Json(json!({
            "items": [{"name": "Windowlicker", "artists": [{"name": "Aphex Twin"}]}]
        }))
        .into_response(),
        "/v1/me/top/artists" => Json(json!({
            "items": [{"name": "Aphex Twin"}, {"name": "Boards of Canada"}]
        }))
        .into_response(),
        "/v1/me/player/currently-playing" => StatusCode::NO_CONTENT.into_response(),
        "/v1/me/player/recently-played" => Json(json!({
            "items": [{
                "track": {"name": "Roygbiv", "artists": [{"name": "Boards of Canada"}]},
                "played_at": "2026-10-18T21:04:00.000Z"
            }]
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Config pointing both provider services at `mock`.
pub fn test_config(mock: &MockSpotify, delivery: Delivery) -> Config {
    let mut config = Config::default();
    config.spotify.client_id = "test-client".into();
    config.spotify.client_secret = Some(Secret::new("test-secret".to_string()));
    config.spotify.accounts_url = mock.url.clone();
    config.spotify.api_url = mock.api_url.clone();
    config.spotify.delivery = delivery;
    config
}

pub fn test_app(mock: &MockSpotify, delivery: Delivery) -> Router {
    let config = test_config(mock, delivery);
    let state = AppState::from_config(&config, reqwest::Client::new(), metrics::detached_handle())
        .unwrap();
    build_router(state, &config.server)
}

/// GET `uri` with optional `Cookie` header value.
pub async fn get(app: Router, uri: &str, cookie: Option<&str>) -> Response {
    let headers: Vec<(&str, &str)> = cookie.map(|c| ("cookie", c)).into_iter().collect();
    get_with_headers(app, uri, &headers).await
}

pub async fn get_with_headers(app: Router, uri: &str, headers: &[(&str, &str)]) -> Response {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get("location")
        .expect("response has no Location header")
        .to_str()
        .unwrap()
        .to_string()
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
