//! In-process Web API stand-in for tests.

use std::sync::{Arc, Mutex};

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub const VALID_TOKEN: &str = "at_valid";

/// What `/me/player/currently-playing` answers with.
#[derive(Debug, Clone, Copy)]
pub enum NowPlaying {
    /// 200 with a two-artist track
    Track,
    /// 200 with a body that has no `item`
    Idle,
    /// 204 No Content
    NoContent,
}

#[derive(Clone)]
struct MockState {
    now_playing: NowPlaying,
    failing_path: Option<&'static str>,
    requested: Arc<Mutex<Vec<String>>>,
}

pub struct MockApi {
    pub base_url: String,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockApi {
    pub async fn start(now_playing: NowPlaying) -> Self {
        Self::spawn(now_playing, None).await
    }

    /// Like `start`, but `failing_path` answers 500.
    pub async fn start_failing(now_playing: NowPlaying, failing_path: &'static str) -> Self {
        Self::spawn(now_playing, Some(failing_path)).await
    }

    async fn spawn(now_playing: NowPlaying, failing_path: Option<&'static str>) -> Self {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            now_playing,
            failing_path,
            requested: requested.clone(),
        };

        let app = axum::Router::new().fallback(handle).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/v1"),
            requested,
        }
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

async fn handle(State(state): State<MockState>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    let full = request
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| path.clone());
    state.requested.lock().unwrap().push(full);

    let authorized = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {VALID_TOKEN}"));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({"error": {"status": 401, "message": "The access token expired"}})),
        )
            .into_response();
    }

    if state.failing_path == Some(path.as_str()) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }

    match path.as_str() {
        "/v1/me" => axum::Json(json!({
            "id": "ada",
            "display_name": "Ada Lovelace",
            "country": "GB"
        }))
        .into_response(),
        "/v1/me/top/tracks" => axum::Json(json!({
            "items": [
                {"name": "Windowlicker", "artists": [{"name": "Aphex Twin"}]},
                {"name": "Teardrop", "artists": [{"name": "Massive Attack"}]}
            ]
        }))
        .into_response(),
        "/v1/me/top/artists" => axum::Json(json!({
            "items": [{"name": "Aphex Twin"}, {"name": "Boards of Canada"}]
        }))
        .into_response(),
        "/v1/me/player/currently-playing" => match state.now_playing {
            NowPlaying::Track => axum::Json(json!({
                "is_playing": true,
                "item": {
                    "name": "Under Pressure",
                    "artists": [{"name": "Queen"}, {"name": "David Bowie"}]
                }
            }))
            .into_response(),
            NowPlaying::Idle => axum::Json(json!({"is_playing": false})).into_response(),
            NowPlaying::NoContent => StatusCode::NO_CONTENT.into_response(),
        },
        "/v1/me/player/recently-played" => axum::Json(json!({
            "items": [
                {
                    "track": {"name": "Roygbiv", "artists": [{"name": "Boards of Canada"}]},
                    "played_at": "2026-10-18T21:04:00.000Z"
                },
                {
                    "track": {
                        "name": "Empire State of Mind",
                        "artists": [{"name": "JAY-Z"}, {"name": "Alicia Keys"}]
                    },
                    "played_at": "2026-10-18T20:59:00.000Z"
                }
            ]
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
