//! Bearer-authenticated Web API client

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Artist, CurrentlyPlaying, Paging, PlayHistory, Track, UserProfile};

/// Web API client. Holds no token; every call takes the caller's access
/// token so one client serves all users.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// GET `path` with `Authorization: Bearer <access_token>`.
    ///
    /// Returns `None` for `204 No Content` or an empty body.
    async fn get<T: DeserializeOwned>(&self, path: &str, access_token: &str) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {path} failed: {e}")))?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "web api response");

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            if status == StatusCode::UNAUTHORIZED {
                return Err(Error::Unauthorized(format!("GET {path}: {body}")));
            }
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Http(format!("reading GET {path} body failed: {e}")))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::Decode(format!("GET {path}: {e}")))
    }

    async fn get_required<T: DeserializeOwned>(&self, path: &str, access_token: &str) -> Result<T> {
        self.get(path, access_token)
            .await?
            .ok_or_else(|| Error::Decode(format!("GET {path}: empty response")))
    }

    pub async fn current_user(&self, access_token: &str) -> Result<UserProfile> {
        self.get_required("/me", access_token).await
    }

    pub async fn top_tracks(&self, access_token: &str, limit: u32) -> Result<Paging<Track>> {
        self.get_required(&format!("/me/top/tracks?limit={limit}"), access_token)
            .await
    }

    pub async fn top_artists(&self, access_token: &str, limit: u32) -> Result<Paging<Artist>> {
        self.get_required(&format!("/me/top/artists?limit={limit}"), access_token)
            .await
    }

    /// `None` when the player has nothing to report.
    pub async fn currently_playing(&self, access_token: &str) -> Result<Option<CurrentlyPlaying>> {
        self.get("/me/player/currently-playing", access_token).await
    }

    pub async fn recently_played(
        &self,
        access_token: &str,
        limit: u32,
    ) -> Result<Paging<PlayHistory>> {
        self.get_required(
            &format!("/me/player/recently-played?limit={limit}"),
            access_token,
        )
        .await
    }
}
