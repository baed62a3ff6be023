//! Subset of Web API response objects read by the relay.
//!
//! Only the fields the profile page uses are declared; serde ignores the
//! rest of each payload.

use serde::Deserialize;

/// `GET /me`
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub display_name: Option<String>,
}

/// Paging envelope shared by the top-items and recently-played endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub name: String,
    // Podcast episodes come back through the player endpoints without artists
    #[serde(default)]
    pub artists: Vec<Artist>,
}

/// `GET /me/player/currently-playing`. `item` is absent or null when
/// nothing is playing.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentlyPlaying {
    pub item: Option<Track>,
}

/// One entry of `GET /me/player/recently-played`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayHistory {
    pub track: Track,
}
