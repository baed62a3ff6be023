//! Profile page aggregation
//!
//! Five independent resource calls are issued concurrently and joined with
//! `try_join!`: the first failure drops the remaining futures and fails the
//! whole aggregation, so a caller never sees a partial profile.

use serde::Serialize;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Result;
use crate::model::{Artist, CurrentlyPlaying, Paging, PlayHistory, Track, UserProfile};

/// Items requested from each top/recent endpoint.
pub const PROFILE_ITEM_LIMIT: u32 = 5;

/// A track reduced to what the page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub track_name: String,
    /// Credited artists joined with ", "
    pub artist_name: String,
}

impl From<&Track> for TrackSummary {
    fn from(track: &Track) -> Self {
        Self {
            track_name: track.name.clone(),
            artist_name: join_artists(&track.artists),
        }
    }
}

/// Flat, read-only render model for the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub name: Option<String>,
    pub currently_playing: Option<TrackSummary>,
    pub recently_played: Vec<TrackSummary>,
    pub top_tracks: Vec<String>,
    pub top_artists: Vec<String>,
}

impl ProfileView {
    pub fn assemble(
        user: UserProfile,
        playing: Option<CurrentlyPlaying>,
        recent: Paging<PlayHistory>,
        top_tracks: Paging<Track>,
        top_artists: Paging<Artist>,
    ) -> Self {
        Self {
            name: user.display_name,
            currently_playing: playing
                .and_then(|p| p.item)
                .map(|item| TrackSummary::from(&item)),
            recently_played: recent
                .items
                .iter()
                .map(|entry| TrackSummary::from(&entry.track))
                .collect(),
            top_tracks: top_tracks.items.into_iter().map(|t| t.name).collect(),
            top_artists: top_artists.items.into_iter().map(|a| a.name).collect(),
        }
    }
}

pub fn join_artists(artists: &[Artist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fetch everything the profile page needs for one access token.
pub async fn fetch_profile(client: &ApiClient, access_token: &str) -> Result<ProfileView> {
    let (top_tracks, top_artists, user, playing, recent) = tokio::try_join!(
        client.top_tracks(access_token, PROFILE_ITEM_LIMIT),
        client.top_artists(access_token, PROFILE_ITEM_LIMIT),
        client.current_user(access_token),
        client.currently_playing(access_token),
        client.recently_played(access_token, PROFILE_ITEM_LIMIT),
    )?;

    debug!(
        top_tracks = top_tracks.items.len(),
        top_artists = top_artists.items.len(),
        recently_played = recent.items.len(),
        "profile fetched"
    );

    Ok(ProfileView::assemble(
        user,
        playing,
        recent,
        top_tracks,
        top_artists,
    ))
}
