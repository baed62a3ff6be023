//! Spotify Web API resource calls used by the profile page
//!
//! `ApiClient` performs bearer-authenticated GETs against the Web API and
//! decodes the handful of response shapes the relay needs. `profile`
//! fans out the five listening-activity calls and reshapes them into a
//! flat `ProfileView` for rendering.

pub mod client;
pub mod error;
pub mod model;
pub mod profile;

#[cfg(test)]
mod test_support;

pub use client::ApiClient;
pub use error::{Error, Result};
pub use profile::{PROFILE_ITEM_LIMIT, ProfileView, TrackSummary, fetch_profile};
