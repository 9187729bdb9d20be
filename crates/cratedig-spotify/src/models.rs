// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Generic paging object wrapping most Spotify list responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    /// URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
}

/// Body of `GET /search?type=album`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumSearchResponse {
    pub albums: Page<SimplifiedAlbum>,
}

/// Album as it appears in search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimplifiedAlbum {
    /// Spotify album ID.
    pub id: String,
    /// Album name.
    pub name: String,
    /// Spotify URI (`spotify:album:...`).
    #[serde(default)]
    pub uri: Option<String>,
    /// Album type (e.g., "album", "single", "compilation").
    #[serde(default)]
    pub album_type: Option<String>,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD).
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub total_tracks: Option<u32>,
}

/// Track entry from `GET /albums/{id}/tracks`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumTrack {
    pub id: Option<String>,
    pub name: String,
    /// Spotify URI (`spotify:track:...`), the value accepted by playlist add.
    pub uri: String,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub disc_number: Option<u32>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

/// Body of `GET /me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Body of `POST /users/{user_id}/playlists`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreatePlaylistRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public: false,
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Playlist returned by playlist creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Playlist {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
}

impl Playlist {
    /// Browser URL of the playlist, if Spotify returned one.
    pub fn spotify_url(&self) -> Option<&str> {
        self.external_urls.get("spotify").map(String::as_str)
    }
}

/// Body returned when tracks are added to a playlist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

/// Error envelope Spotify uses for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
