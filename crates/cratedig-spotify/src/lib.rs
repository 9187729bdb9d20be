// SPDX-License-Identifier: GPL-3.0-or-later

//! Spotify Web API client for building playlists.
//!
//! Covers the handful of endpoints the playlist builder needs: album search,
//! album track listing, the current user profile, playlist creation and
//! adding tracks. Every call takes the caller's bearer access token; the
//! client never obtains or refreshes tokens itself.

pub mod client;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::{SpotifyClient, SpotifyClientBuilder, MAX_PAGE_LIMIT, MAX_TRACKS_PER_ADD};
pub use error::{Result, SpotifyError};
pub use models::{
    AlbumSearchResponse, AlbumTrack, CreatePlaylistRequest, CurrentUser, Page, Playlist,
    SimplifiedAlbum, SnapshotResponse,
};
