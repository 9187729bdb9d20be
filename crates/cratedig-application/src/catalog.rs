// SPDX-License-Identifier: GPL-3.0-or-later

//! Seam between the playlist engine and the streaming catalog.

use async_trait::async_trait;
use cratedig_domain::{BearerToken, PlaylistHandle, SearchCandidate, TrackReference};
use cratedig_spotify::{CreatePlaylistRequest, SpotifyClient, SpotifyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("credential rejected: {0}")]
    Unauthorized(String),
    #[error("rate limited by catalog")]
    RateLimited,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<SpotifyError> for CatalogError {
    fn from(error: SpotifyError) -> Self {
        match error {
            SpotifyError::Unauthorized(message) => Self::Unauthorized(message),
            SpotifyError::RateLimitExceeded { .. } => Self::RateLimited,
            SpotifyError::NotFound(resource) => Self::NotFound(resource),
            SpotifyError::InvalidResponse(message) => Self::InvalidResponse(message),
            SpotifyError::SerializationError(error) => Self::InvalidResponse(error.to_string()),
            other => Self::Request(other.to_string()),
        }
    }
}

/// Operations the engine needs from a streaming catalog.
///
/// Every call carries the caller's credential; implementations never
/// obtain or refresh credentials themselves.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Album search; results in backend relevance order.
    async fn search_albums(
        &self,
        credential: &BearerToken,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchCandidate>, CatalogError>;

    /// Track references of an album, in album order.
    async fn album_tracks(
        &self,
        credential: &BearerToken,
        album_id: &str,
        limit: u32,
    ) -> Result<Vec<TrackReference>, CatalogError>;

    /// ID of the user owning the credential.
    async fn current_user(&self, credential: &BearerToken) -> Result<String, CatalogError>;

    async fn create_playlist(
        &self,
        credential: &BearerToken,
        user_id: &str,
        name: &str,
    ) -> Result<PlaylistHandle, CatalogError>;

    /// Append at most 100 tracks to a playlist.
    async fn add_tracks(
        &self,
        credential: &BearerToken,
        playlist_id: &str,
        tracks: &[TrackReference],
    ) -> Result<(), CatalogError>;
}

const PLAYLIST_DESCRIPTION: &str = "Built from a record collection export by cratedig";

#[async_trait]
impl CatalogBackend for SpotifyClient {
    async fn search_albums(
        &self,
        credential: &BearerToken,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchCandidate>, CatalogError> {
        let albums = SpotifyClient::search_albums(self, credential.expose(), query, limit).await?;
        Ok(albums
            .into_iter()
            .map(|album| SearchCandidate::new(album.id, album.name))
            .collect())
    }

    async fn album_tracks(
        &self,
        credential: &BearerToken,
        album_id: &str,
        limit: u32,
    ) -> Result<Vec<TrackReference>, CatalogError> {
        let tracks = SpotifyClient::album_tracks(self, credential.expose(), album_id, limit).await?;
        Ok(tracks
            .into_iter()
            .map(|track| TrackReference::new(track.uri))
            .collect())
    }

    async fn current_user(&self, credential: &BearerToken) -> Result<String, CatalogError> {
        let user = SpotifyClient::current_user(self, credential.expose()).await?;
        Ok(user.id)
    }

    async fn create_playlist(
        &self,
        credential: &BearerToken,
        user_id: &str,
        name: &str,
    ) -> Result<PlaylistHandle, CatalogError> {
        let request = CreatePlaylistRequest::new(name).description(PLAYLIST_DESCRIPTION);
        let playlist =
            SpotifyClient::create_playlist(self, credential.expose(), user_id, &request).await?;

        let external_url = playlist
            .spotify_url()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", playlist.id));

        Ok(PlaylistHandle {
            id: playlist.id,
            external_url,
        })
    }

    async fn add_tracks(
        &self,
        credential: &BearerToken,
        playlist_id: &str,
        tracks: &[TrackReference],
    ) -> Result<(), CatalogError> {
        let uris: Vec<String> = tracks.iter().map(|track| track.0.clone()).collect();
        SpotifyClient::add_tracks(self, credential.expose(), playlist_id, &uris).await?;
        Ok(())
    }
}
