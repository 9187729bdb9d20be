// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{Result, SpotifyError};
use crate::models::{
    AlbumSearchResponse, AlbumTrack, CreatePlaylistRequest, CurrentUser, ErrorEnvelope, Page,
    Playlist, SimplifiedAlbum, SnapshotResponse,
};
use crate::rate_limiter::RateLimiter;
use moka::sync::Cache;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tracing::{debug, instrument, trace};
use url::Url;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const USER_AGENT: &str = concat!("cratedig/", env!("CARGO_PKG_VERSION"));

/// Largest number of URIs Spotify accepts in a single add-tracks call.
pub const MAX_TRACKS_PER_ADD: usize = 100;

/// Largest `limit` Spotify accepts on search and album track listings.
pub const MAX_PAGE_LIMIT: u32 = 50;

/// Album track listings keyed by (credential fingerprint, album id, limit).
type TrackListingKey = (u64, String, u32);

/// Spotify Web API client with rate limiting.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    base_url: Url,
    rate_limiter: RateLimiter,
    album_tracks_cache: Cache<TrackListingKey, Vec<AlbumTrack>>,
}

impl SpotifyClient {
    /// Create a new Spotify client with default settings.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a client builder for custom configuration.
    pub fn builder() -> SpotifyClientBuilder {
        SpotifyClientBuilder::default()
    }

    /// Search the catalog for albums.
    ///
    /// Results come back in Spotify's relevance order and are returned as-is.
    ///
    /// # Example
    /// ```no_run
    /// # use cratedig_spotify::SpotifyClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = SpotifyClient::new()?;
    /// let albums = client.search_albums("access-token", "Thriller Michael Jackson", 5).await?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, access_token))]
    pub async fn search_albums(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SimplifiedAlbum>> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", "album")
            .append_pair("limit", &limit.to_string());

        let response: AlbumSearchResponse = self
            .send(self.client.get(url.as_str()), access_token)
            .await?;
        Ok(response.albums.items)
    }

    /// List the tracks of an album, in album order.
    ///
    /// Spotify relinks tracks to the market of the token's user, so listings
    /// are cached per credential as well as per album and page size. Duplicate
    /// releases in one collection cost a single call; another user's run
    /// never sees them.
    #[instrument(skip(self, access_token))]
    pub async fn album_tracks(
        &self,
        access_token: &str,
        album_id: &str,
        limit: u32,
    ) -> Result<Vec<AlbumTrack>> {
        let cache_key = (credential_fingerprint(access_token), album_id.to_string(), limit);
        if let Some(cached) = self.album_tracks_cache.get(&cache_key) {
            trace!(target: "spotify", album_id, "album tracks served from cache");
            return Ok(cached);
        }

        let mut url = self.endpoint(&["albums", album_id, "tracks"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let page: Page<AlbumTrack> = self
            .send(self.client.get(url.as_str()), access_token)
            .await?;

        self.album_tracks_cache.insert(cache_key, page.items.clone());
        Ok(page.items)
    }

    /// Fetch the profile of the user owning the access token.
    pub async fn current_user(&self, access_token: &str) -> Result<CurrentUser> {
        let url = self.endpoint(&["me"])?;
        self.send(self.client.get(url.as_str()), access_token).await
    }

    /// Create a playlist owned by `user_id`.
    #[instrument(skip(self, access_token, request), fields(name = %request.name))]
    pub async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<Playlist> {
        let url = self.endpoint(&["users", user_id, "playlists"])?;
        self.send(self.client.post(url.as_str()).json(request), access_token)
            .await
    }

    /// Append tracks to a playlist. At most [`MAX_TRACKS_PER_ADD`] URIs per call.
    #[instrument(skip(self, access_token, uris), fields(count = uris.len()))]
    pub async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<SnapshotResponse> {
        if uris.len() > MAX_TRACKS_PER_ADD {
            return Err(SpotifyError::TooManyTracks(uris.len()));
        }

        let url = self.endpoint(&["playlists", playlist_id, "tracks"])?;
        let body = serde_json::json!({ "uris": uris });
        self.send(self.client.post(url.as_str()).json(&body), access_token)
            .await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SpotifyError::InvalidResponse(format!("base URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Internal method to perform rate-limited, authenticated requests.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        access_token: &str,
    ) -> Result<T> {
        self.rate_limiter.acquire().await?;

        let response = request.bearer_auth(access_token).send().await?;

        let status = response.status();
        let url = response.url().to_string();
        debug!(target: "spotify", %url, "response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok());
            if let Some(secs) = retry_after_secs {
                self.rate_limiter.back_off(Duration::from_secs(secs)).await;
            }
            return Err(SpotifyError::RateLimitExceeded { retry_after_secs });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            return Err(match status {
                StatusCode::UNAUTHORIZED => SpotifyError::Unauthorized(message),
                StatusCode::NOT_FOUND => SpotifyError::NotFound(url),
                _ => SpotifyError::ApiError {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body = response.text().await?;
        trace!(target: "spotify", "response body: {}", body);

        serde_json::from_str(&body).map_err(|e| {
            SpotifyError::InvalidResponse(format!("Failed to parse response: {}", e))
        })
    }
}

impl std::fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("base_url", &self.base_url.as_str())
            .field("rate_limiter", &self.rate_limiter)
            .field("cached_albums", &self.album_tracks_cache.entry_count())
            .finish()
    }
}

fn credential_fingerprint(access_token: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    access_token.hash(&mut hasher);
    hasher.finish()
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                "Unknown error".to_string()
            } else {
                body.to_string()
            }
        })
}

/// Builder for configuring a Spotify client.
#[derive(Debug)]
pub struct SpotifyClientBuilder {
    base_url: String,
    timeout: Duration,
    rate_limit_interval: Duration,
    cache_capacity: u64,
}

impl Default for SpotifyClientBuilder {
    fn default() -> Self {
        Self {
            base_url: SPOTIFY_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            rate_limit_interval: Duration::from_millis(50),
            cache_capacity: 1_000,
        }
    }
}

impl SpotifyClientBuilder {
    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set rate limit interval between requests.
    pub fn rate_limit_interval(mut self, interval: Duration) -> Self {
        self.rate_limit_interval = interval;
        self
    }

    /// Set how many album track listings are kept in memory.
    pub fn cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Build the Spotify client.
    pub fn build(self) -> Result<SpotifyClient> {
        let base_url = Url::parse(self.base_url.trim_end_matches('/')).map_err(|e| {
            SpotifyError::InvalidResponse(format!("invalid base URL {}: {}", self.base_url, e))
        })?;

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(SpotifyClient {
            client,
            base_url,
            rate_limiter: RateLimiter::new(self.rate_limit_interval),
            album_tracks_cache: Cache::new(self.cache_capacity),
        })
    }
}
