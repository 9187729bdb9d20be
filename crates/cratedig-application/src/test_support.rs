// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory catalog used by the engine tests.

use crate::catalog::{CatalogBackend, CatalogError};
use async_trait::async_trait;
use cratedig_domain::{BearerToken, PlaylistHandle, SearchCandidate, TrackReference};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn token() -> BearerToken {
    BearerToken::new("test-token").expect("non-empty token")
}

pub(crate) fn album(id: &str, name: &str) -> SearchCandidate {
    SearchCandidate::new(id, name)
}

pub(crate) fn track_refs(album_id: &str, count: usize) -> Vec<TrackReference> {
    (0..count)
        .map(|n| TrackReference::new(format!("spotify:track:{}-{}", album_id, n)))
        .collect()
}

#[derive(Default)]
pub(crate) struct FakeCatalog {
    search_results: HashMap<String, Result<Vec<SearchCandidate>, ()>>,
    search_delays: HashMap<String, Duration>,
    albums: HashMap<String, Result<Vec<TrackReference>, ()>>,
    fail_current_user: bool,
    fail_add_on_call: Option<usize>,
    pub(crate) search_log: Mutex<Vec<String>>,
    search_limit_log: Mutex<Vec<u32>>,
    track_limit_log: Mutex<Vec<u32>>,
    pub(crate) track_fetch_log: Mutex<Vec<String>>,
    pub(crate) created_playlists: Mutex<Vec<String>>,
    pub(crate) add_batches: Mutex<Vec<Vec<TrackReference>>>,
}

impl FakeCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_search(mut self, query: &str, results: Vec<SearchCandidate>) -> Self {
        self.search_results.insert(query.to_string(), Ok(results));
        self
    }

    pub(crate) fn with_search_failure(mut self, query: &str) -> Self {
        self.search_results.insert(query.to_string(), Err(()));
        self
    }

    pub(crate) fn with_search_delay(mut self, query: &str, delay: Duration) -> Self {
        self.search_delays.insert(query.to_string(), delay);
        self
    }

    pub(crate) fn with_album(mut self, album_id: &str, tracks: Vec<TrackReference>) -> Self {
        self.albums.insert(album_id.to_string(), Ok(tracks));
        self
    }

    pub(crate) fn with_album_failure(mut self, album_id: &str) -> Self {
        self.albums.insert(album_id.to_string(), Err(()));
        self
    }

    pub(crate) fn failing_current_user(mut self) -> Self {
        self.fail_current_user = true;
        self
    }

    /// Fail the n-th add-tracks call (0-based).
    pub(crate) fn failing_add_on_call(mut self, call: usize) -> Self {
        self.fail_add_on_call = Some(call);
        self
    }

    pub(crate) fn searches(&self) -> Vec<String> {
        self.search_log.lock().unwrap().clone()
    }

    pub(crate) fn search_limits(&self) -> Vec<u32> {
        self.search_limit_log.lock().unwrap().clone()
    }

    pub(crate) fn track_fetch_limits(&self) -> Vec<u32> {
        self.track_limit_log.lock().unwrap().clone()
    }

    pub(crate) fn batch_sizes(&self) -> Vec<usize> {
        self.add_batches
            .lock()
            .unwrap()
            .iter()
            .map(Vec::len)
            .collect()
    }
}

#[async_trait]
impl CatalogBackend for FakeCatalog {
    async fn search_albums(
        &self,
        _credential: &BearerToken,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchCandidate>, CatalogError> {
        self.search_log.lock().unwrap().push(query.to_string());
        self.search_limit_log.lock().unwrap().push(limit);

        if let Some(delay) = self.search_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }

        match self.search_results.get(query) {
            Some(Ok(results)) => Ok(results.iter().take(limit as usize).cloned().collect()),
            Some(Err(())) => Err(CatalogError::Request(format!("search failed for {}", query))),
            None => Ok(Vec::new()),
        }
    }

    async fn album_tracks(
        &self,
        _credential: &BearerToken,
        album_id: &str,
        limit: u32,
    ) -> Result<Vec<TrackReference>, CatalogError> {
        self.track_fetch_log
            .lock()
            .unwrap()
            .push(album_id.to_string());
        self.track_limit_log.lock().unwrap().push(limit);

        match self.albums.get(album_id) {
            Some(Ok(tracks)) => Ok(tracks.iter().take(limit as usize).cloned().collect()),
            Some(Err(())) => Err(CatalogError::Request(format!(
                "track listing failed for {}",
                album_id
            ))),
            None => Err(CatalogError::NotFound(album_id.to_string())),
        }
    }

    async fn current_user(&self, _credential: &BearerToken) -> Result<String, CatalogError> {
        if self.fail_current_user {
            return Err(CatalogError::Unauthorized("token expired".to_string()));
        }
        Ok("crate-digger".to_string())
    }

    async fn create_playlist(
        &self,
        _credential: &BearerToken,
        _user_id: &str,
        name: &str,
    ) -> Result<PlaylistHandle, CatalogError> {
        let mut created = self.created_playlists.lock().unwrap();
        created.push(name.to_string());
        let id = format!("playlist-{}", created.len());
        Ok(PlaylistHandle {
            external_url: format!("https://open.spotify.com/playlist/{}", id),
            id,
        })
    }

    async fn add_tracks(
        &self,
        _credential: &BearerToken,
        _playlist_id: &str,
        tracks: &[TrackReference],
    ) -> Result<(), CatalogError> {
        let mut batches = self.add_batches.lock().unwrap();
        if self.fail_add_on_call == Some(batches.len()) {
            return Err(CatalogError::Request("add tracks failed".to_string()));
        }
        batches.push(tracks.to_vec());
        Ok(())
    }
}
