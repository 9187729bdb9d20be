// SPDX-License-Identifier: GPL-3.0-or-later
use cratedig_config::AppConfig;
use cratedig_spotify::SpotifyClient;
use std::sync::Arc;
use std::time::Duration;

pub mod catalog;
pub mod coordinator;
pub mod matching;
pub mod normalize;
pub mod queries;
pub mod resolver;
#[cfg(test)]
mod test_support;
pub mod tracks;
pub mod upload;

pub use catalog::{CatalogBackend, CatalogError};
pub use coordinator::{BuildError, RunCoordinator};
pub use matching::select_match;
pub use normalize::{clean, normalize};
pub use queries::generate_queries;
pub use resolver::AlbumResolver;
pub use tracks::{TrackCollection, TrackCollector};
pub use upload::BatchUploader;

use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub coordinator: Arc<RunCoordinator>,
}

impl AppState {
    pub fn new(config: AppConfig, backend: Arc<dyn CatalogBackend>) -> Self {
        let coordinator = Arc::new(RunCoordinator::new(backend, &config.resolver));
        Self {
            config,
            coordinator,
        }
    }

    /// Build state backed by the Spotify Web API as configured.
    pub fn from_config(config: AppConfig) -> Result<Self, CatalogError> {
        let client = SpotifyClient::builder()
            .base_url(config.spotify.api_base_url.clone())
            .timeout(Duration::from_secs(config.spotify.timeout_secs))
            .rate_limit_interval(Duration::from_millis(config.spotify.min_request_interval_ms))
            .build()?;

        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn on_start(&self) {
        info!(
            target: "application",
            spotify_api = %self.config.spotify.api_base_url,
            max_concurrent_releases = self.config.resolver.max_concurrent_releases,
            "application state initialized"
        );
    }
}
