// SPDX-License-Identifier: GPL-3.0-or-later

use crate::catalog::CatalogBackend;
use cratedig_domain::{BearerToken, ResolvedAlbum, TrackReference};
use cratedig_spotify::MAX_PAGE_LIMIT;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of tracks fetched per album.
pub const DEFAULT_TRACK_PAGE_SIZE: u32 = 50;

/// Outcome of listing a resolved album's tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackCollection {
    /// Track references in album order; may be empty for an empty album.
    Collected(Vec<TrackReference>),
    /// The listing call failed; the album contributes no tracks.
    Failed,
}

impl TrackCollection {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    pub fn into_tracks(self) -> Vec<TrackReference> {
        match self {
            Self::Collected(tracks) => tracks,
            Self::Failed => Vec::new(),
        }
    }
}

pub struct TrackCollector {
    backend: Arc<dyn CatalogBackend>,
    page_size: u32,
}

impl TrackCollector {
    /// `page_size` is clamped to `1..=50`, the listing ceiling of the catalog.
    pub fn new(backend: Arc<dyn CatalogBackend>, page_size: u32) -> Self {
        Self {
            backend,
            page_size: page_size.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub async fn collect_tracks(
        &self,
        album: &ResolvedAlbum,
        credential: &BearerToken,
    ) -> TrackCollection {
        match self
            .backend
            .album_tracks(credential, &album.external_id, self.page_size)
            .await
        {
            Ok(tracks) => {
                debug!(
                    target: "tracks",
                    album_id = %album.external_id,
                    count = tracks.len(),
                    "album tracks collected"
                );
                TrackCollection::Collected(tracks)
            }
            Err(error) => {
                warn!(
                    target: "tracks",
                    album_id = %album.external_id,
                    album = %album.display_name,
                    error = %error,
                    "track listing failed, skipping album"
                );
                TrackCollection::Failed
            }
        }
    }
}
