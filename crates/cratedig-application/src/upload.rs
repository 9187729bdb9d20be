// SPDX-License-Identifier: GPL-3.0-or-later

use crate::catalog::{CatalogBackend, CatalogError};
use cratedig_domain::{BearerToken, PlaylistHandle, TrackReference};
use cratedig_spotify::MAX_TRACKS_PER_ADD;
use std::sync::Arc;
use tracing::{debug, error};

/// Submits track references to a playlist in bounded, ordered chunks.
pub struct BatchUploader {
    backend: Arc<dyn CatalogBackend>,
    batch_size: usize,
}

impl BatchUploader {
    /// `batch_size` is clamped to `1..=100`, the per-call ceiling of the catalog.
    pub fn new(backend: Arc<dyn CatalogBackend>, batch_size: usize) -> Self {
        Self {
            backend,
            batch_size: batch_size.clamp(1, MAX_TRACKS_PER_ADD),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Upload every reference, one chunk at a time, in original order.
    ///
    /// Chunk `k + 1` is only sent after chunk `k` succeeded. The first failing
    /// chunk aborts the upload and its error is returned.
    pub async fn upload(
        &self,
        tracks: &[TrackReference],
        playlist: &PlaylistHandle,
        credential: &BearerToken,
    ) -> Result<usize, CatalogError> {
        let mut added = 0;

        for (index, chunk) in tracks.chunks(self.batch_size).enumerate() {
            if let Err(e) = self
                .backend
                .add_tracks(credential, &playlist.id, chunk)
                .await
            {
                error!(
                    target: "upload",
                    playlist_id = %playlist.id,
                    chunk = index,
                    added,
                    error = %e,
                    "adding tracks failed"
                );
                return Err(e);
            }

            added += chunk.len();
            debug!(
                target: "upload",
                playlist_id = %playlist.id,
                chunk = index,
                size = chunk.len(),
                added,
                "chunk added"
            );
        }

        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{token, track_refs, FakeCatalog};

    fn playlist() -> PlaylistHandle {
        PlaylistHandle {
            id: "pl".to_string(),
            external_url: "https://open.spotify.com/playlist/pl".to_string(),
        }
    }

    #[tokio::test]
    async fn splits_250_refs_into_ordered_chunks() {
        let catalog = Arc::new(FakeCatalog::new());
        let uploader = BatchUploader::new(catalog.clone(), 100);
        let tracks = track_refs("a", 250);

        let added = uploader.upload(&tracks, &playlist(), &token()).await.unwrap();

        assert_eq!(added, 250);
        assert_eq!(catalog.batch_sizes(), vec![100, 100, 50]);
        let flattened: Vec<TrackReference> =
            catalog.add_batches.lock().unwrap().concat();
        assert_eq!(flattened, tracks);
    }

    #[tokio::test]
    async fn exactly_one_full_chunk_is_a_single_call() {
        let catalog = Arc::new(FakeCatalog::new());
        let uploader = BatchUploader::new(catalog.clone(), 100);

        let added = uploader
            .upload(&track_refs("a", 100), &playlist(), &token())
            .await
            .unwrap();

        assert_eq!(added, 100);
        assert_eq!(catalog.batch_sizes(), vec![100]);
    }

    #[tokio::test]
    async fn one_past_the_ceiling_spills_into_second_call() {
        let catalog = Arc::new(FakeCatalog::new());
        let uploader = BatchUploader::new(catalog.clone(), 100);
        let tracks = track_refs("a", 101);

        let added = uploader.upload(&tracks, &playlist(), &token()).await.unwrap();

        assert_eq!(added, 101);
        assert_eq!(catalog.batch_sizes(), vec![100, 1]);
        assert_eq!(catalog.add_batches.lock().unwrap()[1], vec![tracks[100].clone()]);
    }

    #[tokio::test]
    async fn empty_input_issues_no_calls() {
        let catalog = Arc::new(FakeCatalog::new());
        let uploader = BatchUploader::new(catalog.clone(), 100);

        let added = uploader.upload(&[], &playlist(), &token()).await.unwrap();

        assert_eq!(added, 0);
        assert!(catalog.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn failing_chunk_aborts_remaining_chunks() {
        let catalog = Arc::new(FakeCatalog::new().failing_add_on_call(1));
        let uploader = BatchUploader::new(catalog.clone(), 100);

        let result = uploader
            .upload(&track_refs("a", 250), &playlist(), &token())
            .await;

        assert!(result.is_err());
        assert_eq!(catalog.batch_sizes(), vec![100]);
    }

    #[test]
    fn batch_size_is_clamped_to_api_ceiling() {
        let catalog: Arc<dyn CatalogBackend> = Arc::new(FakeCatalog::new());
        assert_eq!(BatchUploader::new(catalog.clone(), 500).batch_size(), 100);
        assert_eq!(BatchUploader::new(catalog, 0).batch_size(), 1);
    }
}
