// SPDX-License-Identifier: GPL-3.0-or-later

//! Orchestrates a whole collection-to-playlist run.
//!
//! Releases are resolved in input order (or through a bounded worker pool
//! whose results are re-sorted by input index), tracks of every resolved
//! album are accumulated, and the accumulated sequence is uploaded once.

use crate::catalog::{CatalogBackend, CatalogError};
use crate::resolver::AlbumResolver;
use crate::tracks::{TrackCollection, TrackCollector};
use crate::upload::BatchUploader;
use cratedig_config::ResolverConfig;
use cratedig_domain::{BearerToken, BuildReport, PlaylistHandle, ReleaseRecord, RunId, TrackReference};
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("playlist name is required")]
    MissingPlaylistName,
    #[error("failed to create playlist: {0}")]
    PlaylistCreation(#[source] CatalogError),
    #[error("failed to add tracks to playlist: {0}")]
    Upload(#[source] CatalogError),
}

/// What happened to one release during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReleaseOutcome {
    Unmatched,
    /// Resolved; tracks were not requested (preview).
    Resolved,
    Collected(Vec<TrackReference>),
    TrackFetchFailed,
}

/// Run state owned by the coordinator for the duration of one build.
#[derive(Debug, Default)]
struct RunAccumulator {
    tracks: Vec<TrackReference>,
    unmatched: Vec<String>,
    track_fetch_failures: Vec<String>,
    matched: usize,
}

impl RunAccumulator {
    fn record(&mut self, release: &ReleaseRecord, outcome: ReleaseOutcome) {
        match outcome {
            ReleaseOutcome::Unmatched => self.unmatched.push(release.label()),
            ReleaseOutcome::Resolved => self.matched += 1,
            ReleaseOutcome::Collected(tracks) => {
                self.matched += 1;
                self.tracks.extend(tracks);
            }
            ReleaseOutcome::TrackFetchFailed => {
                self.matched += 1;
                self.track_fetch_failures.push(release.label());
            }
        }
    }
}

pub struct RunCoordinator {
    backend: Arc<dyn CatalogBackend>,
    resolver: AlbumResolver,
    collector: TrackCollector,
    uploader: BatchUploader,
    max_concurrent_releases: usize,
}

impl RunCoordinator {
    pub fn new(backend: Arc<dyn CatalogBackend>, config: &ResolverConfig) -> Self {
        Self {
            resolver: AlbumResolver::new(backend.clone(), config.search_limit),
            collector: TrackCollector::new(backend.clone(), config.track_page_size),
            uploader: BatchUploader::new(backend.clone(), config.upload_batch_size),
            backend,
            max_concurrent_releases: config.max_concurrent_releases.max(1),
        }
    }

    /// Create a playlist named `playlist_name` and fill it from `records`.
    ///
    /// Fails before any network call when the name is blank. Playlist
    /// creation and upload failures abort the run; unmatched releases and
    /// failed track listings are reported instead.
    pub async fn build(
        &self,
        records: &[ReleaseRecord],
        playlist_name: &str,
        credential: &BearerToken,
    ) -> Result<BuildReport, BuildError> {
        let playlist_name = playlist_name.trim();
        if playlist_name.is_empty() {
            return Err(BuildError::MissingPlaylistName);
        }

        let run_id = RunId::new();
        self.create_and_fill(run_id, records, playlist_name, credential)
            .instrument(info_span!("build", run_id = %run_id, releases = records.len()))
            .await
    }

    /// Fill an existing playlist from `records`.
    pub async fn build_into(
        &self,
        records: &[ReleaseRecord],
        playlist: &PlaylistHandle,
        credential: &BearerToken,
    ) -> Result<BuildReport, BuildError> {
        let run_id = RunId::new();
        self.fill_playlist(run_id, records, playlist, credential)
            .instrument(info_span!("build", run_id = %run_id, releases = records.len()))
            .await
    }

    /// Resolve every release and report the unmatched ones without creating,
    /// listing or uploading anything.
    pub async fn preview(
        &self,
        records: &[ReleaseRecord],
        credential: &BearerToken,
    ) -> BuildReport {
        let run_id = RunId::new();
        async {
            let acc = self.process_releases(records, credential, false).await;
            info!(
                target: "coordinator",
                matched = acc.matched,
                unmatched = acc.unmatched.len(),
                "preview complete"
            );
            BuildReport {
                run_id,
                added_track_count: 0,
                unmatched_releases: acc.unmatched,
                track_fetch_failures: acc.track_fetch_failures,
                matched_release_count: acc.matched,
                playlist_reference: None,
                preview: true,
            }
        }
        .instrument(info_span!("preview", run_id = %run_id, releases = records.len()))
        .await
    }

    async fn create_and_fill(
        &self,
        run_id: RunId,
        records: &[ReleaseRecord],
        playlist_name: &str,
        credential: &BearerToken,
    ) -> Result<BuildReport, BuildError> {
        let user_id = self
            .backend
            .current_user(credential)
            .await
            .map_err(BuildError::PlaylistCreation)?;
        let playlist = self
            .backend
            .create_playlist(credential, &user_id, playlist_name)
            .await
            .map_err(BuildError::PlaylistCreation)?;
        info!(target: "coordinator", playlist_id = %playlist.id, "playlist created");

        self.fill_playlist(run_id, records, &playlist, credential)
            .await
    }

    async fn fill_playlist(
        &self,
        run_id: RunId,
        records: &[ReleaseRecord],
        playlist: &PlaylistHandle,
        credential: &BearerToken,
    ) -> Result<BuildReport, BuildError> {
        let acc = self.process_releases(records, credential, true).await;

        let added_track_count = self
            .uploader
            .upload(&acc.tracks, playlist, credential)
            .await
            .map_err(BuildError::Upload)?;

        info!(
            target: "coordinator",
            added = added_track_count,
            matched = acc.matched,
            unmatched = acc.unmatched.len(),
            track_fetch_failures = acc.track_fetch_failures.len(),
            "playlist build complete"
        );

        Ok(BuildReport {
            run_id,
            added_track_count,
            unmatched_releases: acc.unmatched,
            track_fetch_failures: acc.track_fetch_failures,
            matched_release_count: acc.matched,
            playlist_reference: Some(playlist.external_url.clone()),
            preview: false,
        })
    }

    async fn process_releases(
        &self,
        records: &[ReleaseRecord],
        credential: &BearerToken,
        collect_tracks: bool,
    ) -> RunAccumulator {
        let mut acc = RunAccumulator::default();

        if self.max_concurrent_releases == 1 {
            for record in records {
                let outcome = self.process_release(record, credential, collect_tracks).await;
                acc.record(record, outcome);
            }
            return acc;
        }

        // Boxed up front so the pool's future type stays `Send` for any
        // borrow of `records`.
        let pending: Vec<BoxFuture<'_, (usize, ReleaseOutcome)>> = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                async move {
                    (
                        index,
                        self.process_release(record, credential, collect_tracks).await,
                    )
                }
                .boxed()
            })
            .collect();

        let mut outcomes: Vec<(usize, ReleaseOutcome)> = stream::iter(pending)
            .buffer_unordered(self.max_concurrent_releases)
            .collect()
            .await;
        outcomes.sort_by_key(|(index, _)| *index);

        for (index, outcome) in outcomes {
            acc.record(&records[index], outcome);
        }
        acc
    }

    async fn process_release(
        &self,
        record: &ReleaseRecord,
        credential: &BearerToken,
        collect_tracks: bool,
    ) -> ReleaseOutcome {
        let Some(album) = self.resolver.resolve(record, credential).await else {
            return ReleaseOutcome::Unmatched;
        };

        if !collect_tracks {
            return ReleaseOutcome::Resolved;
        }

        match self.collector.collect_tracks(&album, credential).await {
            TrackCollection::Collected(tracks) => ReleaseOutcome::Collected(tracks),
            TrackCollection::Failed => ReleaseOutcome::TrackFetchFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{album, token, track_refs, FakeCatalog};
    use std::time::Duration;

    fn config(max_concurrent_releases: usize) -> ResolverConfig {
        ResolverConfig {
            max_concurrent_releases,
            ..ResolverConfig::default()
        }
    }

    fn coordinator(catalog: &Arc<FakeCatalog>) -> RunCoordinator {
        RunCoordinator::new(catalog.clone(), &config(1))
    }

    #[tokio::test]
    async fn matched_release_adds_all_album_tracks() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_search("Thriller Michael Jackson", vec![album("mj1", "Thriller")])
                .with_album("mj1", track_refs("mj1", 9)),
        );

        let report = coordinator(&catalog)
            .build(
                &[ReleaseRecord::new("Thriller", "Michael Jackson")],
                "My Spotify Playlist",
                &token(),
            )
            .await
            .unwrap();

        assert!(report.unmatched_releases.is_empty());
        assert_eq!(report.added_track_count, 9);
        assert_eq!(report.matched_release_count, 1);
        assert_eq!(
            report.playlist_reference.as_deref(),
            Some("https://open.spotify.com/playlist/playlist-1")
        );
        assert!(!report.preview);
        assert_eq!(catalog.searches().len(), 1);
        assert_eq!(
            *catalog.created_playlists.lock().unwrap(),
            vec!["My Spotify Playlist".to_string()]
        );
    }

    #[tokio::test]
    async fn symbol_only_release_is_reported_unmatched() {
        let catalog = Arc::new(FakeCatalog::new());

        let report = coordinator(&catalog)
            .build(&[ReleaseRecord::new("???", "Unknown")], "Mine", &token())
            .await
            .unwrap();

        assert_eq!(report.unmatched_releases, vec!["??? — Unknown".to_string()]);
        assert_eq!(report.added_track_count, 0);
        assert!(catalog.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn albums_totalling_150_tracks_upload_in_two_calls() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_search("Alpha Band", vec![album("a", "Alpha")])
                .with_search("Beta Band", vec![album("b", "Beta")])
                .with_search("Gamma Band", vec![album("c", "Gamma")])
                .with_album("a", track_refs("a", 50))
                .with_album("b", track_refs("b", 50))
                .with_album("c", track_refs("c", 50)),
        );

        let report = coordinator(&catalog)
            .build(
                &[
                    ReleaseRecord::new("Alpha", "Band"),
                    ReleaseRecord::new("Beta", "Band"),
                    ReleaseRecord::new("Gamma", "Band"),
                ],
                "Mine",
                &token(),
            )
            .await
            .unwrap();

        assert_eq!(report.added_track_count, 150);
        assert_eq!(catalog.batch_sizes(), vec![100, 50]);
        assert_eq!(catalog.track_fetch_limits(), vec![50, 50, 50]);
        let uploaded = catalog.add_batches.lock().unwrap().concat();
        let mut expected = track_refs("a", 50);
        expected.extend(track_refs("b", 50));
        expected.extend(track_refs("c", 50));
        assert_eq!(uploaded, expected);
    }

    #[tokio::test]
    async fn every_release_is_either_matched_or_unmatched() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_search("Thriller Michael Jackson", vec![album("mj1", "Thriller")])
                .with_album("mj1", track_refs("mj1", 9))
                .with_search("Discovery", vec![album("dp1", "Discovery")])
                .with_album_failure("dp1"),
        );
        let records = vec![
            ReleaseRecord::new("Thriller", "Michael Jackson"),
            ReleaseRecord::new("Missing One", "Nobody"),
            ReleaseRecord::new("Discovery", "Daft Punk"),
            ReleaseRecord::new("Missing Two", "Nobody"),
        ];

        let report = coordinator(&catalog)
            .build(&records, "Mine", &token())
            .await
            .unwrap();

        assert_eq!(
            report.unmatched_releases,
            vec![
                "Missing One — Nobody".to_string(),
                "Missing Two — Nobody".to_string()
            ]
        );
        assert_eq!(report.matched_release_count, 2);
        assert_eq!(report.processed_release_count(), records.len());
        assert_eq!(
            report.track_fetch_failures,
            vec!["Discovery — Daft Punk".to_string()]
        );
        assert_eq!(report.added_track_count, 9);
    }

    #[tokio::test]
    async fn blank_playlist_name_fails_before_network_work() {
        let catalog = Arc::new(FakeCatalog::new());

        let result = coordinator(&catalog)
            .build(&[ReleaseRecord::new("Thriller", "Michael Jackson")], "  ", &token())
            .await;

        assert!(matches!(result, Err(BuildError::MissingPlaylistName)));
        assert!(catalog.searches().is_empty());
        assert!(catalog.created_playlists.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn playlist_creation_failure_is_fatal() {
        let catalog = Arc::new(FakeCatalog::new().failing_current_user());

        let result = coordinator(&catalog)
            .build(&[ReleaseRecord::new("Thriller", "Michael Jackson")], "Mine", &token())
            .await;

        assert!(matches!(result, Err(BuildError::PlaylistCreation(_))));
        assert!(catalog.searches().is_empty());
    }

    #[tokio::test]
    async fn upload_failure_is_fatal() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_search("Thriller Michael Jackson", vec![album("mj1", "Thriller")])
                .with_album("mj1", track_refs("mj1", 9))
                .failing_add_on_call(0),
        );

        let result = coordinator(&catalog)
            .build(&[ReleaseRecord::new("Thriller", "Michael Jackson")], "Mine", &token())
            .await;

        assert!(matches!(result, Err(BuildError::Upload(_))));
    }

    #[tokio::test]
    async fn preview_skips_playlist_and_tracks() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_search("Thriller Michael Jackson", vec![album("mj1", "Thriller")])
                .with_album("mj1", track_refs("mj1", 9)),
        );

        let report = coordinator(&catalog)
            .preview(
                &[
                    ReleaseRecord::new("Thriller", "Michael Jackson"),
                    ReleaseRecord::new("???", "Unknown"),
                ],
                &token(),
            )
            .await;

        assert!(report.preview);
        assert_eq!(report.unmatched_releases, vec!["??? — Unknown".to_string()]);
        assert_eq!(report.matched_release_count, 1);
        assert_eq!(report.added_track_count, 0);
        assert_eq!(report.playlist_reference, None);
        assert!(catalog.created_playlists.lock().unwrap().is_empty());
        assert!(catalog.track_fetch_log.lock().unwrap().is_empty());
        assert!(catalog.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn build_into_uses_given_playlist() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_search("Thriller Michael Jackson", vec![album("mj1", "Thriller")])
                .with_album("mj1", track_refs("mj1", 9)),
        );
        let playlist = PlaylistHandle {
            id: "existing".to_string(),
            external_url: "https://open.spotify.com/playlist/existing".to_string(),
        };

        let report = coordinator(&catalog)
            .build_into(
                &[ReleaseRecord::new("Thriller", "Michael Jackson")],
                &playlist,
                &token(),
            )
            .await
            .unwrap();

        assert_eq!(report.added_track_count, 9);
        assert_eq!(
            report.playlist_reference.as_deref(),
            Some("https://open.spotify.com/playlist/existing")
        );
        assert!(catalog.created_playlists.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_run_preserves_input_order() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_search("Slow Band", vec![album("slow", "Slow")])
                .with_search_delay("Slow Band", Duration::from_millis(40))
                .with_search("Fast Band", vec![album("fast", "Fast")])
                .with_album("slow", track_refs("slow", 2))
                .with_album("fast", track_refs("fast", 2))
                .with_search_delay("Lost One Nobody", Duration::from_millis(30)),
        );
        let coordinator = RunCoordinator::new(catalog.clone(), &config(4));
        let records = vec![
            ReleaseRecord::new("Lost One", "Nobody"),
            ReleaseRecord::new("Slow", "Band"),
            ReleaseRecord::new("Lost Two", "Nobody"),
            ReleaseRecord::new("Fast", "Band"),
        ];

        let report = coordinator.build(&records, "Mine", &token()).await.unwrap();

        assert_eq!(
            report.unmatched_releases,
            vec![
                "Lost One — Nobody".to_string(),
                "Lost Two — Nobody".to_string()
            ]
        );
        let uploaded = catalog.add_batches.lock().unwrap().concat();
        let mut expected = track_refs("slow", 2);
        expected.extend(track_refs("fast", 2));
        assert_eq!(uploaded, expected);
        assert_eq!(report.added_track_count, 4);
    }

    fn assert_send<T: Send>(_: T) {}

    #[test]
    fn run_futures_are_send() {
        let catalog = Arc::new(FakeCatalog::new());
        let coordinator = RunCoordinator::new(catalog, &config(4));
        let records = vec![ReleaseRecord::new("Thriller", "Michael Jackson")];
        let credential = token();

        assert_send(coordinator.build(&records, "Mine", &credential));
        assert_send(coordinator.preview(&records, &credential));
    }
}
