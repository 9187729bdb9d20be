// SPDX-License-Identifier: GPL-3.0-or-later

//! Album resolution through a layered fallback chain of search queries.
//!
//! Catalog exports are unreliable about word order and punctuation, so a
//! release is searched with up to three queries. The first query whose
//! results contain a title match wins; failed or fruitless queries fall
//! through to the next one.

use crate::catalog::CatalogBackend;
use crate::matching::select_match;
use crate::normalize::normalize;
use crate::queries::generate_queries;
use cratedig_domain::{BearerToken, ReleaseRecord, ResolvedAlbum};
use cratedig_spotify::MAX_PAGE_LIMIT;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of search results considered per query.
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

pub struct AlbumResolver {
    backend: Arc<dyn CatalogBackend>,
    search_limit: u32,
}

impl AlbumResolver {
    /// `search_limit` is clamped to `1..=50`, the search ceiling of the catalog.
    pub fn new(backend: Arc<dyn CatalogBackend>, search_limit: u32) -> Self {
        Self {
            backend,
            search_limit: search_limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Resolve a release to a single album, or `None` once every query is exhausted.
    ///
    /// Search failures are scoped to their query: they are logged and the
    /// next query is tried.
    pub async fn resolve(
        &self,
        record: &ReleaseRecord,
        credential: &BearerToken,
    ) -> Option<ResolvedAlbum> {
        if normalize(&record.title).is_empty() {
            debug!(
                target: "resolver",
                title = %record.title,
                "title has no comparable characters, skipping search"
            );
            return None;
        }

        for (attempt, query) in generate_queries(record).iter().enumerate() {
            let candidates = match self
                .backend
                .search_albums(credential, query, self.search_limit)
                .await
            {
                Ok(candidates) => candidates,
                Err(error) => {
                    warn!(
                        target: "resolver",
                        query = %query,
                        attempt,
                        error = %error,
                        "album search failed, trying next query"
                    );
                    continue;
                }
            };

            if candidates.is_empty() {
                debug!(target: "resolver", query = %query, attempt, "no search results");
                continue;
            }

            if let Some(candidate) = select_match(&record.title, candidates) {
                debug!(
                    target: "resolver",
                    query = %query,
                    attempt,
                    album_id = %candidate.external_id,
                    album = %candidate.display_name,
                    "release resolved"
                );
                return Some(candidate.into());
            }

            debug!(target: "resolver", query = %query, attempt, "no candidate matched title");
        }

        debug!(target: "resolver", release = %record.label(), "release unresolved");
        None
    }
}
