// SPDX-License-Identifier: GPL-3.0-or-later
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Value Objects & IDs
// ============================================================================

/// Correlates every log line and the final report of a single playlist build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque bearer credential obtained by the caller. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Returns `None` for an empty or whitespace-only token.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Identifier accepted by the playlist track-add operation, e.g. `spotify:track:...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackReference(pub String);

impl TrackReference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Catalog records
// ============================================================================

/// One row of the user's collection export.
///
/// Field names on the wire follow the export columns (`Title`, `Artist`,
/// `Released`). `Title` and `Artist` are required; a row missing either is
/// rejected during deserialization instead of reaching the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Artist")]
    pub artist: String,
    #[serde(rename = "Released", default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<String>,
}

impl ReleaseRecord {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            release_year: None,
        }
    }

    pub fn with_release_year(mut self, year: impl Into<String>) -> Self {
        self.release_year = Some(year.into());
        self
    }

    /// Label used in unmatched and failure lists: `"title — artist"`.
    pub fn label(&self) -> String {
        format!("{} \u{2014} {}", self.title, self.artist)
    }
}

/// A single album hit returned by the search backend, in backend relevance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub external_id: String,
    pub display_name: String,
}

impl SearchCandidate {
    pub fn new(external_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// The album a release record was mapped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAlbum {
    pub external_id: String,
    pub display_name: String,
}

impl From<SearchCandidate> for ResolvedAlbum {
    fn from(candidate: SearchCandidate) -> Self {
        Self {
            external_id: candidate.external_id,
            display_name: candidate.display_name,
        }
    }
}

/// Target playlist created for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistHandle {
    pub id: String,
    pub external_url: String,
}

// ============================================================================
// Run report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub run_id: RunId,
    pub added_track_count: usize,
    /// Labels of releases no album could be resolved for, in input order.
    pub unmatched_releases: Vec<String>,
    /// Labels of resolved releases whose track listing could not be fetched, in input order.
    pub track_fetch_failures: Vec<String>,
    pub matched_release_count: usize,
    pub playlist_reference: Option<String>,
    pub preview: bool,
}

impl BuildReport {
    /// Total number of records accounted for; equals the input length.
    pub fn processed_release_count(&self) -> usize {
        self.unmatched_releases.len() + self.matched_release_count
    }
}
