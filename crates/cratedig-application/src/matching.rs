// SPDX-License-Identifier: GPL-3.0-or-later

//! Candidate selection by symmetric containment of normalized titles.

use crate::normalize::normalize;
use cratedig_domain::SearchCandidate;

/// Pick the first candidate whose normalized name contains the normalized
/// release title, or is contained in it.
///
/// Candidate order is the backend's relevance order and is never changed.
/// A title that normalizes to nothing matches no candidate.
pub fn select_match(
    release_title: &str,
    candidates: Vec<SearchCandidate>,
) -> Option<SearchCandidate> {
    let wanted = normalize(release_title);
    if wanted.is_empty() {
        return None;
    }

    candidates
        .into_iter()
        .find(|candidate| titles_overlap(&wanted, &normalize(&candidate.display_name)))
}

fn titles_overlap(wanted: &str, found: &str) -> bool {
    !found.is_empty() && (found.contains(wanted) || wanted.contains(found))
}
