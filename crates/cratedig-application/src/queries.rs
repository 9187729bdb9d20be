// SPDX-License-Identifier: GPL-3.0-or-later

use crate::normalize::clean;
use cratedig_domain::ReleaseRecord;

/// Number of search queries tried per release.
pub const QUERIES_PER_RELEASE: usize = 3;

/// Search queries for a release, most specific first.
///
/// 1. `title artist`
/// 2. `title`
/// 3. `artist title`
///
/// The resolver walks them in this order and stops at the first match.
pub fn generate_queries(record: &ReleaseRecord) -> [String; QUERIES_PER_RELEASE] {
    let title = clean(&record.title);
    let artist = clean(&record.artist);

    [
        format!("{} {}", title, artist),
        title.clone(),
        format!("{} {}", artist, title),
    ]
}
