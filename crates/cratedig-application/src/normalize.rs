// SPDX-License-Identifier: GPL-3.0-or-later

//! String canonicalization shared by query generation and matching.

/// Comparison key: lower-cased, keeping only `[a-z0-9]`.
///
/// Accented and non-Latin letters are dropped along with punctuation and
/// whitespace, so `"Greatest Hits (Remastered)"` becomes
/// `"greatesthitsremastered"`.
pub fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Display/query form: quote and slash characters removed, then trimmed.
pub fn clean(value: &str) -> String {
    value
        .chars()
        .filter(|c| !is_quote_or_slash(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_quote_or_slash(c: char) -> bool {
    matches!(
        c,
        '"' | '\'' | '`' | '/' | '\\' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}'
    )
}
