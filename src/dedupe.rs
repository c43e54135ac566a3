//! Title-based de-duplication.
//!
//! Syndicated stories often show up under several outlets with the same
//! headline. Articles are keyed by their trimmed, lowercased title and only
//! the first occurrence is kept. Near-duplicates (trailing punctuation,
//! reworded headlines) are not detected.

use crate::models::Article;
use itertools::Itertools;
use std::collections::HashSet;

/// Normalized comparison key for a title.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Keep the first article for each normalized title, preserving order.
pub fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    articles
        .into_iter()
        .unique_by(|a| normalize_title(&a.title))
        .collect()
}

/// Dedupe `incoming` and drop anything whose title is already in `existing`.
///
/// Used when appending a further page to an accumulated result list.
pub fn dedupe_against(existing: &[Article], incoming: Vec<Article>) -> Vec<Article> {
    let seen: HashSet<String> = existing.iter().map(|a| normalize_title(&a.title)).collect();
    dedupe(incoming)
        .into_iter()
        .filter(|a| !seen.contains(&normalize_title(&a.title)))
        .collect()
}
