//! Data models for search results and queries.
//!
//! - [`Article`]: one search hit as returned by the news API
//! - [`SearchQuery`] and [`Scope`]: what the user asked for
//! - [`SearchResponse`]: the envelope around a page of articles
//!
//! The API uses camelCase field names, hence the `rename_all` attributes.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A news article as listed by the search API.
///
/// Articles carry no identity beyond their URL and title, and the API does
/// not promise they are unique.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// The article headline.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Link to the article on the publisher's site.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Publish timestamp, usually RFC 3339 (`2024-03-05T10:00:00Z`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub published_at: String,
    /// The publishing outlet.
    #[serde(default)]
    pub source: ArticleSource,
    /// Byline, when the outlet provides one.
    #[serde(default)]
    pub author: Option<String>,
    /// One-paragraph teaser.
    #[serde(default)]
    pub description: Option<String>,
}

/// The outlet an article came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleSource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// The API sends `null` for missing strings; treat those as empty.
fn null_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which outlets a search covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Every outlet the API indexes.
    #[default]
    #[value(name = "all")]
    All,
    /// Only the Australian allow-list in [`crate::search::AU_DOMAINS`].
    #[value(name = "au")]
    #[serde(alias = "au")]
    RegionFiltered,
}

impl Scope {
    /// Label used in the "scanning" banner.
    pub fn wire_label(self) -> &'static str {
        match self {
            Scope::All => "GLOBAL WIRES",
            Scope::RegionFiltered => "AUSTRALIAN WIRES",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => f.write_str("All Sources"),
            Scope::RegionFiltered => f.write_str("Australian Sources"),
        }
    }
}

/// A search as issued by the user. A new search replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub topic: String,
    pub scope: Scope,
}

/// One page of search results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub total_results: Option<u32>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// Error envelope the search API sends with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
pub(crate) fn article(title: &str, url: &str) -> Article {
    Article {
        title: title.to_string(),
        url: url.to_string(),
        published_at: "2024-03-05T10:00:00Z".to_string(),
        source: ArticleSource {
            name: "ABC News".to_string(),
        },
        author: None,
        description: None,
    }
}
