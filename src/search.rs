//! News search API client.
//!
//! Wraps the NewsAPI `/v2/everything` endpoint. Results are sorted by publish
//! time, newest first, and restricted to English. Pagination is server-side:
//! every request asks for one fixed-size page by number.
//!
//! # Regional scope
//!
//! [`Scope::RegionFiltered`] sends the [`AU_DOMAINS`] allow-list as the
//! comma-joined `domains` parameter.

use crate::error::UpstreamError;
use crate::models::{ApiErrorBody, Article, Scope, SearchQuery, SearchResponse};
use crate::utils::truncate_for_log;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Australian outlets searched when the scope is region-filtered.
pub const AU_DOMAINS: &[&str] = &[
    "abc.net.au",
    "skynews.com.au",
    "news.com.au",
    "9news.com.au",
    "dailytelegraph.com.au",
    "smh.com.au",
    "theage.com.au",
    "sbs.com.au",
    "heraldsun.com.au",
    "thegcminute.com.au",
    "cairnsnews.org",
    "canberratimes.com.au",
    "goldcoastbulletin.com.au",
    "businessnews.com.au",
    "tasmaniantimes.com",
    "alicespringsnews.com.au",
    "sydneysun.com",
    "perthnow.com.au",
    "brisbanetimes.com.au",
    "watoday.com.au",
    "afr.com",
    "theaustralian.com.au",
    "adelaidenow.com.au",
    "ntnews.com.au",
    "themercury.com.au",
    "examiner.com.au",
    "bordermail.com.au",
    "illawarramercury.com.au",
    "newcastleherald.com.au",
    "geelongadvertiser.com.au",
    "bendigoadvertiser.com.au",
    "thecourier.com.au",
    "standard.net.au",
    "theadvocate.com.au",
    "northerndailyleader.com.au",
    "dailyadvertiser.com.au",
    "couriermail.com.au",
    "morningbulletin.com.au",
    "gladstoneobserver.com.au",
    "frasercoastchronicle.com.au",
    "sunshinecoastdaily.com.au",
    "gympietimes.com.au",
    "tweeddailynews.com.au",
    "northernstar.com.au",
    "dailymercury.com.au",
    "theguardian.com",
];

/// Largest page the API will serve.
pub const MAX_PAGE_SIZE: u32 = 100;

/// One page of results for a query.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub articles: Vec<Article>,
    /// Total matches the API reports for the query, if it says.
    pub total_results: Option<u32>,
}

/// Anything that can run a news search.
pub trait NewsSearch {
    /// Fetch page `page` (1-based) of results for `query`.
    async fn search(
        &self,
        api_key: &str,
        query: &SearchQuery,
        page: u32,
    ) -> Result<SearchPage, UpstreamError>;

    /// Number of articles requested per page.
    fn page_size(&self) -> u32;
}

/// NewsAPI-backed [`NewsSearch`].
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl NewsApiClient {
    /// Create a client against `base_url` (e.g. `https://newsapi.org`).
    ///
    /// `page_size` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, page_size: u32) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v2/everything", self.base_url)
    }
}

/// Query parameters for one page of `query`, minus the API key.
pub fn query_params(query: &SearchQuery, page_size: u32, page: u32) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("q", query.topic.clone()),
        ("sortBy", "publishedAt".to_string()),
        ("language", "en".to_string()),
        ("pageSize", page_size.to_string()),
        ("page", page.to_string()),
    ];
    if query.scope == Scope::RegionFiltered {
        params.push(("domains", AU_DOMAINS.join(",")));
    }
    params
}

impl NewsSearch for NewsApiClient {
    #[instrument(level = "info", skip(self, api_key), fields(topic = %query.topic, scope = ?query.scope))]
    async fn search(
        &self,
        api_key: &str,
        query: &SearchQuery,
        page: u32,
    ) -> Result<SearchPage, UpstreamError> {
        let t0 = Instant::now();
        let mut params = query_params(query, self.page_size, page);
        params.push(("apiKey", api_key.to_string()));

        let resp = self.client.get(self.endpoint()).query(&params).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                body_preview = %truncate_for_log(&body, 300),
                "Search API returned an error"
            );
            return Err(upstream_error(status.as_u16(), body));
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        info!(
            count = parsed.articles.len(),
            total = ?parsed.total_results,
            page,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched search page"
        );
        debug!(urls = ?parsed.articles.iter().map(|a| &a.url).collect::<Vec<_>>(), "Search hits");

        Ok(SearchPage {
            articles: parsed.articles,
            total_results: parsed.total_results,
        })
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }
}

/// Prefer the API's own `{code, message}` over the raw body when present.
fn upstream_error(status: u16, body: String) -> UpstreamError {
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(ApiErrorBody {
            code: Some(code),
            message: Some(message),
        }) => UpstreamError::Api { code, message },
        _ => UpstreamError::Status { status, body },
    }
}
