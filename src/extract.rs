//! Full-text extraction for a single article page.
//!
//! The page is downloaded with a desktop-browser user agent (many outlets
//! reject obvious bots) and a bounded timeout, then reduced to paragraph
//! text with `scraper`. Paragraphs inside `<article>` win; if there are
//! none, every `<p>` on the page is used.
//!
//! Very short results usually mean a paywall or a video/gallery page, so
//! they come back as [`Extraction::Restricted`] instead of an error.

use crate::error::ExtractionError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Browser identity sent with every article request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Seconds before an article download is abandoned.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Below this many characters the text is treated as restricted content.
pub const MIN_ARTICLE_CHARS: usize = 200;

static ARTICLE_P: Lazy<Selector> = Lazy::new(|| Selector::parse("article p").unwrap());
static ANY_P: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Outcome of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Readable article text.
    Text(String),
    /// Too little text to be worth summarizing.
    Restricted { chars: usize },
}

/// Anything that can turn an article URL into text.
pub trait ArticleExtract {
    async fn extract(&self, url: &str) -> Result<Extraction, ExtractionError>;
}

/// HTTP + HTML implementation of [`ArticleExtract`].
#[derive(Debug, Clone)]
pub struct WebExtractor {
    client: reqwest::Client,
    min_chars: usize,
}

impl WebExtractor {
    /// Build an extractor with its own client carrying [`USER_AGENT`] and
    /// a `timeout_secs` request timeout.
    pub fn new(timeout_secs: u64, min_chars: usize) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client, min_chars })
    }
}

impl ArticleExtract for WebExtractor {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn extract(&self, url: &str) -> Result<Extraction, ExtractionError> {
        let parsed = validate_url(url)?;
        let t0 = Instant::now();

        let resp = self.client.get(parsed).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Article page returned an error");
            return Err(ExtractionError::Status(status.as_u16()));
        }
        let body = resp.text().await?;

        let text = extract_text(&body);
        let chars = text.chars().count();
        info!(chars, elapsed_ms = t0.elapsed().as_millis() as u64, "Extracted article text");

        Ok(classify(text, self.min_chars))
    }
}

/// Only absolute http(s) URLs are fetched.
fn validate_url(url: &str) -> Result<Url, ExtractionError> {
    let parsed = Url::parse(url).map_err(|e| ExtractionError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ExtractionError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

/// Apply the content-quality gate.
pub fn classify(text: String, min_chars: usize) -> Extraction {
    let chars = text.chars().count();
    if chars < min_chars {
        debug!(chars, min_chars, "Article text below threshold");
        Extraction::Restricted { chars }
    } else {
        Extraction::Text(text)
    }
}

/// Pull paragraph text out of an HTML document.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let collect = |selector: &Selector| -> Vec<String> {
        document
            .select(selector)
            .map(|p| {
                let raw = p.text().collect::<Vec<_>>().join(" ");
                WHITESPACE.replace_all(raw.trim(), " ").into_owned()
            })
            .filter(|p| !p.is_empty())
            .collect()
    };

    let mut paragraphs = collect(&ARTICLE_P);
    if paragraphs.is_empty() {
        paragraphs = collect(&ANY_P);
    }
    paragraphs.join("\n\n")
}
