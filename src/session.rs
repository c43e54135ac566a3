//! Session state and its reducer.
//!
//! A [`Session`] holds the results of the active search and a page cursor.
//! Each user action maps to one method that mutates the session and, when a
//! fetch is needed, returns an [`Effect`] describing it. The caller runs the
//! effect and reports the outcome back with [`Session::page_loaded`] or
//! [`Session::fetch_failed`]. Nothing here touches the network.
//!
//! Pagination is server-side: page `n + 1` is requested on "load more" and
//! appended. The cursor becomes exhausted when a page comes back empty or
//! the API's `totalResults` has been reached.
//!
//! Titles are de-duplicated across every page of the active query, not just
//! within a page.

use crate::dedupe::{dedupe, dedupe_against};
use crate::error::ValidationError;
use crate::models::{Article, Scope, SearchQuery};
use tracing::{debug, info};

/// API keys needed before a search may run.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub news_api_key: Option<String>,
    pub google_api_key: Option<String>,
}

impl Credentials {
    /// Both keys, or the name of the first missing one.
    pub fn require(&self) -> Result<(&str, &str), ValidationError> {
        let news = self.news().ok_or(ValidationError::MissingCredentials("NEWS_API_KEY"))?;
        let google = self.google().ok_or(ValidationError::MissingCredentials("GOOGLE_API_KEY"))?;
        Ok((news, google))
    }

    /// The news API key, unless absent or blank.
    pub fn news(&self) -> Option<&str> {
        non_blank(&self.news_api_key)
    }

    /// The Google API key, unless absent or blank.
    pub fn google(&self) -> Option<&str> {
        non_blank(&self.google_api_key)
    }
}

fn non_blank(key: &Option<String>) -> Option<&str> {
    key.as_deref().map(str::trim).filter(|k| !k.is_empty())
}

/// Page-number pagination position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCursor {
    /// Last page successfully merged into the results; 0 before the first.
    pub page: u32,
    /// No further pages will be requested for this query.
    pub exhausted: bool,
}

/// Coarse view of where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No search yet.
    Idle,
    /// A search ran and has no results.
    Empty,
    /// A search ran and has results.
    Loaded,
}

/// A network fetch the caller must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch { query: SearchQuery, page: u32 },
}

#[derive(Debug, Clone)]
pub struct Session {
    results: Vec<Article>,
    cursor: PageCursor,
    active_query: Option<SearchQuery>,
    total_results: Option<u32>,
    last_error: Option<String>,
    page_size: u32,
}

impl Session {
    pub fn new(page_size: u32) -> Self {
        Self {
            results: Vec::new(),
            cursor: PageCursor::default(),
            active_query: None,
            total_results: None,
            last_error: None,
            page_size: page_size.max(1),
        }
    }

    pub fn phase(&self) -> Phase {
        match (&self.active_query, self.results.is_empty()) {
            (None, _) => Phase::Idle,
            (Some(_), true) => Phase::Empty,
            (Some(_), false) => Phase::Loaded,
        }
    }

    pub fn results(&self) -> &[Article] {
        &self.results
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn active_query(&self) -> Option<&SearchQuery> {
        self.active_query.as_ref()
    }

    pub fn total_results(&self) -> Option<u32> {
        self.total_results
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether "load more" would do anything.
    pub fn can_load_more(&self) -> bool {
        self.active_query.is_some() && self.cursor.page >= 1 && !self.cursor.exhausted
    }

    /// Start a new search.
    ///
    /// Invalid input leaves the session untouched. Otherwise the previous
    /// results are discarded before the first page is requested.
    pub fn new_search(
        &mut self,
        topic: &str,
        scope: Scope,
        credentials: &Credentials,
    ) -> Result<Effect, ValidationError> {
        credentials.require()?;
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }

        let query = SearchQuery {
            topic: topic.to_string(),
            scope,
        };
        self.results.clear();
        self.cursor = PageCursor::default();
        self.total_results = None;
        self.last_error = None;
        self.active_query = Some(query.clone());

        info!(topic = %query.topic, scope = ?query.scope, "New search");
        Ok(Effect::Fetch { query, page: 1 })
    }

    /// Request the next page, or `None` when there is nothing more to load.
    pub fn load_more(&mut self) -> Option<Effect> {
        if !self.can_load_more() {
            debug!(cursor = ?self.cursor, "Load more ignored");
            return None;
        }
        let query = self.active_query.clone()?;
        Some(Effect::Fetch {
            query,
            page: self.cursor.page + 1,
        })
    }

    /// Merge a fetched page. Pages for a query that is no longer active are
    /// dropped.
    pub fn page_loaded(
        &mut self,
        query: &SearchQuery,
        page: u32,
        articles: Vec<Article>,
        total_results: Option<u32>,
    ) {
        if self.active_query.as_ref() != Some(query) {
            debug!(topic = %query.topic, page, "Dropping page for stale query");
            return;
        }

        let fetched = articles.len();
        let added = if page <= 1 {
            self.results = dedupe(articles);
            self.results.len()
        } else {
            let fresh = dedupe_against(&self.results, articles);
            let n = fresh.len();
            self.results.extend(fresh);
            n
        };

        if total_results.is_some() {
            self.total_results = total_results;
        }
        self.cursor.page = page;
        let reached_total = self
            .total_results
            .is_some_and(|t| u64::from(page) * u64::from(self.page_size) >= u64::from(t));
        self.cursor.exhausted = fetched == 0 || reached_total;
        self.last_error = None;

        info!(
            page,
            fetched,
            added,
            total = self.results.len(),
            exhausted = self.cursor.exhausted,
            "Merged search page"
        );
    }

    /// Record a failed fetch. Existing results and the cursor are kept.
    pub fn fetch_failed(&mut self, query: &SearchQuery, page: u32, error: String) {
        if self.active_query.as_ref() != Some(query) {
            return;
        }
        debug!(page, %error, "Recording fetch failure");
        self.last_error = Some(error);
    }

    /// The API will not serve pages past this point for the active query.
    /// Results are kept and the cursor is exhausted.
    pub fn result_cap_reached(&mut self, query: &SearchQuery, page: u32) {
        if self.active_query.as_ref() != Some(query) {
            return;
        }
        info!(page, loaded = self.results.len(), "Result cap reached");
        self.cursor.exhausted = true;
        self.last_error = None;
    }

    /// Forget the last fetch error once it has been shown.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}
