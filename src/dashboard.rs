//! The interactive dashboard: runs commands against a [`Session`].
//!
//! The dashboard owns the session and the three collaborators. It executes
//! the effects the session asks for and writes rendered output after every
//! command. Commands run one at a time; each finishes before the next line
//! is read.

use crate::commands::{Command, KeyKind};
use crate::error::ValidationError;
use crate::extract::{ArticleExtract, Extraction};
use crate::models::Scope;
use crate::present::{Overview, help_text, render_overview, render_results, scanning_banner};
use crate::search::NewsSearch;
use crate::session::{Credentials, Effect, Session};
use crate::summarize::Summarize;
use std::io::{self, Write};
use tracing::{error, info, instrument, warn};

/// Whether the REPL should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Dashboard<S, E, M> {
    session: Session,
    credentials: Credentials,
    scope: Scope,
    search: S,
    extractor: E,
    summarizer: M,
}

impl<S, E, M> Dashboard<S, E, M>
where
    S: NewsSearch,
    E: ArticleExtract,
    M: Summarize,
{
    pub fn new(search: S, extractor: E, summarizer: M, credentials: Credentials, scope: Scope) -> Self {
        Self {
            session: Session::new(search.page_size()),
            credentials,
            scope,
            search,
            extractor,
            summarizer,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Run one command, writing everything the user should see to `out`.
    pub async fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        match command {
            Command::Search { topic } => self.search(&Command::topic(&topic), out).await?,
            Command::Scope { scope } => {
                self.scope = scope;
                writeln!(out, "SOURCE REGION: {scope}")?;
            }
            Command::More => self.load_more(out).await?,
            Command::Open { n } => self.open(n, out).await?,
            Command::List => write!(out, "{}", render_results(&self.session))?,
            Command::Key { which, value } => {
                match which {
                    KeyKind::News => self.credentials.news_api_key = Some(value),
                    KeyKind::Google => self.credentials.google_api_key = Some(value),
                }
                writeln!(out, "✅ {} API KEY LOADED", key_label(which))?;
            }
            Command::Help => writeln!(out, "{}", help_text())?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    #[instrument(level = "info", skip(self, out))]
    async fn search<W: Write>(&mut self, topic: &str, out: &mut W) -> io::Result<()> {
        let effect = match self.session.new_search(topic, self.scope, &self.credentials) {
            Ok(effect) => effect,
            Err(e) => {
                warn!(error = %e, "Search rejected");
                return writeln!(out, "⚠️ {e}");
            }
        };

        let Effect::Fetch { query, .. } = &effect;
        writeln!(out, "{}", scanning_banner(query))?;
        out.flush()?;

        self.run(effect).await;
        self.show_results(out)
    }

    async fn load_more<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self.session.load_more() {
            Some(effect) => {
                self.run(effect).await;
                self.show_results(out)
            }
            None => writeln!(out, "NO MORE ARTICLES TO LOAD."),
        }
    }

    /// Render right after a fetch. A fetch error is shown this once.
    fn show_results<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", render_results(&self.session))?;
        self.session.clear_error();
        Ok(())
    }

    /// Execute a fetch and feed the outcome back into the session.
    async fn run(&mut self, effect: Effect) {
        let Effect::Fetch { query, page } = effect;
        let Some(api_key) = self.credentials.news().map(str::to_string) else {
            self.session
                .fetch_failed(&query, page, ValidationError::MissingCredentials("NEWS_API_KEY").to_string());
            return;
        };

        match self.search.search(&api_key, &query, page).await {
            Ok(result) => {
                self.session
                    .page_loaded(&query, page, result.articles, result.total_results);
            }
            Err(e) if e.is_result_cap() => {
                warn!(error = %e, page, "Search API result cap reached");
                self.session.result_cap_reached(&query, page);
            }
            Err(e) => {
                error!(error = %e, page, "Search failed");
                self.session.fetch_failed(&query, page, e.to_string());
            }
        }
    }

    /// Extract and summarize the `n`th visible article (1-based).
    ///
    /// Runs both steps every time; nothing is cached between expansions.
    #[instrument(level = "info", skip(self, out))]
    async fn open<W: Write>(&self, n: usize, out: &mut W) -> io::Result<()> {
        let results = self.session.results();
        let Some(article) = n.checked_sub(1).and_then(|i| results.get(i)) else {
            return writeln!(out, "⚠️ No article {n}. Showing {} article(s).", results.len());
        };
        let Some(google_key) = self.credentials.google() else {
            return writeln!(out, "⚠️ {}", ValidationError::MissingCredentials("GOOGLE_API_KEY"));
        };

        writeln!(out, "DECRYPTING & ANALYZING...")?;
        out.flush()?;

        let overview = match self.extractor.extract(&article.url).await {
            Ok(Extraction::Text(text)) => match self.summarizer.summarize(google_key, &text).await {
                Ok(summary) => Overview::Summary(summary),
                Err(e) => {
                    warn!(url = %article.url, error = %e, "Summarization failed");
                    Overview::SummaryFailed(e)
                }
            },
            Ok(Extraction::Restricted { chars }) => {
                info!(url = %article.url, chars, "Restricted content");
                Overview::Restricted
            }
            Err(e) => {
                warn!(url = %article.url, error = %e, "Extraction failed");
                Overview::ExtractionFailed(e)
            }
        };

        write!(out, "{}", render_overview(article, &overview))
    }
}

fn key_label(kind: KeyKind) -> &'static str {
    match kind {
        KeyKind::News => "NEWS",
        KeyKind::Google => "GOOGLE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, SummarizationError, UpstreamError};
    use crate::models::{Article, SearchQuery, article};
    use crate::search::SearchPage;
    use crate::session::Phase;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeSearch {
        pages: RefCell<VecDeque<Result<SearchPage, UpstreamError>>>,
        calls: RefCell<Vec<(String, u32)>>,
    }

    impl FakeSearch {
        fn with(pages: Vec<Result<SearchPage, UpstreamError>>) -> Self {
            Self {
                pages: RefCell::new(pages.into()),
                calls: RefCell::default(),
            }
        }
    }

    impl NewsSearch for &FakeSearch {
        async fn search(
            &self,
            _api_key: &str,
            query: &SearchQuery,
            page: u32,
        ) -> Result<SearchPage, UpstreamError> {
            self.calls.borrow_mut().push((query.topic.clone(), page));
            self.pages
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(SearchPage::default()))
        }

        fn page_size(&self) -> u32 {
            2
        }
    }

    #[derive(Default)]
    struct FakeExtractor {
        text: Option<String>,
        calls: RefCell<usize>,
    }

    impl ArticleExtract for &FakeExtractor {
        async fn extract(&self, _url: &str) -> Result<Extraction, ExtractionError> {
            *self.calls.borrow_mut() += 1;
            match &self.text {
                Some(t) => Ok(crate::extract::classify(t.clone(), 200)),
                None => Err(ExtractionError::Status(500)),
            }
        }
    }

    #[derive(Default)]
    struct FakeSummarizer {
        blocked: bool,
        calls: RefCell<usize>,
    }

    impl Summarize for &FakeSummarizer {
        async fn summarize(&self, _api_key: &str, _text: &str) -> Result<String, SummarizationError> {
            *self.calls.borrow_mut() += 1;
            if self.blocked {
                Err(SummarizationError::Blocked { reason: None })
            } else {
                Ok("- one\n- two\n- three\n- four".to_string())
            }
        }
    }

    fn keys() -> Credentials {
        Credentials {
            news_api_key: Some("n".to_string()),
            google_api_key: Some("g".to_string()),
        }
    }

    fn page(articles: Vec<Article>, total: u32) -> Result<SearchPage, UpstreamError> {
        Ok(SearchPage {
            articles,
            total_results: Some(total),
        })
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_search_then_load_more() {
        let search = FakeSearch::with(vec![
            page(vec![article("A", "a"), article("B", "b")], 4),
            page(vec![article("C", "c"), article("a", "a-dup")], 4),
        ]);
        let ex = FakeExtractor::default();
        let sm = FakeSummarizer::default();
        let mut d = Dashboard::new(&search, &ex, &sm, keys(), Scope::All);

        let mut out = Vec::new();
        d.handle(Command::Search { topic: vec!["gold".into()] }, &mut out)
            .await
            .unwrap();
        let text = output(out);
        assert!(text.contains("SCANNING GLOBAL WIRES FOR 'GOLD'..."));
        assert!(text.contains("SHOWING 2/4"));

        let mut out = Vec::new();
        d.handle(Command::More, &mut out).await.unwrap();
        assert!(output(out).contains("### 3. C"));
        assert_eq!(d.session().results().len(), 3);
        assert!(d.session().cursor().exhausted);
        assert_eq!(
            *search.calls.borrow(),
            vec![("gold".to_string(), 1), ("gold".to_string(), 2)]
        );

        let mut out = Vec::new();
        d.handle(Command::More, &mut out).await.unwrap();
        assert!(output(out).contains("NO MORE ARTICLES"));
        assert_eq!(search.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_topic_makes_no_calls() {
        let search = FakeSearch::default();
        let ex = FakeExtractor::default();
        let sm = FakeSummarizer::default();
        let mut d = Dashboard::new(&search, &ex, &sm, keys(), Scope::All);

        let mut out = Vec::new();
        d.handle(Command::Search { topic: vec![] }, &mut out).await.unwrap();
        assert!(output(out).contains("PLEASE ENTER A TOPIC"));
        assert!(search.calls.borrow().is_empty());
        assert_eq!(d.session().phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_missing_keys_then_supplied_interactively() {
        let search = FakeSearch::with(vec![page(vec![article("A", "a")], 1)]);
        let ex = FakeExtractor::default();
        let sm = FakeSummarizer::default();
        let mut d = Dashboard::new(&search, &ex, &sm, Credentials::default(), Scope::All);

        let mut out = Vec::new();
        d.handle(Command::Search { topic: vec!["x".into()] }, &mut out).await.unwrap();
        assert!(output(out).contains("KEYS NOT FOUND"));
        assert!(search.calls.borrow().is_empty());

        let mut out = Vec::new();
        d.handle(Command::Key { which: KeyKind::News, value: "n".into() }, &mut out).await.unwrap();
        d.handle(Command::Key { which: KeyKind::Google, value: "g".into() }, &mut out).await.unwrap();
        d.handle(Command::Search { topic: vec!["x".into()] }, &mut out).await.unwrap();
        assert_eq!(search.calls.borrow().len(), 1);
        assert_eq!(d.session().phase(), Phase::Loaded);
    }

    #[tokio::test]
    async fn test_upstream_error_is_surfaced() {
        let search = FakeSearch::with(vec![Err(UpstreamError::Status {
            status: 500,
            body: "oops".into(),
        })]);
        let ex = FakeExtractor::default();
        let sm = FakeSummarizer::default();
        let mut d = Dashboard::new(&search, &ex, &sm, keys(), Scope::RegionFiltered);

        let mut out = Vec::new();
        d.handle(Command::Search { topic: vec!["x".into()] }, &mut out).await.unwrap();
        let text = output(out);
        assert!(text.contains("SCANNING AUSTRALIAN WIRES"));
        assert!(text.contains("Error fetching news: search API returned 500: oops"));
        assert!(text.contains("NO RECORDS FOUND."));
    }

    #[tokio::test]
    async fn test_open_reruns_every_time() {
        let search = FakeSearch::with(vec![page(vec![article("A", "https://a.example/1")], 1)]);
        let ex = FakeExtractor {
            text: Some("word ".repeat(100)),
            ..Default::default()
        };
        let sm = FakeSummarizer::default();
        let mut d = Dashboard::new(&search, &ex, &sm, keys(), Scope::All);

        let mut out = Vec::new();
        d.handle(Command::Search { topic: vec!["x".into()] }, &mut out).await.unwrap();

        for _ in 0..2 {
            let mut out = Vec::new();
            d.handle(Command::Open { n: 1 }, &mut out).await.unwrap();
            let text = output(out);
            assert!(text.contains("- four"));
            assert!(text.contains("READ FULL SOURCE MATERIAL: https://a.example/1"));
        }
        assert_eq!(*ex.calls.borrow(), 2);
        assert_eq!(*sm.calls.borrow(), 2);
    }

    #[tokio::test]
    async fn test_open_restricted_skips_summarizer() {
        let search = FakeSearch::with(vec![page(vec![article("A", "a")], 1)]);
        let ex = FakeExtractor {
            text: Some("x".repeat(150)),
            ..Default::default()
        };
        let sm = FakeSummarizer::default();
        let mut d = Dashboard::new(&search, &ex, &sm, keys(), Scope::All);

        let mut out = Vec::new();
        d.handle(Command::Search { topic: vec!["x".into()] }, &mut out).await.unwrap();
        let mut out = Vec::new();
        d.handle(Command::Open { n: 1 }, &mut out).await.unwrap();
        assert!(output(out).contains("Restricted Content"));
        assert_eq!(*sm.calls.borrow(), 0);
    }

    #[tokio::test]
    async fn test_open_failures_leave_session_intact() {
        let search = FakeSearch::with(vec![page(vec![article("A", "a"), article("B", "b")], 2)]);
        let ex = FakeExtractor::default();
        let sm = FakeSummarizer {
            blocked: true,
            ..Default::default()
        };
        let mut d = Dashboard::new(&search, &ex, &sm, keys(), Scope::All);

        let mut out = Vec::new();
        d.handle(Command::Search { topic: vec!["x".into()] }, &mut out).await.unwrap();
        let before = d.session().results().to_vec();

        let mut out = Vec::new();
        d.handle(Command::Open { n: 2 }, &mut out).await.unwrap();
        assert!(output(out).contains("Could not extract content"));

        let mut out = Vec::new();
        d.handle(Command::Open { n: 9 }, &mut out).await.unwrap();
        assert!(output(out).contains("No article 9"));

        let mut out = Vec::new();
        d.handle(Command::Open { n: 0 }, &mut out).await.unwrap();
        assert!(output(out).contains("No article 0"));

        assert_eq!(d.session().results(), before.as_slice());
    }

    #[tokio::test]
    async fn test_open_summary_failure_is_contained() {
        let search = FakeSearch::with(vec![page(vec![article("A", "a"), article("B", "b")], 2)]);
        let ex = FakeExtractor {
            text: Some("word ".repeat(100)),
            ..Default::default()
        };
        let sm = FakeSummarizer {
            blocked: true,
            ..Default::default()
        };
        let mut d = Dashboard::new(&search, &ex, &sm, keys(), Scope::All);

        let mut out = Vec::new();
        d.handle(Command::Search { topic: vec!["x".into()] }, &mut out).await.unwrap();
        let before = d.session().results().to_vec();

        let mut out = Vec::new();
        d.handle(Command::Open { n: 1 }, &mut out).await.unwrap();
        let text = output(out);
        assert!(text.contains("response blocked"));
        assert!(text.contains("READ FULL SOURCE MATERIAL: a"));
        assert_eq!(*sm.calls.borrow(), 1);
        assert_eq!(d.session().results(), before.as_slice());

        let mut out = Vec::new();
        d.handle(Command::Open { n: 2 }, &mut out).await.unwrap();
        assert!(output(out).contains("=== B ==="));
        assert_eq!(*ex.calls.borrow(), 2);
        assert_eq!(*sm.calls.borrow(), 2);
        assert_eq!(d.session().results(), before.as_slice());
    }

    #[tokio::test]
    async fn test_fetch_error_is_shown_once() {
        let search = FakeSearch::with(vec![
            page(vec![article("A", "a"), article("B", "b")], 10),
            Err(UpstreamError::Status {
                status: 503,
                body: "busy".into(),
            }),
        ]);
        let ex = FakeExtractor::default();
        let sm = FakeSummarizer::default();
        let mut d = Dashboard::new(&search, &ex, &sm, keys(), Scope::All);

        let mut out = Vec::new();
        d.handle(Command::Search { topic: vec!["x".into()] }, &mut out).await.unwrap();

        let mut out = Vec::new();
        d.handle(Command::More, &mut out).await.unwrap();
        let text = output(out);
        assert!(text.contains("Error fetching news: search API returned 503: busy"));
        assert!(text.contains("LOAD NEXT ARTICLES"));

        let mut out = Vec::new();
        d.handle(Command::List, &mut out).await.unwrap();
        let text = output(out);
        assert!(!text.contains("Error fetching news"));
        assert!(text.contains("SHOWING 2/10"));
    }

    #[tokio::test]
    async fn test_result_cap_stops_load_more() {
        let search = FakeSearch::with(vec![
            page(vec![article("A", "a"), article("B", "b")], 300),
            Err(UpstreamError::Api {
                code: "maximumResultsReached".into(),
                message: "You have requested too many results.".into(),
            }),
        ]);
        let ex = FakeExtractor::default();
        let sm = FakeSummarizer::default();
        let mut d = Dashboard::new(&search, &ex, &sm, keys(), Scope::All);

        let mut out = Vec::new();
        d.handle(Command::Search { topic: vec!["x".into()] }, &mut out).await.unwrap();

        let mut out = Vec::new();
        d.handle(Command::More, &mut out).await.unwrap();
        let text = output(out);
        assert!(!text.contains("LOAD NEXT ARTICLES"));
        assert!(!text.contains("Error fetching news"));
        assert_eq!(d.session().results().len(), 2);

        let mut out = Vec::new();
        d.handle(Command::More, &mut out).await.unwrap();
        assert!(output(out).contains("NO MORE ARTICLES"));
        assert_eq!(search.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_scope_list_and_quit() {
        let search = FakeSearch::default();
        let ex = FakeExtractor::default();
        let sm = FakeSummarizer::default();
        let mut d = Dashboard::new(&search, &ex, &sm, keys(), Scope::All);

        let mut out = Vec::new();
        d.handle(Command::Scope { scope: Scope::RegionFiltered }, &mut out).await.unwrap();
        assert_eq!(d.scope(), Scope::RegionFiltered);
        assert!(d.handle(Command::List, &mut out).await.unwrap() == Flow::Continue);
        assert_eq!(d.handle(Command::Quit, &mut out).await.unwrap(), Flow::Quit);
        assert!(output(out).contains("Australian Sources"));
        assert!(search.calls.borrow().is_empty());
    }
}
