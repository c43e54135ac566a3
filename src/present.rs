//! Text rendering for the dashboard.
//!
//! Everything here is a pure function of its inputs: rendering the same
//! session twice yields the same text and never triggers a fetch.

use crate::error::{ExtractionError, SummarizationError};
use crate::models::{Article, SearchQuery};
use crate::session::{Phase, Session};
use chrono::NaiveDate;
use std::fmt::Write;

/// Shown instead of a summary when the page had too little text.
pub const RESTRICTED_MESSAGE: &str = "⚠️ **Restricted Content:** This article appears to be behind a hard paywall or consists mainly of media. The AI cannot read the text.";

const RULE: &str = "────────────────────────────────────────────────────────────";

/// `2024-03-05T10:00:00Z` → `05 Mar 2024`. Anything that does not start
/// with a `YYYY-MM-DD` date is shown as its first ten characters.
pub fn format_date(raw: &str) -> String {
    let head: String = raw.chars().take(10).collect();
    match NaiveDate::parse_from_str(&head, "%Y-%m-%d") {
        Ok(d) => d.format("%d %b %Y").to_string(),
        Err(_) => head,
    }
}

/// Banner printed while a search is in flight.
pub fn scanning_banner(query: &SearchQuery) -> String {
    format!(
        "SCANNING {} FOR '{}'...",
        query.scope.wire_label(),
        query.topic.to_uppercase()
    )
}

fn render_article(out: &mut String, index: usize, article: &Article) {
    let title = if article.title.trim().is_empty() {
        "(untitled)"
    } else {
        article.title.trim()
    };
    let source = if article.source.name.trim().is_empty() {
        "UNKNOWN".to_string()
    } else {
        article.source.name.trim().to_uppercase()
    };

    let byline = article
        .author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|a| format!("  |  BY {a}"))
        .unwrap_or_default();

    let _ = writeln!(out, "### {index}. {title}");
    let _ = writeln!(
        out,
        "    📅 {}  |  SOURCE: {source}{byline}",
        format_date(&article.published_at)
    );
    if let Some(desc) = article.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "    {desc}");
    }
    let _ = writeln!(out, "    [+] SHOW OVERVIEW: open {index}");
    let _ = writeln!(out, "{RULE}");
}

/// Render the visible result list for `session`.
pub fn render_results(session: &Session) -> String {
    let mut out = String::new();

    if let Some(err) = session.last_error() {
        let _ = writeln!(out, "❌ Error fetching news: {err}");
    }

    match session.phase() {
        Phase::Idle => {
            let _ = writeln!(out, "Type `search <topic>` to begin. `help` lists commands.");
        }
        Phase::Empty => {
            let _ = writeln!(out, "NO RECORDS FOUND.");
            let _ = writeln!(out, "ARTICLES FOUND: 0");
        }
        Phase::Loaded => {
            if let Some(q) = session.active_query() {
                let _ = writeln!(out, "RESULTS FOR '{}' ({})", q.topic.to_uppercase(), q.scope);
            }
            let shown = session.results().len();
            let total = session
                .total_results()
                .map(|t| t.max(shown as u32).to_string())
                .unwrap_or_else(|| "?".to_string());
            let _ = writeln!(out, "SHOWING {shown}/{total}");
            let _ = writeln!(out, "{RULE}");

            for (i, article) in session.results().iter().enumerate() {
                render_article(&mut out, i + 1, article);
            }

            if session.can_load_more() {
                let _ = writeln!(out, "LOAD NEXT ARTICLES: more");
            }
        }
    }
    out
}

/// What expanding an article produced.
#[derive(Debug)]
pub enum Overview {
    Summary(String),
    Restricted,
    ExtractionFailed(ExtractionError),
    SummaryFailed(SummarizationError),
}

/// Render an expanded article: synopsis (or the reason there is none) plus
/// a link to the source.
pub fn render_overview(article: &Article, overview: &Overview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", article.title.trim());
    match overview {
        Overview::Summary(s) => {
            let _ = writeln!(out, "{s}");
        }
        Overview::Restricted => {
            let _ = writeln!(out, "{RESTRICTED_MESSAGE}");
        }
        Overview::ExtractionFailed(e) => {
            let _ = writeln!(
                out,
                "Error: Could not extract content ({e}). The site may be blocking access."
            );
        }
        Overview::SummaryFailed(e) => {
            let _ = writeln!(out, "{e}");
        }
    }
    let _ = writeln!(out, "**READ FULL SOURCE MATERIAL: {}**", article.url);
    out
}

/// Command reference.
pub fn help_text() -> &'static str {
    "\
COMMANDS
  search <topic...>        new search (replaces current results)
  scope <all|au>           choose All Sources or Australian Sources
  more                     load the next page of results
  open <n>                 extract and summarize article n
  list                     show the current results again
  key <news|google> <key>  supply an API key for this session
  help                     show this help
  quit                     exit"
}
