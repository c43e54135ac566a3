//! Error taxonomy for the dashboard.
//!
//! Every failure is contained to the action (or the single article) that
//! caused it. None of these errors end the session; the REPL renders them
//! inline and keeps reading commands.

use thiserror::Error;

/// Input rejected before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ACCESS DENIED: KEYS NOT FOUND ({0} missing)")]
    MissingCredentials(&'static str),

    #[error("INPUT ERROR: PLEASE ENTER A TOPIC")]
    EmptyTopic,
}

/// The news search API failed.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("search request failed: {}", error_chain(.0))]
    Transport(#[from] reqwest::Error),

    #[error("search API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("search API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("could not decode search response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Downloading or parsing an article page failed.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("invalid article URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not fetch article: {}", error_chain(.0))]
    Transport(#[from] reqwest::Error),

    #[error("article page returned {0}")]
    Status(u16),
}

/// The language-model call failed or produced nothing usable.
#[derive(Error, Debug)]
pub enum SummarizationError {
    #[error("nothing to summarize")]
    EmptyInput,

    #[error("connection error: {}", error_chain(.0))]
    Transport(#[from] reqwest::Error),

    #[error("API Error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response blocked by the model{}", block_suffix(.reason))]
    Blocked { reason: Option<String> },

    #[error("could not decode model response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UpstreamError {
    /// The API refuses to page past the plan's result cap (HTTP 426
    /// `maximumResultsReached` on the developer plan).
    pub fn is_result_cap(&self) -> bool {
        matches!(self, UpstreamError::Api { code, .. } if code == "maximumResultsReached")
    }
}

/// `err` followed by each of its sources, joined with `": "`.
///
/// reqwest keeps the interesting part (`operation timed out`, `connection
/// refused`) in the source chain, not in its own message. Sources whose
/// text is already part of the message so far are skipped.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

fn block_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(" ({r})"),
        None => String::new(),
    }
}
