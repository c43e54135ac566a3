//! Article summarization through the Gemini `generateContent` endpoint.
//!
//! One request per article, no streaming and no retries. The prompt asks for
//! exactly four markdown bullet points.

use crate::error::SummarizationError;
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Default REST root for the generative-language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const INSTRUCTION: &str = "You are a professional industry analyst. Read the following news article and provide a synopsis consisting of EXACTLY four bullet points. Format the output as a clean markdown list. Keep it professional, objective, and concise.";

/// Build the full prompt for `text`.
pub fn build_prompt(text: &str) -> String {
    format!("{INSTRUCTION}\n\nArticle Text:\n{text}")
}

/// Anything that can turn article text into a bullet-point synopsis.
pub trait Summarize {
    async fn summarize(&self, api_key: &str, text: &str) -> Result<String, SummarizationError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Pull the first candidate's text out of a response body.
fn parse_summary(body: &str) -> Result<String, SummarizationError> {
    let resp: GenerateResponse = serde_json::from_str(body)?;

    let first = resp.candidates.first();
    let text = first
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.first())
        .and_then(|p| p.text.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty());

    match text {
        Some(t) => Ok(t.to_string()),
        None => {
            let reason = resp
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .or_else(|| first.and_then(|c| c.finish_reason.clone()));
            Err(SummarizationError::Blocked { reason })
        }
    }
}

/// Gemini-backed [`Summarize`].
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl Summarize for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model, chars = text.len()))]
    async fn summarize(&self, api_key: &str, text: &str) -> Result<String, SummarizationError> {
        if text.trim().is_empty() {
            return Err(SummarizationError::EmptyInput);
        }

        let prompt = build_prompt(text);
        let payload = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: &prompt }],
            }],
        };

        let t0 = Instant::now();
        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms,
                body_preview = %truncate_for_log(&body, 300),
                "Summarization API returned an error"
            );
            return Err(SummarizationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let summary = parse_summary(&body);
        match &summary {
            Ok(s) => info!(elapsed_ms, chars = s.len(), "Summarized article"),
            Err(e) => warn!(
                elapsed_ms,
                error = %e,
                response_preview = %truncate_for_log(&body, 300),
                "Model returned no usable summary"
            ),
        }
        summary
    }
}
