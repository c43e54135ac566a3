//! Non-secret runtime settings.
//!
//! Settings come from built-in defaults, then an optional YAML file, then
//! command-line flags. API keys never live here; see [`crate::cli::Cli`].
//!
//! ```yaml
//! search_base_url: https://newsapi.org
//! summarizer_base_url: https://generativelanguage.googleapis.com/v1beta
//! model: gemini-2.5-flash
//! page_size: 20
//! extract_timeout_secs: 10
//! min_article_chars: 200
//! default_scope: au
//! ```

use crate::cli::Cli;
use crate::extract::{DEFAULT_TIMEOUT_SECS, MIN_ARTICLE_CHARS};
use crate::models::Scope;
use crate::search::MAX_PAGE_SIZE;
use crate::summarize::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

pub const DEFAULT_SEARCH_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search_base_url: String,
    pub summarizer_base_url: String,
    pub model: String,
    pub page_size: u32,
    pub extract_timeout_secs: u64,
    pub min_article_chars: usize,
    pub default_scope: Scope,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            summarizer_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            extract_timeout_secs: DEFAULT_TIMEOUT_SECS,
            min_article_chars: MIN_ARTICLE_CHARS,
            default_scope: Scope::All,
        }
    }
}

impl Settings {
    /// Parse settings from YAML text; missing fields keep their defaults.
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let settings: Settings = serde_yaml::from_str(text).context("invalid settings YAML")?;
        Ok(settings.normalized())
    }

    /// Flags given on the command line win over file values.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(scope) = cli.scope {
            self.default_scope = scope;
        }
        if let Some(page_size) = cli.page_size {
            self.page_size = page_size;
        }
        if let Some(model) = &cli.model {
            self.model = model.clone();
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self.extract_timeout_secs = self.extract_timeout_secs.max(1);
        self
    }
}

/// Load settings from `path`, or defaults when no path is given.
#[instrument(level = "info")]
pub async fn load_settings(path: Option<&str>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = tokio::fs::read_to_string(Path::new(path))
        .await
        .with_context(|| format!("could not read settings file {path}"))?;
    let settings = Settings::from_yaml(&text)?;
    info!(path, ?settings, "Loaded settings");
    Ok(settings)
}
