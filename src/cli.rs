//! Command-line interface definitions for The Briefing.
//!
//! API keys can come from flags or environment variables. Anything left
//! unset can still be entered at the prompt with `key news ...` or
//! `key google ...`.

use crate::models::Scope;
use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Keys from the environment
/// NEWS_API_KEY=... GOOGLE_API_KEY=... the_briefing
///
/// # Australian sources, bigger pages, settings file
/// the_briefing --scope au --page-size 50 -c briefing.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Google generative-language API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Initial source region
    #[arg(long, value_enum)]
    pub scope: Option<Scope>,

    /// Articles requested per page (1-100)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Summarization model name
    #[arg(long)]
    pub model: Option<String>,

    /// Run a search immediately on start-up
    #[arg(short, long)]
    pub topic: Option<String>,
}
