//! # The Briefing
//!
//! A terminal news dashboard. It searches a news API for a topic, optionally
//! limited to Australian outlets, pages through the results, and on request
//! pulls the full text of an article and asks an LLM for a four-point
//! synopsis.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... GOOGLE_API_KEY=... the_briefing
//! > scope au
//! > search interest rates
//! > open 3
//! > more
//! ```
//!
//! ## Architecture
//!
//! 1. **Search**: [`search::NewsApiClient`] fetches one page of results
//! 2. **Session**: [`session::Session`] merges pages, de-duplicates titles
//!    and tracks the page cursor
//! 3. **Expand**: [`extract::WebExtractor`] downloads the article and
//!    [`summarize::GeminiClient`] summarizes it
//! 4. **Render**: [`present`] turns the session into text

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod commands;
mod config;
mod dashboard;
mod dedupe;
mod error;
mod extract;
mod models;
mod present;
mod search;
mod session;
mod summarize;
mod utils;

use cli::Cli;
use commands::{Command, parse_line};
use dashboard::{Dashboard, Flow};
use extract::WebExtractor;
use search::NewsApiClient;
use session::Credentials;
use summarize::GeminiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- Tracing init (stderr; stdout is the dashboard) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    debug!(?args.config, ?args.scope, ?args.page_size, "Parsed CLI arguments");

    let settings = config::load_settings(args.config.as_deref()).await?.apply_cli(&args);
    info!(?settings, "Effective settings");

    let http = reqwest::Client::builder()
        .build()
        .context("could not build HTTP client")?;
    let search = NewsApiClient::new(http.clone(), &settings.search_base_url, settings.page_size);
    let summarizer = GeminiClient::new(http, &settings.summarizer_base_url, &settings.model);
    let extractor = WebExtractor::new(settings.extract_timeout_secs, settings.min_article_chars)
        .context("could not build article extractor")?;

    let credentials = Credentials {
        news_api_key: args.news_api_key.clone(),
        google_api_key: args.google_api_key.clone(),
    };

    let mut stdout = std::io::stdout();
    writeln!(stdout, "THE BRIEFING")?;
    writeln!(stdout, "LIVE NEWS INTELLIGENCE FEED")?;
    writeln!(stdout, "POWERED BY {}", settings.model.to_uppercase())?;
    for (label, key) in [("NEWS", credentials.news()), ("GOOGLE", credentials.google())] {
        if key.is_some() {
            writeln!(stdout, "✅ {label} API KEY LOADED")?;
        } else {
            writeln!(stdout, "⚠️ {label} API KEY MISSING (use `key {}` <KEY>)", label.to_lowercase())?;
        }
    }
    writeln!(stdout, "SOURCE REGION: {}", settings.default_scope)?;
    writeln!(stdout, "Type `help` for commands.")?;

    let mut dashboard = Dashboard::new(search, extractor, summarizer, credentials, settings.default_scope);

    if let Some(topic) = &args.topic {
        let words = topic.split_whitespace().map(str::to_string).collect();
        dashboard.handle(Command::Search { topic: words }, &mut stdout).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(command)) => {
                debug!(?command, "Handling command");
                if dashboard.handle(command, &mut stdout).await? == Flow::Quit {
                    break;
                }
            }
            Err(e) => {
                warn!(input = %line, "Unrecognized command");
                writeln!(stdout, "{}", e.render())?;
            }
        }
    }

    info!("Session ended");
    Ok(())
}
