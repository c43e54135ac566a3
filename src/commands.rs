//! Parsing of interactive commands.
//!
//! Each line typed at the prompt is parsed with `clap` as if it were a tiny
//! command line of its own.

use crate::models::Scope;
use clap::{Parser, Subcommand, ValueEnum};

/// Which API key a `key` command sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyKind {
    News,
    Google,
}

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search for a topic, replacing current results
    #[command(alias = "s")]
    Search {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        topic: Vec<String>,
    },
    /// Choose the source region
    Scope {
        #[arg(value_enum)]
        scope: Scope,
    },
    /// Load the next page of results
    #[command(alias = "m")]
    More,
    /// Summarize article n
    #[command(alias = "o")]
    Open { n: usize },
    /// Show current results again
    #[command(alias = "ls")]
    List,
    /// Supply an API key
    Key {
        #[arg(value_enum)]
        which: KeyKind,
        value: String,
    },
    /// Show commands
    Help,
    /// Leave the dashboard
    #[command(alias = "exit", alias = "q")]
    Quit,
}

impl Command {
    /// Topic words rejoined with single spaces.
    pub fn topic(words: &[String]) -> String {
        words.join(" ")
    }
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    Line::try_parse_from(words).map(|l| Some(l.command))
}
