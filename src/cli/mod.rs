//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// Search a content site from the terminal
#[derive(Parser, Debug)]
#[command(name = "sitesearch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (human, json, jsonl, plain, tsv)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, short = 'm', global = true)]
    pub machine: bool,

    /// Force plain output (no colors)
    #[arg(long, global = true)]
    pub plain: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/sitesearch/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Search endpoint URL, overriding [api].endpoint
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the effective output format.
    ///
    /// Priority order:
    /// 1. `--plain` → Plain format
    /// 2. `--output-format` → Explicit format
    /// 3. `--machine` → JSON format (shorthand)
    /// 4. Default → Human format
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if self.plain {
            return OutputFormat::Plain;
        }

        if let Some(fmt) = self.output_format {
            return fmt;
        }

        if self.machine {
            return OutputFormat::Json;
        }

        OutputFormat::Human
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one search and print the result rows
    Query(commands::query::QueryArgs),

    /// Open the interactive search panel
    Tui(commands::tui::TuiArgs),

    /// Show the resolved configuration
    Config(commands::config::ConfigArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}
