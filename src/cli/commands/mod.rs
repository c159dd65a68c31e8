//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod completions;
pub mod config;
pub mod query;
pub mod tui;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Query(args) => query::run(ctx, args),
        Commands::Tui(args) => tui::run(ctx, args),
        Commands::Config(args) => config::run(ctx, args),
        Commands::Completions(args) => completions::run(args),
    }
}
