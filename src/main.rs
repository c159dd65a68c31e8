//! sitesearch - Search a content site from the terminal
//!
//! Keystrokes are coalesced into throttled calls against the site's search
//! endpoint, either from an interactive panel or one query at a time.

use std::fs::{self, File, OpenOptions};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sitesearch::Result;
use sitesearch::app::AppContext;
use sitesearch::cli::output::{emit_json, robot_error_structured};
use sitesearch::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.output_format().is_machine_readable() {
                // Machine mode: structured error on stdout
                if emit_json(&robot_error_structured(&e)).is_err() {
                    eprintln!("Error: {e}");
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Commands::Completions(args) = &cli.command {
        return sitesearch::cli::commands::completions::run(args);
    }
    let ctx = AppContext::from_cli(cli)?;
    sitesearch::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,sitesearch=info",
        1 => "info,sitesearch=debug",
        2 => "debug,sitesearch=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if matches!(cli.command, Commands::Tui(_)) {
        // The panel owns the screen; log to a file instead.
        if let Some(file) = tui_log_file() {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        return;
    }

    if cli.output_format().is_machine_readable() {
        // JSON logging for machine mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// `<cache_dir>/sitesearch/sitesearch.log`, opened for append.
fn tui_log_file() -> Option<File> {
    let dir = dirs::cache_dir()?.join("sitesearch");
    fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("sitesearch.log"))
        .ok()
}
