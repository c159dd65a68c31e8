pub mod api;
pub mod app;
pub mod cli;
pub mod coalescer;
pub mod config;
pub mod error;
pub mod panel;
pub mod test_utils;
pub mod tui;

pub use error::{ApiError, Result, SiteError};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
