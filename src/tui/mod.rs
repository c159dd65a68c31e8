//! Terminal user interface for the search panel.

pub mod search;

pub use search::{Action, SearchTui, run_search_tui};
