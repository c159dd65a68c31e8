//! Search panel model: result rows, overlay state, keyboard shortcuts.
//!
//! Nothing here touches the terminal; the `tui` module renders a
//! [`PanelState`] and feeds it key events and coalescer replies.

mod hotkeys;
mod rows;
mod state;

pub use hotkeys::{HotkeyMap, PanelAction};
pub use rows::{RowKind, RowLabels, SearchRow, rows_from_response};
pub use state::PanelState;
