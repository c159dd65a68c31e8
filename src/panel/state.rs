use tracing::{trace, warn};

use super::rows::{RowLabels, SearchRow, rows_from_response};
use crate::api::SearchResponse;
use crate::coalescer::Reply;

/// State of the search overlay.
///
/// The coalescer always answers with the newest call record, so any reply can
/// be applied as it arrives; replies that are older than one already applied
/// are ignored.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    open: bool,
    keyword: String,
    loading: bool,
    rows: Vec<SearchRow>,
    selected: usize,
    last_error: Option<String>,
    labels: RowLabels,
    /// `(seq, resolved)` of the newest record applied so far.
    applied: Option<(u64, bool)>,
    /// Bumped on every keyword change; replies carry the value current at submission.
    generation: u64,
}

impl PanelState {
    #[must_use]
    pub fn new(labels: RowLabels) -> Self {
        Self {
            labels,
            ..Self::default()
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the overlay; the next open starts from a blank panel.
    pub fn close(&mut self) {
        let labels = std::mem::take(&mut self.labels);
        let generation = self.generation;
        *self = Self::new(labels);
        self.generation = generation;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Replace the keyword. Returns true if it changed, in which case the
    /// caller must submit it.
    pub fn set_keyword(&mut self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        if keyword == self.keyword {
            return false;
        }
        self.keyword = keyword;
        self.generation += 1;
        self.loading = true;
        self.last_error = None;
        true
    }

    /// Tag to submit alongside the current keyword.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn push_char(&mut self, c: char) -> bool {
        let mut keyword = self.keyword.clone();
        keyword.push(c);
        self.set_keyword(keyword)
    }

    pub fn pop_char(&mut self) -> bool {
        let mut keyword = self.keyword.clone();
        if keyword.pop().is_none() {
            return false;
        }
        self.set_keyword(keyword)
    }

    /// Apply the reply to the submission tagged `generation`.
    ///
    /// Records are ordered by `(seq, resolved)`. `None` and errors carry no
    /// record, so they only count for the newest submission.
    pub fn apply_reply(&mut self, generation: u64, reply: Reply<SearchResponse>) {
        let current = generation == self.generation;
        match reply {
            Ok(None) | Err(_) if !current => {
                trace!(generation, current = self.generation, "ignoring reply for an older keyword");
            }
            Ok(None) => {
                self.loading = false;
                self.rows.clear();
                self.selected = 0;
            }
            Ok(Some(record)) => {
                let seen = (record.seq, record.is_resolved());
                if self.applied.is_some_and(|applied| seen < applied) {
                    trace!(seq = record.seq, "ignoring reply older than the one on screen");
                    return;
                }
                self.applied = Some(seen);

                match record.value() {
                    // newest call still in flight
                    None => self.loading = true,
                    Some(response) => {
                        if let Some(rows) = rows_from_response(response, &self.labels) {
                            self.rows = rows;
                            self.selected = 0;
                        }
                        self.loading = false;
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, keyword = %self.keyword, "search failed");
                self.last_error = Some(err.to_string());
                self.loading = false;
            }
        }
    }

    #[must_use]
    pub const fn loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn rows(&self) -> &[SearchRow] {
        &self.rows
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub const fn selected_index(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn selected_row(&self) -> Option<&SearchRow> {
        self.rows.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.rows.len();
    }

    pub fn select_prev(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selected = if self.selected == 0 {
            self.rows.len() - 1
        } else {
            self.selected - 1
        };
    }

    /// One-line status: loading, the last error, or the result count.
    #[must_use]
    pub fn status_line(&self, empty_label: &str) -> String {
        if self.loading {
            return "Searching…".to_string();
        }
        if let Some(err) = &self.last_error {
            return format!("Search failed: {err}");
        }
        match self.rows.len() {
            0 if self.keyword.is_empty() => "Type to search".to_string(),
            0 => empty_label.to_string(),
            1 => "1 result".to_string(),
            n => format!("{n} results"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::coalescer::{CallRecord, RecordState};
    use crate::error::ApiError;
    use crate::test_utils::fixtures;

    fn resolved(seq: u64, response: SearchResponse) -> Reply<SearchResponse> {
        Ok(Some(CallRecord {
            seq,
            query: "q".into(),
            state: RecordState::Resolved(Arc::new(response)),
        }))
    }

    fn unresolved(seq: u64) -> Reply<SearchResponse> {
        Ok(Some(CallRecord {
            seq,
            query: "q".into(),
            state: RecordState::Unresolved,
        }))
    }

    fn panel_with_rows() -> PanelState {
        let mut panel = PanelState::new(RowLabels::default());
        panel.open();
        panel.set_keyword("rust");
        panel.apply_reply(panel.generation(), resolved(0, fixtures::mixed_response()));
        panel
    }

    #[test]
    fn keyword_change_sets_loading() {
        let mut panel = PanelState::default();
        assert!(!panel.loading());
        assert!(panel.push_char('r'));
        assert!(panel.loading());
        assert_eq!(panel.keyword(), "r");
        assert!(!panel.set_keyword("r"));
    }

    #[test]
    fn resolved_reply_replaces_rows() {
        let panel = panel_with_rows();
        assert!(!panel.loading());
        assert_eq!(panel.rows().len(), 3);
        assert_eq!(panel.selected_index(), 0);
        assert_eq!(panel.status_line("Nothing"), "3 results");
    }

    #[test]
    fn none_reply_clears_rows() {
        let mut panel = panel_with_rows();
        panel.set_keyword("");
        panel.apply_reply(panel.generation(), Ok(None));
        assert!(panel.rows().is_empty());
        assert!(!panel.loading());
        assert_eq!(panel.status_line("Nothing"), "Type to search");
    }

    #[test]
    fn dataless_response_keeps_rows() {
        let mut panel = panel_with_rows();
        panel.set_keyword("rusty");
        let response: SearchResponse =
            serde_json::from_value(fixtures::dataless_response_json()).unwrap();
        panel.apply_reply(panel.generation(), resolved(1, response));
        assert!(!panel.loading());
        assert_eq!(panel.rows().len(), 3);
    }

    #[test]
    fn unresolved_reply_keeps_loading() {
        let mut panel = panel_with_rows();
        panel.set_keyword("rusty");
        panel.apply_reply(panel.generation(), unresolved(1));
        assert!(panel.loading());
        assert_eq!(panel.rows().len(), 3);
    }

    #[test]
    fn error_reply_keeps_rows_and_reports() {
        let mut panel = panel_with_rows();
        panel.set_keyword("rusty");
        panel.apply_reply(panel.generation(), Err(ApiError::Network("connection refused".into())));
        assert!(!panel.loading());
        assert_eq!(panel.rows().len(), 3);
        assert!(panel.last_error().unwrap().contains("connection refused"));
        assert!(panel.status_line("Nothing").starts_with("Search failed"));

        // typing again clears the error
        panel.push_char('!');
        assert!(panel.last_error().is_none());
    }

    #[test]
    fn none_for_older_keyword_keeps_loading() {
        let mut panel = panel_with_rows();
        let cleared_for = panel.generation();
        panel.set_keyword("");
        panel.set_keyword("b");

        // the clear answered an earlier submission; "b" is still pending
        panel.apply_reply(cleared_for, Ok(None));
        assert!(panel.loading());
        assert_eq!(panel.rows().len(), 3);
        assert_eq!(panel.status_line("Nothing here"), "Searching…");
    }

    #[test]
    fn error_for_older_keyword_is_dropped() {
        let mut panel = panel_with_rows();
        panel.set_keyword("rus");
        let failed_for = panel.generation();
        panel.set_keyword("rust!");

        panel.apply_reply(failed_for, Err(ApiError::Network("reset".into())));
        assert!(panel.loading());
        assert!(panel.last_error().is_none());
    }

    #[test]
    fn generation_survives_close() {
        let mut panel = panel_with_rows();
        let before = panel.generation();
        panel.close();
        panel.open();
        panel.set_keyword("x");
        assert!(panel.generation() > before);
    }

    #[test]
    fn stale_reply_is_ignored() {
        let mut panel = panel_with_rows();
        panel.set_keyword("rusty");
        panel.apply_reply(panel.generation(), resolved(2, SearchResponse { data: Some(vec![]), pagination: None }));
        assert!(panel.rows().is_empty());

        // an older delivery arriving late does not bring old rows back
        panel.apply_reply(panel.generation(), resolved(1, fixtures::mixed_response()));
        assert!(panel.rows().is_empty());
        // nor does an unresolved view of the same record
        panel.apply_reply(panel.generation(), unresolved(2));
        assert!(!panel.loading());
    }

    #[test]
    fn empty_result_uses_empty_label() {
        let mut panel = PanelState::default();
        panel.set_keyword("zzz");
        panel.apply_reply(panel.generation(), resolved(0, SearchResponse { data: Some(vec![]), pagination: None }));
        assert_eq!(panel.status_line("Nothing here"), "Nothing here");
    }

    #[test]
    fn selection_wraps() {
        let mut panel = panel_with_rows();
        panel.select_prev();
        assert_eq!(panel.selected_index(), 2);
        panel.select_next();
        assert_eq!(panel.selected_index(), 0);
        panel.select_next();
        assert_eq!(panel.selected_row().unwrap().url, "/notes/118");
    }

    #[test]
    fn close_resets_but_keeps_labels() {
        let labels = RowLabels {
            note: "Diary".into(),
            page: "Page".into(),
        };
        let mut panel = PanelState::new(labels);
        panel.open();
        panel.set_keyword("rust");
        panel.apply_reply(panel.generation(), resolved(0, fixtures::mixed_response()));
        panel.close();

        assert!(!panel.is_open());
        assert!(panel.keyword().is_empty());
        assert!(panel.rows().is_empty());

        panel.open();
        panel.set_keyword("rust");
        panel.apply_reply(panel.generation(), resolved(1, fixtures::mixed_response()));
        assert_eq!(panel.rows()[1].subtitle, "Diary");
    }
}
