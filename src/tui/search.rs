//! Interactive search panel using ratatui.
//!
//! A plain background screen lists the shortcuts; `Ctrl-K`, `Cmd-K` or `/`
//! pops the search overlay over it. Every keyword change goes through the
//! [`RequestCoalescer`]; replies come back over a channel and are applied on
//! the next tick of the UI loop.

use std::io::{self, IsTerminal, Stdout};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tokio::runtime::Handle;

use crate::api::{HttpSearchClient, RemoteSearch, SearchResponse};
use crate::app::AppContext;
use crate::coalescer::{Reply, RequestCoalescer};
use crate::config::Config;
use crate::error::{Result, SiteError};
use crate::panel::{HotkeyMap, PanelAction, PanelState, SearchRow};

/// Action to take after handling input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Exit without selecting anything
    Quit,
    /// Exit returning the highlighted row
    Select(SearchRow),
    Continue,
}

/// A reply tagged with the panel session and keyword generation it answers.
type TaggedReply = (u64, u64, Reply<SearchResponse>);

/// TUI application state.
pub struct SearchTui<S: RemoteSearch<Output = SearchResponse>> {
    coalescer: RequestCoalescer<S>,
    runtime: Handle,
    panel: PanelState,
    hotkeys: HotkeyMap,
    /// Incremented on every open so replies for a closed panel are dropped.
    session: u64,
    replies_tx: Sender<TaggedReply>,
    replies_rx: Receiver<TaggedReply>,
    endpoint: String,
    empty_label: String,
}

impl<S: RemoteSearch<Output = SearchResponse>> SearchTui<S> {
    pub fn new(coalescer: RequestCoalescer<S>, runtime: Handle, config: &Config) -> Self {
        let (replies_tx, replies_rx) = crossbeam_channel::unbounded();
        Self {
            coalescer,
            runtime,
            panel: PanelState::new(config.row_labels()),
            hotkeys: HotkeyMap::default(),
            session: 0,
            replies_tx,
            replies_rx,
            endpoint: config.api.endpoint.clone(),
            empty_label: config.panel.empty_label.clone(),
        }
    }

    /// Open the panel already searching for `keyword`.
    #[must_use]
    pub fn with_keyword(mut self, keyword: Option<&str>) -> Self {
        if let Some(keyword) = keyword {
            self.open_panel();
            if self.panel.set_keyword(keyword) {
                self.submit_keyword();
            }
        }
        self
    }

    /// Run the TUI main loop.
    pub fn run(mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<Option<SearchRow>> {
        loop {
            self.drain_replies();
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.handle_key(key) {
                        Action::Quit => return Ok(None),
                        Action::Select(row) => return Ok(Some(row)),
                        Action::Continue => {}
                    }
                }
            }
        }
    }

    /// Apply every reply that has arrived since the last tick.
    pub fn drain_replies(&mut self) {
        while let Ok((session, generation, reply)) = self.replies_rx.try_recv() {
            if session == self.session && self.panel.is_open() {
                self.panel.apply_reply(generation, reply);
            }
        }
    }

    #[must_use]
    pub const fn panel(&self) -> &PanelState {
        &self.panel
    }

    fn open_panel(&mut self) {
        if self.panel.is_open() {
            return;
        }
        self.session += 1;
        self.panel.open();
    }

    fn close_panel(&mut self) {
        self.panel.close();
        // The panel comes back blank, so drop what the coalescer tracked too.
        let _enter = self.runtime.enter();
        drop(self.coalescer.submit(""));
    }

    fn submit_keyword(&self) {
        let session = self.session;
        let generation = self.panel.generation();
        let tx = self.replies_tx.clone();
        let submission = {
            let _enter = self.runtime.enter();
            self.coalescer.submit(self.panel.keyword())
        };
        self.runtime.spawn(async move {
            let reply = submission.await;
            // The UI loop may already be gone.
            let _ = tx.send((session, generation, reply));
        });
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        if let Some(action) = self.hotkeys.resolve(&key, self.panel.is_open()) {
            match action {
                PanelAction::Open => self.open_panel(),
                PanelAction::Close => self.close_panel(),
            }
            return Action::Continue;
        }

        if !self.panel.is_open() {
            if key.code == KeyCode::Char('q') {
                return Action::Quit;
            }
            return Action::Continue;
        }

        match key.code {
            KeyCode::Enter => {
                if let Some(row) = self.panel.selected_row() {
                    return Action::Select(row.clone());
                }
            }
            KeyCode::Down => self.panel.select_next(),
            KeyCode::Up => self.panel.select_prev(),
            KeyCode::Backspace => {
                if self.panel.pop_char() {
                    self.submit_keyword();
                }
            }
            KeyCode::Char(c)
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if self.panel.push_char(c) {
                    self.submit_keyword();
                }
            }
            _ => {}
        }
        Action::Continue
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title bar
                Constraint::Min(3),    // Background
                Constraint::Length(1), // Help bar
            ])
            .split(f.area());

        self.draw_title_bar(f, chunks[0]);
        self.draw_background(f, chunks[1]);
        self.draw_help_bar(f, chunks[2]);

        if self.panel.is_open() {
            self.draw_overlay(f);
        }
    }

    fn draw_title_bar(&self, f: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled("sitesearch", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" | {}", self.endpoint)),
        ]);
        let paragraph = Paragraph::new(title).style(Style::default().fg(Color::Cyan));
        f.render_widget(paragraph, area);
    }

    fn draw_background(&self, f: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(Span::styled("Shortcuts", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
        ];
        for (label, action) in self.hotkeys.describe() {
            let what = match action {
                PanelAction::Open => "open search",
                PanelAction::Close => "close search",
            };
            lines.push(Line::from(format!("  {label:<10} {what}")));
        }
        lines.push(Line::from(format!("  {:<10} quit", "q")));

        let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn draw_help_bar(&self, f: &mut Frame, area: Rect) {
        let help_text = if self.panel.is_open() {
            "Type to search  Up/Down: move  Enter: select  Esc: close"
        } else {
            "Ctrl-K or /: search  q: quit"
        };
        let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
        f.render_widget(paragraph, area);
    }

    fn draw_overlay(&self, f: &mut Frame) {
        let area = centered_rect(80, 60, f.area());
        f.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Search ");
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Input
                Constraint::Length(1), // Status
                Constraint::Min(1),    // Results
            ])
            .split(inner);

        let input = Paragraph::new(format!("> {}_", self.panel.keyword()));
        f.render_widget(input, chunks[0]);

        let status_style = if self.panel.last_error().is_some() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let status = Paragraph::new(self.panel.status_line(&self.empty_label)).style(status_style);
        f.render_widget(status, chunks[1]);

        self.draw_results(f, chunks[2]);
    }

    fn draw_results(&self, f: &mut Frame, area: Rect) {
        let width = usize::from(area.width.saturating_sub(2));
        let items: Vec<ListItem> = self
            .panel
            .rows()
            .iter()
            .map(|row| ListItem::new(result_line(row, width)))
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("› ");

        let mut state = ListState::default();
        if !self.panel.rows().is_empty() {
            state.select(Some(self.panel.selected_index()));
        }
        f.render_stateful_widget(list, area, &mut state);
    }
}

/// Title on the left, subtitle flush right.
fn result_line(row: &SearchRow, width: usize) -> Line<'static> {
    let subtitle_len = row.subtitle.chars().count();
    let title_room = width.saturating_sub(subtitle_len + 2).max(4);
    let title = truncate(&row.title, title_room);
    let gap = width
        .saturating_sub(title.chars().count() + subtitle_len)
        .max(1);

    Line::from(vec![
        Span::raw(title),
        Span::raw(" ".repeat(gap)),
        Span::styled(row.subtitle.clone(), Style::default().fg(Color::DarkGray)),
    ])
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        format!("{}...", s.chars().take(max_len.saturating_sub(3)).collect::<String>())
    } else {
        s.to_string()
    }
}

/// RAII Guard to ensure terminal state is restored even on panic.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode().map_err(|e| SiteError::Terminal(format!("enable raw mode: {e}")))?;
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen)
            .map_err(|e| SiteError::Terminal(format!("enter alternate screen: {e}")))?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Run the search panel against the configured endpoint.
pub fn run_search_tui(ctx: &AppContext, keyword: Option<&str>) -> Result<Option<SearchRow>> {
    if !io::stdout().is_terminal() {
        return Err(SiteError::NotInteractive(
            "tui command requires an interactive terminal".to_string(),
        ));
    }

    let coalescer: RequestCoalescer<HttpSearchClient> = ctx.coalescer()?;
    let app = SearchTui::new(coalescer, ctx.runtime().handle().clone(), &ctx.config)
        .with_keyword(keyword);

    let _guard = TerminalGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    app.run(&mut terminal)
}
