use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Binding {
    code: KeyCode,
    modifiers: KeyModifiers,
    action: PanelAction,
    /// Whether the binding fires while the search input has focus.
    while_typing: bool,
}

impl Binding {
    const fn new(code: KeyCode, modifiers: KeyModifiers, action: PanelAction, while_typing: bool) -> Self {
        Self {
            code,
            modifiers,
            action,
            while_typing,
        }
    }

    fn matches(&self, key: &KeyEvent) -> bool {
        let mut modifiers = key.modifiers;
        // Shifted layouts report '/' and friends with SHIFT set.
        if matches!(key.code, KeyCode::Char(_)) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        let code = match key.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        code == self.code && modifiers == self.modifiers
    }
}

/// Keyboard shortcuts that open and close the search panel.
#[derive(Debug, Clone)]
pub struct HotkeyMap {
    bindings: Vec<Binding>,
}

impl Default for HotkeyMap {
    fn default() -> Self {
        Self {
            bindings: vec![
                Binding::new(KeyCode::Char('k'), KeyModifiers::CONTROL, PanelAction::Open, true),
                Binding::new(KeyCode::Char('k'), KeyModifiers::SUPER, PanelAction::Open, true),
                Binding::new(KeyCode::Char('k'), KeyModifiers::META, PanelAction::Open, true),
                Binding::new(KeyCode::Char('/'), KeyModifiers::NONE, PanelAction::Open, false),
                Binding::new(KeyCode::Esc, KeyModifiers::NONE, PanelAction::Close, true),
            ],
        }
    }
}

impl HotkeyMap {
    #[must_use]
    pub fn resolve(&self, key: &KeyEvent, input_focused: bool) -> Option<PanelAction> {
        self.bindings
            .iter()
            .find(|binding| (binding.while_typing || !input_focused) && binding.matches(key))
            .map(|binding| binding.action)
    }

    /// Human-readable shortcut list for the help screen.
    #[must_use]
    pub fn describe(&self) -> Vec<(String, PanelAction)> {
        self.bindings
            .iter()
            .map(|binding| (describe_key(binding.code, binding.modifiers), binding.action))
            .collect()
    }
}

fn describe_key(code: KeyCode, modifiers: KeyModifiers) -> String {
    let mut label = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        label.push_str("Ctrl-");
    }
    if modifiers.contains(KeyModifiers::SUPER) {
        label.push_str("Cmd-");
    }
    if modifiers.contains(KeyModifiers::META) {
        label.push_str("Meta-");
    }
    match code {
        KeyCode::Char(c) => label.push(c.to_ascii_uppercase()),
        KeyCode::Esc => label.push_str("Esc"),
        other => label.push_str(&format!("{other:?}")),
    }
    label
}
