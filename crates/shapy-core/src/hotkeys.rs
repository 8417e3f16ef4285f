//! Keyboard chords for editor commands.

/// A key press as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// Key value, e.g. `"z"`, `"Delete"`, `"Escape"`.
    pub key: String,
    pub ctrl: bool,
    /// Cmd on macOS; treated like Ctrl.
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
    /// Focus is inside a text input or textarea.
    pub in_text_input: bool,
}

impl KeyboardEvent {
    /// A key with no modifiers.
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// A key with Ctrl held.
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            ctrl: true,
            ..Self::key(key)
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn in_text_input(mut self) -> Self {
        self.in_text_input = true;
        self
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Command a chord maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Delete,
    Undo,
    Redo,
    Copy,
    Paste,
    /// Save immediately, bypassing the autosave debounce.
    Save,
    ClearSelection,
    SelectAll,
}

/// A documented chord.
#[derive(Debug, Clone, Copy)]
pub struct Hotkey {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: HotkeyAction,
    pub description: &'static str,
}

impl Hotkey {
    const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: HotkeyAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the chord for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

const BINDINGS: &[Hotkey] = &[
    Hotkey::new("Delete", false, false, HotkeyAction::Delete, "Delete selected objects"),
    Hotkey::new("Backspace", false, false, HotkeyAction::Delete, "Delete selected objects"),
    Hotkey::new("Z", true, false, HotkeyAction::Undo, "Undo"),
    Hotkey::new("Z", true, true, HotkeyAction::Redo, "Redo"),
    Hotkey::new("Y", true, false, HotkeyAction::Redo, "Redo"),
    Hotkey::new("C", true, false, HotkeyAction::Copy, "Copy"),
    Hotkey::new("V", true, false, HotkeyAction::Paste, "Paste"),
    Hotkey::new("S", true, false, HotkeyAction::Save, "Save now"),
    Hotkey::new("A", true, false, HotkeyAction::SelectAll, "Select all objects"),
    Hotkey::new("Escape", false, false, HotkeyAction::ClearSelection, "Clear selection"),
];

/// Every chord with its description, for help screens. Cmd works wherever
/// Ctrl is listed.
pub fn bindings() -> &'static [Hotkey] {
    BINDINGS
}

/// Map a key press to an action. Events inside text inputs never match.
pub fn resolve(event: &KeyboardEvent) -> Option<HotkeyAction> {
    if event.in_text_input {
        return None;
    }
    let key = event.key.as_str();
    // Delete works with or without modifiers held.
    if matches!(key, "Delete" | "Backspace") {
        return Some(HotkeyAction::Delete);
    }
    if event.command() {
        return match key.to_ascii_lowercase().as_str() {
            "z" if event.shift => Some(HotkeyAction::Redo),
            "z" => Some(HotkeyAction::Undo),
            "y" => Some(HotkeyAction::Redo),
            "c" => Some(HotkeyAction::Copy),
            "v" => Some(HotkeyAction::Paste),
            "s" => Some(HotkeyAction::Save),
            "a" => Some(HotkeyAction::SelectAll),
            _ => None,
        };
    }
    match key {
        "Escape" => Some(HotkeyAction::ClearSelection),
        _ => None,
    }
}
