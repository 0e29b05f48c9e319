//! Key binding dispatch: [`EditAction`] and [`Keymap`].
//!
//! ## Key chord format
//!
//! A [`KeyChord`] is a crossterm key code plus the Ctrl/Alt modifiers.  Shift
//! is not part of a chord; it is already folded into the character crossterm
//! reports.  [`KeyChord::parse`] reads the `ctrl+f` / `enter` / `left`
//! notation used by `/bind` in the config file.
//!
//! Unbound printable characters insert themselves.

use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

// ── EditAction ────────────────────────────────────────────────────────────────

/// Everything the editor can be asked to do in response to input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Insert this character at the caret.
    InsertChar(char),
    /// Insert a string at the caret (paste); newlines split lines.
    InsertText(String),
    /// Split the line at the caret.
    Newline,
    /// Delete before the caret, merging lines at column 0.
    Backspace,
    /// Delete at the caret, joining the next line at end of line.
    DeleteForward,
    MoveLeft,
    MoveRight,
    /// Up one line, or up one overlay row while the overlay shows items.
    MoveUp,
    /// Down one line, or down one overlay row while the overlay shows items.
    MoveDown,
    MoveHome,
    MoveEnd,
    /// Replace the word left of the caret with the selected completion.
    AcceptCompletion,
    /// Hide the completion overlay.
    DismissCompletion,
    Focus,
    Blur,
    /// Clear the buffer.
    Reset,
}

impl EditAction {
    /// Every action that can be bound by name.
    pub const NAMED: &'static [EditAction] = &[
        EditAction::Newline,
        EditAction::Backspace,
        EditAction::DeleteForward,
        EditAction::MoveLeft,
        EditAction::MoveRight,
        EditAction::MoveUp,
        EditAction::MoveDown,
        EditAction::MoveHome,
        EditAction::MoveEnd,
        EditAction::AcceptCompletion,
        EditAction::DismissCompletion,
        EditAction::Focus,
        EditAction::Blur,
        EditAction::Reset,
    ];

    /// Name used in `/bind` directives; `None` for the insert actions.
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            EditAction::Newline => "newline",
            EditAction::Backspace => "backspace",
            EditAction::DeleteForward => "delete",
            EditAction::MoveLeft => "left",
            EditAction::MoveRight => "right",
            EditAction::MoveUp => "up",
            EditAction::MoveDown => "down",
            EditAction::MoveHome => "home",
            EditAction::MoveEnd => "end",
            EditAction::AcceptCompletion => "accept",
            EditAction::DismissCompletion => "dismiss",
            EditAction::Focus => "focus",
            EditAction::Blur => "blur",
            EditAction::Reset => "reset",
            EditAction::InsertChar(_) | EditAction::InsertText(_) => return None,
        })
    }

    /// Case-insensitive lookup by [`EditAction::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|a| a.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            .cloned()
    }

    /// Whether the action changes buffer content.
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            EditAction::InsertChar(_)
                | EditAction::InsertText(_)
                | EditAction::Newline
                | EditAction::Backspace
                | EditAction::DeleteForward
                | EditAction::AcceptCompletion
                | EditAction::Reset
        )
    }
}

// ── KeyChord ──────────────────────────────────────────────────────────────────

/// A key plus Ctrl/Alt state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyChord {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self {
            code,
            modifiers: modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT),
        }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Parse `ctrl+f`, `alt+left`, `enter`, `x`, ...
    pub fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let mut parts: Vec<&str> = s.split('+').collect();
        // "+" and "ctrl++" name the plus key; "ctrl+" names nothing.
        let key = match parts.pop()? {
            "" if parts.last() == Some(&"") => {
                parts.pop();
                "+"
            }
            "" => return None,
            k => k,
        };
        for m in parts {
            match m.to_ascii_lowercase().as_str() {
                "ctrl" | "c" => modifiers |= KeyModifiers::CONTROL,
                "alt" | "meta" | "m" => modifiers |= KeyModifiers::ALT,
                _ => return None,
            }
        }
        let code = match key.to_ascii_lowercase().as_str() {
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "esc" | "escape" => KeyCode::Esc,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pgup" | "pageup" => KeyCode::PageUp,
            "pgdown" | "pagedown" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            _ => {
                let mut chars = key.chars();
                let ch = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                // Ctrl+letter arrives lowercase from crossterm.
                if modifiers.contains(KeyModifiers::CONTROL) {
                    KeyCode::Char(ch.to_ascii_lowercase())
                } else {
                    KeyCode::Char(ch)
                }
            }
        };
        Some(Self::new(code, modifiers))
    }
}

impl From<KeyEvent> for KeyChord {
    fn from(ev: KeyEvent) -> Self {
        Self::new(ev.code, ev.modifiers)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            other => f.write_str(&format!("{other:?}").to_ascii_lowercase()),
        }
    }
}

// ── Keymap ────────────────────────────────────────────────────────────────────

/// Maps [`KeyChord`]s to [`EditAction`]s.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: HashMap<KeyChord, EditAction>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `chord` to `action`, replacing any earlier binding.
    pub fn bind(&mut self, chord: KeyChord, action: EditAction) {
        self.bindings.insert(chord, action);
    }

    /// Bind by textual chord and action name.  Returns `false` if either
    /// does not parse.
    pub fn bind_named(&mut self, chord: &str, action: &str) -> bool {
        match (KeyChord::parse(chord), EditAction::from_name(action)) {
            (Some(c), Some(a)) => {
                self.bind(c, a);
                true
            }
            _ => false,
        }
    }

    pub fn unbind(&mut self, chord: &KeyChord) {
        self.bindings.remove(chord);
    }

    pub fn get(&self, chord: &KeyChord) -> Option<&EditAction> {
        self.bindings.get(chord)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Translate a key event.  Bound chords win; otherwise an unmodified
    /// printable character inserts itself.  Key releases map to nothing.
    pub fn lookup(&self, ev: &KeyEvent) -> Option<EditAction> {
        if ev.kind == KeyEventKind::Release {
            return None;
        }
        let chord = KeyChord::from(*ev);
        if let Some(action) = self.bindings.get(&chord) {
            return Some(action.clone());
        }
        match chord.code {
            KeyCode::Char(c) if chord.modifiers.is_empty() && !c.is_control() => {
                Some(EditAction::InsertChar(c))
            }
            _ => None,
        }
    }

    /// The standard bindings.
    pub fn with_defaults(mut self) -> Self {
        use EditAction::*;
        use KeyCode as K;

        self.bind(KeyChord::plain(K::Right), MoveRight);
        self.bind(KeyChord::ctrl('f'), MoveRight);
        self.bind(KeyChord::plain(K::Left), MoveLeft);
        self.bind(KeyChord::ctrl('b'), MoveLeft);
        self.bind(KeyChord::plain(K::Up), MoveUp);
        self.bind(KeyChord::plain(K::Down), MoveDown);
        self.bind(KeyChord::plain(K::Home), MoveHome);
        self.bind(KeyChord::plain(K::End), MoveEnd);

        self.bind(KeyChord::plain(K::Enter), Newline);
        self.bind(KeyChord::ctrl('m'), Newline);
        self.bind(KeyChord::plain(K::Backspace), Backspace);
        self.bind(KeyChord::ctrl('h'), Backspace);
        self.bind(KeyChord::plain(K::Delete), DeleteForward);

        self.bind(KeyChord::plain(K::Tab), AcceptCompletion);
        self.bind(KeyChord::plain(K::Esc), Blur);

        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    // ── EditAction ────────────────────────────────────────────────────────────

    #[test]
    fn named_actions_round_trip() {
        for action in EditAction::NAMED {
            let name = action.name().unwrap();
            assert_eq!(EditAction::from_name(name).as_ref(), Some(action));
        }
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(EditAction::from_name("ACCEPT"), Some(EditAction::AcceptCompletion));
        assert_eq!(EditAction::from_name("xyzzy"), None);
    }

    #[test]
    fn insert_actions_have_no_name() {
        assert_eq!(EditAction::InsertChar('a').name(), None);
    }

    // ── KeyChord ──────────────────────────────────────────────────────────────

    #[test]
    fn parse_named_and_modified_keys() {
        assert_eq!(KeyChord::parse("enter"), Some(KeyChord::plain(KeyCode::Enter)));
        assert_eq!(KeyChord::parse("ctrl+F"), Some(KeyChord::ctrl('f')));
        assert_eq!(
            KeyChord::parse("alt+left"),
            Some(KeyChord::new(KeyCode::Left, KeyModifiers::ALT))
        );
        assert_eq!(KeyChord::parse("+"), Some(KeyChord::plain(KeyCode::Char('+'))));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(KeyChord::parse("hyper+x"), None);
        assert_eq!(KeyChord::parse("notakey"), None);
        assert_eq!(KeyChord::parse(""), None);
    }

    #[test]
    fn trailing_plus_needs_an_empty_key_before_it() {
        assert_eq!(KeyChord::parse("ctrl+"), None);
        assert_eq!(KeyChord::parse("alt+ctrl+"), None);
        assert_eq!(
            KeyChord::parse("ctrl++"),
            Some(KeyChord::new(KeyCode::Char('+'), KeyModifiers::CONTROL))
        );
    }

    #[test]
    fn shift_is_not_part_of_a_chord() {
        let ev = key(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(KeyChord::from(ev), KeyChord::plain(KeyCode::Char('A')));
    }

    #[test]
    fn display_uses_bind_notation() {
        assert_eq!(KeyChord::ctrl('h').to_string(), "ctrl+h");
        assert_eq!(KeyChord::plain(KeyCode::Enter).to_string(), "enter");
    }

    // ── Keymap ────────────────────────────────────────────────────────────────

    #[test]
    fn defaults_cover_standard_bindings() {
        let km = Keymap::new().with_defaults();
        let cases = [
            (key(KeyCode::Right, KeyModifiers::NONE), EditAction::MoveRight),
            (key(KeyCode::Char('f'), KeyModifiers::CONTROL), EditAction::MoveRight),
            (key(KeyCode::Left, KeyModifiers::NONE), EditAction::MoveLeft),
            (key(KeyCode::Char('b'), KeyModifiers::CONTROL), EditAction::MoveLeft),
            (key(KeyCode::Enter, KeyModifiers::NONE), EditAction::Newline),
            (key(KeyCode::Char('m'), KeyModifiers::CONTROL), EditAction::Newline),
            (key(KeyCode::Backspace, KeyModifiers::NONE), EditAction::Backspace),
            (key(KeyCode::Char('h'), KeyModifiers::CONTROL), EditAction::Backspace),
            (key(KeyCode::Tab, KeyModifiers::NONE), EditAction::AcceptCompletion),
            (key(KeyCode::Esc, KeyModifiers::NONE), EditAction::Blur),
        ];
        for (ev, want) in cases {
            assert_eq!(km.lookup(&ev), Some(want), "{ev:?}");
        }
    }

    #[test]
    fn printable_chars_insert_themselves() {
        let km = Keymap::new().with_defaults();
        assert_eq!(
            km.lookup(&key(KeyCode::Char('è'), KeyModifiers::NONE)),
            Some(EditAction::InsertChar('è'))
        );
        assert_eq!(
            km.lookup(&key(KeyCode::Char('S'), KeyModifiers::SHIFT)),
            Some(EditAction::InsertChar('S'))
        );
    }

    #[test]
    fn unbound_control_chords_do_nothing() {
        let km = Keymap::new().with_defaults();
        assert_eq!(km.lookup(&key(KeyCode::Char('q'), KeyModifiers::CONTROL)), None);
        assert_eq!(km.lookup(&key(KeyCode::F(5), KeyModifiers::NONE)), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let km = Keymap::new().with_defaults();
        let mut ev = key(KeyCode::Char('a'), KeyModifiers::NONE);
        ev.kind = KeyEventKind::Release;
        assert_eq!(km.lookup(&ev), None);
    }

    #[test]
    fn bind_named_overrides_default() {
        let mut km = Keymap::new().with_defaults();
        assert!(km.bind_named("ctrl+a", "home"));
        assert!(km.bind_named("tab", "dismiss"));
        assert!(!km.bind_named("ctrl+a", "fly"));
        assert_eq!(
            km.lookup(&key(KeyCode::Char('a'), KeyModifiers::CONTROL)),
            Some(EditAction::MoveHome)
        );
        assert_eq!(
            km.lookup(&key(KeyCode::Tab, KeyModifiers::NONE)),
            Some(EditAction::DismissCompletion)
        );
    }

    #[test]
    fn unbind_restores_self_insert() {
        let mut km = Keymap::new();
        km.bind(KeyChord::plain(KeyCode::Char('x')), EditAction::Blur);
        km.unbind(&KeyChord::plain(KeyCode::Char('x')));
        assert!(km.is_empty());
        assert_eq!(
            km.lookup(&key(KeyCode::Char('x'), KeyModifiers::NONE)),
            Some(EditAction::InsertChar('x'))
        );
    }
}
