//! The composed editor: buffer, scroll window, completion overlay and the
//! syntax-highlighting render path behind one [`Editor::update`] entry point.
//!
//! ## Event handling
//!
//! Input arrives as [`EditAction`] values and is applied to completion
//! before the next one is accepted.  A blurred editor ignores everything but
//! [`EditAction::Focus`].  While the overlay shows items, Up and Down move
//! its selection bar instead of the caret.
//!
//! After any action that can move the caret or change text, the caret's line
//! is tokenized and the token just left of the caret is passed to the
//! completion hook; its answer replaces the overlay's items.
//!
//! ## Rendering
//!
//! [`Editor::view`] re-renders every line, stores the result in the
//! viewport, scrolls the viewport so the caret row is visible, and returns
//! the visible window.  Any line failure fails the whole view.
//! [`Editor::view_lossy`] instead logs the failure and shows that line as
//! plain text.

use std::fmt;

use crossterm::event::KeyEvent;

use crate::attr::StyleEntry;
use crate::buffer::Buffer;
use crate::config::EditorConfig;
use crate::cursor::Position;
use crate::hook::CompletionHook;
use crate::keybind::{EditAction, Keymap};
use crate::lexer::{self, coalesce, Lexer, Token};
use crate::render::{RenderError, RenderedLine, Renderer};
use crate::selector::{Selector, SelectorStyle};
use crate::theme::{self, Theme};
use crate::viewport::Viewport;

pub struct Editor {
    buffer: Buffer,
    viewport: Viewport,
    selector: Selector,
    keymap: Keymap,
    syntax: String,
    lexer: &'static dyn Lexer,
    theme: Theme,
    caret_style: StyleEntry,
    overlay_offset: usize,
    focused: bool,
    hook: Option<Box<dyn CompletionHook>>,
}

impl Editor {
    /// An editor with the default configuration.
    pub fn new() -> Self {
        Self::from_config(&EditorConfig::default())
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        let mut keymap = Keymap::new().with_defaults();
        for (chord, action) in &config.bindings {
            keymap.bind(*chord, action.clone());
        }
        Self {
            buffer: Buffer::new(),
            viewport: Viewport::new(config.width, config.height),
            selector: Selector::new(SelectorStyle::default()),
            keymap,
            syntax: config.syntax.clone(),
            lexer: lexer::resolve(&config.syntax, ""),
            theme: theme::resolve(&config.theme).clone(),
            caret_style: config.caret_style,
            overlay_offset: config.overlay_offset,
            focused: true,
            hook: None,
        }
    }

    // ── Content ───────────────────────────────────────────────────────────────

    pub fn value(&self) -> String {
        self.buffer.value()
    }

    /// Replace the text.  The caret ends after the last character and the
    /// overlay is cleared.
    pub fn set_value(&mut self, text: &str) {
        self.buffer.set_value(text);
        self.selector.reset();
    }

    /// Insert `text` at the caret.
    pub fn insert_text(&mut self, text: &str) {
        self.buffer.insert_text(text);
        self.refresh_completions();
    }

    /// Empty the buffer, home the caret and scroll to the top.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.viewport.scroll_to_top();
        self.selector.reset();
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn position(&self) -> Position {
        self.buffer.position()
    }

    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    // ── Focus ─────────────────────────────────────────────────────────────────

    pub fn focus(&mut self) {
        self.focused = true;
        self.selector.focus();
    }

    pub fn blur(&mut self) {
        self.focused = false;
        self.selector.blur();
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    // ── Settings ──────────────────────────────────────────────────────────────

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.viewport.set_size(width, height);
    }

    pub fn width(&self) -> usize {
        self.viewport.width()
    }

    pub fn height(&self) -> usize {
        self.viewport.height()
    }

    /// Choose the lexer by name.  Unknown names fall back to analysis of
    /// the current text, then to plain text.
    pub fn set_syntax(&mut self, name: &str) {
        self.syntax = name.to_owned();
        self.lexer = lexer::resolve(name, &self.buffer.value());
    }

    /// The syntax name as requested.
    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    pub fn lexer(&self) -> &'static dyn Lexer {
        self.lexer
    }

    pub fn set_lexer(&mut self, lexer: &'static dyn Lexer) {
        self.syntax = lexer.name().to_owned();
        self.lexer = lexer;
    }

    /// Choose a built-in theme by name, falling back to the default theme.
    pub fn set_theme_name(&mut self, name: &str) {
        self.theme = theme::resolve(name).clone();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_caret_style(&mut self, style: StyleEntry) {
        self.caret_style = style;
    }

    pub fn set_overlay_offset(&mut self, offset: usize) {
        self.overlay_offset = offset;
    }

    pub fn set_hook(&mut self, hook: impl CompletionHook + 'static) {
        self.hook = Some(Box::new(hook));
    }

    pub fn clear_hook(&mut self) {
        self.hook = None;
        self.selector.reset();
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Translate a key through the keymap and apply it.  Returns `false`
    /// for keys that map to nothing.
    pub fn handle_key(&mut self, ev: &KeyEvent) -> bool {
        match self.keymap.lookup(ev) {
            Some(action) => {
                self.update(action);
                true
            }
            None => false,
        }
    }

    /// Apply one action.
    pub fn update(&mut self, action: EditAction) {
        tracing::trace!(?action, edit = action.is_edit(), focused = self.focused, "edit action");
        match action {
            EditAction::Focus => return self.focus(),
            EditAction::Blur => return self.blur(),
            _ if !self.focused => return,
            EditAction::MoveUp if !self.selector.is_empty() => {
                self.selector.move_up();
                return;
            }
            EditAction::MoveDown if !self.selector.is_empty() => {
                self.selector.move_down();
                return;
            }
            EditAction::AcceptCompletion => return self.accept_completion(),
            EditAction::DismissCompletion => return self.selector.reset(),
            EditAction::Reset => return self.reset(),
            EditAction::InsertChar(ch) => {
                self.buffer.insert_at_cursor(ch);
            }
            EditAction::InsertText(text) => self.buffer.insert_text(&text),
            EditAction::Newline => {
                self.buffer.newline();
            }
            EditAction::Backspace => {
                self.buffer.backspace();
            }
            EditAction::DeleteForward => {
                self.buffer.delete();
            }
            EditAction::MoveLeft => {
                self.buffer.move_left(true);
            }
            EditAction::MoveRight => {
                self.buffer.move_right();
            }
            EditAction::MoveUp => {
                self.buffer.move_up();
            }
            EditAction::MoveDown => {
                self.buffer.move_down();
            }
            EditAction::MoveHome => {
                self.buffer.move_home();
            }
            EditAction::MoveEnd => {
                self.buffer.move_end();
            }
        }
        self.refresh_completions();
    }

    // ── Completion ────────────────────────────────────────────────────────────

    /// Ask the hook about the token left of the caret.
    fn refresh_completions(&mut self) {
        let Some(hook) = self.hook.as_mut() else {
            return;
        };
        let Position { row, col } = self.buffer.position();
        let line = self.buffer.line_text(row);
        let found = match self.lexer.tokenise(&line) {
            Ok(tokens) => token_before(coalesce(tokens), col),
            Err(e) => {
                tracing::debug!(row, error = %e, "no completion token: line did not tokenize");
                None
            }
        };
        let items = match &found {
            Some((_, token)) => hook.complete(token),
            None => Vec::new(),
        };
        if items.is_empty() {
            self.selector.reset();
            return;
        }
        let was_empty = self.selector.is_empty();
        self.selector.set_items(items);
        if was_empty {
            self.selector.select_first();
        }
        let start = found.map_or(0, |(start, _)| start);
        self.selector.set_offset(self.overlay_offset + start);
    }

    /// Put the selected item at the caret.
    ///
    /// If the word left of the caret is a prefix of the item (ignoring
    /// case) the item replaces it; otherwise the item is inserted, after a
    /// space when the caret is right behind a word.
    fn accept_completion(&mut self) {
        let Some(item) = self.selector.selected_item().cloned() else {
            return;
        };
        let Position { row, col } = self.buffer.position();
        let line = self.buffer.line(row).unwrap_or_default();
        let start = word_start(line, col);
        let fragment: String = line[start..col].iter().collect();

        if !fragment.is_empty() && starts_with_ignore_case(&item.value, &fragment) {
            self.buffer.replace_range(row, start, col, &item.value);
        } else {
            let text = if fragment.is_empty() {
                item.value
            } else {
                format!(" {}", item.value)
            };
            self.buffer.replace_range(row, col, col, &text);
        }
        self.selector.reset();
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Every line rendered with syntax highlighting; the caret is drawn on
    /// its line while the editor has focus.
    pub fn render_lines(&self) -> Vec<Result<RenderedLine, RenderError>> {
        let renderer = Renderer::new(&self.theme, self.caret_style);
        let caret = self.caret();
        (0..self.buffer.line_count())
            .map(|row| {
                let text = self.buffer.line_text(row);
                renderer.highlight(&text, self.lexer, caret_col(caret, row))
            })
            .collect()
    }

    /// The visible window, lines joined with `\n`.  Fails if any line fails
    /// to render.
    pub fn view(&mut self) -> Result<String, RenderError> {
        let lines = self
            .render_lines()
            .into_iter()
            .map(|line| line?.to_ansi())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.show(lines))
    }

    /// Like [`Editor::view`], but a line that fails to render is shown as
    /// plain text with the caret overlay.
    pub fn view_lossy(&mut self) -> String {
        let caret = self.caret();
        let lines = self
            .render_lines()
            .into_iter()
            .enumerate()
            .map(|(row, line)| {
                let text = self.buffer.line_text(row);
                let plain = || RenderedLine::plain(&text, caret_col(caret, row), self.caret_style);
                let rendered = line.unwrap_or_else(|e| {
                    tracing::warn!(row, error = %e, "line failed to render; showing plain text");
                    plain()
                });
                rendered
                    .to_ansi()
                    .or_else(|_| plain().to_ansi())
                    .unwrap_or_else(|_| text.clone())
            })
            .collect();
        self.show(lines)
    }

    /// The overlay rows, already padded; empty when there is nothing to
    /// offer.
    pub fn overlay(&mut self) -> Result<Vec<String>, RenderError> {
        self.selector.view()
    }

    /// Row of the caret within the visible window, as of the last view.
    pub fn caret_screen_row(&self) -> usize {
        self.buffer.position().row.saturating_sub(self.viewport.offset())
    }

    fn caret(&self) -> Option<Position> {
        self.focused.then(|| self.buffer.position())
    }

    fn show(&mut self, lines: Vec<String>) -> String {
        self.viewport.set_content(lines);
        self.viewport.ensure_visible(self.buffer.position().row);
        self.viewport.view().join("\n")
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("buffer", &self.buffer)
            .field("viewport", &self.viewport)
            .field("selector", &self.selector)
            .field("syntax", &self.syntax)
            .field("lexer", &self.lexer.name())
            .field("theme", &self.theme.name())
            .field("focused", &self.focused)
            .field("hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn caret_col(caret: Option<Position>, row: usize) -> Option<usize> {
    caret.filter(|p| p.row == row).map(|p| p.col)
}

/// The token that ends at or spans `col` from the left, with its start
/// column.  Nothing at column 0.
fn token_before(tokens: Vec<Token>, col: usize) -> Option<(usize, Token)> {
    let mut start = 0;
    for token in tokens {
        let end = start + token.char_len();
        if start < col && col <= end {
            return Some((start, token));
        }
        start = end;
    }
    None
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word_start(line: &[char], col: usize) -> usize {
    let col = col.min(line.len());
    line[..col]
        .iter()
        .rposition(|&c| !is_word_char(c))
        .map_or(0, |i| i + 1)
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    let mut s = s.chars().flat_map(char::to_lowercase);
    prefix
        .chars()
        .flat_map(char::to_lowercase)
        .all(|p| s.next() == Some(p))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
