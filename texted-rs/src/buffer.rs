//! Line buffer: the editable text and its splice-level edit operations.
//!
//! ## Design
//!
//! The text is a `Vec<Line>` where each [`Line`] is a `Vec<char>`, so column
//! arithmetic works in Unicode characters rather than bytes.  There is always
//! at least one line and never more than [`MAX_LINES`].
//!
//! Every operation clamps its row and column arguments instead of failing;
//! a split attempted at capacity is dropped.  The buffer owns the [`Cursor`]
//! and re-validates it after each structural change.

use crate::cursor::{Cursor, Position};

/// One newline-free line of text.
pub type Line = Vec<char>;

/// Hard cap on the number of lines a buffer may hold.
pub const MAX_LINES: usize = 99;

/// A multi-line text buffer with a single caret.
#[derive(Debug, Clone)]
pub struct Buffer {
    lines: Vec<Line>,
    cursor: Cursor,
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            lines: vec![Line::new()],
            cursor: Cursor::new(),
        }
    }

    // ── Access ────────────────────────────────────────────────────────────────

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, row: usize) -> Option<&[char]> {
        self.lines.get(row).map(Vec::as_slice)
    }

    /// Length in chars of `row`, or 0 for a missing row.
    pub fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, Vec::len)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// `row` as an owned `String`.
    pub fn line_text(&self, row: usize) -> String {
        self.lines.get(row).map_or_else(String::new, |l| l.iter().collect())
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn is_full(&self) -> bool {
        self.lines.len() >= MAX_LINES
    }

    /// The whole text, lines joined with `\n`.
    pub fn value(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(line.iter());
        }
        out
    }

    // ── Whole-buffer operations ───────────────────────────────────────────────

    /// Replace the content with a single empty line and home the caret.
    pub fn reset(&mut self) {
        self.lines = vec![Line::new()];
        self.cursor = Cursor::new();
    }

    /// Replace the content with `text`, leaving the caret after the last
    /// inserted character.
    ///
    /// A single trailing newline does not produce an empty last line, so
    /// `value()` afterwards equals `text` minus that one newline.
    pub fn set_value(&mut self, text: &str) {
        self.reset();
        self.insert_text(text);
    }

    // ── Structural splices ────────────────────────────────────────────────────

    /// Split `row` at `col`: the tail becomes a new line directly below and
    /// the caret moves to its start.
    ///
    /// Returns `false` (and changes nothing) when the buffer is full.
    pub fn split_line(&mut self, row: usize, col: usize) -> bool {
        if self.is_full() {
            tracing::debug!(lines = self.lines.len(), "split rejected at capacity");
            return false;
        }
        let row = self.clamp_row(row);
        let col = col.min(self.lines[row].len());
        let tail = self.lines[row].split_off(col);
        self.lines.insert(row + 1, tail);
        self.cursor.set(&self.lines, row + 1, 0);
        true
    }

    /// Append `row` to the line above it and remove `row`.  The caret lands
    /// on the junction.
    ///
    /// Returns `false` when there is no line above.
    pub fn merge_line_above(&mut self, row: usize) -> bool {
        let row = self.clamp_row(row);
        if row == 0 {
            return false;
        }
        let moved = self.lines.remove(row);
        let junction = self.lines[row - 1].len();
        self.lines[row - 1].extend(moved);
        self.cursor.set(&self.lines, row - 1, junction);
        true
    }

    // ── Character edits ───────────────────────────────────────────────────────

    /// Insert `ch` at `(row, col)` and place the caret after it.
    ///
    /// A `'\n'` is a line split rather than a character, and is dropped
    /// silently when the buffer is full.
    pub fn insert_char(&mut self, row: usize, col: usize, ch: char) -> bool {
        if ch == '\n' {
            return self.split_line(row, col);
        }
        let row = self.clamp_row(row);
        let col = col.min(self.lines[row].len());
        self.lines[row].insert(col, ch);
        self.cursor.set(&self.lines, row, col + 1);
        true
    }

    /// Insert `text` at the caret, splitting lines at each newline.
    ///
    /// One trailing newline is ignored; see [`Buffer::set_value`].
    pub fn insert_text(&mut self, text: &str) {
        let text = text.strip_suffix('\n').unwrap_or(text);
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                let Position { row, col } = self.position();
                self.split_line(row, col);
            }
            for ch in segment.chars() {
                let Position { row, col } = self.position();
                self.insert_char(row, col, ch);
            }
        }
    }

    /// Backspace at `(row, col)`.
    ///
    /// Removes the character before `col`, or merges `row` into the line
    /// above when `col` is 0.  Returns `false` at the very start of the
    /// buffer.
    pub fn delete_backward(&mut self, row: usize, col: usize) -> bool {
        let row = self.clamp_row(row);
        let col = col.min(self.lines[row].len());
        if col > 0 {
            self.lines[row].remove(col - 1);
            self.cursor.set(&self.lines, row, col - 1);
            true
        } else {
            self.merge_line_above(row)
        }
    }

    /// Forward delete at `(row, col)`: removes the character under the caret,
    /// or pulls the next line up when the caret is at the end of its line.
    pub fn delete_forward(&mut self, row: usize, col: usize) -> bool {
        let row = self.clamp_row(row);
        let col = col.min(self.lines[row].len());
        if col < self.lines[row].len() {
            self.lines[row].remove(col);
            self.cursor.set(&self.lines, row, col);
            true
        } else if row + 1 < self.lines.len() {
            self.merge_line_above(row + 1)
        } else {
            false
        }
    }

    /// Replace the chars `[start, end)` of `row` with `text` (which must not
    /// contain newlines), leaving the caret after the replacement.
    pub fn replace_range(&mut self, row: usize, start: usize, end: usize, text: &str) {
        let row = self.clamp_row(row);
        let len = self.lines[row].len();
        let end = end.min(len);
        let start = start.min(end);
        let replacement: Vec<char> = text.chars().filter(|&c| c != '\n').collect();
        let caret = start + replacement.len();
        self.lines[row].splice(start..end, replacement);
        self.cursor.set(&self.lines, row, caret);
    }

    // ── Caret-relative edits ──────────────────────────────────────────────────

    /// Type `ch` at the caret.
    pub fn insert_at_cursor(&mut self, ch: char) -> bool {
        let Position { row, col } = self.position();
        self.insert_char(row, col, ch)
    }

    /// Split the line at the caret.
    pub fn newline(&mut self) -> bool {
        let Position { row, col } = self.position();
        self.split_line(row, col)
    }

    /// Backspace at the caret.
    pub fn backspace(&mut self) -> bool {
        let Position { row, col } = self.position();
        self.delete_backward(row, col)
    }

    /// Forward delete at the caret.
    pub fn delete(&mut self) -> bool {
        let Position { row, col } = self.position();
        self.delete_forward(row, col)
    }

    // ── Caret movement ────────────────────────────────────────────────────────

    pub fn move_right(&mut self) -> Position {
        self.cursor.move_right(&self.lines)
    }

    pub fn move_left(&mut self, stay_within_line: bool) -> Position {
        self.cursor.move_left(&self.lines, stay_within_line)
    }

    pub fn move_up(&mut self) -> Position {
        self.cursor.move_up(&self.lines)
    }

    pub fn move_down(&mut self) -> Position {
        self.cursor.move_down(&self.lines)
    }

    pub fn move_home(&mut self) -> Position {
        self.cursor.move_home(&self.lines)
    }

    pub fn move_end(&mut self) -> Position {
        self.cursor.move_end(&self.lines)
    }

    /// Set the caret column on the current row, clamped.
    pub fn set_cursor(&mut self, col: usize) -> Position {
        self.cursor.set_col(&self.lines, col)
    }

    /// Place the caret anywhere, clamped.
    pub fn set_position(&mut self, row: usize, col: usize) -> Position {
        self.cursor.set(&self.lines, row, col)
    }

    // ── Internal ──────────────────────────────────────────────────────────────

    fn clamp_row(&self, row: usize) -> usize {
        row.min(self.lines.len() - 1)
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
