//! Caret position and movement over a slice of lines.
//!
//! All positions are in Unicode scalar values (chars), not bytes.  A
//! [`Cursor`] does not own the text it points into; every movement takes the
//! current lines so that bounds come from the buffer at the moment of the
//! move.  After any structural change to the lines the owner must call
//! [`Cursor::clamp`] before the next read.

use crate::buffer::Line;

/// A `(row, col)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The single insertion point of a buffer.
///
/// Legal when `row < lines.len()` and `col <= lines[row].len()`; `col` equal
/// to the line length means "after the last character".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
    /// Column recorded when a run of vertical moves starts.  Zeroed by every
    /// horizontal move or column assignment.
    pub last_horizontal_offset: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    /// Re-establish the legality invariant against `lines`.
    pub fn clamp(&mut self, lines: &[Line]) {
        let last = lines.len().saturating_sub(1);
        self.row = self.row.min(last);
        self.col = self.col.min(line_len(lines, self.row));
    }

    /// Place the caret at `(row, col)`, clamped, and forget the vertical
    /// column memory.
    pub fn set(&mut self, lines: &[Line], row: usize, col: usize) -> Position {
        self.row = row;
        self.col = col;
        self.clamp(lines);
        self.last_horizontal_offset = 0;
        self.position()
    }

    /// Assign the column on the current row, clamped to `[0, len]`.
    pub fn set_col(&mut self, lines: &[Line], col: usize) -> Position {
        let row = self.row;
        self.set(lines, row, col)
    }

    // ── Horizontal ────────────────────────────────────────────────────────────

    /// One character right, wrapping to the start of the next line.  No-op at
    /// the end of the buffer.
    pub fn move_right(&mut self, lines: &[Line]) -> Position {
        self.clamp(lines);
        self.last_horizontal_offset = 0;
        if self.col < line_len(lines, self.row) {
            self.col += 1;
        } else if self.row + 1 < lines.len() {
            self.row += 1;
            self.col = 0;
        }
        self.position()
    }

    /// One character left, wrapping to the end of the previous line.
    ///
    /// When the caret wraps and `stay_within_line` is `false`, one further
    /// left step is taken on the new line.
    pub fn move_left(&mut self, lines: &[Line], stay_within_line: bool) -> Position {
        self.clamp(lines);
        self.last_horizontal_offset = 0;
        if self.col == 0 && self.row > 0 {
            self.row -= 1;
            self.col = line_len(lines, self.row);
            if stay_within_line {
                return self.position();
            }
        }
        if self.col > 0 {
            self.col -= 1;
        }
        self.position()
    }

    pub fn move_home(&mut self, lines: &[Line]) -> Position {
        self.set_col(lines, 0)
    }

    pub fn move_end(&mut self, lines: &[Line]) -> Position {
        self.set_col(lines, usize::MAX)
    }

    // ── Vertical ──────────────────────────────────────────────────────────────

    /// One row down.  The column is kept unless the new line is shorter, in
    /// which case it is clamped to that line's length.
    pub fn move_down(&mut self, lines: &[Line]) -> Position {
        self.clamp(lines);
        if self.row + 1 < lines.len() {
            self.remember_column();
            self.row += 1;
            self.col = self.col.min(line_len(lines, self.row));
        }
        self.position()
    }

    /// One row up, with the same column rule as [`Cursor::move_down`].
    pub fn move_up(&mut self, lines: &[Line]) -> Position {
        self.clamp(lines);
        if self.row > 0 {
            self.remember_column();
            self.row -= 1;
            self.col = self.col.min(line_len(lines, self.row));
        }
        self.position()
    }

    fn remember_column(&mut self) {
        if self.last_horizontal_offset == 0 {
            self.last_horizontal_offset = self.col;
        }
    }
}

fn line_len(lines: &[Line], row: usize) -> usize {
    lines.get(row).map_or(0, Vec::len)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
