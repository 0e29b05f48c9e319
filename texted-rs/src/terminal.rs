//! Terminal drawing: crossterm-backed output of the editor frame, the
//! completion overlay and a status line.
//!
//! ## Layout
//!
//! ```text
//!   ┌────────────────┐   row 0
//!   │select *        │
//!   │from tab1       │   ← caret row
//!   │ table1         │   ← overlay rows replace the rows below the caret
//!   │ table2         │
//!   └────────────────┘
//!   sql · monokai · 2:5  (ctrl+c to quit)
//! ```
//!
//! Frame composition ([`compose_overlay`], [`frame`]) is pure and works on
//! already-encoded ANSI lines; [`Terminal`] only positions and prints them.

use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    queue,
    style::{Print, ResetColor, SetStyle},
    terminal::{self, ClearType},
};

use crate::attr::{Attr, StyleEntry};
use crate::render::strip_ansi;

// ── Frame composition ─────────────────────────────────────────────────────────

/// Lay `overlay` rows over `body`, starting on the row after `anchor`.
/// Rows that would fall past the end of the body are dropped.
pub fn compose_overlay(body: &[String], overlay: &[String], anchor: usize) -> Vec<String> {
    let mut out = body.to_vec();
    for (i, row) in overlay.iter().enumerate() {
        match out.get_mut(anchor + 1 + i) {
            Some(slot) => *slot = row.clone(),
            None => break,
        }
    }
    out
}

/// Surround `body` with a single-line border, `width × height` inside.
/// Short bodies are padded with blank rows; long lines are cut.
pub fn frame(body: &[String], width: usize, height: usize) -> Vec<String> {
    let rule = "─".repeat(width);
    let mut out = Vec::with_capacity(height + 2);
    out.push(format!("┌{rule}┐"));
    for i in 0..height {
        let line = body.get(i).map_or("", String::as_str);
        out.push(format!("│{}│", pad_or_truncate(line, width)));
    }
    out.push(format!("└{rule}┘"));
    out
}

// ── StatusLine ────────────────────────────────────────────────────────────────

/// One row of text drawn below the frame.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub text: String,
    pub style: StyleEntry,
}

impl StatusLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: StyleEntry::ZERO,
        }
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.style = self.style.with_attr(attr);
        self
    }
}

// ── Terminal ──────────────────────────────────────────────────────────────────

/// The output side of the demo: a writer plus the current screen size.
///
/// Call [`Terminal::enter_raw_mode`] once at startup and keep the returned
/// guard alive for the session.
pub struct Terminal {
    /// Columns.
    pub width: u16,
    /// Rows.
    pub height: u16,
    out: Box<dyn Write>,
}

impl Terminal {
    /// Draw to `out`.  The size is read from the tty, or taken as 80×24
    /// when there is none.
    pub fn new(out: impl Write + 'static) -> io::Result<Self> {
        let (width, height) = terminal::size().unwrap_or((80, 24));
        Ok(Self {
            width,
            height,
            out: Box::new(out),
        })
    }

    /// Switch the tty to raw mode until the returned guard is dropped.
    pub fn enter_raw_mode() -> io::Result<RawModeGuard> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard(()))
    }

    /// Ask the tty to deliver pastes as one event instead of a key per
    /// character.  [`RawModeGuard`] turns it off again on drop.
    pub fn set_bracketed_paste(&mut self, on: bool) -> io::Result<()> {
        if on {
            queue!(self.out, EnableBracketedPaste)
        } else {
            queue!(self.out, DisableBracketedPaste)
        }
    }

    /// Record the size from a resize event.
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Send everything queued so far.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Blank the screen and home the cursor.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.out, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))
    }

    /// Draw `lines` from the top of the screen, one per row, clearing the
    /// remainder of each row.  Lines below the terminal are skipped.
    pub fn draw_lines(&mut self, top: u16, lines: &[String]) -> io::Result<()> {
        queue!(self.out, cursor::Hide)?;
        for (i, line) in lines.iter().enumerate() {
            let row = top.saturating_add(i as u16);
            if row >= self.height {
                break;
            }
            queue!(
                self.out,
                cursor::MoveTo(0, row),
                Print(line),
                ResetColor,
                terminal::Clear(ClearType::UntilNewLine)
            )?;
        }
        Ok(())
    }

    /// Draw a status line at `row`, padded to the terminal width.
    pub fn draw_status(&mut self, row: u16, status: &StatusLine) -> io::Result<()> {
        let text = pad_or_truncate(&status.text, self.width as usize);
        queue!(
            self.out,
            cursor::MoveTo(0, row),
            SetStyle(status.style.content_style()),
            Print(&text),
            ResetColor
        )
    }

    /// Erase everything from `row` to the bottom of the screen.
    pub fn clear_below(&mut self, row: u16) -> io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(0, row),
            terminal::Clear(ClearType::FromCursorDown)
        )
    }
}

// ── RawModeGuard ──────────────────────────────────────────────────────────────

/// Leaves the screen blank, the cursor visible, bracketed paste off and raw
/// mode off when dropped.
pub struct RawModeGuard(());

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            DisableBracketedPaste,
            ResetColor,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            cursor::Show
        );
        let _ = terminal::disable_raw_mode();
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Number of terminal cells `s` occupies once ANSI sequences are removed.
pub fn visible_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/// Pad `s` with spaces to exactly `width` visible chars, or cut it.  ANSI
/// sequences do not count towards the width; a cut line is ended with a
/// style reset.
fn pad_or_truncate(s: &str, width: usize) -> String {
    let count = visible_width(s);
    if count <= width {
        let mut out = s.to_owned();
        out.extend(std::iter::repeat(' ').take(width - count));
        return out;
    }

    let mut out = String::with_capacity(s.len());
    let mut shown = 0;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            out.push(ch);
            for c in chars.by_ref() {
                out.push(c);
                if ('@'..='~').contains(&c) && c != '[' {
                    break;
                }
            }
        } else if shown < width {
            out.push(ch);
            shown += 1;
        }
    }
    if out.contains('\x1b') {
        out.push_str("\x1b[0m");
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
