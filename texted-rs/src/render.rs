//! Render pipeline: one line of tokens in, one styled segment stream out.
//!
//! ## Caret overlay
//!
//! The caret is drawn as a single cell in a reserved style on top of the
//! token styles.  When the caret column falls inside a token the token is
//! split there:
//!
//! ```text
//!   Style(kw) "f" Caret('r') Style(kw) "om" Reset     ← token "from", caret at 1
//! ```
//!
//! The caret cell ends with a full attribute reset, so the token's style is
//! opened again before the rest of the token, if any is left.  A caret after the last
//! character is drawn as a blank cell at the end of the line.
//!
//! Columns are counted in chars throughout; tokens are split on char
//! boundaries, never inside a multi-byte character.
//!
//! Rendering is a pure function of its inputs.  Token streams that do not
//! reproduce the line are rejected with [`RenderError::SpanMismatch`] before
//! anything is emitted.

use std::fmt;

use crossterm::style::{Attribute, Print, SetAttribute, SetStyle};
use crossterm::Command;

use crate::attr::{color, Attr, StyleEntry};
use crate::lexer::{coalesce, LexError, Lexer, Token};
use crate::theme::Theme;

/// Bold on red, the caret style used unless configuration overrides it.
pub const DEFAULT_CARET_STYLE: StyleEntry = StyleEntry {
    attr: Attr::BOLD,
    fg: None,
    bg: Some(color::RED),
};

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("tokenizer failed: {0}")]
    Lex(#[from] LexError),
    /// The tokens do not concatenate to the line being rendered.
    #[error("token spans do not match line: expected {expected:?}, got {got:?}")]
    SpanMismatch { expected: String, got: String },
    #[error("encoding failed")]
    Encode(#[from] fmt::Error),
}

// ── Segments ──────────────────────────────────────────────────────────────────

/// One element of a rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Open a token style.
    Style(StyleEntry),
    /// Literal text under the currently open style.
    Text(String),
    /// The caret cell: one char in the caret style, followed by a reset.
    Caret(char, StyleEntry),
    /// Close the open style.
    Reset,
}

/// A line as an ordered stream of [`Segment`]s.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedLine {
    segments: Vec<Segment>,
}

impl RenderedLine {
    /// `line` with no token styling, only the caret overlay.
    pub fn plain(line: &str, caret: Option<usize>, caret_style: StyleEntry) -> Self {
        let mut out = RenderedLine::default();
        let len = line.chars().count();
        match caret {
            Some(col) if col < len => {
                let (head, ch, tail) = split_at_char(line, col);
                out.push_text(head);
                out.segments.push(Segment::Caret(ch, caret_style));
                out.push_text(tail);
            }
            Some(_) => {
                out.push_text(line);
                out.segments.push(Segment::Caret(' ', caret_style));
            }
            None => out.push_text(line),
        }
        out
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of caret cells (0 or 1).
    pub fn caret_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Caret(..)))
            .count()
    }

    /// The visible characters, caret cell included.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Text(t) => out.push_str(t),
                Segment::Caret(ch, _) => out.push(*ch),
                Segment::Style(_) | Segment::Reset => {}
            }
        }
        out
    }

    /// Encode as a string with ANSI attribute sequences.
    pub fn to_ansi(&self) -> Result<String, RenderError> {
        let mut out = String::new();
        self.write_ansi(&mut out)?;
        Ok(out)
    }

    /// Append the ANSI encoding to `out`.
    pub fn write_ansi(&self, out: &mut impl fmt::Write) -> Result<(), RenderError> {
        for seg in &self.segments {
            match seg {
                Segment::Style(style) => SetStyle(style.content_style()).write_ansi(out)?,
                Segment::Text(text) => Print(text).write_ansi(out)?,
                Segment::Caret(ch, style) => {
                    SetStyle(style.content_style()).write_ansi(out)?;
                    Print(ch).write_ansi(out)?;
                    SetAttribute(Attribute::Reset).write_ansi(out)?;
                }
                Segment::Reset => SetAttribute(Attribute::Reset).write_ansi(out)?,
            }
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.segments.push(Segment::Text(text.to_owned()));
        }
    }
}

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Renders token streams against a theme with a caret style.
#[derive(Debug, Clone)]
pub struct Renderer<'t> {
    theme: std::borrow::Cow<'t, Theme>,
    caret_style: StyleEntry,
}

impl<'t> Renderer<'t> {
    /// The theme's canvas background is cleared here, once, so no token
    /// inherits it.
    pub fn new(theme: &'t Theme, caret_style: StyleEntry) -> Self {
        Self {
            theme: theme.without_background(),
            caret_style,
        }
    }

    pub fn caret_style(&self) -> StyleEntry {
        self.caret_style
    }

    /// Tokenize `line` with `lexer`, then render it.
    pub fn highlight(
        &self,
        line: &str,
        lexer: &dyn Lexer,
        caret: Option<usize>,
    ) -> Result<RenderedLine, RenderError> {
        let tokens = coalesce(lexer.tokenise(line)?);
        self.render_tokens(line, &tokens, caret)
    }

    /// Render `tokens`, which must concatenate to `line`, placing the caret
    /// at char column `caret` if given.
    pub fn render_tokens(
        &self,
        line: &str,
        tokens: &[Token],
        caret: Option<usize>,
    ) -> Result<RenderedLine, RenderError> {
        check_spans(line, tokens)?;

        let mut out = RenderedLine::default();
        let mut column = 0;
        let mut caret_pending = caret;

        for token in tokens {
            let style = self.theme.get(token.kind);
            let styled = !style.is_zero();
            let len = token.char_len();

            if styled {
                out.segments.push(Segment::Style(style));
            }

            match caret_pending {
                Some(c) if column <= c && c < column + len => {
                    let (head, ch, tail) = split_at_char(&token.text, c - column);
                    out.push_text(head);
                    out.segments.push(Segment::Caret(ch, self.caret_style));
                    if styled && !tail.is_empty() {
                        out.segments.push(Segment::Style(style));
                    }
                    out.push_text(tail);
                    caret_pending = None;
                }
                _ => out.push_text(&token.text),
            }

            if styled {
                out.segments.push(Segment::Reset);
            }
            column += len;
        }

        if caret_pending.is_some() {
            out.segments.push(Segment::Caret(' ', self.caret_style));
        }
        Ok(out)
    }
}

fn check_spans(line: &str, tokens: &[Token]) -> Result<(), RenderError> {
    let mut rest = line;
    for token in tokens {
        match rest.strip_prefix(token.text.as_str()) {
            Some(r) => rest = r,
            None => return Err(mismatch(line, tokens)),
        }
    }
    if rest.is_empty() {
        Ok(())
    } else {
        Err(mismatch(line, tokens))
    }
}

fn mismatch(line: &str, tokens: &[Token]) -> RenderError {
    RenderError::SpanMismatch {
        expected: line.to_owned(),
        got: tokens.iter().map(|t| t.text.as_str()).collect(),
    }
}

/// Split `s` around the char at `idx`, which must exist.
fn split_at_char(s: &str, idx: usize) -> (&str, char, &str) {
    let mut it = s.char_indices().skip(idx);
    match it.next() {
        Some((start, ch)) => (&s[..start], ch, &s[start + ch.len_utf8()..]),
        None => (s, ' ', ""),
    }
}

/// `s` with ANSI CSI sequences removed.
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            // CSI: ESC [ params final-byte
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) && c != '[' {
                    break;
                }
            }
        } else {
            out.push(ch);
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
