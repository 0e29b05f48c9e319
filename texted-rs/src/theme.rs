//! Themes: map token kinds to [`StyleEntry`] values.
//!
//! A [`Theme`] holds explicit entries for some kinds plus a *canvas* entry
//! (the theme's default foreground and background).  [`Theme::get`] resolves
//! a kind by walking up [`TokenKind::parent`] until an entry is found, then
//! fills anything still unset from the canvas.  A kind with no entry anywhere
//! on its chain resolves to the canvas alone, which for a theme with a bare
//! canvas is [`StyleEntry::ZERO`].
//!
//! The editor draws on its own background, so before rendering the canvas
//! background is dropped with [`Theme::without_background`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::attr::{Attr, Rgb, StyleEntry};
use crate::lexer::TokenKind;

/// A named style table.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    name: String,
    canvas: StyleEntry,
    entries: HashMap<TokenKind, StyleEntry>,
}

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            canvas: StyleEntry::ZERO,
            entries: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the entry for `kind`.
    pub fn with(mut self, kind: TokenKind, entry: StyleEntry) -> Self {
        self.entries.insert(kind, entry);
        self
    }

    /// Set the canvas (default foreground/background) entry.
    pub fn with_canvas(mut self, canvas: StyleEntry) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn canvas(&self) -> StyleEntry {
        self.canvas
    }

    /// Resolve the style for `kind`.
    pub fn get(&self, kind: TokenKind) -> StyleEntry {
        let mut style = StyleEntry::ZERO;
        let mut next = Some(kind);
        while let Some(k) = next {
            if let Some(entry) = self.entries.get(&k) {
                style = style.inherit(*entry);
            }
            next = k.parent();
        }
        style.inherit(self.canvas)
    }

    /// This theme with the canvas background cleared.  Borrows when there is
    /// nothing to clear.
    pub fn without_background(&self) -> Cow<'_, Theme> {
        if self.canvas.bg.is_none() {
            return Cow::Borrowed(self);
        }
        let mut owned = self.clone();
        owned.canvas = owned.canvas.without_bg();
        Cow::Owned(owned)
    }
}

// ── Built-in themes ───────────────────────────────────────────────────────────

/// Name of the theme used when a requested name is unknown.
pub const FALLBACK: &str = "monokai";

fn fg(hex: u32) -> StyleEntry {
    StyleEntry::fg(Rgb::hex(hex))
}

fn monokai() -> Theme {
    use TokenKind::*;
    Theme::new("monokai")
        .with_canvas(fg(0xf8f8f2).with_bg(Rgb::hex(0x272822)))
        .with(Error, fg(0x960050).with_bg(Rgb::hex(0x1e0010)))
        .with(Comment, fg(0x75715e))
        .with(Keyword, fg(0x66d9ef))
        .with(NameTag, fg(0xf92672))
        .with(NameBuiltin, fg(0xa6e22e))
        .with(Literal, fg(0xae81ff))
        .with(LiteralString, fg(0xe6db74))
        .with(Operator, fg(0xf92672))
}

fn github() -> Theme {
    use TokenKind::*;
    Theme::new("github")
        .with_canvas(StyleEntry::ZERO.with_bg(Rgb::hex(0xffffff)))
        .with(Error, fg(0xa61717).with_bg(Rgb::hex(0xe3d2d2)))
        .with(Comment, fg(0x999988).with_attr(Attr::ITALIC))
        .with(Keyword, fg(0x000000).with_attr(Attr::BOLD))
        .with(KeywordType, fg(0x445588).with_attr(Attr::BOLD))
        .with(NameBuiltin, fg(0x0086b3))
        .with(NameTag, fg(0x000080))
        .with(NameVariable, fg(0x008080))
        .with(LiteralNumber, fg(0x009999))
        .with(LiteralString, fg(0xdd1144))
        .with(Operator, StyleEntry::ZERO.with_attr(Attr::BOLD))
}

fn bw() -> Theme {
    use TokenKind::*;
    let bold = StyleEntry::ZERO.with_attr(Attr::BOLD);
    Theme::new("bw")
        .with(Comment, StyleEntry::ZERO.with_attr(Attr::ITALIC))
        .with(Keyword, bold)
        .with(NameTag, bold)
        .with(LiteralString, StyleEntry::ZERO.with_attr(Attr::ITALIC))
        .with(Error, StyleEntry::ZERO.with_attr(Attr::UNDERLINE))
}

static THEMES: LazyLock<Vec<Theme>> = LazyLock::new(|| vec![monokai(), github(), bw()]);

/// Names of the built-in themes.
pub fn names() -> Vec<&'static str> {
    THEMES.iter().map(Theme::name).collect()
}

/// Look up a built-in theme by name, case-insensitive.
pub fn get(name: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Look up a theme, falling back to [`FALLBACK`].
pub fn resolve(name: &str) -> &'static Theme {
    if let Some(theme) = get(name) {
        return theme;
    }
    tracing::debug!(requested = name, fallback = FALLBACK, "unknown theme");
    // THEMES is never empty; index 0 is the fallback.
    get(FALLBACK).unwrap_or(&THEMES[0])
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::color;

    #[test]
    fn exact_entry_wins() {
        let t = Theme::new("t").with(TokenKind::Keyword, StyleEntry::fg(color::RED));
        assert_eq!(t.get(TokenKind::Keyword).fg, Some(color::RED));
    }

    #[test]
    fn sub_kind_inherits_from_parent() {
        let t = Theme::new("t")
            .with(TokenKind::Keyword, StyleEntry::fg(color::RED).with_attr(Attr::BOLD))
            .with(TokenKind::KeywordType, StyleEntry::fg(color::GREEN));
        let s = t.get(TokenKind::KeywordType);
        assert_eq!(s.fg, Some(color::GREEN));
        assert!(s.attr.contains(Attr::BOLD));
        assert_eq!(t.get(TokenKind::KeywordConstant).fg, Some(color::RED));
    }

    #[test]
    fn unmapped_kind_is_zero_on_bare_canvas() {
        let t = Theme::new("t").with(TokenKind::Keyword, StyleEntry::fg(color::RED));
        assert!(t.get(TokenKind::Punctuation).is_zero());
    }

    #[test]
    fn canvas_fills_unset_fields() {
        let t = Theme::new("t")
            .with_canvas(StyleEntry::fg(color::WHITE).with_bg(color::BLACK))
            .with(TokenKind::Keyword, StyleEntry::ZERO.with_attr(Attr::BOLD));
        let s = t.get(TokenKind::Keyword);
        assert_eq!(s.fg, Some(color::WHITE));
        assert_eq!(s.bg, Some(color::BLACK));
    }

    #[test]
    fn without_background_drops_canvas_bg_only() {
        let t = Theme::new("t")
            .with_canvas(StyleEntry::fg(color::WHITE).with_bg(color::BLACK))
            .with(TokenKind::Error, StyleEntry::ZERO.with_bg(color::RED));
        let cleared = t.without_background();
        assert!(matches!(cleared, Cow::Owned(_)));
        assert_eq!(cleared.get(TokenKind::Name).bg, None);
        assert_eq!(cleared.get(TokenKind::Name).fg, Some(color::WHITE));
        assert_eq!(cleared.get(TokenKind::Error).bg, Some(color::RED));
    }

    #[test]
    fn without_background_borrows_when_clear() {
        let t = Theme::new("t");
        assert!(matches!(t.without_background(), Cow::Borrowed(_)));
    }

    // ── Registry ──────────────────────────────────────────────────────────────

    #[test]
    fn builtins_are_registered() {
        assert_eq!(names(), ["monokai", "github", "bw"]);
        assert!(get("GitHub").is_some());
    }

    #[test]
    fn unknown_theme_falls_back() {
        assert_eq!(resolve("solarized-neon").name(), FALLBACK);
    }

    #[test]
    fn bw_has_no_colours() {
        let t = resolve("bw");
        for &kind in TokenKind::ALL {
            let s = t.get(kind);
            assert_eq!((s.fg, s.bg), (None, None), "{kind}");
        }
    }
}
