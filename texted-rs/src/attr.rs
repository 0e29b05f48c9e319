//! Text display attributes.
//!
//! An [`Attr`] packs the boolean style flags (bold, italic, …) into a single
//! `u8`; a [`StyleEntry`] pairs those flags with optional 24-bit foreground
//! and background colours.  Themes map token kinds to `StyleEntry` values and
//! the render pipeline turns them into terminal attribute codes.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crossterm::style::{Attribute, Attributes, Color, ContentStyle};

/// Boolean style flags for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attr(u8);

impl Attr {
    pub const BOLD: Self      = Self(0x01);
    pub const ITALIC: Self    = Self(0x02);
    pub const UNDERLINE: Self = Self(0x04);
    /// Swap foreground and background.  Not produced by any theme; used for
    /// monochrome caret styles.
    pub const REVERSE: Self   = Self(0x08);

    /// No flags set.
    pub const EMPTY: Self = Self(0);

    /// Returns `true` if no flag bits are set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Return a copy of `self` with the bits of `other` cleared.
    #[inline]
    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for Attr {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
}

impl BitOrAssign for Attr {
    fn bitor_assign(&mut self, rhs: Self) { self.0 |= rhs.0; }
}

// ── Rgb ───────────────────────────────────────────────────────────────────────

/// A 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    pub const fn hex(v: u32) -> Self {
        Self::new((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb { r: c.r, g: c.g, b: c.b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error returned when a `#rrggbb` colour string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour {0:?} (expected #rrggbb)")]
pub struct ParseRgbError(pub String);

impl FromStr for Rgb {
    type Err = ParseRgbError;

    /// Accepts `#rrggbb` or `rrggbb`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseRgbError(s.to_owned()));
        }
        u32::from_str_radix(digits, 16)
            .map(Rgb::hex)
            .map_err(|_| ParseRgbError(s.to_owned()))
    }
}

// ── StyleEntry ────────────────────────────────────────────────────────────────

/// The visual attributes a theme assigns to one token kind.
///
/// The zero value (no flags, no colours) is the no-op style: rendering it
/// emits no attribute codes and no reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StyleEntry {
    pub attr: Attr,
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
}

impl StyleEntry {
    /// The no-op style.
    pub const ZERO: Self = Self { attr: Attr::EMPTY, fg: None, bg: None };

    pub const fn fg(color: Rgb) -> Self {
        Self { attr: Attr::EMPTY, fg: Some(color), bg: None }
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attr |= attr;
        self
    }

    pub fn with_bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn without_bg(mut self) -> Self {
        self.bg = None;
        self
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.attr.is_empty() && self.fg.is_none() && self.bg.is_none()
    }

    /// Fill in anything `self` leaves unset from `parent`.
    pub fn inherit(self, parent: StyleEntry) -> StyleEntry {
        StyleEntry {
            attr: self.attr | parent.attr,
            fg: self.fg.or(parent.fg),
            bg: self.bg.or(parent.bg),
        }
    }

    /// Map to a crossterm [`ContentStyle`].
    pub fn content_style(&self) -> ContentStyle {
        let mut style = ContentStyle::new();
        let mut attributes = Attributes::default();

        if self.attr.contains(Attr::BOLD) {
            attributes.set(Attribute::Bold);
        }
        if self.attr.contains(Attr::UNDERLINE) {
            attributes.set(Attribute::Underlined);
        }
        if self.attr.contains(Attr::ITALIC) {
            attributes.set(Attribute::Italic);
        }
        if self.attr.contains(Attr::REVERSE) {
            attributes.set(Attribute::Reverse);
        }

        style.attributes = attributes;
        style.foreground_color = self.fg.map(Color::from);
        style.background_color = self.bg.map(Color::from);
        style
    }
}

// ── Named colours ─────────────────────────────────────────────────────────────

/// Colours shared by the built-in themes and default styles.
pub mod color {
    use super::Rgb;

    pub const BLACK: Rgb  = Rgb::hex(0x000000);
    pub const WHITE: Rgb  = Rgb::hex(0xffffff);
    pub const RED: Rgb    = Rgb::hex(0xcd0000);
    pub const GREEN: Rgb  = Rgb::hex(0x33aa66);
    pub const LIGHT_GRAY: Rgb = Rgb::hex(0xeeeeee);
    pub const DARK_GRAY: Rgb  = Rgb::hex(0x333333);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_independent() {
        let a = Attr::BOLD | Attr::UNDERLINE;
        assert!(a.contains(Attr::BOLD));
        assert!(a.contains(Attr::UNDERLINE));
        assert!(!a.contains(Attr::ITALIC));
        assert_eq!(a.without(Attr::BOLD), Attr::UNDERLINE);
    }

    #[test]
    fn default_is_zero() {
        assert!(StyleEntry::default().is_zero());
        assert_eq!(StyleEntry::default(), StyleEntry::ZERO);
    }

    #[test]
    fn background_alone_is_not_zero() {
        let s = StyleEntry::ZERO.with_bg(color::BLACK);
        assert!(!s.is_zero());
        assert!(s.without_bg().is_zero());
    }

    #[test]
    fn inherit_fills_unset_fields() {
        let parent = StyleEntry::fg(color::RED).with_attr(Attr::BOLD);
        let child = StyleEntry::ZERO.with_attr(Attr::ITALIC);
        let s = child.inherit(parent);
        assert_eq!(s.fg, Some(color::RED));
        assert!(s.attr.contains(Attr::BOLD | Attr::ITALIC));
    }

    #[test]
    fn child_colour_wins() {
        let s = StyleEntry::fg(color::GREEN).inherit(StyleEntry::fg(color::RED));
        assert_eq!(s.fg, Some(color::GREEN));
    }

    // ── Rgb ───────────────────────────────────────────────────────────────────

    #[test]
    fn parse_hex_colour() {
        assert_eq!("#33aa66".parse::<Rgb>(), Ok(Rgb::new(0x33, 0xaa, 0x66)));
        assert_eq!("FFFFFF".parse::<Rgb>(), Ok(color::WHITE));
    }

    #[test]
    fn reject_bad_colour() {
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#zzzzzz".parse::<Rgb>().is_err());
        assert!("".parse::<Rgb>().is_err());
    }

    #[test]
    fn display_is_lowercase_hex() {
        assert_eq!(Rgb::hex(0x33AA66).to_string(), "#33aa66");
    }

    // ── content_style ─────────────────────────────────────────────────────────

    #[test]
    fn bold_maps_to_bold_attribute() {
        let s = StyleEntry::ZERO.with_attr(Attr::BOLD).content_style();
        assert!(s.attributes.has(Attribute::Bold));
        assert!(!s.attributes.has(Attribute::Italic));
    }

    #[test]
    fn colours_map_to_rgb() {
        let s = StyleEntry::fg(color::RED).with_bg(color::WHITE).content_style();
        assert_eq!(s.foreground_color, Some(Color::Rgb { r: 0xcd, g: 0, b: 0 }));
        assert_eq!(s.background_color, Some(Color::Rgb { r: 0xff, g: 0xff, b: 0xff }));
    }

    #[test]
    fn zero_style_has_nothing_set() {
        let s = StyleEntry::ZERO.content_style();
        assert_eq!(s.foreground_color, None);
        assert_eq!(s.background_color, None);
        assert!(!s.attributes.has(Attribute::Bold));
    }
}
