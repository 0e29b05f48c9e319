//! Completion overlay: a short list of candidates with a selection bar.
//!
//! The list is replaced wholesale by [`Selector::set_items`] every time the
//! completion hook runs.  Replacing the items does not touch the selected
//! index; callers that want the bar back at the top call
//! [`Selector::reset`] or [`Selector::select_first`].  The index is clamped
//! on read so a shorter replacement list can never index out of range.
//!
//! Rows are drawn into a private [`Viewport`] (20×8 unless configured
//! otherwise) that is scrolled to keep the selected row visible, then
//! left-padded by the overlay offset.

use crossterm::style::{Attribute, Print, SetAttribute, SetStyle};
use crossterm::Command;

use crate::attr::{color, Attr, StyleEntry};
use crate::render::RenderError;
use crate::viewport::Viewport;

pub const DEFAULT_WIDTH: usize = 20;
pub const DEFAULT_HEIGHT: usize = 8;

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntellisenseItem {
    pub value: String,
    /// Free-form category, e.g. `"table"`.
    pub kind: String,
}

impl IntellisenseItem {
    pub fn new(value: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: kind.into(),
        }
    }
}

// ── Styles ────────────────────────────────────────────────────────────────────

/// Row styles for the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorStyle {
    pub normal: StyleEntry,
    pub selected: StyleEntry,
    /// Blank cells on each side of an item's text.
    pub padding: usize,
}

impl Default for SelectorStyle {
    fn default() -> Self {
        Self {
            normal: StyleEntry::ZERO.with_bg(color::DARK_GRAY),
            selected: StyleEntry::fg(color::BLACK)
                .with_bg(color::GREEN)
                .with_attr(Attr::BOLD),
            padding: 1,
        }
    }
}

impl SelectorStyle {
    /// Variant for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            normal: StyleEntry::ZERO.with_bg(color::LIGHT_GRAY),
            ..Self::default()
        }
    }
}

// ── Selector ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Selector {
    items: Vec<IntellisenseItem>,
    selected: usize,
    focused: bool,
    offset: usize,
    style: SelectorStyle,
    viewport: Viewport,
}

impl Selector {
    /// A focused, empty selector.
    pub fn new(style: SelectorStyle) -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            focused: true,
            offset: 0,
            style,
            viewport: Viewport::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
        }
    }

    pub fn items(&self) -> &[IntellisenseItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the selected item, or `None` when there are no items.
    pub fn selected_index(&self) -> Option<usize> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.selected.min(self.items.len() - 1))
        }
    }

    pub fn selected_item(&self) -> Option<&IntellisenseItem> {
        self.selected_index().map(|i| &self.items[i])
    }

    /// Replace the candidate list.  The selected index is left alone.
    pub fn set_items(&mut self, items: Vec<IntellisenseItem>) {
        self.items = items;
        self.follow_selection();
    }

    /// Clear the list and move the selection to the top.
    pub fn reset(&mut self) {
        self.items.clear();
        self.selected = 0;
        self.viewport.scroll_to_top();
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.follow_selection();
    }

    // ── Focus ─────────────────────────────────────────────────────────────────

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    // ── Geometry ──────────────────────────────────────────────────────────────

    /// Left padding, in cells, applied to every rendered row.
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.viewport.set_size(width, height);
        self.follow_selection();
    }

    // ── Navigation ────────────────────────────────────────────────────────────

    /// Move the bar up one row.  Returns `false` if nothing moved.
    pub fn move_up(&mut self) -> bool {
        let Some(current) = self.navigable() else {
            return false;
        };
        if current == 0 {
            return false;
        }
        self.selected = current - 1;
        self.follow_selection();
        true
    }

    /// Move the bar down one row.  Returns `false` if nothing moved.
    pub fn move_down(&mut self) -> bool {
        let Some(current) = self.navigable() else {
            return false;
        };
        if current + 1 >= self.items.len() {
            return false;
        }
        self.selected = current + 1;
        self.follow_selection();
        true
    }

    fn navigable(&self) -> Option<usize> {
        if !self.focused {
            return None;
        }
        self.selected_index()
    }

    fn follow_selection(&mut self) {
        let rows = self.items.len();
        self.viewport.set_content(vec![String::new(); rows]);
        if let Some(i) = self.selected_index() {
            self.viewport.ensure_visible(i);
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Rendered rows, each with ANSI styling and left padding.  Empty when
    /// there are no items.
    pub fn view(&mut self) -> Result<Vec<String>, RenderError> {
        if self.items.is_empty() {
            return Ok(Vec::new());
        }
        let selected = self.selected_index();
        let rows = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| self.render_row(item, Some(i) == selected))
            .collect::<Result<Vec<_>, _>>()?;
        self.viewport.set_content(rows);
        if let Some(i) = selected {
            self.viewport.ensure_visible(i);
        }
        Ok(self.viewport.view().to_vec())
    }

    fn render_row(&self, item: &IntellisenseItem, selected: bool) -> Result<String, RenderError> {
        let style = if selected { self.style.selected } else { self.style.normal };
        let pad = " ".repeat(self.style.padding);
        let room = self.viewport.width().saturating_sub(2 * self.style.padding);
        let text: String = item.value.chars().take(room).collect();

        let mut out = " ".repeat(self.offset);
        SetStyle(style.content_style()).write_ansi(&mut out)?;
        Print(format!("{pad}{text}{pad}")).write_ansi(&mut out)?;
        SetAttribute(Attribute::Reset).write_ansi(&mut out)?;
        Ok(out)
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(SelectorStyle::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
