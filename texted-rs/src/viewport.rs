//! Bounded scroll window over a list of rendered lines.
//!
//! A [`Viewport`] stores the latest full render and shows the slice
//! `[offset, offset + height)` of it.  The offset always stays within
//! `0 ..= max(0, len - height)`; every operation that can change either side
//! of that bound re-clamps.
//!
//! The viewport does not know where the caret is.  Callers that want the
//! caret kept on screen call [`Viewport::ensure_visible`] before
//! [`Viewport::view`].

/// A `width × height` window onto a vertically larger list of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport<T = String> {
    width: usize,
    height: usize,
    offset: usize,
    content: Vec<T>,
}

impl<T> Viewport<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            content: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Index of the first visible line.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total number of stored lines.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Largest legal offset for the current content and height.
    pub fn max_offset(&self) -> usize {
        self.content.len().saturating_sub(self.height)
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.clamp();
    }

    /// Replace the stored lines.
    pub fn set_content(&mut self, content: Vec<T>) {
        self.content = content;
        self.clamp();
    }

    /// The visible lines, fewer than `height` when content runs out.
    pub fn view(&self) -> &[T] {
        let start = self.offset.min(self.content.len());
        let end = (start + self.height).min(self.content.len());
        &self.content[start..end]
    }

    // ── Scrolling ─────────────────────────────────────────────────────────────

    /// Set the offset, clamped.
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
        self.clamp();
    }

    /// Scroll towards the top by `n` lines.  Returns how far it moved.
    pub fn scroll_up(&mut self, n: usize) -> usize {
        let before = self.offset;
        self.offset = self.offset.saturating_sub(n);
        before - self.offset
    }

    /// Scroll towards the bottom by `n` lines.  Returns how far it moved.
    pub fn scroll_down(&mut self, n: usize) -> usize {
        let before = self.offset;
        self.set_offset(self.offset.saturating_add(n));
        self.offset - before
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Scroll the minimum amount that brings line `row` into the window.
    pub fn ensure_visible(&mut self, row: usize) {
        if row < self.offset {
            self.offset = row;
        } else if self.height > 0 && row >= self.offset + self.height {
            self.offset = row + 1 - self.height;
        }
        self.clamp();
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}

impl<T> Default for Viewport<T> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
