//! texted: a line-oriented terminal text editor widget with syntax
//! highlighting, a caret overlay and a completion popup.
//!
//! The pieces, leaves first:
//!
//! * [`buffer`] and [`cursor`]: the text and the caret, with clamping edits.
//! * [`lexer`] and [`theme`]: tokens for a line and styles for token kinds.
//! * [`render`]: one line of tokens to a styled segment stream with the
//!   caret drawn in.
//! * [`viewport`]: the visible window over rendered lines.
//! * [`selector`] and [`hook`]: the completion overlay and what fills it.
//! * [`editor`]: all of the above behind one `update` / `view` surface.
//!
//! [`keybind`], [`config`], [`terminal`] and [`cli`] serve the demo binary.

pub mod attr;
pub mod buffer;
pub mod cli;
pub mod config;
pub mod cursor;
pub mod editor;
pub mod hook;
pub mod keybind;
pub mod lexer;
pub mod render;
pub mod selector;
pub mod terminal;
pub mod theme;
pub mod viewport;

pub use buffer::{Buffer, MAX_LINES};
pub use cursor::Position;
pub use editor::Editor;
pub use keybind::EditAction;
pub use selector::IntellisenseItem;
