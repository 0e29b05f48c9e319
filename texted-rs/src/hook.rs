//! Completion hooks.
//!
//! After every edit the editor tokenizes the caret's line and hands the token
//! just left of the caret to its [`CompletionHook`].  Whatever list comes back
//! replaces the overlay's items; an empty list hides the overlay.
//!
//! Any `FnMut(&Token) -> Vec<IntellisenseItem>` is a hook.  [`KeywordHook`]
//! covers the common case of "after keyword X, offer list Y".

use std::collections::HashMap;

use crate::lexer::{Token, TokenKind};
use crate::selector::IntellisenseItem;

// ── Trait ─────────────────────────────────────────────────────────────────────

pub trait CompletionHook {
    /// Candidates for `token`, possibly none.
    fn complete(&mut self, token: &Token) -> Vec<IntellisenseItem>;
}

impl<F> CompletionHook for F
where
    F: FnMut(&Token) -> Vec<IntellisenseItem>,
{
    fn complete(&mut self, token: &Token) -> Vec<IntellisenseItem> {
        self(token)
    }
}

// ── KeywordHook ───────────────────────────────────────────────────────────────

/// Offers a fixed candidate list after particular keywords.
///
/// Matching is case-insensitive on the token text and applies to any token
/// whose kind is [`TokenKind::Keyword`] or one of its sub-kinds.
#[derive(Debug, Clone, Default)]
pub struct KeywordHook {
    triggers: HashMap<String, Vec<IntellisenseItem>>,
}

impl KeywordHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer `items` after `keyword`.  Replaces any earlier list for it.
    pub fn on(mut self, keyword: &str, items: Vec<IntellisenseItem>) -> Self {
        self.triggers.insert(keyword.to_lowercase(), items);
        self
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

impl CompletionHook for KeywordHook {
    fn complete(&mut self, token: &Token) -> Vec<IntellisenseItem> {
        if !is_keyword(token.kind) {
            return Vec::new();
        }
        self.triggers
            .get(&token.text.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}

fn is_keyword(kind: TokenKind) -> bool {
    let mut next = Some(kind);
    while let Some(k) = next {
        if k == TokenKind::Keyword {
            return true;
        }
        next = k.parent();
    }
    false
}

// ── Tests ─────────────────────────────────────────────────────────────────────
