//! Text parser hook.
//!
//! A parser runs after every content change. It may rewrite the text and
//! move the selection; the view corrects whatever range comes back.

use std::ops::Range;

use crate::editable::{adjust_selection, AttributedBuffer, TextRange};

pub trait TextParser {
    /// Returns true when the text was changed
    fn parse_text(&self, text: &mut AttributedBuffer, selected_range: &mut Range<usize>) -> bool;
}

/// Replaces literal patterns, e.g. `:)` with an emoji.
#[derive(Debug, Clone, Default)]
pub struct ReplacementParser {
    rules: Vec<(String, String)>,
}

impl ReplacementParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if !pattern.is_empty() {
            self.rules.push((pattern, replacement.into()));
        }
        self
    }
}

impl TextParser for ReplacementParser {
    fn parse_text(&self, text: &mut AttributedBuffer, selected_range: &mut Range<usize>) -> bool {
        let mut changed = false;
        for (pattern, replacement) in &self.rules {
            let plain = text.text();
            let hits: Vec<usize> = plain.match_indices(pattern.as_str()).map(|(b, _)| b).collect();
            if hits.is_empty() {
                continue;
            }
            let pattern_len = pattern.chars().count();
            let inserted = replacement.chars().count();
            // Back to front so earlier offsets stay valid
            for byte in hits.into_iter().rev() {
                let start = plain[..byte].chars().count();
                let edit = TextRange::with_range(start, pattern_len);
                let new_len = text.len() - pattern_len + inserted;
                let sel = TextRange::from_range(selected_range.clone());
                let sel = if sel.same_span(&edit) {
                    TextRange::with_range(start + inserted, 0)
                } else {
                    adjust_selection(&edit, inserted, &sel, new_len)
                };
                text.replace(edit.as_range(), replacement);
                *selected_range = sel.as_range();
                changed = true;
            }
        }
        changed
    }
}
