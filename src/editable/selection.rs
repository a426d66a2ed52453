//! Selection and marked-text state, and how a selection follows an edit.

use super::position::TextRange;

/// Current selection plus the IME composition span, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected: TextRange,
    pub marked: Option<TextRange>,
}

impl SelectionState {
    pub fn new(selected: TextRange) -> Self {
        Self {
            selected,
            marked: None,
        }
    }

    /// True while an input method is composing
    pub fn is_composing(&self) -> bool {
        self.marked.is_some()
    }

    /// Clamp both ranges against a buffer of `len` chars
    pub fn correct(&mut self, len: usize) {
        self.selected = self.selected.corrected(len);
        self.marked = self.marked.map(|m| m.corrected(len));
    }
}

/// Where `selection` ends up after `edit` (old coordinates) is replaced by
/// `inserted` chars. The result is corrected against `new_len`.
pub fn adjust_selection(
    edit: &TextRange,
    inserted: usize,
    selection: &TextRange,
    new_len: usize,
) -> TextRange {
    let r = edit.as_range();
    let s = selection.as_range();
    let removed = r.len();
    let overlap = selection.intersection_len(edit);

    let adjusted = if r == s {
        TextRange::with_range(r.start + inserted, 0)
    } else if overlap == 0 {
        // Disjoint, or only touching: only an edit before the selection
        // moves it
        if r.end <= s.start {
            TextRange::with_range(s.start + inserted - removed, s.len())
        } else {
            *selection
        }
    } else if r.start <= s.start && r.end >= s.end {
        TextRange::with_range(r.start + inserted, 0)
    } else if s.start <= r.start && s.end >= r.end {
        TextRange::with_range(s.start, s.len() - removed + inserted)
    } else if r.start < s.start {
        TextRange::with_range(r.start + inserted, s.len() - overlap)
    } else {
        TextRange::with_range(s.start, s.len() - overlap)
    };
    adjusted.corrected(new_len)
}
