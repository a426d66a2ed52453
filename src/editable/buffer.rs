//! Attributed text storage.
//!
//! Characters live in a [`ropey::Rope`]; styling lives in a parallel list of
//! runs. The runs always cover the rope exactly, never contain a zero-length
//! entry, and adjacent runs never carry equal attribute sets.

use std::ops::Range;

use ropey::Rope;

use super::attributes::{
    AttributeKey, AttributeValue, Attributes, TextAlignment, WritingDirection,
};

/// Character appended to layout copies so a trailing line break still has a
/// line for the caret to sit on.
pub const LAYOUT_SENTINEL: &str = "\r";

#[derive(Debug, Clone, PartialEq)]
struct Run {
    len: usize,
    attrs: Attributes,
}

/// Mutable styled text. Offsets and lengths are in chars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributedBuffer {
    rope: Rope,
    runs: Vec<Run>,
}

impl AttributedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain text without attributes
    pub fn from_text(text: &str) -> Self {
        Self::with_attributes(text, Attributes::new())
    }

    /// Text with one attribute set over its whole length
    pub fn with_attributes(text: &str, attrs: Attributes) -> Self {
        let rope = Rope::from_str(text);
        let len = rope.len_chars();
        let runs = if len == 0 {
            Vec::new()
        } else {
            vec![Run { len, attrs }]
        };
        Self { rope, runs }
    }

    // ========================================================================
    // Text access
    // ========================================================================

    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text inside `range`, clamped to the buffer
    pub fn plain_text(&self, range: Range<usize>) -> String {
        let range = self.clamp_range(range);
        self.rope.slice(range).to_string()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset < self.len() {
            Some(self.rope.char(offset))
        } else {
            None
        }
    }

    /// Attributed copy of `range`
    pub fn substring(&self, range: Range<usize>) -> AttributedBuffer {
        let range = self.clamp_range(range);
        let mut out = AttributedBuffer {
            rope: Rope::from(self.rope.slice(range.clone())),
            runs: Vec::new(),
        };
        for (span, attrs) in self.runs() {
            let start = span.start.max(range.start);
            let end = span.end.min(range.end);
            if start < end {
                out.runs.push(Run {
                    len: end - start,
                    attrs: attrs.clone(),
                });
            }
        }
        out.normalize();
        out
    }

    /// Runs as `(range, attributes)` in buffer order
    pub fn runs(&self) -> impl Iterator<Item = (Range<usize>, &Attributes)> {
        let mut pos = 0;
        self.runs.iter().map(move |run| {
            let start = pos;
            pos += run.len;
            (start..pos, &run.attrs)
        })
    }

    // ========================================================================
    // Attribute queries
    // ========================================================================

    /// Attribute set of the character at `offset` (empty past the end)
    pub fn attributes_at(&self, offset: usize) -> Attributes {
        self.run_at(offset)
            .map(|(idx, _)| self.runs[idx].attrs.clone())
            .unwrap_or_default()
    }

    pub fn attribute_at(&self, key: &AttributeKey, offset: usize) -> Option<&AttributeValue> {
        let (idx, _) = self.run_at(offset)?;
        self.runs[idx].attrs.get(key)
    }

    /// Widest span around `offset` over which `key` keeps the value it has
    /// at `offset`. `None` when the key is absent there.
    pub fn longest_effective_range(
        &self,
        key: &AttributeKey,
        offset: usize,
    ) -> Option<Range<usize>> {
        let (idx, run_start) = self.run_at(offset)?;
        let value = self.runs[idx].attrs.get(key)?;

        let mut start = run_start;
        let mut i = idx;
        while i > 0 && self.runs[i - 1].attrs.get(key) == Some(value) {
            i -= 1;
            start -= self.runs[i].len;
        }

        let mut end = run_start + self.runs[idx].len;
        let mut j = idx + 1;
        while j < self.runs.len() && self.runs[j].attrs.get(key) == Some(value) {
            end += self.runs[j].len;
            j += 1;
        }
        Some(start..end)
    }

    /// Spans inside `range` that carry `key`, merged where the value repeats
    pub fn attribute_spans(
        &self,
        key: &AttributeKey,
        range: Range<usize>,
    ) -> Vec<(Range<usize>, AttributeValue)> {
        let range = self.clamp_range(range);
        let mut spans: Vec<(Range<usize>, AttributeValue)> = Vec::new();
        for (span, attrs) in self.runs() {
            let start = span.start.max(range.start);
            let end = span.end.min(range.end);
            if start >= end {
                continue;
            }
            let Some(value) = attrs.get(key) else {
                continue;
            };
            match spans.last_mut() {
                Some((last, v)) if last.end == start && v == value => last.end = end,
                _ => spans.push((start..end, value.clone())),
            }
        }
        spans
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Replace `range` with plain `text`.
    ///
    /// The new characters take the attributes of the first replaced character,
    /// or of the neighbour when nothing is replaced. Discontinuous attributes
    /// are then removed from the new span.
    pub fn replace(&mut self, range: Range<usize>, text: &str) {
        let range = self.clamp_range(range);
        let attrs = self.inherited_attributes(&range).without_discontinuous();
        let inserted = text.chars().count();

        self.rope.remove(range.clone());
        self.rope.insert(range.start, text);

        let i = self.split_at(range.start);
        let j = self.split_at(range.end);
        self.runs.drain(i..j);
        if inserted > 0 {
            self.runs.insert(
                i,
                Run {
                    len: inserted,
                    attrs,
                },
            );
        }
        self.normalize();
    }

    /// Replace `range` with styled text, keeping the inserted attributes as-is
    pub fn replace_attributed(&mut self, range: Range<usize>, text: &AttributedBuffer) {
        let range = self.clamp_range(range);
        self.rope.remove(range.clone());
        self.rope.insert(range.start, &text.text());

        let i = self.split_at(range.start);
        let j = self.split_at(range.end);
        self.runs.splice(i..j, text.runs.iter().cloned());
        self.normalize();
    }

    pub fn set_attribute(&mut self, key: AttributeKey, value: AttributeValue, range: Range<usize>) {
        self.modify_runs(range, |attrs| attrs.insert(key.clone(), value.clone()));
    }

    pub fn remove_attribute(&mut self, key: &AttributeKey, range: Range<usize>) {
        self.modify_runs(range, |attrs| {
            attrs.remove(key);
        });
    }

    /// Replace the whole attribute set over `range`
    pub fn set_attributes(&mut self, attrs: &Attributes, range: Range<usize>) {
        self.modify_runs(range, |a| *a = attrs.clone());
    }

    /// Overlay `attrs` on top of what is already set over `range`
    pub fn add_attributes(&mut self, attrs: &Attributes, range: Range<usize>) {
        self.modify_runs(range, |a| a.merge(attrs));
    }

    pub fn set_all_attributes(&mut self, key: AttributeKey, value: AttributeValue) {
        let len = self.len();
        self.set_attribute(key, value, 0..len);
    }

    /// Update the paragraph alignment over `range`, keeping the other
    /// paragraph settings
    pub fn set_alignment(&mut self, alignment: TextAlignment, range: Range<usize>) {
        self.modify_runs(range, |attrs| attrs.set_alignment(alignment));
    }

    pub fn set_base_writing_direction(&mut self, direction: WritingDirection, range: Range<usize>) {
        self.modify_runs(range, |attrs| attrs.set_base_writing_direction(direction));
    }

    pub fn remove_discontinuous_attributes(&mut self, range: Range<usize>) {
        self.modify_runs(range, |attrs| attrs.remove_discontinuous());
    }

    /// Copy for the layout engine with a trailing sentinel character.
    ///
    /// The sentinel never carries discontinuous attributes. `typing` styles the
    /// whole text when the buffer is empty, and the sentinel when the caret
    /// sits at the end.
    pub fn with_layout_sentinel(&self, typing: &Attributes, caret_at_end: bool) -> AttributedBuffer {
        let mut out = self.clone();
        let len = out.len();
        out.replace(len..len, LAYOUT_SENTINEL);
        if len == 0 {
            out.set_attributes(typing, 0..out.len());
        } else if caret_at_end {
            out.add_attributes(typing, len..len + 1);
            out.remove_discontinuous_attributes(len..len + 1);
        }
        out
    }

    // ========================================================================
    // Run bookkeeping
    // ========================================================================

    fn clamp_range(&self, range: Range<usize>) -> Range<usize> {
        let len = self.len();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        start..end
    }

    /// Index of the run containing `offset` and the offset that run starts at
    fn run_at(&self, offset: usize) -> Option<(usize, usize)> {
        let mut pos = 0;
        for (i, run) in self.runs.iter().enumerate() {
            if offset < pos + run.len {
                return Some((i, pos));
            }
            pos += run.len;
        }
        None
    }

    fn inherited_attributes(&self, range: &Range<usize>) -> Attributes {
        if range.start < range.end {
            self.attributes_at(range.start)
        } else if range.start > 0 {
            self.attributes_at(range.start - 1)
        } else {
            self.attributes_at(0)
        }
    }

    /// Split so a run boundary falls on `offset`; returns the index of the run
    /// that starts there (or `runs.len()` at the end).
    fn split_at(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for i in 0..self.runs.len() {
            if pos == offset {
                return i;
            }
            let len = self.runs[i].len;
            if offset < pos + len {
                let head = offset - pos;
                let tail = Run {
                    len: len - head,
                    attrs: self.runs[i].attrs.clone(),
                };
                self.runs[i].len = head;
                self.runs.insert(i + 1, tail);
                return i + 1;
            }
            pos += len;
        }
        self.runs.len()
    }

    fn modify_runs(&mut self, range: Range<usize>, mut f: impl FnMut(&mut Attributes)) {
        let range = self.clamp_range(range);
        if range.is_empty() {
            return;
        }
        let i = self.split_at(range.start);
        let j = self.split_at(range.end);
        for run in &mut self.runs[i..j] {
            f(&mut run.attrs);
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        let mut out: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.len == 0 {
                continue;
            }
            match out.last_mut() {
                Some(last) if last.attrs == run.attrs => last.len += run.len,
                _ => out.push(run),
            }
        }
        self.runs = out;
        debug_assert_eq!(
            self.runs.iter().map(|r| r.len).sum::<usize>(),
            self.rope.len_chars(),
            "runs must cover the text exactly"
        );
    }
}

impl From<&str> for AttributedBuffer {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}
