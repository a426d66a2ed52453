//! Text positions and ranges.
//!
//! Offsets count Unicode scalar values (`char`s), the same unit the rope
//! backend indexes by. A position carries an [`Affinity`] which picks the
//! visual line when the offset sits exactly on a soft line-wrap boundary.

use std::cmp::Ordering;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Which side of a line-wrap boundary a position belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affinity {
    /// Attached to the following character (start of the next line)
    #[default]
    Forward,
    /// Attached to the preceding character (end of the previous line)
    Backward,
}

/// A caret position in the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextPosition {
    pub offset: usize,
    #[serde(default)]
    pub affinity: Affinity,
}

impl TextPosition {
    pub const fn new(offset: usize) -> Self {
        Self {
            offset,
            affinity: Affinity::Forward,
        }
    }

    pub const fn with_affinity(offset: usize, affinity: Affinity) -> Self {
        Self { offset, affinity }
    }

    /// Total order by offset. Affinity never participates.
    pub fn compare(&self, other: &TextPosition) -> Ordering {
        self.offset.cmp(&other.offset)
    }

    /// Whether the position can be used as-is against a buffer of `len` chars.
    ///
    /// Offsets past the end are invalid, and so is a backward affinity at
    /// either end of the buffer (there is no line to attach to).
    pub fn is_valid(&self, len: usize) -> bool {
        if self.offset > len {
            return false;
        }
        if self.affinity == Affinity::Backward && (self.offset == 0 || self.offset == len) {
            return false;
        }
        true
    }

    /// Clamp into `[0, len]`, resetting affinity to forward when the original
    /// was not valid.
    pub fn corrected(&self, len: usize) -> TextPosition {
        if self.is_valid(len) {
            return *self;
        }
        TextPosition::new(self.offset.min(len))
    }
}

/// An ordered `(start, end)` pair. A caret when `start == end`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextRange {
    /// Build a range from two positions in any order.
    pub fn new(a: TextPosition, b: TextPosition) -> Self {
        if a.compare(&b) == Ordering::Greater {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    /// Range from a `(location, length)` pair
    pub fn with_range(location: usize, length: usize) -> Self {
        Self::with_range_affinity(location, length, Affinity::Forward)
    }

    /// Range from a `(location, length)` pair. The affinity is applied to the
    /// end position, and to the start as well when the range is a caret.
    pub fn with_range_affinity(location: usize, length: usize, affinity: Affinity) -> Self {
        let start_affinity = if length == 0 {
            affinity
        } else {
            Affinity::Forward
        };
        Self {
            start: TextPosition::with_affinity(location, start_affinity),
            end: TextPosition::with_affinity(location + length, affinity),
        }
    }

    pub fn caret(position: TextPosition) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn from_range(range: Range<usize>) -> Self {
        Self::with_range(range.start, range.end.saturating_sub(range.start))
    }

    pub fn location(&self) -> usize {
        self.start.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Plain `start..end` view
    pub fn as_range(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }

    /// True when both the offsets and lengths match, regardless of affinity
    pub fn same_span(&self, other: &TextRange) -> bool {
        self.as_range() == other.as_range()
    }

    pub fn is_valid(&self, len: usize) -> bool {
        self.start.is_valid(len) && self.end.is_valid(len)
    }

    pub fn corrected(&self, len: usize) -> TextRange {
        if self.is_valid(len) {
            return *self;
        }
        TextRange::new(self.start.corrected(len), self.end.corrected(len))
    }

    /// Length of the overlap with `other` (zero when they only touch)
    pub fn intersection_len(&self, other: &TextRange) -> usize {
        let start = self.start.offset.max(other.start.offset);
        let end = self.end.offset.min(other.end.offset);
        end.saturating_sub(start)
    }

    /// Clamp a position into this range
    pub fn clamp(&self, position: TextPosition) -> TextPosition {
        if position.compare(&self.start) == Ordering::Less {
            self.start
        } else if position.compare(&self.end) == Ordering::Greater {
            self.end
        } else {
            position
        }
    }
}

/// The smallest range covering every position in `positions`.
pub fn enclosing_range(positions: &[TextPosition]) -> Option<TextRange> {
    let first = positions.iter().min_by(|a, b| a.compare(b))?;
    let last = positions.iter().max_by(|a, b| a.compare(b))?;
    Some(TextRange {
        start: *first,
        end: *last,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_ignores_affinity() {
        let a = TextPosition::with_affinity(3, Affinity::Backward);
        let b = TextPosition::new(3);
        assert_eq!(a.compare(&b), Ordering::Equal);
        assert_ne!(a, b);
        assert_eq!(TextPosition::new(1).compare(&b), Ordering::Less);
    }

    #[test]
    fn test_position_validity() {
        assert!(TextPosition::new(0).is_valid(0));
        assert!(TextPosition::new(5).is_valid(5));
        assert!(!TextPosition::new(6).is_valid(5));
        assert!(!TextPosition::with_affinity(0, Affinity::Backward).is_valid(5));
        assert!(!TextPosition::with_affinity(5, Affinity::Backward).is_valid(5));
        assert!(TextPosition::with_affinity(3, Affinity::Backward).is_valid(5));
    }

    #[test]
    fn test_correction_clamps_and_resets_affinity() {
        assert_eq!(TextPosition::new(9).corrected(4), TextPosition::new(4));
        assert_eq!(
            TextPosition::with_affinity(4, Affinity::Backward).corrected(4),
            TextPosition::new(4)
        );
        assert_eq!(
            TextPosition::with_affinity(0, Affinity::Backward).corrected(4),
            TextPosition::new(0)
        );
        let mid = TextPosition::with_affinity(2, Affinity::Backward);
        assert_eq!(mid.corrected(4), mid);
    }

    #[test]
    fn test_correction_is_idempotent() {
        for len in 0..4 {
            for offset in 0..7 {
                for affinity in [Affinity::Forward, Affinity::Backward] {
                    let once = TextPosition::with_affinity(offset, affinity).corrected(len);
                    assert_eq!(once.corrected(len), once);
                    assert!(once.is_valid(len));
                }
            }
        }
    }

    #[test]
    fn test_range_orders_endpoints() {
        let r = TextRange::new(TextPosition::new(5), TextPosition::new(2));
        assert_eq!(r.as_range(), 2..5);
        assert_eq!(r.len(), 3);
        assert!(!r.is_empty());
    }

    #[test]
    fn test_range_correction() {
        let r = TextRange::with_range(3, 10).corrected(5);
        assert_eq!(r.as_range(), 3..5);
        assert!(r.is_valid(5));
    }

    #[test]
    fn test_intersection_len() {
        let a = TextRange::with_range(0, 5);
        assert_eq!(a.intersection_len(&TextRange::with_range(3, 5)), 2);
        assert_eq!(a.intersection_len(&TextRange::with_range(5, 2)), 0);
        assert_eq!(a.intersection_len(&TextRange::with_range(2, 0)), 0);
    }

    #[test]
    fn test_enclosing_range() {
        let r = enclosing_range(&[
            TextPosition::new(4),
            TextPosition::new(1),
            TextPosition::new(7),
        ]);
        assert_eq!(r.map(|r| r.as_range()), Some(1..7));
        assert_eq!(enclosing_range(&[]), None);
    }
}
