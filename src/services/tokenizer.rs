//! Word boundaries for selection granularity.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Which side of a position to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageDirection {
    /// The character after the position
    Forward,
    /// The character before the position
    Backward,
}

pub trait Tokenizer {
    /// Word enclosing `position` (in chars), `None` when that side is not a word
    fn word_range_enclosing(
        &self,
        text: &str,
        position: usize,
        direction: StorageDirection,
    ) -> Option<Range<usize>>;
}

/// Unicode word boundaries (UAX #29).
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn word_range_enclosing(
        &self,
        text: &str,
        position: usize,
        direction: StorageDirection,
    ) -> Option<Range<usize>> {
        let target = match direction {
            StorageDirection::Forward => position,
            StorageDirection::Backward => position.checked_sub(1)?,
        };
        let mut chars = 0;
        for segment in text.split_word_bounds() {
            let len = segment.chars().count();
            let range = chars..chars + len;
            chars += len;
            if range.contains(&target) {
                let is_word = segment.chars().any(char::is_alphanumeric);
                return is_word.then_some(range);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_forward_and_backward() {
        let t = WordTokenizer;
        let text = "hello brave world";
        assert_eq!(
            t.word_range_enclosing(text, 6, StorageDirection::Forward),
            Some(6..11)
        );
        assert_eq!(
            t.word_range_enclosing(text, 6, StorageDirection::Backward),
            None
        );
        assert_eq!(
            t.word_range_enclosing(text, 5, StorageDirection::Backward),
            Some(0..5)
        );
        assert_eq!(t.word_range_enclosing(text, 0, StorageDirection::Backward), None);
        assert_eq!(t.word_range_enclosing(text, 17, StorageDirection::Forward), None);
    }

    #[test]
    fn test_non_ascii_words() {
        let t = WordTokenizer;
        assert_eq!(
            t.word_range_enclosing("größe maß", 7, StorageDirection::Forward),
            Some(6..9)
        );
    }
}
