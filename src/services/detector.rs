//! Data detection (links, phone numbers, dates, addresses).

use std::ops::Range;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedKind {
    Link,
    PhoneNumber,
    Date,
    Address,
}

/// A classified span in char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSpan {
    pub kind: DetectedKind,
    pub range: Range<usize>,
}

/// Which classes to look for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorTypes {
    pub link: bool,
    pub phone_number: bool,
    pub date: bool,
    pub address: bool,
}

impl DetectorTypes {
    pub fn all() -> Self {
        Self {
            link: true,
            phone_number: true,
            date: true,
            address: true,
        }
    }

    pub fn links() -> Self {
        Self {
            link: true,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.link || self.phone_number || self.date || self.address)
    }
}

pub trait DataDetector {
    /// Non-overlapping spans in ascending order
    fn detect(&self, text: &str) -> Vec<DetectedSpan>;
}

pub struct RegexDataDetector {
    patterns: Vec<(DetectedKind, Regex)>,
}

const LINK_PATTERN: &str = r"(?i)\b(?:https?://|www\.)[^\s<>\[\]]+[^\s<>\[\].,;:!?)]";
const PHONE_PATTERN: &str = r"\+?\(?\d{1,4}\)?[\d\-. ]{5,}\d";
const DATE_PATTERN: &str = r"\b(?:\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{2,4})\b";
const ADDRESS_PATTERN: &str = r"\b\d{1,5}(?:\s+[A-Z][a-z]+){1,3}\s+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr)\b";

impl RegexDataDetector {
    /// `None` when no class is requested
    pub fn new(types: DetectorTypes) -> Option<Self> {
        if types.is_empty() {
            return None;
        }
        let wanted = [
            (types.link, DetectedKind::Link, LINK_PATTERN),
            (types.date, DetectedKind::Date, DATE_PATTERN),
            (types.address, DetectedKind::Address, ADDRESS_PATTERN),
            (types.phone_number, DetectedKind::PhoneNumber, PHONE_PATTERN),
        ];
        let mut patterns = Vec::new();
        for (enabled, kind, pattern) in wanted {
            if !enabled {
                continue;
            }
            match Regex::new(pattern) {
                Ok(re) => patterns.push((kind, re)),
                Err(e) => tracing::warn!(?kind, "invalid detector pattern: {e}"),
            }
        }
        Some(Self { patterns })
    }
}

impl DataDetector for RegexDataDetector {
    fn detect(&self, text: &str) -> Vec<DetectedSpan> {
        let mut byte_spans: Vec<(DetectedKind, Range<usize>)> = Vec::new();
        for (kind, re) in &self.patterns {
            for m in re.find_iter(text) {
                let overlaps = byte_spans
                    .iter()
                    .any(|(_, r)| m.start() < r.end && r.start < m.end());
                if !overlaps {
                    byte_spans.push((*kind, m.range()));
                }
            }
        }
        byte_spans.sort_by_key(|(_, r)| r.start);

        // Byte offsets to char offsets in one pass
        let mut spans = Vec::with_capacity(byte_spans.len());
        let mut chars = 0;
        let mut byte = 0;
        for (kind, r) in byte_spans {
            chars += text[byte..r.start].chars().count();
            let start = chars;
            chars += text[r.start..r.end].chars().count();
            byte = r.end;
            spans.push(DetectedSpan {
                kind,
                range: start..chars,
            });
        }
        spans
    }
}
