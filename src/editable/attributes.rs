//! Attribute keys and values for styled text runs.
//!
//! An [`Attributes`] set maps an [`AttributeKey`] to a tagged
//! [`AttributeValue`]. Some keys are *discontinuous*: markers such as links,
//! highlights, borders, attachments and bindings describe one specific span
//! and must never bleed into text typed next to them.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::{EdgeInsets, Rect};

// ============================================================================
// Keys
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKey {
    Font,
    ForegroundColor,
    BackgroundColor,
    ParagraphStyle,
    Underline,
    WritingDirection,
    Link,
    Highlight,
    Border,
    BackgroundBorder,
    Attachment,
    Binding,
    Custom(String),
}

impl AttributeKey {
    /// Markers that belong to one span and are stripped at edit boundaries
    pub fn is_discontinuous(&self) -> bool {
        matches!(
            self,
            AttributeKey::Link
                | AttributeKey::Highlight
                | AttributeKey::Border
                | AttributeKey::BackgroundBorder
                | AttributeKey::Attachment
                | AttributeKey::Binding
        )
    }
}

// ============================================================================
// Values
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Default tint used for links and the caret
    pub const TINT: Color = Color::rgb(69, 111, 238);
    pub const PLACEHOLDER_GRAY: Color = Color::rgb(179, 179, 179);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
}

impl Font {
    pub fn system(size: f64) -> Self {
        Self {
            family: "system".to_string(),
            size,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::system(12.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    #[default]
    Natural,
    Left,
    Center,
    Right,
    Justified,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritingDirection {
    #[default]
    Natural,
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    #[serde(default)]
    pub alignment: TextAlignment,
    #[serde(default)]
    pub base_writing_direction: WritingDirection,
    #[serde(default)]
    pub line_spacing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub color: Color,
    pub width: f64,
    #[serde(default)]
    pub fill: Option<Color>,
    #[serde(default)]
    pub corner_radius: f64,
    #[serde(default)]
    pub insets: EdgeInsets,
}

/// Payload drawn in place of an object-replacement character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentContent {
    /// Decoded RGBA pixels
    Image {
        pixel_width: usize,
        pixel_height: usize,
        #[serde(skip)]
        rgba: Rc<Vec<u8>>,
    },
    /// Host-rendered view identified by a tag
    View(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub width: f64,
    pub ascent: f64,
    pub descent: f64,
    pub content: AttachmentContent,
}

/// The character attachments are stored under
pub const ATTACHMENT_CHAR: char = '\u{FFFC}';

/// Marks a span that is deleted as a single unit. The first backspace
/// after it selects the span, the second one deletes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding;

/// Arguments handed to highlight tap/long-press callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightEvent {
    pub text: String,
    pub range: Range<usize>,
    pub rect: Rect,
}

pub type HighlightAction = Rc<dyn Fn(&HighlightEvent)>;

/// An interactive span. While touched, `attributes` are laid over the span.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(skip)]
    pub tap_action: Option<HighlightAction>,
    #[serde(skip)]
    pub long_press_action: Option<HighlightAction>,
}

impl Highlight {
    pub fn with_attributes(attributes: Attributes) -> Self {
        Self {
            attributes,
            ..Default::default()
        }
    }

    pub fn on_tap(mut self, action: impl Fn(&HighlightEvent) + 'static) -> Self {
        self.tap_action = Some(Rc::new(action));
        self
    }

    pub fn on_long_press(mut self, action: impl Fn(&HighlightEvent) + 'static) -> Self {
        self.long_press_action = Some(Rc::new(action));
        self
    }

    pub fn has_actions(&self) -> bool {
        self.tap_action.is_some() || self.long_press_action.is_some()
    }
}

fn same_action(a: &Option<HighlightAction>, b: &Option<HighlightAction>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

impl PartialEq for Highlight {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
            && same_action(&self.tap_action, &other.tap_action)
            && same_action(&self.long_press_action, &other.long_press_action)
    }
}

impl fmt::Debug for Highlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Highlight")
            .field("attributes", &self.attributes)
            .field("tap_action", &self.tap_action.is_some())
            .field("long_press_action", &self.long_press_action.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Font(Font),
    Color(Color),
    ParagraphStyle(ParagraphStyle),
    Underline(bool),
    WritingDirection(WritingDirection),
    Link(String),
    Highlight(Highlight),
    Border(Border),
    Attachment(Attachment),
    Binding(Binding),
    Text(String),
    Number(f64),
    Flag(bool),
}

// ============================================================================
// Attribute sets
// ============================================================================

/// Attribute set of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<AttributeKey, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, key: AttributeKey, value: AttributeValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &AttributeKey) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &AttributeKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: AttributeKey, value: AttributeValue) {
        self.0.insert(key, value);
    }

    pub fn remove(&mut self, key: &AttributeKey) -> Option<AttributeValue> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKey, &AttributeValue)> {
        self.0.iter()
    }

    /// Overlay `other` on top of `self`
    pub fn merge(&mut self, other: &Attributes) {
        for (k, v) in other.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn remove_discontinuous(&mut self) {
        self.0.retain(|k, _| !k.is_discontinuous());
    }

    pub fn without_discontinuous(&self) -> Attributes {
        let mut attrs = self.clone();
        attrs.remove_discontinuous();
        attrs
    }

    pub fn font(&self) -> Option<&Font> {
        match self.get(&AttributeKey::Font) {
            Some(AttributeValue::Font(f)) => Some(f),
            _ => None,
        }
    }

    pub fn foreground_color(&self) -> Option<Color> {
        match self.get(&AttributeKey::ForegroundColor) {
            Some(AttributeValue::Color(c)) => Some(*c),
            _ => None,
        }
    }

    pub fn paragraph_style(&self) -> Option<&ParagraphStyle> {
        match self.get(&AttributeKey::ParagraphStyle) {
            Some(AttributeValue::ParagraphStyle(p)) => Some(p),
            _ => None,
        }
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        match self.get(&AttributeKey::Highlight) {
            Some(AttributeValue::Highlight(h)) => Some(h),
            _ => None,
        }
    }

    pub fn binding(&self) -> Option<Binding> {
        match self.get(&AttributeKey::Binding) {
            Some(AttributeValue::Binding(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        match self.get(&AttributeKey::Attachment) {
            Some(AttributeValue::Attachment(a)) => Some(a),
            _ => None,
        }
    }

    /// Paragraph style with its alignment replaced, creating one if absent
    pub fn set_alignment(&mut self, alignment: TextAlignment) {
        let mut style = self.paragraph_style().cloned().unwrap_or_default();
        style.alignment = alignment;
        self.insert(
            AttributeKey::ParagraphStyle,
            AttributeValue::ParagraphStyle(style),
        );
    }

    pub fn set_base_writing_direction(&mut self, direction: WritingDirection) {
        let mut style = self.paragraph_style().cloned().unwrap_or_default();
        style.base_writing_direction = direction;
        self.insert(
            AttributeKey::ParagraphStyle,
            AttributeValue::ParagraphStyle(style),
        );
    }
}

impl FromIterator<(AttributeKey, AttributeValue)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (AttributeKey, AttributeValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discontinuous_keys() {
        assert!(AttributeKey::Link.is_discontinuous());
        assert!(AttributeKey::Binding.is_discontinuous());
        assert!(AttributeKey::BackgroundBorder.is_discontinuous());
        assert!(!AttributeKey::Font.is_discontinuous());
        assert!(!AttributeKey::Custom("x".into()).is_discontinuous());
    }

    #[test]
    fn test_without_discontinuous() {
        let attrs = Attributes::new()
            .with(AttributeKey::Font, AttributeValue::Font(Font::system(14.0)))
            .with(AttributeKey::Link, AttributeValue::Link("https://a.b".into()))
            .with(
                AttributeKey::Binding,
                AttributeValue::Binding(Binding::default()),
            );
        let stripped = attrs.without_discontinuous();
        assert_eq!(stripped.len(), 1);
        assert_eq!(stripped.font(), Some(&Font::system(14.0)));
    }

    #[test]
    fn test_merge_overrides() {
        let mut a = Attributes::new().with(
            AttributeKey::ForegroundColor,
            AttributeValue::Color(Color::BLACK),
        );
        let b = Attributes::new().with(
            AttributeKey::ForegroundColor,
            AttributeValue::Color(Color::TINT),
        );
        a.merge(&b);
        assert_eq!(a.foreground_color(), Some(Color::TINT));
    }

    #[test]
    fn test_highlight_equality_tracks_actions() {
        let plain = Highlight::default();
        let tapped = Highlight::default().on_tap(|_| {});
        assert_eq!(plain, Highlight::default());
        assert_ne!(plain, tapped);
        assert_eq!(tapped.clone(), tapped);
    }

    #[test]
    fn test_set_alignment_creates_style() {
        let mut attrs = Attributes::new();
        attrs.set_alignment(TextAlignment::Center);
        assert_eq!(
            attrs.paragraph_style().map(|p| p.alignment),
            Some(TextAlignment::Center)
        );
    }
}
