//! Text model for the editing widget.
//!
//! This module holds the pieces that know nothing about geometry or events:
//!
//! - [`TextPosition`] / [`TextRange`]: char offsets with line-wrap affinity
//! - [`AttributedBuffer`]: rope-backed text with attribute runs
//! - [`SelectionState`] and [`adjust_selection`]: how a selection follows an edit
//! - [`UndoManager`]: bounded snapshot history
//! - [`EditConstraints`]: behaviour switches
//!
//! # Example
//!
//! ```ignore
//! use richedit::editable::{AttributedBuffer, TextRange, adjust_selection};
//!
//! let mut buf = AttributedBuffer::from_text("hello world");
//! let edit = TextRange::with_range(0, 5);
//! buf.replace(edit.as_range(), "hi");
//!
//! let sel = adjust_selection(&edit, 2, &edit, buf.len());
//! assert_eq!(sel.as_range(), 2..2);
//! ```

mod attributes;
mod buffer;
mod constraints;
mod history;
mod position;
mod selection;

pub use attributes::{
    Attachment, AttachmentContent, AttributeKey, AttributeValue, Attributes, Binding, Border,
    Color, Font, Highlight, HighlightAction, HighlightEvent, ParagraphStyle, TextAlignment,
    WritingDirection, ATTACHMENT_CHAR,
};
pub use buffer::{AttributedBuffer, LAYOUT_SENTINEL};
pub use constraints::EditConstraints;
pub use history::{UndoManager, UndoSnapshot};
pub use position::{enclosing_range, Affinity, TextPosition, TextRange};
pub use selection::{adjust_selection, SelectionState};
