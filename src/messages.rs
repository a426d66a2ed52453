//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use serde::{Deserialize, Serialize};

use crate::editable::{Affinity, TextRange, WritingDirection};
use crate::geometry::{EdgeInsets, Point, Rect};
use crate::model::{TimerKind, TimerToken};

/// Edits driven by the keyboard and input method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMsg {
    /// Type text at the selection
    InsertText(String),
    /// Delete the character before the caret, or the selection
    DeleteBackward,
    /// Replace a range with plain text
    Replace { range: TextRange, text: String },
    /// Set the composing text; `selected_range` is relative to its start
    SetMarkedText {
        text: String,
        selected_range: TextRange,
    },
    /// Commit the composing text as-is
    UnmarkText,
    SetSelectedTextRange(TextRange),
    SetSelectionAffinity(Affinity),
    SetBaseWritingDirection {
        direction: WritingDirection,
        range: TextRange,
    },
}

/// Standard edit-menu actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMsg {
    Cut,
    Copy,
    Paste,
    /// Select the word at the caret
    Select,
    SelectAll,
    Undo,
    Redo,
    /// Motion shake: offer undo/redo
    Shake,
    /// The system pasteboard contents changed
    PasteboardChanged,
}

/// Single-finger touch events. Points are in content coordinates and
/// timestamps in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchMsg {
    Began { point: Point, time_ms: u64 },
    Moved { point: Point, time_ms: u64 },
    Ended { point: Point, time_ms: u64 },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMsg {
    /// A timer scheduled through `Cmd::ScheduleTimer` elapsed
    Fired { kind: TimerKind, token: TimerToken },
}

/// First responder transitions requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponderMsg {
    Become,
    Resign,
    /// The input views are about to be reloaded
    ReloadInputViews,
}

/// Geometry and scroll-view events
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportMsg {
    /// The view's frame in window coordinates
    SetFrame(Rect),
    SetContentInset(EdgeInsets),
    /// The shared keyboard tracker reported a new frame
    KeyboardChanged,
    /// The scroll view moved to a new content offset
    DidScroll { offset: Point },
    WillBeginDragging,
    DidEndDragging { will_decelerate: bool },
    WillBeginDecelerating,
    DidEndDecelerating,
    DidEndScrollingAnimation,
    DidScrollToTop,
}

/// Top-level message type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Msg {
    Input(InputMsg),
    Edit(EditMsg),
    Touch(TouchMsg),
    Timer(TimerMsg),
    Responder(ResponderMsg),
    Viewport(ViewportMsg),
}

impl From<InputMsg> for Msg {
    fn from(m: InputMsg) -> Self {
        Msg::Input(m)
    }
}

impl From<EditMsg> for Msg {
    fn from(m: EditMsg) -> Self {
        Msg::Edit(m)
    }
}

impl From<TouchMsg> for Msg {
    fn from(m: TouchMsg) -> Self {
        Msg::Touch(m)
    }
}

impl From<TimerMsg> for Msg {
    fn from(m: TimerMsg) -> Self {
        Msg::Timer(m)
    }
}

impl From<ResponderMsg> for Msg {
    fn from(m: ResponderMsg) -> Self {
        Msg::Responder(m)
    }
}

impl From<ViewportMsg> for Msg {
    fn from(m: ViewportMsg) -> Self {
        Msg::Viewport(m)
    }
}
