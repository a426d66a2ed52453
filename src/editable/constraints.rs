//! Behaviour switches for a text view.
//!
//! Constraints define which interactions and clipboard formats are allowed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConstraints {
    /// Text can be changed
    pub editable: bool,

    /// Text can be selected (and becomes first responder on touch)
    pub selectable: bool,

    /// Link and highlight spans react to touches
    pub highlightable: bool,

    /// Undo/redo snapshots are captured
    pub allows_undo_and_redo: bool,

    /// Pasting an image inserts an attachment
    pub allows_paste_image: bool,

    /// Paste keeps attributes when the pasteboard carries styled text
    pub allows_paste_attributed: bool,

    /// Copy writes styled text along with the plain string
    pub allows_copy_attributed: bool,
}

impl Default for EditConstraints {
    fn default() -> Self {
        Self::editor()
    }
}

impl EditConstraints {
    /// Full editor (everything but image and styled paste)
    pub fn editor() -> Self {
        Self {
            editable: true,
            selectable: true,
            highlightable: true,
            allows_undo_and_redo: true,
            allows_paste_image: false,
            allows_paste_attributed: false,
            allows_copy_attributed: true,
        }
    }

    /// Selectable and copyable, never changed by the user
    pub fn read_only() -> Self {
        Self {
            editable: false,
            allows_undo_and_redo: false,
            ..Self::editor()
        }
    }

    /// Display only: highlights react, nothing can be selected
    pub fn display() -> Self {
        Self {
            editable: false,
            selectable: false,
            allows_undo_and_redo: false,
            ..Self::editor()
        }
    }
}
