//! Command types for the Elm-style architecture
//!
//! Commands are side effects the host performs after an update: arming
//! timers, presenting the menu and magnifier loupes, and driving the scroll
//! view. The core never performs them itself.

use serde::Serialize;

use crate::geometry::{EdgeInsets, Point, Rect};
use crate::model::{TimerKind, TimerToken};

/// Which loupe a magnifier command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnifierStyle {
    /// Round loupe centred on the caret
    Caret,
    /// Wide loupe pinned to the line being selected
    Ranged,
}

/// Commands returned by update functions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Cmd {
    /// No command
    #[default]
    None,

    /// Call back with `TimerMsg::Fired { kind, token }` after `delay_ms`.
    /// A repeating timer keeps firing until cancelled.
    ScheduleTimer {
        kind: TimerKind,
        token: TimerToken,
        delay_ms: u64,
        repeating: bool,
    },
    /// Drop the pending timer of this kind
    CancelTimer { kind: TimerKind, token: TimerToken },

    /// Present the edit menu pointing at `target` (content coordinates)
    ShowMenu { target: Rect },
    HideMenu,

    /// Show a loupe, or move it when already visible. Points are in content
    /// coordinates.
    ShowMagnifier {
        style: MagnifierStyle,
        popover_center: Point,
        capture_center: Point,
        capture_disabled: bool,
    },
    HideMagnifier { style: MagnifierStyle },

    /// Grabber dots of a ranged selection
    ShowSelectionDots,
    HideSelectionDots,

    /// Scroll the minimum amount that makes `rect` visible
    ScrollRectToVisible { rect: Rect, animated: bool },
    SetContentOffset { offset: Point, animated: bool },
    SetContentInsets {
        content: EdgeInsets,
        scroll_indicator: EdgeInsets,
    },
    FlashScrollIndicators,
    SetScrollEnabled(bool),

    /// Ask the user whether to undo or redo
    ShowUndoAlert { can_undo: bool, can_redo: bool },

    /// The view gained or lost first responder status
    FocusChanged { focused: bool },

    /// The host should redraw the text view
    Redraw,

    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        Cmd::Batch(cmds)
    }

    /// Fold a list of commands into one, `None` when the list is empty
    pub fn from_list(mut cmds: Vec<Cmd>) -> Option<Self> {
        cmds.retain(|c| !matches!(c, Cmd::None));
        match cmds.len() {
            0 => None,
            1 => cmds.pop(),
            _ => Some(Cmd::Batch(cmds)),
        }
    }

    /// Flatten nested batches into a single list
    pub fn into_vec(self) -> Vec<Cmd> {
        match self {
            Cmd::None => Vec::new(),
            Cmd::Batch(cmds) => cmds.into_iter().flat_map(Cmd::into_vec).collect(),
            other => vec![other],
        }
    }

    /// Check if this command requires a redraw
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::None => false,
            Cmd::ScheduleTimer { .. } | Cmd::CancelTimer { .. } => false,
            Cmd::ShowUndoAlert { .. } | Cmd::FocusChanged { .. } => false,
            Cmd::SetScrollEnabled(_) => false,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_list_collapses() {
        assert_eq!(Cmd::from_list(vec![]), None);
        assert_eq!(Cmd::from_list(vec![Cmd::None]), None);
        assert_eq!(Cmd::from_list(vec![Cmd::HideMenu]), Some(Cmd::HideMenu));
        assert_eq!(
            Cmd::from_list(vec![Cmd::HideMenu, Cmd::Redraw]),
            Some(Cmd::Batch(vec![Cmd::HideMenu, Cmd::Redraw]))
        );
    }

    #[test]
    fn test_into_vec_flattens_batches() {
        let cmd = Cmd::batch(vec![
            Cmd::HideMenu,
            Cmd::batch(vec![Cmd::Redraw, Cmd::None]),
        ]);
        assert_eq!(cmd.into_vec(), vec![Cmd::HideMenu, Cmd::Redraw]);
    }

    #[test]
    fn test_needs_redraw() {
        assert!(!Cmd::None.needs_redraw());
        assert!(Cmd::HideMenu.needs_redraw());
        assert!(!Cmd::SetScrollEnabled(true).needs_redraw());
        assert!(Cmd::batch(vec![Cmd::SetScrollEnabled(false), Cmd::Redraw]).needs_redraw());
    }
}
