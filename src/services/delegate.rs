//! Observer interfaces a host can register on a text view.
//!
//! Every method has a default, so an implementor only overrides what it
//! cares about. The view holds delegates weakly.

use std::ops::Range;

use super::notifications::ViewId;
use crate::editable::Highlight;
use crate::geometry::Rect;

pub trait TextViewDelegate {
    fn should_begin_editing(&mut self, _view: ViewId) -> bool {
        true
    }

    fn did_begin_editing(&mut self, _view: ViewId) {}

    fn should_end_editing(&mut self, _view: ViewId) -> bool {
        true
    }

    fn did_end_editing(&mut self, _view: ViewId) {}

    /// Veto an edit before anything is touched
    fn should_change_text(&mut self, _view: ViewId, _range: Range<usize>, _replacement: &str) -> bool {
        true
    }

    fn did_change(&mut self, _view: ViewId) {}

    fn did_change_selection(&mut self, _view: ViewId) {}

    fn should_tap_highlight(
        &mut self,
        _view: ViewId,
        _highlight: &Highlight,
        _range: Range<usize>,
    ) -> bool {
        true
    }

    fn did_tap_highlight(
        &mut self,
        _view: ViewId,
        _highlight: &Highlight,
        _range: Range<usize>,
        _rect: Rect,
    ) {
    }

    fn should_long_press_highlight(
        &mut self,
        _view: ViewId,
        _highlight: &Highlight,
        _range: Range<usize>,
    ) -> bool {
        true
    }

    fn did_long_press_highlight(
        &mut self,
        _view: ViewId,
        _highlight: &Highlight,
        _range: Range<usize>,
        _rect: Rect,
    ) {
    }

    // Scroll callbacks forwarded from the host's scroll view

    fn did_scroll(&mut self, _view: ViewId) {}

    fn will_begin_dragging(&mut self, _view: ViewId) {}

    fn did_end_dragging(&mut self, _view: ViewId, _will_decelerate: bool) {}

    fn will_begin_decelerating(&mut self, _view: ViewId) {}

    fn did_end_decelerating(&mut self, _view: ViewId) {}

    fn did_end_scrolling_animation(&mut self, _view: ViewId) {}

    fn should_scroll_to_top(&mut self, _view: ViewId) -> Option<bool> {
        None
    }

    fn did_scroll_to_top(&mut self, _view: ViewId) {}
}

/// The input system's view of text and selection changes.
pub trait InputDelegate {
    fn text_will_change(&mut self, _view: ViewId) {}
    fn text_did_change(&mut self, _view: ViewId) {}
    fn selection_will_change(&mut self, _view: ViewId) {}
    fn selection_did_change(&mut self, _view: ViewId) {}
}
