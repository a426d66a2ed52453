//! Display state driven by the editing core: caret and selection geometry,
//! magnifier loupes, the edit menu, the touched highlight and the
//! placeholder. Everything here is output; the host renders it.

use std::ops::Range;
use std::rc::Rc;

use serde::Serialize;

use super::tracking::Grabber;
use crate::editable::{AttributedBuffer, Highlight};
use crate::geometry::{Point, Rect};
use crate::layout::{SelectionRect, TextLayout};

/// Extra reach around grabbers and the caret when hit-testing touches
pub const TOUCH_TEST_EXTEND: f64 = 14.0;

// ============================================================================
// Selection view
// ============================================================================

/// Caret and selection geometry in content coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionView {
    pub caret_rect: Rect,
    pub caret_visible: bool,
    pub caret_blinks: bool,
    pub rects: Vec<SelectionRect>,
}

impl SelectionView {
    pub fn clear(&mut self) {
        *self = SelectionView::default();
    }

    fn marker(&self, grabber: Grabber) -> Option<Rect> {
        self.rects
            .iter()
            .find(|r| match grabber {
                Grabber::Start => r.contains_start,
                Grabber::End => r.contains_end,
            })
            .map(|r| r.rect)
    }

    /// Whether the selection has grabber markers at all
    pub fn has_grabbers(&self) -> bool {
        self.rects.iter().any(|r| r.is_marker())
    }

    /// The grabber under `point`, preferring the closer one when both reach
    pub fn grabber_at(&self, point: Point) -> Option<Grabber> {
        let hit = |g: Grabber| {
            self.marker(g).and_then(|rect| {
                let area = rect.inset_by(-TOUCH_TEST_EXTEND, -TOUCH_TEST_EXTEND);
                area.contains(point).then(|| {
                    let dx = rect.mid_x() - point.x;
                    let dy = rect.mid_y() - point.y;
                    dx * dx + dy * dy
                })
            })
        };
        match (hit(Grabber::Start), hit(Grabber::End)) {
            (Some(s), Some(e)) => Some(if s < e { Grabber::Start } else { Grabber::End }),
            (Some(_), None) => Some(Grabber::Start),
            (None, Some(_)) => Some(Grabber::End),
            (None, None) => None,
        }
    }

    pub fn caret_contains(&self, point: Point) -> bool {
        self.caret_visible
            && self
                .caret_rect
                .inset_by(-TOUCH_TEST_EXTEND, -TOUCH_TEST_EXTEND)
                .contains(point)
    }

    /// Union of the filled (non-marker) rects
    pub fn fill_bounds(&self) -> Option<Rect> {
        self.rects
            .iter()
            .filter(|r| !r.is_marker())
            .map(|r| r.rect)
            .reduce(|a, b| a.union(&b))
    }
}

// ============================================================================
// Magnifiers and menu
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Magnifier {
    pub visible: bool,
    pub popover_center: Point,
    pub capture_center: Point,
    pub capture_disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlayState {
    pub selection: SelectionView,
    pub caret_magnifier: Magnifier,
    pub ranged_magnifier: Magnifier,
    pub dots_visible: bool,
    pub menu_visible: bool,
    pub menu_target: Option<Rect>,
}

impl OverlayState {
    pub fn magnifier_visible(&self) -> bool {
        self.caret_magnifier.visible || self.ranged_magnifier.visible
    }
}

// ============================================================================
// Highlight
// ============================================================================

/// A highlight span under the current touch.
#[derive(Clone)]
pub struct ActiveHighlight {
    pub highlight: Highlight,
    pub range: Range<usize>,
    /// Layout with the highlight attributes applied, built on first show
    pub layout: Option<Rc<dyn TextLayout>>,
    pub showing: bool,
}

impl std::fmt::Debug for ActiveHighlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveHighlight")
            .field("highlight", &self.highlight)
            .field("range", &self.range)
            .field("showing", &self.showing)
            .finish()
    }
}

// ============================================================================
// Placeholder
// ============================================================================

/// Placeholder text and where to draw it (content coordinates).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceholderFrame {
    pub text: AttributedBuffer,
    pub frame: Rect,
    pub hidden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(rect: Rect, start: bool) -> SelectionRect {
        SelectionRect {
            rect,
            contains_start: start,
            contains_end: !start,
            is_vertical: false,
        }
    }

    #[test]
    fn test_grabber_hit_uses_touch_extend() {
        let view = SelectionView {
            rects: vec![
                marker(Rect::new(10.0, 0.0, 0.0, 16.0), true),
                SelectionRect::fill(Rect::new(10.0, 0.0, 80.0, 16.0), false),
                marker(Rect::new(90.0, 0.0, 0.0, 16.0), false),
            ],
            ..Default::default()
        };
        assert_eq!(view.grabber_at(Point::new(0.0, 8.0)), Some(Grabber::Start));
        assert_eq!(view.grabber_at(Point::new(100.0, 20.0)), Some(Grabber::End));
        assert_eq!(view.grabber_at(Point::new(50.0, 8.0)), None);
        assert_eq!(
            view.fill_bounds(),
            Some(Rect::new(10.0, 0.0, 80.0, 16.0))
        );
    }

    #[test]
    fn test_hidden_caret_never_contains() {
        let mut view = SelectionView {
            caret_rect: Rect::new(10.0, 0.0, 2.0, 16.0),
            ..Default::default()
        };
        assert!(!view.caret_contains(Point::new(11.0, 8.0)));
        view.caret_visible = true;
        assert!(view.caret_contains(Point::new(20.0, 8.0)));
    }
}
