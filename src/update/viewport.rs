//! Frame, inset and keyboard handling, and the scroll callbacks forwarded
//! from the host's scroll view

use std::ops::Range;

use crate::commands::Cmd;
use crate::editable::TextRange;
use crate::geometry::{EdgeInsets, Rect};
use crate::messages::ViewportMsg;
use crate::model::TextView;

/// Margin kept around a rect scrolled into view, and above the keyboard
const SCROLL_EXTEND: f64 = 3.0;

impl TextView {
    pub(crate) fn handle_viewport(&mut self, msg: ViewportMsg) {
        match msg {
            ViewportMsg::SetFrame(frame) => self.set_frame(frame),
            ViewportMsg::SetContentInset(inset) => self.set_content_inset(inset),
            ViewportMsg::KeyboardChanged => self.keyboard_changed(),
            ViewportMsg::DidScroll { offset } => {
                self.viewport.content_offset = offset;
                if self.overlay.dots_visible {
                    self.emit(Cmd::HideSelectionDots);
                }
                self.with_delegate(|d, id| d.did_scroll(id));
            }
            ViewportMsg::WillBeginDragging => {
                self.with_delegate(|d, id| d.will_begin_dragging(id));
            }
            ViewportMsg::DidEndDragging { will_decelerate } => {
                if !will_decelerate {
                    self.reshow_selection_dots();
                }
                self.with_delegate(|d, id| d.did_end_dragging(id, will_decelerate));
            }
            ViewportMsg::WillBeginDecelerating => {
                self.with_delegate(|d, id| d.will_begin_decelerating(id));
            }
            ViewportMsg::DidEndDecelerating => {
                self.reshow_selection_dots();
                self.with_delegate(|d, id| d.did_end_decelerating(id));
            }
            ViewportMsg::DidEndScrollingAnimation => {
                self.with_delegate(|d, id| d.did_end_scrolling_animation(id));
            }
            ViewportMsg::DidScrollToTop => {
                self.with_delegate(|d, id| d.did_scroll_to_top(id));
            }
        }
    }

    fn reshow_selection_dots(&mut self) {
        if self.overlay.dots_visible {
            self.emit(Cmd::ShowSelectionDots);
        }
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    fn set_frame(&mut self, frame: Rect) {
        let old = self.viewport.frame.size();
        self.viewport.frame = frame;
        let new = frame.size();
        let wrap_axis_changed = if self.container.vertical_form {
            old.height != new.height
        } else {
            old.width != new.width
        };
        if wrap_axis_changed {
            self.update_inner_container_size();
            self.commit_update();
        }
        if old != new {
            self.commit_placeholder_update();
        }
    }

    /// While the keyboard owns the bottom inset, a new inset only replaces
    /// the one to restore later
    fn set_content_inset(&mut self, inset: EdgeInsets) {
        if let Some((content, _)) = self.viewport.original_insets.as_mut() {
            *content = inset;
            return;
        }
        let old = self.viewport.content_inset;
        self.viewport.content_inset = inset;
        if old != inset {
            self.update_inner_container_size();
            self.commit_update();
            self.commit_placeholder_update();
        }
    }

    pub fn set_scroll_indicator_insets(&mut self, insets: EdgeInsets) {
        match self.viewport.original_insets.as_mut() {
            Some((_, indicator)) => *indicator = insets,
            None => self.viewport.scroll_indicator_insets = insets,
        }
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    /// Keyboard frame relative to the view's frame, grown upwards by the
    /// extra accessory view
    pub(crate) fn keyboard_rect_in_view(&self) -> Option<Rect> {
        let keyboard = self.services.keyboard.frame()?;
        let frame = self.viewport.frame;
        let extra = self.viewport.extra_accessory_view_height;
        Some(Rect::new(
            keyboard.x - frame.x,
            keyboard.y - frame.y - extra,
            keyboard.width,
            keyboard.height + extra,
        ))
    }

    pub(crate) fn keyboard_rect_in_content(&self) -> Option<Rect> {
        let rect = self.keyboard_rect_in_view()?;
        let offset = self.viewport.content_offset;
        Some(rect.with_origin(rect.origin().offset(offset.x, offset.y)))
    }

    pub(crate) fn keyboard_changed(&mut self) {
        if !self.flags.first_responder {
            return;
        }
        if self.services.keyboard.is_visible() {
            self.scroll_selected_range_to_visible();
        } else {
            self.restore_insets();
        }
        self.update_magnifier();
        if self.overlay.menu_visible {
            self.show_menu();
        }
    }

    /// Put back the insets the keyboard displaced
    pub(crate) fn restore_insets(&mut self) {
        let Some((content, indicator)) = self.viewport.original_insets.take() else {
            return;
        };
        self.viewport.content_inset = content;
        self.viewport.scroll_indicator_insets = indicator;
        self.emit(Cmd::SetContentInsets {
            content,
            scroll_indicator: indicator,
        });
        tracing::debug!(view = self.id.0, ?content, "insets restored");
    }

    // ========================================================================
    // Scrolling
    // ========================================================================

    /// Scroll so `range` is visible, corrected into the text bounds
    pub fn scroll_to_range(&mut self, range: Range<usize>) {
        self.update_if_needed();
        let range = self.corrected_range(TextRange::from_range(range));
        self.scroll_range_to_visible(range);
    }

    pub(crate) fn scroll_selected_range_to_visible(&mut self) {
        self.scroll_range_to_visible(self.selection.selected);
    }

    /// Scroll `range` into view. When the keyboard covers the lower part of
    /// the view, the bottom inset is raised above it first.
    pub(crate) fn scroll_range_to_visible(&mut self, range: TextRange) {
        let Some(layout) = self.layout.clone() else {
            return;
        };
        let Some(rect) = layout.rect_for_range(&range) else {
            return;
        };
        let mut rect = self.from_layout_rect(rect);
        rect.width = rect.width.max(1.0);
        rect.height = rect.height.max(1.0);
        let target = rect.inset_by(-SCROLL_EXTEND, -SCROLL_EXTEND);

        if self.flags.first_responder && !self.container.vertical_form {
            if let Some(new_insets) = self.keyboard_insets() {
                if self.viewport.original_insets.is_none() {
                    self.viewport.original_insets = Some((
                        self.viewport.content_inset,
                        self.viewport.scroll_indicator_insets,
                    ));
                }
                let (content, indicator) = new_insets;
                self.viewport.content_inset = content;
                self.viewport.scroll_indicator_insets = indicator;
                self.emit(Cmd::SetContentInsets {
                    content,
                    scroll_indicator: indicator,
                });
                self.emit(Cmd::ScrollRectToVisible {
                    rect: target,
                    animated: false,
                });
                tracing::debug!(view = self.id.0, bottom = content.bottom, "inset raised above keyboard");
                return;
            }
        }

        self.restore_insets();
        self.emit(Cmd::ScrollRectToVisible {
            rect: target,
            animated: false,
        });
    }

    /// Insets that clear the keyboard, `None` when the current bottom inset
    /// already does or the keyboard does not cover the view from below
    fn keyboard_insets(&self) -> Option<(EdgeInsets, EdgeInsets)> {
        let keyboard = self.keyboard_rect_in_view()?;
        let bounds = Rect::from_size(self.viewport.frame.size());
        let inter = bounds.intersection(&keyboard)?;
        if inter.height <= 1.0 || inter.width <= SCROLL_EXTEND || inter.min_y() <= bounds.min_y() {
            return None;
        }
        let (mut content, mut indicator) = self.viewport.original_insets.unwrap_or((
            self.viewport.content_inset,
            self.viewport.scroll_indicator_insets,
        ));
        if content.bottom >= inter.height + SCROLL_EXTEND {
            return None;
        }
        content.bottom = inter.height + SCROLL_EXTEND;
        indicator.bottom = content.bottom;
        Some((content, indicator))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::commands::Cmd;
    use crate::geometry::{EdgeInsets, Point, Rect};
    use crate::messages::{ResponderMsg, ViewportMsg};
    use crate::protocol::ScrollForwarding;
    use crate::services::{TextViewDelegate, ViewId};
    use crate::test_support::view_with_text;
    use crate::update::update;

    fn keyboard_up(view: &mut crate::TextView) -> Vec<Cmd> {
        view.services.keyboard.set_frame(Some(Rect::new(0.0, 300.0, 320.0, 180.0)));
        update(view, ViewportMsg::KeyboardChanged.into())
            .map(Cmd::into_vec)
            .unwrap_or_default()
    }

    #[test]
    fn test_keyboard_raises_bottom_inset() {
        let mut view = view_with_text("hello");
        update(&mut view, ResponderMsg::Become.into());
        let cmds = keyboard_up(&mut view);
        assert_eq!(view.viewport().content_inset.bottom, 183.0);
        assert!(cmds
            .iter()
            .any(|c| matches!(c, Cmd::ScrollRectToVisible { .. })));

        view.services.keyboard.set_frame(None);
        update(&mut view, ViewportMsg::KeyboardChanged.into());
        assert_eq!(view.viewport().content_inset, EdgeInsets::ZERO);
    }

    #[test]
    fn test_keyboard_ignored_without_focus() {
        let mut view = view_with_text("hello");
        let cmds = keyboard_up(&mut view);
        assert!(cmds.is_empty());
        assert_eq!(view.viewport().content_inset.bottom, 0.0);
    }

    #[test]
    fn test_accessory_height_extends_keyboard() {
        let mut view = view_with_text("hello");
        view.set_extra_accessory_view_height(44.0);
        update(&mut view, ResponderMsg::Become.into());
        keyboard_up(&mut view);
        assert_eq!(view.viewport().content_inset.bottom, 227.0);
    }

    #[test]
    fn test_inset_set_under_keyboard_is_restored_later() {
        let mut view = view_with_text("hello");
        update(&mut view, ResponderMsg::Become.into());
        keyboard_up(&mut view);
        let inset = EdgeInsets::new(10.0, 0.0, 0.0, 0.0);
        update(&mut view, ViewportMsg::SetContentInset(inset).into());
        assert_eq!(view.viewport().content_inset.bottom, 183.0);

        update(&mut view, ResponderMsg::Resign.into());
        assert_eq!(view.viewport().content_inset, inset);
    }

    #[test]
    fn test_frame_width_change_relayouts() {
        let mut view = view_with_text("hello");
        let before = view.refresh_count();
        update(
            &mut view,
            ViewportMsg::SetFrame(Rect::new(0.0, 0.0, 200.0, 480.0)).into(),
        );
        assert_eq!(view.refresh_count(), before + 1);
        assert_eq!(view.viewport().frame.width, 200.0);

        // Only the height changed: no relayout for horizontal text
        update(
            &mut view,
            ViewportMsg::SetFrame(Rect::new(0.0, 0.0, 200.0, 300.0)).into(),
        );
        assert_eq!(view.refresh_count(), before + 1);
    }

    #[derive(Default)]
    struct ScrollLog {
        events: Vec<&'static str>,
        allow_top: Option<bool>,
    }

    impl TextViewDelegate for ScrollLog {
        fn did_scroll(&mut self, _view: ViewId) {
            self.events.push("scroll");
        }

        fn did_end_dragging(&mut self, _view: ViewId, _will_decelerate: bool) {
            self.events.push("end_dragging");
        }

        fn should_scroll_to_top(&mut self, _view: ViewId) -> Option<bool> {
            self.allow_top
        }
    }

    #[test]
    fn test_scroll_callbacks_reach_delegate() {
        let mut view = view_with_text("hello");
        let log = Rc::new(RefCell::new(ScrollLog::default()));
        view.set_delegate(&log);

        view.did_scroll(Point::new(0.0, 12.0));
        view.did_end_dragging(false);
        assert_eq!(view.viewport().content_offset, Point::new(0.0, 12.0));
        assert_eq!(log.borrow().events, vec!["scroll", "end_dragging"]);

        assert!(view.should_scroll_to_top());
        log.borrow_mut().allow_top = Some(false);
        assert!(!view.should_scroll_to_top());
    }

    #[test]
    fn test_keyboard_rect_follows_content_offset() {
        let mut view = view_with_text("hello");
        view.services.keyboard.set_frame(Some(Rect::new(0.0, 300.0, 320.0, 180.0)));
        view.did_scroll(Point::new(0.0, 50.0));
        let rect = view.keyboard_rect_in_content().unwrap();
        assert_eq!(rect.y, 350.0);
        view.services.keyboard.set_frame(None);
    }
}
