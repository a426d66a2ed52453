//! Timer arming and the handlers run when the host reports a firing

use crate::commands::Cmd;
use crate::editable::TextRange;
use crate::geometry::Rect;
use crate::messages::TimerMsg;
use crate::model::{TextView, TimerKind};

impl TextView {
    /// Arm `kind`, replacing a pending timer of the same kind
    pub(crate) fn start_timer(&mut self, kind: TimerKind) {
        let (token, previous) = self.timers.arm(kind);
        if let Some(previous) = previous {
            self.emit(Cmd::CancelTimer {
                kind,
                token: previous,
            });
        }
        self.emit(Cmd::ScheduleTimer {
            kind,
            token,
            delay_ms: self.timings.delay_ms(kind),
            repeating: kind.is_repeating(),
        });
    }

    pub(crate) fn end_timer(&mut self, kind: TimerKind) {
        if let Some(token) = self.timers.cancel(kind) {
            self.emit(Cmd::CancelTimer { kind, token });
        }
    }

    pub(crate) fn handle_timer(&mut self, msg: TimerMsg) {
        let TimerMsg::Fired { kind, token } = msg;
        if !self.timers.accept(kind, token) {
            tracing::trace!(view = self.id.0, ?kind, token = token.0, "stale timer ignored");
            return;
        }
        match kind {
            TimerKind::LongPress => self.track_did_long_press(),
            TimerKind::AutoScroll => self.track_did_tick_auto_scroll(),
            TimerKind::SelectionDotFix => {
                // The host may have moved the view; re-place the dots
                if self.overlay.dots_visible {
                    self.emit(Cmd::HideSelectionDots);
                    self.emit(Cmd::ShowSelectionDots);
                }
            }
            TimerKind::TouchGuard => self.flags.ignore_touch_began = false,
            TimerKind::DeferredFocus => {
                if self.can_become_first_responder() {
                    self.become_first_responder();
                }
            }
            TimerKind::DeferredScroll => self.scroll_selected_range_to_visible(),
        }
    }

    // ========================================================================
    // Long press
    // ========================================================================

    fn track_did_long_press(&mut self) {
        self.end_timer(TimerKind::LongPress);

        let mut handled = false;
        let showing = self.highlight.as_ref().filter(|h| h.showing).cloned();
        if let Some(active) = showing {
            self.hide_menu();
            let rect = self.rect_for_highlight(&active.range);
            if let Some(action) = active.highlight.long_press_action.clone() {
                handled = true;
                action(&self.highlight_event(active.range.clone(), rect));
                self.end_touch_tracking();
            } else {
                let id = self.id;
                let delegated = self.with_delegate(|d, _| {
                    if d.should_long_press_highlight(id, &active.highlight, active.range.clone()) {
                        d.did_long_press_highlight(id, &active.highlight, active.range.clone(), rect);
                        true
                    } else {
                        false
                    }
                });
                if delegated == Some(true) {
                    handled = true;
                    self.end_touch_tracking();
                }
            }
        }
        if handled {
            return;
        }

        self.remove_highlight();
        if !self.tracking.active {
            return;
        }
        if self.tracking.grabber.is_some() {
            self.set_scroll_enabled(false);
            self.hide_menu();
            self.show_magnifier_ranged();
        } else if self.flags.first_responder {
            self.set_scroll_enabled(false);
            self.overlay.selection.caret_blinks = false;
            self.tracking.caret = true;
            if let Some(position) = self.tracking_caret_position() {
                self.tracking.range = Some(TextRange::caret(position));
                self.update_selection_view();
            }
            self.hide_menu();
            if self.selection.marked.is_some() {
                self.show_magnifier_ranged();
            } else {
                self.show_magnifier_caret();
            }
        } else if self.constraints.selectable {
            self.set_scroll_enabled(false);
            self.tracking.pre_select = true;
            self.flags.selected_without_edit = false;
            self.update_range_by_tracking_pre_select();
            self.update_selection_view();
            self.show_magnifier_caret();
        }
        tracing::debug!(view = self.id.0, mode = ?self.tracking_mode(), "long press");
    }

    pub(crate) fn rect_for_highlight(&self, range: &std::ops::Range<usize>) -> Rect {
        self.layout
            .as_ref()
            .and_then(|l| l.rect_for_range(&TextRange::from_range(range.clone())))
            .map(|r| self.from_layout_rect(r))
            .unwrap_or(Rect::ZERO)
    }

    // ========================================================================
    // Auto-scroll
    // ========================================================================

    pub(crate) fn start_auto_scroll_timer(&mut self) {
        if !self.timers.is_armed(TimerKind::AutoScroll) {
            self.start_timer(TimerKind::AutoScroll);
        }
    }

    /// Stop auto-scrolling and let the magnifiers capture again
    pub(crate) fn end_auto_scroll_timer(&mut self) {
        if self.tracking.auto_scroll_ticked {
            self.emit(Cmd::FlashScrollIndicators);
        }
        self.end_timer(TimerKind::AutoScroll);
        self.tracking.auto_scroll_offset = 0.0;
        self.tracking.auto_scroll_acceleration = 0;
        self.tracking.auto_scroll_ticked = false;

        if self.overlay.caret_magnifier.capture_disabled {
            self.overlay.caret_magnifier.capture_disabled = false;
            if self.overlay.caret_magnifier.visible {
                self.show_magnifier_caret();
            }
        }
        if self.overlay.ranged_magnifier.capture_disabled {
            self.overlay.ranged_magnifier.capture_disabled = false;
            if self.overlay.ranged_magnifier.visible {
                self.show_magnifier_ranged();
            }
        }
    }

    fn track_did_tick_auto_scroll(&mut self) {
        let step = self.tracking.auto_scroll_offset;
        if step == 0.0 {
            self.end_auto_scroll_timer();
            return;
        }
        self.overlay.caret_magnifier.capture_disabled = true;
        self.overlay.ranged_magnifier.capture_disabled = true;

        let vertical = self.container.vertical_form;
        let viewport = self.viewport;
        let inset = viewport.content_inset;
        let current = viewport.content_offset;
        let acceleration = self.tracking.auto_scroll_acceleration as f64;
        let boost = if acceleration > 0.0 {
            step.signum() * acceleration * acceleration * 0.5
        } else {
            0.0
        };
        self.tracking.auto_scroll_acceleration += 1;

        let mut offset = current;
        if vertical {
            let max = viewport.content_size.width - viewport.frame.width + inset.right;
            offset.x = (offset.x + step + boost).round();
            if step > 0.0 {
                offset.x = offset.x.min(max);
            }
            offset.x = offset.x.max(-inset.left);
        } else {
            let max = viewport.content_size.height - viewport.frame.height + inset.bottom;
            offset.y = (offset.y + step + boost).round();
            if step > 0.0 {
                offset.y = offset.y.min(max);
            }
            offset.y = offset.y.max(-inset.top);
        }

        let moved = if vertical {
            (offset.x - current.x).abs() > 0.5
        } else {
            (offset.y - current.y).abs() > 0.5
        };
        if !moved {
            self.end_auto_scroll_timer();
            return;
        }

        self.tracking.auto_scroll_ticked = true;
        self.tracking.point = self
            .tracking
            .point
            .offset(offset.x - current.x, offset.y - current.y);
        self.viewport.content_offset = offset;
        self.emit(Cmd::SetContentOffset {
            offset,
            animated: true,
        });

        if !self.tracking.active {
            return;
        }
        if self.tracking.grabber.is_some() {
            self.show_magnifier_ranged();
            self.update_range_by_tracking_grabber();
        } else if self.tracking.pre_select {
            self.show_magnifier_caret();
            self.update_range_by_tracking_pre_select();
        } else if self.tracking.caret {
            if self.selection.marked.is_some() {
                self.show_magnifier_ranged();
            } else {
                self.show_magnifier_caret();
            }
            self.update_range_by_tracking_caret();
        }
        self.update_selection_view();
    }
}
