//! Touch tracking: caret drags, grabber drags, long-press pre-selection,
//! highlight taps, and the menu, magnifier and highlight overlays they drive

use std::ops::Range;

use crate::commands::{Cmd, MagnifierStyle};
use crate::editable::{
    enclosing_range, AttributeKey, AttributeValue, Highlight, HighlightEvent, TextPosition,
    TextRange,
};
use crate::geometry::{clamp, Point, Rect};
use crate::layout::LayoutDirection;
use crate::messages::TouchMsg;
use crate::model::{ActiveHighlight, Grabber, MoveDirection, TextView, TimerKind};
use crate::services::StorageDirection;

/// Vertical nudge applied to the touch while dragging a grabber
const MAGNIFIER_RANGED_TRACK_FIX: f64 = -6.0;
const MAGNIFIER_RANGED_POPOVER_OFFSET: f64 = 4.0;
const MAGNIFIER_RANGED_CAPTURE_OFFSET: f64 = -6.0;

impl TextView {
    pub(crate) fn handle_touch(&mut self, msg: TouchMsg) {
        match msg {
            TouchMsg::Began { point, time_ms } => self.touch_began(point, time_ms),
            TouchMsg::Moved { point, time_ms } => self.touch_moved(point, time_ms),
            TouchMsg::Ended { point, time_ms } => self.touch_ended(point, time_ms),
            TouchMsg::Cancelled => {
                self.end_touch_tracking();
                self.hide_menu();
            }
        }
    }

    // ========================================================================
    // Touch phases
    // ========================================================================

    fn touch_began(&mut self, point: Point, time_ms: u64) {
        self.update_if_needed();
        self.tracking.begin(point, time_ms, self.selection.selected);

        if !self.flags.first_responder
            && !self.flags.selected_without_edit
            && self.constraints.highlightable
        {
            self.highlight = self
                .get_highlight(point)
                .map(|(highlight, range)| ActiveHighlight {
                    highlight,
                    range,
                    layout: None,
                    showing: false,
                });
        }

        if (!self.constraints.selectable && self.highlight.is_none())
            || self.flags.ignore_touch_began
        {
            self.tracking.swallow = false;
            self.tracking.active = false;
            return;
        }

        self.start_timer(TimerKind::LongPress);
        if self.highlight.is_some() {
            self.show_highlight();
        } else if let Some(grabber) = self.overlay.selection.grabber_at(point) {
            self.set_scroll_enabled(false);
            self.hide_menu();
            self.tracking.grabber = Some(grabber);
            self.tracking.magnifier_ranged_offset = self.magnifier_ranged_offset();
        } else if self.selection.selected.is_empty()
            && self.flags.first_responder
            && self.overlay.selection.caret_contains(point)
        {
            self.tracking.caret = true;
            self.set_scroll_enabled(false);
        }
        self.update_selection_view();
        tracing::trace!(view = self.id.0, mode = ?self.tracking_mode(), "touch began");
    }

    fn touch_moved(&mut self, point: Point, time_ms: u64) {
        self.update_if_needed();
        self.tracking.point = point;
        self.tracking.time_ms = time_ms;

        if self.tracking.moved == MoveDirection::None {
            self.tracking.moved = self.tracking.move_direction(self.timings.allowable_movement);
            if self.tracking.moved.is_moved() {
                self.end_timer(TimerKind::LongPress);
            }
        }
        self.flags.clears_on_insertion_once = false;

        if self.tracking.active {
            let mut magnifier = None;
            if let Some(current) = self.highlight.as_ref().map(|h| h.highlight.clone()) {
                let under = self.get_highlight(point).map(|(h, _)| h);
                if under.as_ref() == Some(&current) {
                    self.show_highlight();
                } else {
                    self.hide_highlight();
                }
            } else {
                self.tracking.range = Some(self.selection.selected);
                if self.tracking.grabber.is_some() {
                    self.set_scroll_enabled(false);
                    self.hide_menu();
                    self.update_range_by_tracking_grabber();
                    magnifier = Some(MagnifierStyle::Ranged);
                } else if self.tracking.pre_select {
                    self.update_range_by_tracking_pre_select();
                    magnifier = Some(MagnifierStyle::Caret);
                } else if (self.tracking.caret
                    || self.selection.marked.is_some()
                    || self.flags.first_responder)
                    && (self.tracking.caret || self.tracking.moved.is_moved())
                {
                    self.tracking.caret = true;
                    self.hide_menu();
                    let across = if self.container.vertical_form {
                        self.tracking.moved.is_vertical()
                    } else {
                        self.tracking.moved.is_horizontal()
                    };
                    if across {
                        self.set_scroll_enabled(false);
                    }
                    self.update_range_by_tracking_caret();
                    magnifier = Some(if self.selection.marked.is_some() {
                        MagnifierStyle::Ranged
                    } else {
                        MagnifierStyle::Caret
                    });
                }
            }
            self.update_selection_view();
            match magnifier {
                Some(MagnifierStyle::Caret) => self.show_magnifier_caret(),
                Some(MagnifierStyle::Ranged) => self.show_magnifier_ranged(),
                None => {}
            }
        }

        let offset = self.autoscroll_offset();
        if offset != self.tracking.auto_scroll_offset {
            if offset.abs() < self.tracking.auto_scroll_offset.abs() {
                self.tracking.auto_scroll_acceleration /= 2;
            }
            self.tracking.auto_scroll_offset = offset;
            if offset != 0.0 && self.tracking.moved.is_moved() {
                self.start_auto_scroll_timer();
            }
        }
    }

    fn touch_ended(&mut self, point: Point, time_ms: u64) {
        self.update_if_needed();
        self.tracking.point = point;
        self.tracking.time_ms = time_ms;
        if self.tracking.moved == MoveDirection::None {
            self.tracking.moved = self.tracking.move_direction(self.timings.allowable_movement);
        }
        if !self.tracking.active {
            return;
        }
        self.hide_magnifier();

        let moved = self.tracking.moved.is_moved();
        if let Some(active) = self.highlight.clone() {
            if active.showing {
                self.tap_highlight(&active);
                self.remove_highlight();
            }
        } else if self.tracking.caret {
            if moved {
                self.update_range_by_tracking_caret();
                self.show_menu();
            } else {
                self.toggle_menu();
            }
        } else if self.tracking.grabber.is_some() {
            self.update_range_by_tracking_grabber();
            self.show_menu();
        } else if self.tracking.pre_select {
            self.update_range_by_tracking_pre_select();
            if self.tracking.range.is_some_and(|r| !r.is_empty()) {
                self.flags.selected_without_edit = true;
                self.show_menu();
            } else {
                self.start_timer(TimerKind::DeferredFocus);
            }
        } else if self.flags.delete_confirm || self.selection.marked.is_some() {
            self.update_range_by_tracking_caret();
            self.hide_menu();
        } else if !moved {
            if self.flags.selected_without_edit {
                self.flags.selected_without_edit = false;
                self.hide_menu();
            } else if self.flags.first_responder {
                let old = self.tracking.range;
                self.update_range_by_tracking_caret();
                if old == self.tracking.range {
                    self.toggle_menu();
                } else {
                    self.hide_menu();
                }
            } else {
                self.hide_menu();
                if self.flags.clears_on_insertion_once {
                    self.flags.clears_on_insertion_once = false;
                    self.tracking.range = Some(TextRange::with_range(0, self.inner_text.len()));
                } else {
                    self.update_range_by_tracking_caret();
                }
                self.start_timer(TimerKind::DeferredFocus);
            }
        }

        if let Some(range) = self.tracking.range {
            let changed = range != self.selection.selected;
            if changed || self.tracking.pre_select {
                if changed {
                    self.selection_will_change();
                    self.selection.selected = range;
                    self.selection_did_change();
                    self.update_attributes_holder();
                    self.update_outer_properties();
                }
                if self.tracking.grabber.is_none() && !self.tracking.pre_select {
                    self.scroll_range_to_visible(self.selection.selected);
                }
            }
        }
        self.end_touch_tracking();
    }

    /// Reset tracking and every overlay it drove
    pub(crate) fn end_touch_tracking(&mut self) {
        if !self.tracking.active {
            return;
        }
        self.tracking.active = false;
        self.tracking.grabber = None;
        self.tracking.caret = false;
        self.tracking.pre_select = false;
        self.tracking.moved = MoveDirection::None;
        self.tracking.range = None;
        self.flags.delete_confirm = false;
        self.flags.clears_on_insertion_once = false;
        self.overlay.selection.caret_blinks = true;

        self.remove_highlight();
        self.hide_magnifier();
        self.end_timer(TimerKind::LongPress);
        self.end_auto_scroll_timer();
        self.update_selection_view();
        self.set_scroll_enabled(true);
    }

    /// Lock or unlock panning. Unlocking respects the scroll-enabled property.
    pub(crate) fn set_scroll_enabled(&mut self, enabled: bool) {
        let locked = !enabled;
        if self.flags.scroll_locked == locked {
            return;
        }
        self.flags.scroll_locked = locked;
        self.emit(Cmd::SetScrollEnabled(enabled && self.viewport.scroll_enabled));
    }

    // ========================================================================
    // Candidate range
    // ========================================================================

    /// Closest position to the touch, kept inside the marked text
    pub(crate) fn tracking_caret_position(&self) -> Option<TextPosition> {
        let layout = self.layout.as_ref()?;
        let point = self.to_layout_point(self.tracking.point);
        let position = self.corrected_position(layout.closest_position(point)?);
        Some(match self.selection.marked {
            Some(marked) => marked.clamp(position),
            None => position,
        })
    }

    pub(crate) fn update_range_by_tracking_caret(&mut self) {
        if !self.tracking.active {
            return;
        }
        if let Some(position) = self.tracking_caret_position() {
            self.tracking.range = Some(TextRange::caret(position));
        }
    }

    pub(crate) fn update_range_by_tracking_grabber(&mut self) {
        if !self.tracking.active {
            return;
        }
        let Some(grabber) = self.tracking.grabber else {
            return;
        };
        let Some(layout) = self.layout.clone() else {
            return;
        };
        let selected = self.selection.selected;
        let (old, other) = match grabber {
            Grabber::Start => (selected.start, selected.end),
            Grabber::End => (selected.end, selected.start),
        };
        let point = self.to_layout_point(
            self.tracking
                .point
                .offset(0.0, MAGNIFIER_RANGED_TRACK_FIX),
        );
        let Some(position) = layout.position_for_grabber(point, old, other) else {
            return;
        };
        let position = self.corrected_position(position);
        self.tracking.range = Some(match grabber {
            Grabber::Start => TextRange::new(position, selected.end),
            Grabber::End => TextRange::new(selected.start, position),
        });
    }

    pub(crate) fn update_range_by_tracking_pre_select(&mut self) {
        if !self.tracking.active {
            return;
        }
        self.tracking.range = self.closest_token_range_at_point(self.tracking.point);
    }

    // ========================================================================
    // Word granularity
    // ========================================================================

    fn word_range(&self, text: &str, position: TextPosition, dir: StorageDirection) -> Option<TextRange> {
        self.tokenizer
            .word_range_enclosing(text, position.offset, dir)
            .map(TextRange::from_range)
    }

    /// Widen `range` so neither end splits a cluster
    fn extend_to_clusters(&self, range: TextRange) -> TextRange {
        let Some(layout) = self.layout.as_ref() else {
            return range;
        };
        match (
            layout.cluster_range_at(range.start),
            layout.cluster_range_at(range.end),
        ) {
            (Some(s), Some(e)) => {
                enclosing_range(&[s.start, s.end, e.start, e.end]).unwrap_or(range)
            }
            _ => range,
        }
    }

    /// The word around `position`, falling back to the neighbouring cluster
    /// and finally to the whole text
    pub(crate) fn closest_token_range_at_position(
        &self,
        position: TextPosition,
    ) -> Option<TextRange> {
        let position = self.corrected_position(position);
        let text = self.inner_text.text();
        let word = self
            .word_range(&text, position, StorageDirection::Forward)
            .filter(|r| !r.is_empty())
            .or_else(|| self.word_range(&text, position, StorageDirection::Backward))
            .filter(|r| !r.is_empty());

        let range = match word {
            Some(word) => self.extend_to_clusters(word),
            None => {
                let layout = self.layout.as_ref()?;
                let extend = |dir| {
                    layout
                        .range_by_extending(position, dir, 1)
                        .map(|r| self.corrected_range(r))
                };
                match extend(LayoutDirection::Right).filter(|r| !r.is_empty()) {
                    Some(r) => r,
                    None => extend(LayoutDirection::Left)?,
                }
            }
        };
        let mut range = self.corrected_range(range);
        if range.is_empty() {
            range = TextRange::with_range(0, self.inner_text.len());
        }
        Some(self.corrected_range(range))
    }

    /// The words touched around `point` (content coordinates)
    pub(crate) fn closest_token_range_at_point(&self, point: Point) -> Option<TextRange> {
        let layout = self.layout.as_ref()?;
        let touched = layout
            .closest_text_range(self.to_layout_point(point))
            .map(|r| self.corrected_range(r));

        let mut range = touched.map(|touched| {
            let text = self.inner_text.text();
            let before = self.word_range(&text, touched.end, StorageDirection::Backward);
            let after = self.word_range(&text, touched.start, StorageDirection::Forward);
            let words = match (after, before) {
                (Some(a), Some(b)) => {
                    enclosing_range(&[a.start, a.end, b.start, b.end]).unwrap_or(touched)
                }
                _ => touched,
            };
            self.extend_to_clusters(words)
        });

        let len = self.inner_text.len();
        if len > 0 && range.map_or(true, |r| r.is_empty()) {
            range = Some(TextRange::with_range(0, len));
        }
        Some(range.unwrap_or_default())
    }

    // ========================================================================
    // Highlight
    // ========================================================================

    /// Highlight span under `point`, unless the delegate declines both its
    /// tap and long press
    pub(crate) fn get_highlight(&self, point: Point) -> Option<(Highlight, Range<usize>)> {
        if !self.constraints.highlightable {
            return None;
        }
        let layout = self.layout.as_ref()?;
        let touched = layout.text_range_at(self.to_layout_point(point))?;
        let touched = self.corrected_range(touched);

        let len = self.inner_text.len();
        let mut index = touched.start.offset;
        if index == len {
            index = index.checked_sub(1)?;
        }
        let text = self.detected_text.as_ref().unwrap_or(&self.inner_text);
        let highlight = match text.attribute_at(&AttributeKey::Highlight, index)? {
            AttributeValue::Highlight(h) => h.clone(),
            _ => return None,
        };
        let range = text.longest_effective_range(&AttributeKey::Highlight, index)?;

        if !highlight.has_actions() {
            let id = self.id;
            let allowed = self.with_delegate(|d, _| {
                d.should_tap_highlight(id, &highlight, range.clone())
                    || d.should_long_press_highlight(id, &highlight, range.clone())
            });
            if allowed == Some(false) {
                return None;
            }
        }
        Some((highlight, range))
    }

    fn tap_highlight(&mut self, active: &ActiveHighlight) {
        let rect = self.rect_for_highlight(&active.range);
        if let Some(action) = active.highlight.tap_action.clone() {
            action(&self.highlight_event(active.range.clone(), rect));
            return;
        }
        let id = self.id;
        self.with_delegate(|d, _| {
            if d.should_tap_highlight(id, &active.highlight, active.range.clone()) {
                d.did_tap_highlight(id, &active.highlight, active.range.clone(), rect);
            }
        });
        tracing::debug!(view = id.0, range = ?active.range, "highlight tapped");
    }

    pub(crate) fn highlight_event(&self, range: Range<usize>, rect: Rect) -> HighlightEvent {
        HighlightEvent {
            text: self.inner_text.text(),
            range,
            rect,
        }
    }

    /// Draw the highlight layout, building it on first use
    pub(crate) fn show_highlight(&mut self) {
        let Some(active) = self.highlight.as_ref() else {
            return;
        };
        if active.layout.is_none() {
            let layout = self.build_highlight_layout(&active.highlight, active.range.clone());
            match (layout, self.highlight.as_mut()) {
                (Some(layout), Some(active)) => active.layout = Some(layout),
                _ => {
                    self.highlight = None;
                    return;
                }
            }
        }
        if let Some(active) = self.highlight.as_mut() {
            if !active.showing {
                active.showing = true;
                self.emit(Cmd::Redraw);
            }
        }
    }

    /// Go back to the plain layout, keeping the highlight for a re-show
    pub(crate) fn hide_highlight(&mut self) {
        if let Some(active) = self.highlight.as_mut() {
            if active.showing {
                active.showing = false;
                self.emit(Cmd::Redraw);
            }
        }
    }

    pub(crate) fn remove_highlight(&mut self) {
        self.hide_highlight();
        self.highlight = None;
    }

    // ========================================================================
    // Magnifiers
    // ========================================================================

    pub(crate) fn show_magnifier_caret(&mut self) {
        if self.overlay.ranged_magnifier.visible {
            self.overlay.ranged_magnifier.visible = false;
            self.emit(Cmd::HideMagnifier {
                style: MagnifierStyle::Ranged,
            });
        }
        let point = self.tracking.point;
        let magnifier = &mut self.overlay.caret_magnifier;
        magnifier.visible = true;
        magnifier.popover_center = point;
        magnifier.capture_center = point;
        let capture_disabled = magnifier.capture_disabled;
        self.emit(Cmd::ShowMagnifier {
            style: MagnifierStyle::Caret,
            popover_center: point,
            capture_center: point,
            capture_disabled,
        });
    }

    /// Show the ranged loupe pinned to the line of the dragged edge. Vertical
    /// text uses the caret loupe.
    pub(crate) fn show_magnifier_ranged(&mut self) {
        if self.container.vertical_form {
            self.show_magnifier_caret();
            return;
        }
        if self.overlay.caret_magnifier.visible {
            self.overlay.caret_magnifier.visible = false;
            self.emit(Cmd::HideMagnifier {
                style: MagnifierStyle::Caret,
            });
        }
        let Some(layout) = self.layout.clone() else {
            return;
        };

        let selected = match self.tracking.range {
            Some(range) if self.tracking.active => range,
            _ => self.selection.selected,
        };
        let position = if self.selection.marked.is_some() {
            Some(selected.end)
        } else {
            let point = self.to_layout_point(
                self.tracking
                    .point
                    .offset(0.0, MAGNIFIER_RANGED_TRACK_FIX),
            );
            let (old, other) = match self.tracking.grabber {
                Some(Grabber::Start) => (selected.start, selected.end),
                _ => (selected.end, selected.start),
            };
            layout.position_for_grabber(point, old, other)
        };
        let Some(position) = position else {
            return;
        };
        let Some(line) = layout
            .line_index_for_position(position)
            .and_then(|i| layout.lines().get(i))
        else {
            return;
        };
        let caret_x = layout
            .caret_rect(position)
            .map_or(line.position.x, |r| r.x);
        let line_point = self.from_layout_point(Point::new(caret_x, line.position.y));

        let popover_center = line_point.offset(0.0, self.tracking.magnifier_ranged_offset);
        let capture_center = line_point.offset(0.0, MAGNIFIER_RANGED_CAPTURE_OFFSET);
        let magnifier = &mut self.overlay.ranged_magnifier;
        magnifier.visible = true;
        magnifier.popover_center = popover_center;
        magnifier.capture_center = capture_center;
        let capture_disabled = magnifier.capture_disabled;
        self.emit(Cmd::ShowMagnifier {
            style: MagnifierStyle::Ranged,
            popover_center,
            capture_center,
            capture_disabled,
        });
    }

    /// Re-send the visible loupes so the host can move them
    pub(crate) fn update_magnifier(&mut self) {
        for (style, magnifier) in [
            (MagnifierStyle::Caret, self.overlay.caret_magnifier),
            (MagnifierStyle::Ranged, self.overlay.ranged_magnifier),
        ] {
            if magnifier.visible {
                self.emit(Cmd::ShowMagnifier {
                    style,
                    popover_center: magnifier.popover_center,
                    capture_center: magnifier.capture_center,
                    capture_disabled: magnifier.capture_disabled,
                });
            }
        }
    }

    /// Hide both loupes. Touches are ignored briefly afterwards so the
    /// closing animation is not mistaken for a new tap.
    pub(crate) fn hide_magnifier(&mut self) {
        if !self.overlay.magnifier_visible() {
            return;
        }
        self.flags.ignore_touch_began = true;
        self.start_timer(TimerKind::TouchGuard);
        if self.overlay.caret_magnifier.visible {
            self.overlay.caret_magnifier.visible = false;
            self.emit(Cmd::HideMagnifier {
                style: MagnifierStyle::Caret,
            });
        }
        if self.overlay.ranged_magnifier.visible {
            self.overlay.ranged_magnifier.visible = false;
            self.emit(Cmd::HideMagnifier {
                style: MagnifierStyle::Ranged,
            });
        }
    }

    /// Distance from the dragged line's baseline to the touch, captured when
    /// a grabber drag starts
    fn magnifier_ranged_offset(&self) -> f64 {
        let Some(layout) = self.layout.as_ref() else {
            return 0.0;
        };
        let point = self
            .to_layout_point(self.tracking.point)
            .offset(0.0, MAGNIFIER_RANGED_TRACK_FIX);
        let line = layout
            .closest_position(point)
            .and_then(|p| layout.line_index_for_position(p))
            .and_then(|i| layout.lines().get(i));
        match line {
            Some(line) => {
                let y = clamp(point.y, line.bounds.min_y(), line.bounds.max_y());
                y - line.position.y + MAGNIFIER_RANGED_POPOVER_OFFSET
            }
            None => 0.0,
        }
    }

    // ========================================================================
    // Menu
    // ========================================================================

    /// Present the edit menu at the caret or the visible part of the
    /// selection, avoiding the keyboard
    pub(crate) fn show_menu(&mut self) {
        let view = &self.overlay.selection;
        let rect = if view.caret_visible {
            view.caret_rect
        } else if let Some(union) = view.rects.iter().map(|r| r.rect).reduce(|a, b| a.union(&b)) {
            let bounds = self.viewport.bounds();
            let mut rect = match union.intersection(&bounds) {
                Some(inter) if inter.height > 1.0 => inter,
                _ => {
                    let y = if union.min_y() < bounds.min_y() {
                        bounds.min_y()
                    } else {
                        bounds.max_y()
                    };
                    Rect::new(union.x, y, union.width, 1.0)
                }
            };
            if let Some(keyboard) = self.keyboard_rect_in_content() {
                if let Some(inter) = rect.intersection(&keyboard) {
                    if inter.height > 1.0 && inter.width > 1.0 {
                        if inter.min_y() > rect.min_y() {
                            rect.height -= inter.height;
                        } else if inter.max_y() < rect.max_y() {
                            rect.y += inter.height;
                            rect.height -= inter.height;
                        }
                    }
                }
            }
            rect
        } else {
            Rect::from_size(self.viewport.content_size)
        };

        let target = rect.standardized();
        self.overlay.menu_visible = true;
        self.overlay.menu_target = Some(target);
        self.emit(Cmd::ShowMenu { target });
    }

    pub(crate) fn hide_menu(&mut self) {
        if self.overlay.menu_visible {
            self.overlay.menu_visible = false;
            self.overlay.menu_target = None;
            self.emit(Cmd::HideMenu);
        }
    }

    fn toggle_menu(&mut self) {
        if self.overlay.menu_visible {
            self.hide_menu();
        } else {
            self.show_menu();
        }
    }

    // ========================================================================
    // Auto-scroll
    // ========================================================================

    /// Scroll step for a touch dragged past the visible area, zero inside it
    fn autoscroll_offset(&self) -> f64 {
        if !self.tracking.active {
            return 0.0;
        }
        let viewport = &self.viewport;
        let mut bounds = Rect::from_size(viewport.frame.size());
        if self.flags.first_responder && !self.container.vertical_form {
            if let Some(keyboard) = self.keyboard_rect_in_view() {
                if let Some(inter) = bounds.intersection(&keyboard) {
                    if inter.height > 1.0 && inter.width > 1.0 && inter.min_y() > bounds.min_y() {
                        bounds.height -= inter.height;
                    }
                }
            }
        }

        let max = self.timings.max_auto_scroll_step;
        let inset = viewport.content_inset;
        let point = self
            .tracking
            .point
            .offset(-viewport.content_offset.x, -viewport.content_offset.y);
        let (pos, low, high) = if self.container.vertical_form {
            (point.x, inset.left, bounds.width)
        } else {
            (point.y, inset.top, bounds.height)
        };
        if pos < low {
            ((pos - low - 5.0) * 0.5).max(-max)
        } else if pos > high {
            ((pos - high + 5.0) * 0.5).min(max)
        } else {
            0.0
        }
    }
}
