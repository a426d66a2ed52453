//! Layout and selection refresh, coordinate conversion, and the derived
//! properties recomputed after each commit.

use std::rc::Rc;

use crate::commands::Cmd;
use crate::editable::{
    AttributeKey, AttributeValue, AttributedBuffer, Color, Font, Highlight, TextPosition,
    TextRange,
};
use crate::geometry::{Point, Rect, Size};
use crate::layout::{LayoutFrame, SelectionRect, TextLayout, CONTAINER_MAX};
use crate::model::{PlaceholderFrame, TextView, TimerKind};

impl TextView {
    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Mark the layout stale. The refresh runs once, before the next query
    /// that needs geometry or at the end of the turn.
    pub(crate) fn commit_update(&mut self) {
        self.scheduler.commit_update();
    }

    pub(crate) fn update_if_needed(&mut self) {
        if self.scheduler.needs_update() {
            self.update_now();
        }
    }

    /// Relayout and rebuild the selection view immediately
    pub(crate) fn update_now(&mut self) {
        self.scheduler.take_update();
        self.scheduler.record_refresh();
        self.update_layout();
        self.update_selection_view();
    }

    pub(crate) fn commit_placeholder_update(&mut self) {
        self.scheduler.commit_placeholder_update();
    }

    pub(crate) fn update_placeholder_if_needed(&mut self) {
        if self.scheduler.take_placeholder_update() {
            self.scheduler.record_placeholder_refresh();
            self.update_placeholder();
        }
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Bounds minus the content insets, never negative. A bottom inset
    /// raised for the keyboard does not count.
    pub(crate) fn visible_size(&self) -> Size {
        let inset = self
            .viewport
            .original_insets
            .map_or(self.viewport.content_inset, |(content, _)| content);
        let bounds = self.viewport.frame.size();
        Size::new(
            (bounds.width - inset.left - inset.right).max(0.0),
            (bounds.height - inset.top - inset.bottom).max(0.0),
        )
    }

    pub(crate) fn update_inner_container_size(&mut self) {
        let mut size = self.visible_size();
        if self.container.vertical_form {
            size.width = CONTAINER_MAX;
        } else {
            size.height = CONTAINER_MAX;
        }
        self.container.size = size;
    }

    fn update_layout(&mut self) {
        if let Some(placeholder) = self.placeholder.frame.as_mut() {
            placeholder.hidden = !self.inner_text.is_empty();
        }
        let mut text = self.inner_text.clone();
        let detected = self.detect_text(&mut text);
        self.detected_text = detected.then(|| text.clone());

        let caret_at_end = self.selection.selected.end.offset == self.inner_text.len();
        let text = text.with_layout_sentinel(&self.typing_holder, caret_at_end);
        self.layout = self.layout_engine.layout(&text, &self.container);

        let mut size = self
            .layout
            .as_ref()
            .map(|l| l.bounding_size())
            .unwrap_or(Size::ZERO);
        let visible = self.visible_size();
        if self.container.vertical_form {
            size.height = visible.height;
            size.width = size.width.max(visible.width);
        } else {
            size.width = visible.width;
        }
        self.viewport.content_size = size;
        if let Some(highlight) = self.highlight.as_mut() {
            highlight.showing = false;
        }
        tracing::trace!(
            view = self.id.0,
            chars = self.inner_text.len(),
            ?size,
            "layout updated"
        );
    }

    /// Rebuild caret and selection geometry from the current layout
    pub(crate) fn update_selection_view(&mut self) {
        self.overlay.selection.clear();
        let Some(layout) = self.layout.clone() else {
            self.set_dots_visible(false);
            return;
        };

        let selected = match self.tracking.range {
            Some(range) if self.tracking.active => range,
            _ => self.selection.selected,
        };
        let first_responder = self.flags.first_responder;

        let mut rects: Vec<SelectionRect> = Vec::new();
        let mut contains_dot = false;
        let mut caret: Option<(Rect, bool)> = None;

        if let Some(marked) = self.selection.marked {
            rects.extend(layout.selection_rects_without_ends(&marked));
            if selected.is_empty() {
                if let Some(rect) = layout.caret_rect(selected.end) {
                    caret = Some((rect, true));
                }
            } else {
                let ends = layout.selection_rects_only_ends(&selected);
                contains_dot = !ends.is_empty();
                rects.extend(ends);
            }
        } else if selected.is_empty() {
            if first_responder || self.tracking.pre_select {
                if let Some(rect) = layout.caret_rect(selected.end) {
                    let blinks = !self.tracking.caret && !self.tracking.pre_select;
                    caret = Some((rect, blinks));
                }
            }
        } else if (first_responder && !self.flags.delete_confirm)
            || (!first_responder && self.flags.selected_without_edit)
        {
            let all = layout.selection_rects(&selected);
            contains_dot = !all.is_empty();
            rects.extend(all);
        } else if (!first_responder && self.tracking.pre_select)
            || (first_responder && self.flags.delete_confirm)
        {
            rects.extend(layout.selection_rects_without_ends(&selected));
        }

        if let Some(frame) = self.layout_frame() {
            for r in rects.iter_mut() {
                r.rect = frame.from_layout_rect(r.rect);
            }
            if let Some((rect, blinks)) = caret {
                let view = &mut self.overlay.selection;
                view.caret_rect = frame.from_layout_rect(rect);
                view.caret_visible = true;
                view.caret_blinks = blinks;
            }
        }
        self.overlay.selection.rects = rects;

        self.set_dots_visible(contains_dot);
        if contains_dot {
            self.start_timer(TimerKind::SelectionDotFix);
        } else {
            self.end_timer(TimerKind::SelectionDotFix);
        }
    }

    pub(crate) fn set_dots_visible(&mut self, visible: bool) {
        if self.overlay.dots_visible == visible {
            return;
        }
        self.overlay.dots_visible = visible;
        self.emit(if visible {
            Cmd::ShowSelectionDots
        } else {
            Cmd::HideSelectionDots
        });
    }

    // ========================================================================
    // Coordinate conversion
    // ========================================================================

    pub(crate) fn layout_frame(&self) -> Option<LayoutFrame> {
        let layout = self.layout.as_ref()?;
        Some(LayoutFrame {
            bounding_size: layout.bounding_size(),
            container_size: self.container.size,
            view_size: self.viewport.frame.size(),
            vertical_form: self.container.vertical_form,
            alignment: self.vertical_alignment,
        })
    }

    pub(crate) fn to_layout_point(&self, point: Point) -> Point {
        self.layout_frame()
            .map(|f| f.to_layout_point(point))
            .unwrap_or(point)
    }

    pub(crate) fn from_layout_point(&self, point: Point) -> Point {
        self.layout_frame()
            .map(|f| f.from_layout_point(point))
            .unwrap_or(point)
    }

    pub(crate) fn from_layout_rect(&self, rect: Rect) -> Rect {
        self.layout_frame()
            .map(|f| f.from_layout_rect(rect))
            .unwrap_or(rect)
    }

    // ========================================================================
    // Position correction
    // ========================================================================

    pub(crate) fn corrected_position(&self, position: TextPosition) -> TextPosition {
        position.corrected(self.inner_text.len())
    }

    pub(crate) fn corrected_range(&self, range: TextRange) -> TextRange {
        range.corrected(self.inner_text.len())
    }

    // ========================================================================
    // Derived properties
    // ========================================================================

    /// Capture the attributes before the selection end as typing attributes
    pub(crate) fn update_attributes_holder(&mut self) {
        if self.inner_text.is_empty() {
            return;
        }
        let end = self.selection.selected.end.offset;
        let index = end.saturating_sub(1);
        let mut attrs = self.inner_text.attributes_at(index);
        attrs.remove_discontinuous();
        self.typing_holder = attrs;
    }

    /// Recompute the public snapshot, notifying the delegate when the
    /// selected range changed
    pub(crate) fn update_outer_properties(&mut self) {
        self.update_attributes_holder();
        let head = self.inner_text.attributes_at(0);

        let style = head
            .paragraph_style()
            .or_else(|| self.typing_holder.paragraph_style())
            .cloned()
            .unwrap_or_default();
        let font = head
            .font()
            .or_else(|| self.typing_holder.font())
            .cloned()
            .unwrap_or_else(Font::default);
        let color = head
            .foreground_color()
            .or_else(|| self.typing_holder.foreground_color())
            .unwrap_or(Color::BLACK);

        self.outer.text = self.inner_text.text();
        self.outer.font = font;
        self.outer.text_color = color;
        self.outer.alignment = style.alignment;
        self.outer.typing_attributes = self.typing_holder.clone();
        self.set_outer_selected_range();
    }

    pub(crate) fn set_outer_selected_range(&mut self) {
        let range = self.selection.selected.as_range();
        if self.outer.selected_range != range {
            self.outer.selected_range = range;
            self.with_delegate(|d, id| d.did_change_selection(id));
        }
    }

    /// Run the text parser. Returns whether the text changed.
    pub(crate) fn parse_text(&mut self) -> bool {
        let Some(parser) = self.text_parser.clone() else {
            return false;
        };
        let old = self.selection.selected;
        let mut range = old.as_range();

        self.text_will_change();
        let changed = parser.parse_text(&mut self.inner_text, &mut range);
        self.text_did_change();

        let new = self.corrected_range(TextRange::from_range(range));
        if new != old {
            self.selection_will_change();
            self.selection.selected = new;
            self.selection_did_change();
        }
        if changed {
            tracing::debug!(view = self.id.0, "text parser rewrote the text");
        }
        changed
    }

    pub(crate) fn should_detect_text(&self) -> bool {
        self.data_detector.is_some()
            && self.constraints.highlightable
            && !(self.link_text_attributes.is_empty() && self.highlight_text_attributes.is_empty())
            && !self.flags.first_responder
    }

    /// Decorate detected spans with link and highlight attributes
    fn detect_text(&self, text: &mut AttributedBuffer) -> bool {
        if text.is_empty() || !self.should_detect_text() {
            return false;
        }
        let Some(detector) = self.data_detector.as_ref() else {
            return false;
        };
        let spans = detector.detect(&text.text());
        for span in &spans {
            if !self.highlight_text_attributes.is_empty() {
                let highlight = Highlight::with_attributes(self.highlight_text_attributes.clone());
                text.set_attribute(
                    AttributeKey::Highlight,
                    AttributeValue::Highlight(highlight),
                    span.range.clone(),
                );
            }
            if !self.link_text_attributes.is_empty() {
                text.add_attributes(&self.link_text_attributes, span.range.clone());
            }
        }
        !spans.is_empty()
    }

    // ========================================================================
    // Placeholder
    // ========================================================================

    fn update_placeholder(&mut self) {
        self.placeholder.frame = None;
        let Some(text) = self.placeholder.text.clone().filter(|t| !t.is_empty()) else {
            return;
        };
        let bounds = self.viewport.frame.size();
        let mut container = self.container.clone();
        container.size = bounds;
        let Some(layout) = self.layout_engine.layout(&text, &container) else {
            return;
        };
        let size = layout.bounding_size();
        if size.width <= 1.0 || size.height <= 1.0 {
            return;
        }
        let origin = if container.vertical_form {
            Point::new(bounds.width - size.width, 0.0)
        } else {
            Point::ZERO
        };
        self.placeholder.frame = Some(PlaceholderFrame {
            text,
            frame: Rect::from_size(size).with_origin(origin),
            hidden: !self.inner_text.is_empty(),
        });
    }

    /// Layout used to draw the highlight of `range`, built from the
    /// decorated text when detection ran
    pub(crate) fn build_highlight_layout(
        &self,
        highlight: &Highlight,
        range: std::ops::Range<usize>,
    ) -> Option<Rc<dyn TextLayout>> {
        let mut text = self
            .detected_text
            .clone()
            .unwrap_or_else(|| self.inner_text.clone());
        text.add_attributes(&highlight.attributes, range);
        let caret_at_end = self.selection.selected.end.offset == self.inner_text.len();
        let text = text.with_layout_sentinel(&self.typing_holder, caret_at_end);
        self.layout_engine.layout(&text, &self.container)
    }
}
