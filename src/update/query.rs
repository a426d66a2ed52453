//! Text-input protocol surface: read-only queries plus the mutating calls,
//! which go through `dispatch` like any other message.

use std::cmp::Ordering;

use crate::editable::{
    Affinity, Attributes, TextPosition, TextRange, WritingDirection,
};
use crate::geometry::{Point, Rect};
use crate::layout::{LayoutDirection, SelectionRect};
use crate::messages::{InputMsg, Msg, ViewportMsg};
use crate::model::TextView;
use crate::protocol::{KeyInput, ScrollForwarding, TextInput};
use crate::services::StorageDirection;

use super::dispatch;

const MIN_CARET_THICKNESS: f64 = 2.0;

impl KeyInput for TextView {
    fn has_text(&self) -> bool {
        !self.inner_text.is_empty()
    }

    fn insert_text(&mut self, text: &str) {
        dispatch(self, Msg::Input(InputMsg::InsertText(text.to_string())));
    }

    fn delete_backward(&mut self) {
        dispatch(self, Msg::Input(InputMsg::DeleteBackward));
    }
}

impl TextInput for TextView {
    fn text_in_range(&self, range: TextRange) -> String {
        let range = self.corrected_range(range);
        self.inner_text.plain_text(range.as_range())
    }

    fn replace(&mut self, range: TextRange, text: &str) {
        dispatch(
            self,
            Msg::Input(InputMsg::Replace {
                range,
                text: text.to_string(),
            }),
        );
    }

    fn selected_text_range(&self) -> TextRange {
        self.selection.selected
    }

    fn set_selected_text_range(&mut self, range: TextRange) {
        dispatch(self, Msg::Input(InputMsg::SetSelectedTextRange(range)));
    }

    fn marked_text_range(&self) -> Option<TextRange> {
        self.selection.marked
    }

    fn set_marked_text(&mut self, text: &str, selected_range: TextRange) {
        dispatch(
            self,
            Msg::Input(InputMsg::SetMarkedText {
                text: text.to_string(),
                selected_range,
            }),
        );
    }

    fn unmark_text(&mut self) {
        dispatch(self, Msg::Input(InputMsg::UnmarkText));
    }

    // ========================================================================
    // Positions
    // ========================================================================

    fn beginning_of_document(&self) -> TextPosition {
        TextPosition::new(0)
    }

    fn end_of_document(&self) -> TextPosition {
        TextPosition::new(self.inner_text.len())
    }

    fn text_range(&self, from: TextPosition, to: TextPosition) -> TextRange {
        self.corrected_range(TextRange::new(from, to))
    }

    fn position_from(&mut self, position: TextPosition, offset: isize) -> Option<TextPosition> {
        if offset == 0 {
            return Some(self.corrected_position(position));
        }
        let len = self.inner_text.len();
        let location = position.offset as isize + offset;
        if location < 0 || location > len as isize {
            return None;
        }
        let mut location = location as usize;
        if location > 0 && location < len {
            // Land on a cluster boundary, never inside a combined emoji
            self.update_if_needed();
            let cluster = self
                .layout
                .as_ref()
                .and_then(|l| l.cluster_range_at(TextPosition::new(location)));
            if let Some(cluster) = cluster.filter(|c| !c.is_empty()) {
                location = if offset < 0 {
                    cluster.start.offset
                } else {
                    cluster.end.offset
                };
            }
        }
        Some(self.corrected_position(TextPosition::new(location)))
    }

    fn position_in_direction(
        &mut self,
        position: TextPosition,
        direction: LayoutDirection,
        offset: isize,
    ) -> Option<TextPosition> {
        self.update_if_needed();
        let layout = self.layout.clone()?;
        let range = layout.range_by_extending(position, direction, offset)?;

        let mut forward = if self.container.vertical_form {
            matches!(direction, LayoutDirection::Left | LayoutDirection::Down)
        } else {
            matches!(direction, LayoutDirection::Down | LayoutDirection::Right)
        };
        if !forward && offset < 0 {
            forward = true;
        }
        let mut result = if forward { range.end } else { range.start };
        let len = self.inner_text.len();
        if result.offset > len {
            result = TextPosition::with_affinity(len, Affinity::Backward);
        }
        Some(self.corrected_position(result))
    }

    fn compare(&self, a: TextPosition, b: TextPosition) -> Ordering {
        a.compare(&b)
    }

    fn offset_between(&self, from: TextPosition, to: TextPosition) -> isize {
        to.offset as isize - from.offset as isize
    }

    fn position_within_range_farthest(
        &self,
        range: TextRange,
        direction: LayoutDirection,
    ) -> TextPosition {
        let range = self.corrected_range(range);
        match direction {
            LayoutDirection::Left | LayoutDirection::Up => range.start,
            LayoutDirection::Right | LayoutDirection::Down => {
                self.corrected_position(TextPosition::with_affinity(
                    range.end.offset,
                    Affinity::Backward,
                ))
            }
        }
    }

    fn character_range_by_extending(
        &mut self,
        position: TextPosition,
        direction: LayoutDirection,
    ) -> Option<TextRange> {
        self.update_if_needed();
        let range = self
            .layout
            .as_ref()?
            .range_by_extending(position, direction, 1)?;
        Some(self.corrected_range(range))
    }

    fn position_within_range_at_offset(
        &self,
        range: TextRange,
        offset: usize,
    ) -> Option<TextPosition> {
        let range = self.corrected_range(range);
        let location = range.location() + offset;
        if location > range.end.offset {
            return None;
        }
        Some(TextPosition::new(location))
    }

    fn character_offset_within_range(&self, position: TextPosition, _range: TextRange) -> usize {
        position.offset
    }

    // ========================================================================
    // Writing direction
    // ========================================================================

    fn base_writing_direction(
        &self,
        position: TextPosition,
        _direction: StorageDirection,
    ) -> WritingDirection {
        let len = self.inner_text.len();
        if len == 0 {
            return WritingDirection::Natural;
        }
        let position = self.corrected_position(position);
        let index = if position.offset >= len {
            len - 1
        } else {
            position.offset
        };
        self.inner_text
            .attributes_at(index)
            .paragraph_style()
            .map(|s| s.base_writing_direction)
            .unwrap_or_default()
    }

    fn set_base_writing_direction(&mut self, direction: WritingDirection, range: TextRange) {
        dispatch(
            self,
            Msg::Input(InputMsg::SetBaseWritingDirection { direction, range }),
        );
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    fn first_rect(&mut self, range: TextRange) -> Rect {
        self.update_if_needed();
        let range = self.corrected_range(range);
        self.layout
            .as_ref()
            .and_then(|l| l.first_rect(&range))
            .map(|r| self.from_layout_rect(r))
            .unwrap_or(Rect::ZERO)
    }

    fn caret_rect(&mut self, position: TextPosition) -> Rect {
        self.update_if_needed();
        let position = self.corrected_position(position);
        let Some(rect) = self.layout.as_ref().and_then(|l| l.caret_rect(position)) else {
            return Rect::ZERO;
        };
        let mut rect = self.from_layout_rect(rect).standardized();
        let bounds = self.viewport.frame.size();
        if self.container.vertical_form {
            if rect.height < MIN_CARET_THICKNESS {
                rect.y -= (MIN_CARET_THICKNESS - rect.height) * 0.5;
                rect.height = MIN_CARET_THICKNESS;
            }
            if rect.y < 0.0 {
                rect.y = 0.0;
            } else if rect.max_y() > bounds.height {
                rect.y = bounds.height - rect.height;
            }
        } else {
            if rect.width < MIN_CARET_THICKNESS {
                rect.x -= (MIN_CARET_THICKNESS - rect.width) * 0.5;
                rect.width = MIN_CARET_THICKNESS;
            }
            if rect.x < 0.0 {
                rect.x = 0.0;
            } else if rect.max_x() > bounds.width {
                rect.x = bounds.width - rect.width;
            }
        }
        rect.pixel_round()
    }

    fn selection_rects(&mut self, range: TextRange) -> Vec<SelectionRect> {
        self.update_if_needed();
        let range = self.corrected_range(range);
        let Some(layout) = self.layout.clone() else {
            return Vec::new();
        };
        layout
            .selection_rects(&range)
            .into_iter()
            .map(|mut r| {
                r.rect = self.from_layout_rect(r.rect);
                r
            })
            .collect()
    }

    // ========================================================================
    // Hit-testing
    // ========================================================================

    fn closest_position(&mut self, point: Point) -> Option<TextPosition> {
        self.update_if_needed();
        let point = self.to_layout_point(point);
        let position = self.layout.as_ref()?.closest_position(point)?;
        Some(self.corrected_position(position))
    }

    fn closest_position_within(&mut self, point: Point, range: TextRange) -> Option<TextPosition> {
        let range = self.corrected_range(range);
        let position = self.closest_position(point)?;
        Some(range.clamp(position))
    }

    fn character_range_at(&mut self, point: Point) -> Option<TextRange> {
        self.update_if_needed();
        let point = self.to_layout_point(point);
        let range = self.layout.as_ref()?.closest_text_range(point)?;
        Some(self.corrected_range(range))
    }

    fn text_styling_at(&self, position: TextPosition, direction: StorageDirection) -> Attributes {
        let len = self.inner_text.len();
        if len == 0 {
            return self.typing_holder.clone();
        }
        let position = self.corrected_position(position);
        let mut index = position.offset;
        if index == len || direction == StorageDirection::Backward {
            index = index.saturating_sub(1);
        }
        self.inner_text.attributes_at(index)
    }

    fn selection_affinity(&self) -> Affinity {
        self.selection.selected.end.affinity
    }

    fn set_selection_affinity(&mut self, affinity: Affinity) {
        dispatch(self, Msg::Input(InputMsg::SetSelectionAffinity(affinity)));
    }
}

impl ScrollForwarding for TextView {
    fn did_scroll(&mut self, offset: Point) {
        dispatch(self, Msg::Viewport(ViewportMsg::DidScroll { offset }));
    }

    fn will_begin_dragging(&mut self) {
        dispatch(self, Msg::Viewport(ViewportMsg::WillBeginDragging));
    }

    fn did_end_dragging(&mut self, will_decelerate: bool) {
        dispatch(
            self,
            Msg::Viewport(ViewportMsg::DidEndDragging { will_decelerate }),
        );
    }

    fn will_begin_decelerating(&mut self) {
        dispatch(self, Msg::Viewport(ViewportMsg::WillBeginDecelerating));
    }

    fn did_end_decelerating(&mut self) {
        dispatch(self, Msg::Viewport(ViewportMsg::DidEndDecelerating));
    }

    fn did_end_scrolling_animation(&mut self) {
        dispatch(self, Msg::Viewport(ViewportMsg::DidEndScrollingAnimation));
    }

    fn should_scroll_to_top(&mut self) -> bool {
        let id = self.id;
        self.with_delegate(|d, _| d.should_scroll_to_top(id))
            .flatten()
            .unwrap_or(true)
    }

    fn did_scroll_to_top(&mut self) {
        dispatch(self, Msg::Viewport(ViewportMsg::DidScrollToTop));
    }
}
