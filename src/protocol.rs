//! Capability interfaces an input system drives.
//!
//! The text view implements each of them; the mutating methods route through
//! [`crate::update::dispatch`] so they behave exactly like the equivalent
//! [`crate::messages::Msg`]. Commands they produce stay queued until the host
//! calls [`crate::model::TextView::take_commands`].

use std::cmp::Ordering;

use crate::editable::{Affinity, Attributes, TextPosition, TextRange, WritingDirection};
use crate::geometry::{Point, Rect};
use crate::layout::{LayoutDirection, SelectionRect};
use crate::services::StorageDirection;

/// Minimal keyboard input
pub trait KeyInput {
    fn has_text(&self) -> bool;
    fn insert_text(&mut self, text: &str);
    fn delete_backward(&mut self);
}

/// The full text-input protocol: document bounds, position arithmetic,
/// geometry, hit-testing, marked text and selection.
///
/// Positions handed in are corrected against the buffer before use.
pub trait TextInput: KeyInput {
    // Editing
    fn text_in_range(&self, range: TextRange) -> String;
    fn replace(&mut self, range: TextRange, text: &str);

    fn selected_text_range(&self) -> TextRange;
    fn set_selected_text_range(&mut self, range: TextRange);

    fn marked_text_range(&self) -> Option<TextRange>;
    /// `selected_range` is relative to the start of the marked text
    fn set_marked_text(&mut self, text: &str, selected_range: TextRange);
    fn unmark_text(&mut self);

    // Positions
    fn beginning_of_document(&self) -> TextPosition;
    fn end_of_document(&self) -> TextPosition;
    fn text_range(&self, from: TextPosition, to: TextPosition) -> TextRange;
    /// `None` when the result falls outside the buffer. Never splits a
    /// grapheme cluster.
    fn position_from(&mut self, position: TextPosition, offset: isize) -> Option<TextPosition>;
    fn position_in_direction(
        &mut self,
        position: TextPosition,
        direction: LayoutDirection,
        offset: isize,
    ) -> Option<TextPosition>;
    fn compare(&self, a: TextPosition, b: TextPosition) -> Ordering;
    fn offset_between(&self, from: TextPosition, to: TextPosition) -> isize;
    fn position_within_range_farthest(
        &self,
        range: TextRange,
        direction: LayoutDirection,
    ) -> TextPosition;
    fn character_range_by_extending(
        &mut self,
        position: TextPosition,
        direction: LayoutDirection,
    ) -> Option<TextRange>;
    fn position_within_range_at_offset(&self, range: TextRange, offset: usize)
        -> Option<TextPosition>;
    fn character_offset_within_range(&self, position: TextPosition, range: TextRange) -> usize;

    // Writing direction
    fn base_writing_direction(
        &self,
        position: TextPosition,
        direction: StorageDirection,
    ) -> WritingDirection;
    fn set_base_writing_direction(&mut self, direction: WritingDirection, range: TextRange);

    // Geometry, in content coordinates
    fn first_rect(&mut self, range: TextRange) -> Rect;
    fn caret_rect(&mut self, position: TextPosition) -> Rect;
    fn selection_rects(&mut self, range: TextRange) -> Vec<SelectionRect>;

    // Hit-testing
    fn closest_position(&mut self, point: Point) -> Option<TextPosition>;
    fn closest_position_within(&mut self, point: Point, range: TextRange) -> Option<TextPosition>;
    fn character_range_at(&mut self, point: Point) -> Option<TextRange>;

    fn text_styling_at(&self, position: TextPosition, direction: StorageDirection) -> Attributes;

    fn selection_affinity(&self) -> Affinity;
    fn set_selection_affinity(&mut self, affinity: Affinity);
}

/// Scroll-view callbacks. The view adjusts its overlay and forwards each
/// call to its delegate.
pub trait ScrollForwarding {
    fn did_scroll(&mut self, offset: Point);
    fn will_begin_dragging(&mut self);
    fn did_end_dragging(&mut self, will_decelerate: bool);
    fn will_begin_decelerating(&mut self);
    fn did_end_decelerating(&mut self);
    fn did_end_scrolling_animation(&mut self);
    fn should_scroll_to_top(&mut self) -> bool;
    fn did_scroll_to_top(&mut self);
}
