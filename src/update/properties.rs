//! Public property setters.
//!
//! Setters apply immediately and queue a coalesced refresh. Outside of
//! `update()`, call `TextView::flush` afterwards to run the refresh and
//! collect the commands they produced.

use std::ops::Range;
use std::rc::Rc;

use crate::commands::Cmd;
use crate::editable::{
    AttributeKey, AttributeValue, AttributedBuffer, Attributes, Color, EditConstraints, Font,
    TextAlignment, TextRange,
};
use crate::geometry::{EdgeInsets, Rect};
use crate::layout::{LinePositionModifier, VerticalAlignment};
use crate::model::{TextView, Timings};
use crate::services::{DataDetector, DetectorTypes, RegexDataDetector, TextParser, TextViewNotification};

impl TextView {
    // ========================================================================
    // Content
    // ========================================================================

    /// Replace the whole text. History restarts from the new text.
    pub fn set_text(&mut self, text: &str) {
        if self.outer.text == text {
            return;
        }
        self.flags.selected_without_edit = false;
        self.flags.delete_confirm = false;
        self.end_touch_tracking();
        self.hide_menu();
        let all = TextRange::with_range(0, self.inner_text.len());
        self.replace_range(all, text);
        self.reset_undo_and_redo_stack();
    }

    /// Replace the whole text with styled text. The caret moves to the end.
    pub fn set_attributed_text(&mut self, text: AttributedBuffer) {
        if self.inner_text == text {
            return;
        }
        self.flags.typing_attributes_once = false;
        let all = TextRange::with_range(0, self.inner_text.len());
        if text.is_empty() {
            self.replace_range(all, "");
            return;
        }
        let id = self.id;
        let plain = text.text();
        let allowed = self
            .with_delegate(|d, _| d.should_change_text(id, all.as_range(), &plain))
            .unwrap_or(true);
        if !allowed {
            return;
        }

        self.flags.selected_without_edit = false;
        self.flags.delete_confirm = false;
        self.end_touch_tracking();
        self.hide_menu();

        self.selection_will_change();
        self.text_will_change();
        self.inner_text = text;
        self.selection.marked = None;
        self.parse_text();
        let len = self.inner_text.len();
        self.selection.selected = TextRange::with_range(len, 0);
        self.text_did_change();
        self.selection_did_change();

        if len > 0 {
            self.typing_holder = self.inner_text.attributes_at(len - 1).without_discontinuous();
        }
        self.update_outer_properties();
        self.update_now();
        if self.flags.first_responder {
            self.scroll_range_to_visible(self.selection.selected);
        }
        self.with_delegate(|d, id| d.did_change(id));
        self.post(TextViewNotification::DidChange);

        if !self.history.is_restoring() {
            self.reset_undo_and_redo_stack();
        }
    }

    pub fn set_text_parser(&mut self, parser: Option<Rc<dyn TextParser>>) {
        let same = match (&self.text_parser, &parser) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        if same {
            return;
        }
        self.text_parser = parser;
        if self.text_parser.is_some() && !self.inner_text.is_empty() {
            // Re-run the parser over the current text
            let text = self.inner_text.text();
            let all = TextRange::with_range(0, self.inner_text.len());
            self.replace_range(all, &text);
        }
        self.reset_undo_and_redo_stack();
        self.commit_update();
    }

    // ========================================================================
    // Whole-text styling
    // ========================================================================

    pub fn set_font(&mut self, font: Font) {
        if self.outer.font == font {
            return;
        }
        self.flags.typing_attributes_once = false;
        let value = AttributeValue::Font(font);
        self.typing_holder.insert(AttributeKey::Font, value.clone());
        self.inner_text.set_all_attributes(AttributeKey::Font, value);
        self.restyled();
    }

    pub fn set_text_color(&mut self, color: Color) {
        if self.outer.text_color == color {
            return;
        }
        self.flags.typing_attributes_once = false;
        let value = AttributeValue::Color(color);
        self.typing_holder
            .insert(AttributeKey::ForegroundColor, value.clone());
        self.inner_text
            .set_all_attributes(AttributeKey::ForegroundColor, value);
        self.restyled();
    }

    pub fn set_text_alignment(&mut self, alignment: TextAlignment) {
        if self.outer.alignment == alignment {
            return;
        }
        self.typing_holder.set_alignment(alignment);
        let all = 0..self.inner_text.len();
        self.inner_text.set_alignment(alignment, all);
        self.restyled();
    }

    fn restyled(&mut self) {
        self.update_outer_properties();
        self.reset_undo_and_redo_stack();
        self.commit_update();
    }

    pub fn set_vertical_alignment(&mut self, alignment: VerticalAlignment) {
        if self.vertical_alignment == alignment {
            return;
        }
        self.vertical_alignment = alignment;
        self.commit_update();
    }

    /// Attributes for the next insertion only
    pub fn set_typing_attributes(&mut self, attributes: Attributes) {
        self.flags.typing_attributes_once = true;
        self.typing_holder.merge(&attributes);
        self.outer.typing_attributes = self.typing_holder.clone();
        self.commit_update();
    }

    // ========================================================================
    // Data detection
    // ========================================================================

    pub fn set_data_detector_types(&mut self, types: DetectorTypes) {
        if self.detector_types == types {
            return;
        }
        self.detector_types = types;
        self.data_detector =
            RegexDataDetector::new(types).map(|d| Rc::new(d) as Rc<dyn DataDetector>);
        self.reset_undo_and_redo_stack();
        self.commit_update();
    }

    pub fn set_link_text_attributes(&mut self, attributes: Attributes) {
        if self.link_text_attributes == attributes {
            return;
        }
        self.link_text_attributes = attributes;
        if self.data_detector.is_some() {
            self.commit_update();
        }
    }

    pub fn set_highlight_text_attributes(&mut self, attributes: Attributes) {
        if self.highlight_text_attributes == attributes {
            return;
        }
        self.highlight_text_attributes = attributes;
        if self.data_detector.is_some() {
            self.commit_update();
        }
    }

    // ========================================================================
    // Placeholder
    // ========================================================================

    /// Plain placeholder, styled with the placeholder font and color
    pub fn set_placeholder_text(&mut self, text: Option<&str>) {
        let text = text.unwrap_or_default();
        let has_placeholder = self
            .placeholder
            .text
            .as_ref()
            .is_some_and(|t| !t.is_empty());
        if has_placeholder {
            if let Some(existing) = self.placeholder.text.as_mut() {
                let all = 0..existing.len();
                existing.replace(all, text);
            }
        } else if !text.is_empty() {
            self.placeholder.text = Some(AttributedBuffer::from_text(text));
        }
        let font = self
            .placeholder
            .font
            .get_or_insert_with(|| self.outer.font.clone())
            .clone();
        let color = *self
            .placeholder
            .color
            .get_or_insert(Color::PLACEHOLDER_GRAY);
        if let Some(placeholder) = self.placeholder.text.as_mut() {
            placeholder.set_all_attributes(AttributeKey::Font, AttributeValue::Font(font));
            placeholder.set_all_attributes(AttributeKey::ForegroundColor, AttributeValue::Color(color));
        }
        self.commit_placeholder_update();
    }

    pub fn set_placeholder_font(&mut self, font: Font) {
        if let Some(text) = self.placeholder.text.as_mut() {
            text.set_all_attributes(AttributeKey::Font, AttributeValue::Font(font.clone()));
        }
        self.placeholder.font = Some(font);
        self.commit_placeholder_update();
    }

    pub fn set_placeholder_color(&mut self, color: Color) {
        if let Some(text) = self.placeholder.text.as_mut() {
            text.set_all_attributes(AttributeKey::ForegroundColor, AttributeValue::Color(color));
        }
        self.placeholder.color = Some(color);
        self.commit_placeholder_update();
    }

    /// Styled placeholder. Font and color are taken from its first character.
    pub fn set_placeholder_attributed_text(&mut self, text: Option<AttributedBuffer>) {
        let head = text
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| t.attributes_at(0));
        self.placeholder.font = head.as_ref().and_then(|a| a.font().cloned());
        self.placeholder.color = head.as_ref().and_then(|a| a.foreground_color());
        self.placeholder.text = text;
        self.commit_placeholder_update();
    }

    pub fn placeholder_font(&self) -> Option<&Font> {
        self.placeholder.font.as_ref()
    }

    pub fn placeholder_color(&self) -> Option<Color> {
        self.placeholder.color
    }

    // ========================================================================
    // Container
    // ========================================================================

    pub fn set_text_container_inset(&mut self, insets: EdgeInsets) {
        if self.container.insets == insets {
            return;
        }
        self.container.insets = insets;
        self.commit_update();
    }

    pub fn set_exclusion_paths(&mut self, paths: Vec<Rect>) {
        if self.exclusion_paths == paths {
            return;
        }
        self.exclusion_paths = paths;
        self.apply_exclusion_paths();
        self.commit_update();
    }

    /// Vertical containers are wider than the view and anchored right, so
    /// view-space paths shift by the difference
    fn apply_exclusion_paths(&mut self) {
        let shift = if self.container.vertical_form {
            self.container.size.width - self.viewport.frame.width
        } else {
            0.0
        };
        self.container.exclusion_paths = self
            .exclusion_paths
            .iter()
            .map(|r| r.with_origin(r.origin().offset(shift, 0.0)))
            .collect();
    }

    pub fn set_vertical_form(&mut self, vertical: bool) {
        if self.container.vertical_form == vertical {
            return;
        }
        self.container.vertical_form = vertical;
        self.update_inner_container_size();
        if vertical && self.container.insets == EdgeInsets::DEFAULT {
            self.container.insets = EdgeInsets::DEFAULT_VERTICAL;
        } else if !vertical && self.container.insets == EdgeInsets::DEFAULT_VERTICAL {
            self.container.insets = EdgeInsets::DEFAULT;
        }
        self.apply_exclusion_paths();
        self.keyboard_changed();
        self.commit_update();
    }

    pub fn set_line_position_modifier(&mut self, modifier: Option<Rc<dyn LinePositionModifier>>) {
        let same = match (&self.container.line_position_modifier, &modifier) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        if same {
            return;
        }
        self.container.line_position_modifier = modifier;
        self.commit_update();
    }

    /// Pick up the shared debug options after the registry changed
    pub fn sync_debug_options(&mut self) {
        let options = self.services.debug.options();
        if self.debug_options != options {
            self.debug_options = options;
            self.emit(Cmd::Redraw);
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Move the selection. Ignored while composing. History restarts unless
    /// an undo is being applied.
    pub fn set_selected_range(&mut self, range: Range<usize>) {
        if self.outer.selected_range == range || self.selection.marked.is_some() {
            return;
        }
        self.flags.typing_attributes_once = false;
        let range = self.corrected_range(TextRange::from_range(range));
        self.end_touch_tracking();
        self.selection.selected = range;
        self.update_selection_view();
        self.set_outer_selected_range();
        if !self.history.is_restoring() {
            self.reset_undo_and_redo_stack();
        }
    }

    /// Select everything on the next activation
    pub fn set_clears_on_insertion(&mut self, clears: bool) {
        if self.clears_on_insertion == clears {
            return;
        }
        self.clears_on_insertion = clears;
        if clears {
            if self.flags.first_responder {
                self.set_selected_range(0..self.inner_text.len());
            } else {
                self.flags.clears_on_insertion_once = true;
            }
        }
    }

    // ========================================================================
    // Behaviour
    // ========================================================================

    pub fn set_selectable(&mut self, selectable: bool) {
        if self.constraints.selectable == selectable {
            return;
        }
        self.constraints.selectable = selectable;
        if !selectable {
            if self.flags.first_responder {
                self.resign_first_responder();
            } else {
                self.flags.selected_without_edit = false;
                self.end_touch_tracking();
                self.hide_menu();
                self.update_selection_view();
            }
        }
    }

    pub fn set_highlightable(&mut self, highlightable: bool) {
        if self.constraints.highlightable == highlightable {
            return;
        }
        self.constraints.highlightable = highlightable;
        self.commit_update();
    }

    pub fn set_editable(&mut self, editable: bool) {
        if self.constraints.editable == editable {
            return;
        }
        self.constraints.editable = editable;
        if !editable {
            self.resign_first_responder();
        }
    }

    /// Apply a whole set of behaviour switches
    pub fn set_constraints(&mut self, constraints: EditConstraints) {
        self.set_selectable(constraints.selectable);
        self.set_highlightable(constraints.highlightable);
        self.set_editable(constraints.editable);
        self.constraints = constraints;
    }

    pub fn set_timings(&mut self, timings: Timings) {
        self.timings = timings;
    }

    pub fn set_max_undo_level(&mut self, level: usize) {
        self.history.set_max_size(level);
    }

    pub fn set_extra_accessory_view_height(&mut self, height: f64) {
        self.viewport.extra_accessory_view_height = height.max(0.0);
    }

    /// The scroll-enabled property. Panning stays locked while a drag is
    /// tracked.
    pub fn set_user_scroll_enabled(&mut self, enabled: bool) {
        if self.viewport.scroll_enabled == enabled {
            return;
        }
        self.viewport.scroll_enabled = enabled;
        self.emit(Cmd::SetScrollEnabled(enabled && !self.flags.scroll_locked));
    }
}
