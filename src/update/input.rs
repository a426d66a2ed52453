//! Text input handlers: typing, deletion, range replacement and the
//! marked-text (IME composition) protocol

use crate::editable::{adjust_selection, Affinity, TextRange, WritingDirection};
use crate::layout::LayoutDirection;
use crate::messages::InputMsg;
use crate::model::TextView;
use crate::services::TextViewNotification;

impl TextView {
    pub(crate) fn handle_input(&mut self, msg: InputMsg) {
        match msg {
            InputMsg::InsertText(text) => self.insert_text_inner(&text),
            InputMsg::DeleteBackward => self.delete_backward_inner(),
            InputMsg::Replace { range, text } => self.replace_range(range, &text),
            InputMsg::SetMarkedText {
                text,
                selected_range,
            } => self.set_marked_text_inner(&text, selected_range),
            InputMsg::UnmarkText => self.unmark_text_inner(),
            InputMsg::SetSelectedTextRange(range) => self.set_selected_text_range_inner(range),
            InputMsg::SetSelectionAffinity(affinity) => self.set_selection_affinity_inner(affinity),
            InputMsg::SetBaseWritingDirection { direction, range } => {
                self.set_base_writing_direction_inner(direction, range)
            }
        }
    }

    /// Whether the selection moved since the last typed range, which starts a
    /// new undo step
    fn typing_streak_broken(&self) -> bool {
        self.last_type_range
            .map_or(true, |r| !r.same_span(&self.selection.selected))
    }

    // ========================================================================
    // Key input
    // ========================================================================

    pub(crate) fn insert_text_inner(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.typing_streak_broken() {
            self.save_to_undo_stack();
            self.history.clear_redo();
        }
        self.replace_range(self.selection.selected, text);
    }

    /// Delete the cluster before the caret or the selection. A caret right
    /// after a confirm-on-delete binding first selects the binding instead.
    pub(crate) fn delete_backward_inner(&mut self) {
        self.update_if_needed();
        let selected = self.selection.selected;
        let mut range = selected;
        if range.location() == 0 && range.is_empty() {
            return;
        }
        self.flags.typing_attributes_once = false;

        if !self.flags.delete_confirm && range.is_empty() && range.location() > 0 {
            let before = range.location() - 1;
            if self.inner_text.attributes_at(before).binding().is_some() {
                if let Some(run) = self
                    .inner_text
                    .longest_effective_range(&crate::editable::AttributeKey::Binding, before)
                {
                    self.flags.delete_confirm = true;
                    self.selection_will_change();
                    self.selection.selected = self.corrected_range(TextRange::from_range(run));
                    self.selection_did_change();
                    self.update_outer_properties();
                    self.update_selection_view();
                    tracing::debug!(view = self.id.0, "binding selected for deletion");
                    return;
                }
            }
        }

        self.flags.delete_confirm = false;
        if range.is_empty() {
            let extended = self
                .layout
                .as_ref()
                .and_then(|l| l.range_by_extending(selected.end, LayoutDirection::Left, 1));
            if let Some(extended) = extended.filter(|r| r.is_valid(self.inner_text.len())) {
                range = extended;
            }
        }
        if self.last_type_range.is_some() && self.typing_streak_broken() {
            self.save_to_undo_stack();
            self.history.clear_redo();
        }
        self.replace_range(range, "");
    }

    // ========================================================================
    // Replacement
    // ========================================================================

    /// Replace `range` with plain text, subject to the delegate's veto
    pub(crate) fn replace_range(&mut self, range: TextRange, text: &str) {
        if range.is_empty() && text.is_empty() {
            return;
        }
        let range = self.corrected_range(range);
        let id = self.id;
        let allowed = self
            .with_delegate(|d, _| d.should_change_text(id, range.as_range(), text))
            .unwrap_or(true);
        if !allowed {
            tracing::debug!(view = id.0, range = ?range.as_range(), "edit vetoed by delegate");
            return;
        }

        let len = self.inner_text.len();
        let mut use_holder = false;
        if len > 0 {
            if range.location() == 0 && range.end.offset == len && text.is_empty() {
                self.typing_holder = self.inner_text.attributes_at(0).without_discontinuous();
            }
        } else {
            use_holder = true;
        }
        let mut apply_typing = false;
        if self.flags.typing_attributes_once {
            self.flags.typing_attributes_once = false;
            apply_typing = !use_holder && range.is_empty() && !text.is_empty();
        }

        self.flags.selected_without_edit = false;
        self.flags.delete_confirm = false;
        self.end_touch_tracking();
        self.hide_menu();

        self.replace_inner(range, text, true);
        let inserted = text.chars().count();
        if use_holder {
            let all = 0..self.inner_text.len();
            self.inner_text.set_attributes(&self.typing_holder, all);
        } else if apply_typing {
            let span = range.location()..range.location() + inserted;
            self.inner_text.add_attributes(&self.typing_holder, span);
        }
        self.parse_text();
        self.update_outer_properties();
        self.commit_update();

        if self.flags.first_responder {
            self.scroll_range_to_visible(self.selection.selected);
        }
        self.with_delegate(|d, id| d.did_change(id));
        self.post(TextViewNotification::DidChange);
        self.last_type_range = Some(self.selection.selected);
        tracing::debug!(
            view = id.0,
            range = ?range.as_range(),
            inserted,
            len = self.inner_text.len(),
            "text replaced"
        );
    }

    /// Write `text` over `range` and move the selection to follow the edit
    pub(crate) fn replace_inner(&mut self, range: TextRange, text: &str, notify: bool) {
        if notify {
            self.text_will_change();
        }
        let inserted = text.chars().count();
        let start = range.location();
        self.inner_text.replace(range.as_range(), text);
        self.inner_text
            .remove_discontinuous_attributes(start..start + inserted);
        if notify {
            self.text_did_change();
        }

        let len = self.inner_text.len();
        let old = self.selection.selected;
        let new = adjust_selection(&range, inserted, &old, len);
        self.selection.marked = self.selection.marked.map(|m| m.corrected(len));
        if new != old {
            if notify {
                self.selection_will_change();
            }
            self.selection.selected = new;
            if notify {
                self.selection_did_change();
            }
        }
    }

    // ========================================================================
    // Marked text
    // ========================================================================

    /// Replace the composing text with `text`. `relative` is the selection
    /// inside the new marked span.
    pub(crate) fn set_marked_text_inner(&mut self, text: &str, relative: TextRange) {
        self.update_if_needed();
        self.end_touch_tracking();
        self.hide_menu();

        let target = self.selection.marked.map_or_else(
            || {
                let end = self.selection.selected.end.offset;
                end..end
            },
            |m| m.as_range(),
        );
        let id = self.id;
        let allowed = self
            .with_delegate(|d, _| d.should_change_text(id, target, text))
            .unwrap_or(true);
        if !allowed {
            return;
        }

        if self.typing_streak_broken() {
            self.save_to_undo_stack();
            self.history.clear_redo();
        }

        let mut apply_holder = false;
        if !self.inner_text.is_empty() && self.selection.marked.is_some() {
            self.update_attributes_holder();
        } else {
            apply_holder = true;
        }

        if !self.selection.selected.is_empty() {
            self.replace_range(self.selection.selected, "");
        }

        self.text_will_change();
        self.selection_will_change();

        let inserted = text.chars().count();
        let start = match self.selection.marked {
            None => self.selection.selected.end.offset,
            Some(marked) => self.corrected_range(marked).location(),
        };
        let replaced = match self.selection.marked {
            None => start..start,
            Some(marked) => self.corrected_range(marked).as_range(),
        };
        self.inner_text.replace(replaced, text);

        let marked = self.corrected_range(TextRange::with_range(start, inserted));
        self.selection.selected = self.corrected_range(TextRange::with_range(
            start + relative.location(),
            relative.len(),
        ));
        if marked.is_empty() {
            self.selection.marked = None;
        } else {
            if apply_holder {
                self.inner_text
                    .set_attributes(&self.typing_holder, marked.as_range());
            }
            self.inner_text
                .remove_discontinuous_attributes(marked.as_range());
            self.selection.marked = Some(marked);
        }

        self.selection_did_change();
        self.text_did_change();

        self.update_outer_properties();
        self.commit_update();
        self.scroll_range_to_visible(self.selection.selected);
        self.with_delegate(|d, id| d.did_change(id));
        self.post(TextViewNotification::DidChange);
        self.last_type_range = Some(self.selection.selected);
        tracing::debug!(
            view = id.0,
            marked = ?self.selection.marked.map(|m| m.as_range()),
            "marked text set"
        );
    }

    /// End composition, keeping the composed text
    pub(crate) fn unmark_text_inner(&mut self) {
        self.selection.marked = None;
        self.end_touch_tracking();
        self.hide_menu();
        if self.parse_text() {
            self.commit_update();
        }
        self.update_if_needed();
        self.update_outer_properties();
        self.update_selection_view();
        self.scroll_range_to_visible(self.selection.selected);
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub(crate) fn set_selected_text_range_inner(&mut self, range: TextRange) {
        let range = self.corrected_range(range);
        if range == self.selection.selected {
            return;
        }
        self.update_if_needed();
        self.end_touch_tracking();
        self.hide_menu();
        self.flags.delete_confirm = false;
        self.flags.typing_attributes_once = false;

        self.selection_will_change();
        self.selection.selected = range;
        self.last_type_range = Some(range);
        self.selection_did_change();

        self.update_outer_properties();
        self.update_selection_view();
        if self.flags.first_responder {
            self.scroll_range_to_visible(range);
        }
    }

    pub(crate) fn set_selection_affinity_inner(&mut self, affinity: Affinity) {
        let selected = self.selection.selected;
        self.selection.selected = self.corrected_range(TextRange::with_range_affinity(
            selected.location(),
            selected.len(),
            affinity,
        ));
        self.update_selection_view();
    }

    pub(crate) fn set_base_writing_direction_inner(&mut self, direction: WritingDirection, range: TextRange) {
        let range = self.corrected_range(range);
        self.inner_text
            .set_base_writing_direction(direction, range.as_range());
        self.commit_update();
    }
}
