//! Edit-menu actions, the pasteboard and undo/redo

use std::rc::Rc;

use crate::commands::Cmd;
use crate::editable::{
    Attachment, AttachmentContent, AttributeKey, AttributeValue, AttributedBuffer, TextPosition,
    TextRange, UndoSnapshot, ATTACHMENT_CHAR,
};
use crate::messages::EditMsg;
use crate::model::{TextView, TimerKind};
use crate::services::{ImagePayload, TextViewNotification};

impl TextView {
    pub(crate) fn handle_edit(&mut self, msg: EditMsg) {
        match msg {
            EditMsg::Cut => self.cut(),
            EditMsg::Copy => {
                self.end_touch_tracking();
                self.copy_selected_text_to_pasteboard();
            }
            EditMsg::Paste => self.paste(),
            EditMsg::Select => self.select_word(),
            EditMsg::SelectAll => self.select_all(),
            EditMsg::Undo => {
                self.undo();
                self.restore_first_responder_after_undo_alert();
            }
            EditMsg::Redo => {
                self.redo();
                self.restore_first_responder_after_undo_alert();
            }
            EditMsg::Shake => self.show_undo_redo_alert(),
            EditMsg::PasteboardChanged => {
                if self.overlay.menu_visible {
                    self.show_menu();
                }
            }
        }
    }

    /// Whether the edit menu should offer `action`
    pub fn can_perform(&self, action: EditMsg) -> bool {
        let selected = self.selection.selected;
        let first_responder = self.flags.first_responder;
        let editable = self.constraints.editable;
        if selected.is_empty() {
            match action {
                EditMsg::Select | EditMsg::SelectAll => !self.inner_text.is_empty(),
                EditMsg::Paste => self.pasteboard_has_valid_value(),
                _ => false,
            }
        } else {
            match action {
                EditMsg::Cut => first_responder && editable,
                EditMsg::Copy => true,
                EditMsg::SelectAll => selected.len() < self.inner_text.len(),
                EditMsg::Paste => first_responder && editable && self.pasteboard_has_valid_value(),
                _ => false,
            }
        }
    }

    // ========================================================================
    // Pasteboard
    // ========================================================================

    fn pasteboard_has_valid_value(&self) -> bool {
        let Ok(mut pasteboard) = self.pasteboard.try_borrow_mut() else {
            return false;
        };
        if pasteboard.string().is_some_and(|s| !s.is_empty()) {
            return true;
        }
        if self.constraints.allows_paste_attributed
            && pasteboard.attributed_text().is_some_and(|t| !t.is_empty())
        {
            return true;
        }
        self.constraints.allows_paste_image && pasteboard.image().is_some()
    }

    fn copy_selected_text_to_pasteboard(&mut self) {
        let range = self.selection.selected.as_range();
        let Ok(mut pasteboard) = self.pasteboard.try_borrow_mut() else {
            tracing::warn!(view = self.id.0, "pasteboard busy, copy dropped");
            return;
        };
        if self.constraints.allows_copy_attributed {
            let text = self.inner_text.substring(range);
            if !text.is_empty() {
                pasteboard.set_attributed_text(&text);
            }
        } else {
            let text = self.inner_text.plain_text(range);
            if !text.is_empty() {
                pasteboard.set_string(&text);
            }
        }
    }

    fn cut(&mut self) {
        self.end_touch_tracking();
        if self.selection.selected.is_empty() {
            return;
        }
        self.copy_selected_text_to_pasteboard();
        self.save_to_undo_stack();
        self.history.clear_redo();
        self.replace_range(self.selection.selected, "");
    }

    fn paste(&mut self) {
        self.end_touch_tracking();
        let (attributed, image, string) = {
            let Ok(mut pasteboard) = self.pasteboard.try_borrow_mut() else {
                return;
            };
            let attributed = if self.constraints.allows_paste_attributed {
                pasteboard.attributed_text().filter(|t| !t.is_empty())
            } else {
                None
            };
            let image = if attributed.is_none() && self.constraints.allows_paste_image {
                pasteboard.image()
            } else {
                None
            };
            (attributed, image, pasteboard.string())
        };

        let content = attributed.or_else(|| image.and_then(|i| self.attachment_text(i)));
        if let Some(content) = content {
            self.save_to_undo_stack();
            self.history.clear_redo();
            self.replace_with_attributed(self.selection.selected, &content);
        } else if let Some(string) = string.filter(|s| !s.is_empty()) {
            self.save_to_undo_stack();
            self.history.clear_redo();
            self.replace_range(self.selection.selected, &string);
        }
    }

    /// An attachment character carrying `image`, styled like typed text.
    /// Images of a pixel or less are ignored.
    fn attachment_text(&self, image: ImagePayload) -> Option<AttributedBuffer> {
        if image.width <= 1 || image.height <= 1 {
            return None;
        }
        let attachment = Attachment {
            width: image.width as f64,
            ascent: image.height as f64,
            descent: 0.0,
            content: AttachmentContent::Image {
                pixel_width: image.width,
                pixel_height: image.height,
                rgba: Rc::new(image.rgba),
            },
        };
        let attrs = self
            .typing_holder
            .clone()
            .with(AttributeKey::Attachment, AttributeValue::Attachment(attachment));
        Some(AttributedBuffer::with_attributes(
            &ATTACHMENT_CHAR.to_string(),
            attrs,
        ))
    }

    /// Replace `range` with styled text, keeping its attributes. The caret
    /// ends after the inserted content.
    pub(crate) fn replace_with_attributed(&mut self, range: TextRange, content: &AttributedBuffer) {
        let range = self.corrected_range(range);
        let id = self.id;
        let plain = content.text();
        let allowed = self
            .with_delegate(|d, _| d.should_change_text(id, range.as_range(), &plain))
            .unwrap_or(true);
        if !allowed {
            return;
        }
        self.flags.selected_without_edit = false;
        self.flags.delete_confirm = false;
        self.flags.typing_attributes_once = false;
        self.end_touch_tracking();
        self.hide_menu();

        self.text_will_change();
        self.inner_text.replace_attributed(range.as_range(), content);
        self.text_did_change();

        // Snap past any cluster the content merged into
        let end = self.corrected_position(TextPosition::new(range.location() + content.len()));
        self.update_now();
        let end = self
            .layout
            .as_ref()
            .and_then(|l| l.cluster_range_at(end))
            .map(|r| self.corrected_range(r).end)
            .unwrap_or(end);
        self.selection_will_change();
        self.selection.selected = TextRange::caret(TextPosition::new(end.offset));
        self.selection.marked = None;
        self.selection_did_change();

        self.parse_text();
        self.update_outer_properties();
        self.commit_update();
        if self.flags.first_responder {
            self.scroll_range_to_visible(self.selection.selected);
        }
        self.with_delegate(|d, id| d.did_change(id));
        self.post(TextViewNotification::DidChange);
        self.last_type_range = Some(self.selection.selected);
        tracing::debug!(view = id.0, chars = content.len(), "attributed text pasted");
    }

    // ========================================================================
    // Selection actions
    // ========================================================================

    /// Select the word around the caret
    fn select_word(&mut self) {
        self.end_touch_tracking();
        if !self.selection.selected.is_empty() || self.inner_text.is_empty() {
            return;
        }
        self.update_if_needed();
        let word = self
            .closest_token_range_at_position(self.selection.selected.start)
            .filter(|r| !r.is_empty());
        if let Some(word) = word {
            self.selection_will_change();
            self.selection.selected = word;
            self.selection_did_change();
        }
        self.update_if_needed();
        self.update_outer_properties();
        self.update_selection_view();
        self.hide_menu();
        self.show_menu();
    }

    pub(crate) fn select_all(&mut self) {
        self.tracking.range = None;
        self.selection_will_change();
        self.selection.selected = TextRange::with_range(0, self.inner_text.len());
        self.selection_did_change();

        self.update_if_needed();
        self.update_outer_properties();
        self.update_selection_view();
        self.hide_menu();
        self.show_menu();
    }

    // ========================================================================
    // Undo / redo
    // ========================================================================

    fn current_snapshot(&self) -> UndoSnapshot {
        UndoSnapshot::new(self.inner_text.clone(), self.selection.selected)
    }

    /// Drop all history and keep the current state as the baseline
    pub(crate) fn reset_undo_and_redo_stack(&mut self) {
        let baseline = self.current_snapshot();
        self.history.reset(baseline);
        self.last_type_range = Some(self.selection.selected);
    }

    pub(crate) fn save_to_undo_stack(&mut self) {
        if !self.constraints.allows_undo_and_redo {
            return;
        }
        let snapshot = self.current_snapshot();
        if self.history.push_undo(snapshot) {
            tracing::trace!(view = self.id.0, depth = self.history.undo_count(), "undo captured");
        }
        self.last_type_range = Some(self.selection.selected);
    }

    pub fn can_undo(&self) -> bool {
        self.constraints.allows_undo_and_redo && self.history.can_undo(&self.inner_text)
    }

    pub fn can_redo(&self) -> bool {
        self.constraints.allows_undo_and_redo && self.history.can_redo(&self.inner_text)
    }

    fn undo(&mut self) {
        if !self.can_undo() {
            return;
        }
        if let Some(snapshot) = self.history.undo(self.current_snapshot()) {
            tracing::debug!(view = self.id.0, remaining = self.history.undo_count(), "undo");
            self.restore_snapshot(snapshot);
        }
    }

    fn redo(&mut self) {
        if !self.can_redo() {
            return;
        }
        if let Some(snapshot) = self.history.redo(self.current_snapshot()) {
            tracing::debug!(view = self.id.0, remaining = self.history.redo_count(), "redo");
            self.restore_snapshot(snapshot);
        }
    }

    fn restore_snapshot(&mut self, snapshot: UndoSnapshot) {
        self.history.set_restoring(true);
        self.set_attributed_text(snapshot.text);
        self.set_selected_range(snapshot.selected_range.as_range());
        self.history.set_restoring(false);
        // The next edit starts a new step and drops the redo stack
        self.last_type_range = None;
    }

    fn show_undo_redo_alert(&mut self) {
        if !self.constraints.allows_undo_and_redo {
            return;
        }
        self.flags.first_responder_before_undo_alert = self.flags.first_responder;
        let can_undo = self.can_undo();
        let can_redo = self.can_redo();
        if can_undo || can_redo {
            self.emit(Cmd::ShowUndoAlert { can_undo, can_redo });
        }
    }

    fn restore_first_responder_after_undo_alert(&mut self) {
        if self.flags.first_responder_before_undo_alert {
            self.flags.first_responder_before_undo_alert = false;
            self.start_timer(TimerKind::DeferredFocus);
        }
    }
}
