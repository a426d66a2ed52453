//! First responder transitions

use crate::commands::Cmd;
use crate::messages::ResponderMsg;
use crate::model::{TextView, TimerKind};
use crate::services::TextViewNotification;

impl TextView {
    pub(crate) fn handle_responder(&mut self, msg: ResponderMsg) {
        match msg {
            ResponderMsg::Become => self.become_first_responder(),
            ResponderMsg::Resign => self.resign_first_responder(),
            ResponderMsg::ReloadInputViews => {
                if self.selection.marked.is_some() {
                    self.unmark_text_inner();
                }
            }
        }
    }

    pub fn can_become_first_responder(&self) -> bool {
        if !self.constraints.selectable || !self.constraints.editable {
            return false;
        }
        if self.flags.ignore_first_responder {
            return false;
        }
        self.with_delegate(|d, id| d.should_begin_editing(id))
            .unwrap_or(true)
    }

    pub fn can_resign_first_responder(&self) -> bool {
        if !self.flags.first_responder {
            return true;
        }
        self.with_delegate(|d, id| d.should_end_editing(id))
            .unwrap_or(true)
    }

    pub(crate) fn become_first_responder(&mut self) {
        if self.flags.first_responder || !self.can_become_first_responder() {
            return;
        }
        let detected_before = self.should_detect_text();
        self.flags.first_responder = true;

        self.end_touch_tracking();
        self.hide_menu();
        self.flags.selected_without_edit = false;
        if self.should_detect_text() != detected_before {
            // Detected links are dropped while editing
            self.update_now();
        }
        self.update_if_needed();
        self.update_selection_view();

        self.start_timer(TimerKind::DeferredScroll);
        self.with_delegate(|d, id| d.did_begin_editing(id));
        self.post(TextViewNotification::DidBeginEditing);
        self.emit(Cmd::FocusChanged { focused: true });
        tracing::debug!(view = self.id.0, "became first responder");
    }

    pub(crate) fn resign_first_responder(&mut self) {
        if !self.flags.first_responder || !self.can_resign_first_responder() {
            return;
        }
        self.flags.first_responder = false;

        if self.selection.marked.is_some() {
            self.selection.marked = None;
            self.parse_text();
            self.update_outer_properties();
        }
        self.flags.selected_without_edit = false;
        if self.should_detect_text() {
            self.update_now();
        }
        self.end_touch_tracking();
        self.hide_menu();
        self.end_timer(TimerKind::DeferredScroll);
        self.update_if_needed();
        self.update_selection_view();
        self.restore_insets();

        self.with_delegate(|d, id| d.did_end_editing(id));
        self.post(TextViewNotification::DidEndEditing);
        self.emit(Cmd::FocusChanged { focused: false });
        tracing::debug!(view = self.id.0, "resigned first responder");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::commands::Cmd;
    use crate::editable::{EditConstraints, TextRange};
    use crate::messages::{InputMsg, ResponderMsg};
    use crate::services::{TextViewDelegate, ViewId};
    use crate::test_support::view_with_text;
    use crate::update::update;

    #[derive(Default)]
    struct Gate {
        allow_begin: bool,
        began: usize,
        ended: usize,
    }

    impl TextViewDelegate for Gate {
        fn should_begin_editing(&mut self, _view: ViewId) -> bool {
            self.allow_begin
        }

        fn did_begin_editing(&mut self, _view: ViewId) {
            self.began += 1;
        }

        fn did_end_editing(&mut self, _view: ViewId) {
            self.ended += 1;
        }
    }

    #[test]
    fn test_become_and_resign() {
        let mut view = view_with_text("abc");
        let cmds = update(&mut view, ResponderMsg::Become.into())
            .map(Cmd::into_vec)
            .unwrap_or_default();
        assert!(view.is_first_responder());
        assert!(cmds.contains(&Cmd::FocusChanged { focused: true }));
        assert!(view.is_timer_armed(crate::model::TimerKind::DeferredScroll));

        let cmds = update(&mut view, ResponderMsg::Resign.into())
            .map(Cmd::into_vec)
            .unwrap_or_default();
        assert!(!view.is_first_responder());
        assert!(cmds.contains(&Cmd::FocusChanged { focused: false }));
    }

    #[test]
    fn test_read_only_view_never_becomes_first_responder() {
        let mut view = view_with_text("abc");
        view.set_constraints(EditConstraints::read_only());
        update(&mut view, ResponderMsg::Become.into());
        assert!(!view.is_first_responder());
    }

    #[test]
    fn test_delegate_can_refuse_focus() {
        let mut view = view_with_text("abc");
        let gate = Rc::new(RefCell::new(Gate::default()));
        view.set_delegate(&gate);
        update(&mut view, ResponderMsg::Become.into());
        assert!(!view.is_first_responder());

        gate.borrow_mut().allow_begin = true;
        update(&mut view, ResponderMsg::Become.into());
        update(&mut view, ResponderMsg::Resign.into());
        assert_eq!(gate.borrow().began, 1);
        assert_eq!(gate.borrow().ended, 1);
    }

    #[test]
    fn test_resign_commits_marked_text() {
        let mut view = view_with_text("ab");
        update(&mut view, ResponderMsg::Become.into());
        update(
            &mut view,
            InputMsg::SetMarkedText {
                text: "k".into(),
                selected_range: TextRange::with_range(1, 0),
            }
            .into(),
        );
        assert!(view.marked_range().is_some());
        update(&mut view, ResponderMsg::Resign.into());
        assert_eq!(view.marked_range(), None);
        assert_eq!(view.text(), "abk");
    }

    #[test]
    fn test_reload_input_views_unmarks() {
        let mut view = view_with_text("");
        update(&mut view, ResponderMsg::Become.into());
        update(
            &mut view,
            InputMsg::SetMarkedText {
                text: "x".into(),
                selected_range: TextRange::with_range(1, 0),
            }
            .into(),
        );
        update(&mut view, ResponderMsg::ReloadInputViews.into());
        assert_eq!(view.marked_range(), None);
        assert_eq!(view.text(), "x");
    }
}
