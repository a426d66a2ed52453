//! Editing tests - typing, deletion, replacement, marked text

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{editing_view, insert, recording_delegate, send, test_view, test_view_with_selection};
use richedit::editable::{
    Affinity, AttributeKey, AttributeValue, AttributedBuffer, Binding, TextRange,
};
use richedit::messages::InputMsg;
use richedit::protocol::{KeyInput, TextInput};
use richedit::services::{ReplacementParser, Services, TextViewNotification};

// ========================================================================
// Typing and deletion
// ========================================================================

#[test]
fn test_insert_into_empty_buffer() {
    let mut view = editing_view("");
    insert(&mut view, "a");

    assert_eq!(view.text(), "a");
    assert_eq!(view.selected_range(), 1..1);
}

#[test]
fn test_delete_backward_at_end() {
    let mut view = editing_view("hello");
    assert_eq!(view.selected_range(), 5..5);
    send(&mut view, InputMsg::DeleteBackward);

    assert_eq!(view.text(), "hell");
    assert_eq!(view.selected_range(), 4..4);
}

#[test]
fn test_delete_backward_at_start_is_noop() {
    let mut view = test_view_with_selection("hello", 0..0);
    send(&mut view, InputMsg::DeleteBackward);

    assert_eq!(view.text(), "hello");
    assert_eq!(view.selected_range(), 0..0);
}

#[test]
fn test_delete_backward_removes_whole_cluster() {
    let mut view = editing_view("ae\u{301}");
    send(&mut view, InputMsg::DeleteBackward);

    assert_eq!(view.text(), "a");
    assert_eq!(view.selected_range(), 1..1);
}

#[test]
fn test_typing_replaces_selection() {
    let mut view = test_view_with_selection("hello world", 6..11);
    insert(&mut view, "there");

    assert_eq!(view.text(), "hello there");
    assert_eq!(view.selected_range(), 11..11);
}

#[test]
fn test_replace_selected_range_collapses_after_new_text() {
    let mut view = test_view_with_selection("hello world", 0..5);
    view.replace(TextRange::with_range(0, 5), "hi");

    assert_eq!(view.text(), "hi world");
    assert_eq!(view.selected_range(), 2..2);
}

#[test]
fn test_replace_before_selection_shifts_it() {
    let mut view = test_view_with_selection("hello world", 6..11);
    send(
        &mut view,
        InputMsg::Replace {
            range: TextRange::with_range(0, 5),
            text: "hey there".into(),
        },
    );

    assert_eq!(view.text(), "hey there world");
    assert_eq!(view.selected_range(), 10..15);
}

#[test]
fn test_replace_with_out_of_bounds_range_is_clamped() {
    let mut view = editing_view("abc");
    send(
        &mut view,
        InputMsg::Replace {
            range: TextRange::with_range(2, 40),
            text: "Z".into(),
        },
    );

    assert_eq!(view.text(), "abZ");
}

#[test]
fn test_insert_inside_selection_leaves_it() {
    let mut view = test_view_with_selection("hello world", 0..5);
    send(
        &mut view,
        InputMsg::Replace {
            range: TextRange::with_range(2, 0),
            text: "XY".into(),
        },
    );

    assert_eq!(view.text(), "heXYllo world");
    assert_eq!(view.selected_range(), 0..5);
}

#[test]
fn test_replace_around_caret_leaves_it() {
    let mut view = test_view_with_selection("hello world", 3..3);
    send(
        &mut view,
        InputMsg::Replace {
            range: TextRange::with_range(0, 5),
            text: "hi".into(),
        },
    );

    assert_eq!(view.text(), "hi world");
    assert_eq!(view.selected_range(), 3..3);
}

#[test]
fn test_backward_affinity_reset_when_caret_lands_on_end() {
    let mut view = test_view_with_selection("abc", 2..2);
    send(&mut view, InputMsg::SetSelectionAffinity(Affinity::Backward));
    assert_eq!(view.selected_text_range().start.affinity, Affinity::Backward);

    send(
        &mut view,
        InputMsg::Replace {
            range: TextRange::with_range(2, 1),
            text: String::new(),
        },
    );

    assert_eq!(view.text(), "ab");
    let selected = view.selected_text_range();
    assert_eq!(selected.start.offset, 2);
    assert_eq!(selected.start.affinity, Affinity::Forward);
    assert_eq!(selected.end.affinity, Affinity::Forward);
}

#[test]
fn test_backward_affinity_kept_away_from_boundaries() {
    let mut view = test_view_with_selection("abc", 2..2);
    send(&mut view, InputMsg::SetSelectionAffinity(Affinity::Backward));
    send(
        &mut view,
        InputMsg::Replace {
            range: TextRange::with_range(2, 1),
            text: "xy".into(),
        },
    );

    assert_eq!(view.text(), "abxy");
    assert_eq!(view.selected_text_range().start.affinity, Affinity::Backward);
}

#[test]
fn test_backward_affinity_rejected_at_buffer_edges() {
    let mut view = test_view_with_selection("abc", 0..0);
    send(&mut view, InputMsg::SetSelectionAffinity(Affinity::Backward));
    assert_eq!(view.selected_text_range().start.affinity, Affinity::Forward);

    let mut view = editing_view("abc");
    send(&mut view, InputMsg::SetSelectionAffinity(Affinity::Backward));
    assert_eq!(view.selected_text_range().end.affinity, Affinity::Forward);
}

#[test]
fn test_key_input_trait_routes_through_update() {
    let mut view = editing_view("");
    assert!(!view.has_text());
    view.insert_text("ok");
    view.delete_backward();

    assert!(view.has_text());
    assert_eq!(view.text(), "o");
    assert!(view.take_commands().is_some());
}

// ========================================================================
// Marked text
// ========================================================================

#[test]
fn test_marked_text_sequence() {
    let mut view = test_view_with_selection("abc", 1..1);

    send(
        &mut view,
        InputMsg::SetMarkedText {
            text: "X".into(),
            selected_range: TextRange::with_range(1, 0),
        },
    );
    assert_eq!(view.text(), "aXbc");
    assert_eq!(view.marked_range(), Some(1..2));
    assert_eq!(view.selected_range(), 2..2);

    send(
        &mut view,
        InputMsg::SetMarkedText {
            text: "XY".into(),
            selected_range: TextRange::with_range(2, 0),
        },
    );
    assert_eq!(view.text(), "aXYbc");
    assert_eq!(view.marked_range(), Some(1..3));
    assert_eq!(view.selected_range(), 3..3);

    send(&mut view, InputMsg::UnmarkText);
    assert_eq!(view.marked_range(), None);
    assert_eq!(view.text(), "aXYbc");
}

#[test]
fn test_marked_text_deletes_selection_first() {
    let mut view = test_view_with_selection("hello world", 6..11);
    view.set_marked_text("ka", TextRange::with_range(2, 0));

    assert_eq!(view.text(), "hello ka");
    assert_eq!(view.marked_range(), Some(6..8));
    assert_eq!(view.selected_range(), 8..8);
}

#[test]
fn test_marked_round_trip_replaces_span_once() {
    let mut view = test_view_with_selection("one two", 4..4);
    view.set_marked_text("s", TextRange::with_range(1, 0));
    view.set_marked_text("see", TextRange::with_range(3, 0));
    view.unmark_text();

    assert_eq!(view.text(), "one seetwo");
    assert_eq!(view.marked_text_range(), None);
}

#[test]
fn test_marked_selection_is_clamped_into_span() {
    let mut view = editing_view("");
    view.set_marked_text("ab", TextRange::with_range(9, 0));

    assert_eq!(view.marked_range(), Some(0..2));
    assert_eq!(view.selected_range(), 2..2);
}

// ========================================================================
// Bindings
// ========================================================================

fn text_with_binding() -> AttributedBuffer {
    let mut text = AttributedBuffer::from_text("hi @bob");
    text.set_attribute(
        AttributeKey::Binding,
        AttributeValue::Binding(Binding),
        3..7,
    );
    text
}

#[test]
fn test_binding_needs_two_backspaces() {
    let mut view = editing_view("");
    view.set_attributed_text(text_with_binding());
    view.flush();
    assert_eq!(view.selected_range(), 7..7);

    send(&mut view, InputMsg::DeleteBackward);
    assert_eq!(view.text(), "hi @bob");
    assert_eq!(view.selected_range(), 3..7);

    send(&mut view, InputMsg::DeleteBackward);
    assert_eq!(view.text(), "hi ");
    assert_eq!(view.selected_range(), 3..3);
}

#[test]
fn test_typing_over_confirmed_binding_replaces_it() {
    let mut view = editing_view("");
    view.set_attributed_text(text_with_binding());
    send(&mut view, InputMsg::DeleteBackward);
    insert(&mut view, "x");

    assert_eq!(view.text(), "hi x");
}

// ========================================================================
// Collaborators
// ========================================================================

#[test]
fn test_delegate_veto_leaves_state_unchanged() {
    let mut view = editing_view("keep");
    let delegate = recording_delegate(&mut view);
    delegate.borrow_mut().veto = Some("!".into());

    insert(&mut view, "!");
    assert_eq!(view.text(), "keep");
    assert_eq!(view.selected_range(), 4..4);

    insert(&mut view, "s");
    assert_eq!(view.text(), "keeps");
    assert!(delegate.borrow().events.contains(&"change".to_string()));
}

#[test]
fn test_parser_rewrites_typed_text() {
    let mut view = editing_view("");
    view.set_text_parser(Some(Rc::new(ReplacementParser::new().rule("->", "→"))));
    insert(&mut view, "a-");
    insert(&mut view, ">");

    assert_eq!(view.text(), "a→");
    assert_eq!(view.selected_range(), 2..2);
}

#[test]
fn test_change_notifications_are_posted() {
    let services = Services::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    services
        .notifications
        .subscribe(move |n| sink.borrow_mut().push(n.name));

    let mut view = common::test_view_with_services(&services, "");
    send(&mut view, richedit::messages::ResponderMsg::Become);
    insert(&mut view, "a");
    send(&mut view, richedit::messages::ResponderMsg::Resign);

    let seen = seen.borrow();
    assert_eq!(
        seen.as_slice(),
        &[
            TextViewNotification::DidBeginEditing,
            TextViewNotification::DidChange,
            TextViewNotification::DidEndEditing,
        ]
    );
}

#[test]
fn test_not_editable_view_still_accepts_programmatic_text() {
    let mut view = test_view("abc");
    view.set_constraints(richedit::EditConstraints::read_only());
    view.set_text("xyz");

    assert_eq!(view.text(), "xyz");
}
