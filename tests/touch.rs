//! Touch tracking tests - taps, long press, caret and grabber drags,
//! highlights, auto-scroll

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{
    char_point, editing_view, fire, recording_delegate, scheduled, send, tap, test_view,
    test_view_with_selection, touch_began, touch_ended, touch_moved,
};
use richedit::commands::MagnifierStyle;
use richedit::editable::{AttributeKey, AttributeValue, AttributedBuffer, Attributes, Highlight};
use richedit::geometry::Point;
use richedit::messages::{TimerMsg, TouchMsg};
use richedit::model::{TimerKind, TrackingMode};
use richedit::Cmd;

// ========================================================================
// Taps
// ========================================================================

#[test]
fn test_tap_on_idle_view_places_caret_then_focuses() {
    let mut view = test_view("hello world");
    let cmds = tap(&mut view, char_point(3, 0));

    assert_eq!(view.selected_range(), 3..3);
    assert!(!view.is_first_responder());
    assert!(scheduled(&cmds, TimerKind::DeferredFocus));

    let cmds = fire(&mut view, TimerKind::DeferredFocus);
    assert!(view.is_first_responder());
    assert!(cmds.contains(&Cmd::FocusChanged { focused: true }));
}

#[test]
fn test_tap_while_editing_moves_caret() {
    let mut view = editing_view("hello world");
    tap(&mut view, char_point(2, 0));

    assert_eq!(view.selected_range(), 2..2);
    assert_eq!(view.tracking_mode(), TrackingMode::Inactive);
}

#[test]
fn test_tap_on_caret_toggles_menu() {
    let mut view = test_view_with_selection("hello", 0..0);
    let caret = Point::new(4.0, 14.0);

    let cmds = tap(&mut view, caret);
    assert!(cmds.iter().any(|c| matches!(c, Cmd::ShowMenu { .. })));
    assert!(view.overlay().menu_visible);

    let cmds = tap(&mut view, caret);
    assert!(cmds.contains(&Cmd::HideMenu));
    assert_eq!(view.selected_range(), 0..0);
}

#[test]
fn test_touch_ignored_when_not_selectable() {
    let mut view = test_view("hello");
    view.set_selectable(false);
    tap(&mut view, char_point(1, 0));

    assert_eq!(view.selected_range(), 5..5);
    assert!(!view.is_timer_armed(TimerKind::DeferredFocus));
}

// ========================================================================
// Long press
// ========================================================================

#[test]
fn test_long_press_preselects_word() {
    let mut view = test_view("hello world");
    let point = char_point(7, 0);
    let cmds = touch_began(&mut view, point, 0);
    assert!(scheduled(&cmds, TimerKind::LongPress));

    let cmds = fire(&mut view, TimerKind::LongPress);
    assert_eq!(view.tracking_mode(), TrackingMode::PreSelect);
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::ShowMagnifier {
            style: MagnifierStyle::Caret,
            ..
        }
    )));
    // Not committed while the finger is down
    assert_eq!(view.selected_range(), 11..11);

    let cmds = touch_ended(&mut view, point, 600);
    assert_eq!(view.selected_range(), 6..11);
    assert!(!view.is_first_responder());
    assert!(cmds.iter().any(|c| matches!(c, Cmd::ShowMenu { .. })));
    assert!(cmds.contains(&Cmd::HideMagnifier {
        style: MagnifierStyle::Caret
    }));
}

#[test]
fn test_movement_cancels_long_press() {
    let mut view = test_view("hello world");
    touch_began(&mut view, char_point(1, 0), 0);
    let cmds = touch_moved(&mut view, char_point(6, 0), 40);

    assert!(!view.is_timer_armed(TimerKind::LongPress));
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Cmd::CancelTimer { kind: TimerKind::LongPress, .. })));
}

#[test]
fn test_cancel_reverts_without_committing() {
    let mut view = test_view("hello world");
    touch_began(&mut view, char_point(7, 0), 0);
    fire(&mut view, TimerKind::LongPress);
    send(&mut view, TouchMsg::Cancelled);

    assert_eq!(view.tracking_mode(), TrackingMode::Inactive);
    assert_eq!(view.selected_range(), 11..11);
    assert!(!view.is_timer_armed(TimerKind::LongPress));
}

#[test]
fn test_touches_are_ignored_while_magnifier_closes() {
    let mut view = test_view("hello world");
    touch_began(&mut view, char_point(7, 0), 0);
    fire(&mut view, TimerKind::LongPress);
    touch_ended(&mut view, char_point(7, 0), 600);
    assert!(view.is_timer_armed(TimerKind::TouchGuard));

    touch_began(&mut view, char_point(1, 0), 650);
    assert!(!view.is_timer_armed(TimerKind::LongPress));
    touch_ended(&mut view, char_point(1, 0), 700);

    fire(&mut view, TimerKind::TouchGuard);
    touch_began(&mut view, char_point(1, 0), 800);
    assert!(view.is_timer_armed(TimerKind::LongPress));
}

#[test]
fn test_stale_long_press_is_ignored() {
    let mut view = test_view("hello world");
    let cmds = touch_began(&mut view, char_point(7, 0), 0);
    let token = cmds
        .iter()
        .find_map(|c| match c {
            Cmd::ScheduleTimer {
                kind: TimerKind::LongPress,
                token,
                ..
            } => Some(*token),
            _ => None,
        })
        .expect("long press scheduled");
    touch_ended(&mut view, char_point(7, 0), 50);
    let selected = view.selected_range();

    send(
        &mut view,
        TimerMsg::Fired {
            kind: TimerKind::LongPress,
            token,
        },
    );
    assert_eq!(view.tracking_mode(), TrackingMode::Inactive);
    assert_eq!(view.selected_range(), selected);
}

// ========================================================================
// Drags
// ========================================================================

#[test]
fn test_caret_drag_commits_on_release() {
    let mut view = editing_view("hello world");
    let caret = Point::new(92.0, 14.0);
    let cmds = touch_began(&mut view, caret, 0);
    assert_eq!(view.tracking_mode(), TrackingMode::Caret);
    assert!(cmds.contains(&Cmd::SetScrollEnabled(false)));

    let target = char_point(2, 0);
    let cmds = touch_moved(&mut view, target, 30);
    assert_eq!(view.selected_range(), 11..11);
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Cmd::ShowMagnifier { style: MagnifierStyle::Caret, .. })));

    let cmds = touch_ended(&mut view, target, 60);
    assert_eq!(view.selected_range(), 2..2);
    assert!(cmds.contains(&Cmd::SetScrollEnabled(true)));
    assert!(cmds.iter().any(|c| matches!(c, Cmd::ShowMenu { .. })));
}

#[test]
fn test_grabber_drag_extends_selection() {
    let mut view = test_view_with_selection("hello world", 0..5);
    let end_grabber = Point::new(45.0, 14.0);
    touch_began(&mut view, end_grabber, 0);
    assert_eq!(view.tracking_mode(), TrackingMode::GrabberEnd);

    let target = char_point(9, 0);
    let cmds = touch_moved(&mut view, target, 30);
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Cmd::ShowMagnifier { style: MagnifierStyle::Ranged, .. })));

    touch_ended(&mut view, target, 60);
    assert_eq!(view.selected_range(), 0..9);
}

#[test]
fn test_drag_past_bottom_auto_scrolls() {
    let text = "line\n".repeat(60);
    let mut view = test_view_with_selection(&text, 0..0);
    touch_began(&mut view, Point::new(4.0, 14.0), 0);
    assert_eq!(view.tracking_mode(), TrackingMode::Caret);

    let cmds = touch_moved(&mut view, Point::new(4.0, 500.0), 30);
    assert!(cmds.iter().any(|c| matches!(
        c,
        Cmd::ScheduleTimer {
            kind: TimerKind::AutoScroll,
            repeating: true,
            ..
        }
    )));

    let cmds = fire(&mut view, TimerKind::AutoScroll);
    assert!(view.viewport().content_offset.y > 0.0);
    assert!(cmds
        .iter()
        .any(|c| matches!(c, Cmd::SetContentOffset { animated: true, .. })));

    let cmds = touch_ended(&mut view, Point::new(4.0, 500.0), 200);
    assert!(cmds.contains(&Cmd::FlashScrollIndicators));
    assert!(!view.is_timer_armed(TimerKind::AutoScroll));
}

// ========================================================================
// Highlights
// ========================================================================

fn text_with_highlight(highlight: Highlight) -> AttributedBuffer {
    let mut text = AttributedBuffer::from_text("hello world");
    text.set_attribute(
        AttributeKey::Highlight,
        AttributeValue::Highlight(highlight),
        0..5,
    );
    text
}

#[test]
fn test_highlight_tap_reaches_delegate() {
    let mut view = test_view("");
    view.set_attributed_text(text_with_highlight(Highlight::with_attributes(
        Attributes::new(),
    )));
    view.flush();
    let delegate = recording_delegate(&mut view);

    touch_began(&mut view, char_point(1, 0), 0);
    assert_eq!(view.tracking_mode(), TrackingMode::Highlight);
    assert_eq!(view.active_highlight().map(|(_, r)| r), Some(0..5));

    touch_ended(&mut view, char_point(1, 0), 50);
    assert!(delegate.borrow().events.contains(&"tap 0..5".to_string()));
    assert_eq!(view.active_highlight().map(|(_, r)| r), None);
}

#[test]
fn test_highlight_action_wins_over_delegate() {
    let taps = Rc::new(Cell::new(0));
    let counter = taps.clone();
    let highlight = Highlight::with_attributes(Attributes::new())
        .on_tap(move |event| {
            assert_eq!(event.range, 0..5);
            counter.set(counter.get() + 1);
        });

    let mut view = test_view("");
    view.set_attributed_text(text_with_highlight(highlight));
    view.flush();
    let delegate = recording_delegate(&mut view);

    tap(&mut view, char_point(2, 0));
    assert_eq!(taps.get(), 1);
    assert!(delegate.borrow().events.iter().all(|e| !e.starts_with("tap")));
}

#[test]
fn test_dragging_off_highlight_cancels_tap() {
    let taps = Rc::new(Cell::new(0));
    let counter = taps.clone();
    let highlight =
        Highlight::with_attributes(Attributes::new()).on_tap(move |_| counter.set(counter.get() + 1));

    let mut view = test_view("");
    view.set_attributed_text(text_with_highlight(highlight));
    view.flush();

    touch_began(&mut view, char_point(1, 0), 0);
    touch_moved(&mut view, char_point(9, 0), 30);
    touch_ended(&mut view, char_point(9, 0), 60);
    assert_eq!(taps.get(), 0);
}
