//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use richedit::geometry::{Point, Rect};
use richedit::messages::{InputMsg, Msg, ResponderMsg, TimerMsg, TouchMsg, ViewportMsg};
use richedit::model::TimerKind;
use richedit::services::{MemoryPasteboard, Services, TextViewDelegate, ViewId};
use richedit::{update, Cmd, MonospaceLayoutEngine, MonospaceMetrics, TextView};

/// Frame used by every test view
pub const FRAME: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 320.0,
    height: 480.0,
};

/// Default text container inset is (top 6, left 4); monospace cells are 8x16
pub const ADVANCE: f64 = 8.0;
pub const LINE_HEIGHT: f64 = 16.0;
pub const INSET_LEFT: f64 = 4.0;
pub const INSET_TOP: f64 = 6.0;

/// Create a laid-out view holding `text` with the caret at the end
pub fn test_view(text: &str) -> TextView {
    test_view_with_services(&Services::new(), text)
}

pub fn test_view_with_services(services: &Services, text: &str) -> TextView {
    let engine = Rc::new(MonospaceLayoutEngine::new(MonospaceMetrics::default()));
    let mut view = TextView::new(services, engine);
    view.set_pasteboard(Rc::new(RefCell::new(MemoryPasteboard::new())));
    update(&mut view, ViewportMsg::SetFrame(FRAME).into());
    view.set_text(text);
    view.flush();
    view
}

/// Like [`test_view`], already first responder
pub fn editing_view(text: &str) -> TextView {
    let mut view = test_view(text);
    send(&mut view, ResponderMsg::Become);
    view
}

/// Create an editing view with `selection` selected
pub fn test_view_with_selection(text: &str, selection: Range<usize>) -> TextView {
    let mut view = editing_view(text);
    view.set_selected_range(selection);
    view.flush();
    view
}

/// Send one message, returning its commands flattened
pub fn send(view: &mut TextView, msg: impl Into<Msg>) -> Vec<Cmd> {
    update(view, msg.into()).map(Cmd::into_vec).unwrap_or_default()
}

pub fn insert(view: &mut TextView, text: &str) -> Vec<Cmd> {
    send(view, InputMsg::InsertText(text.to_string()))
}

/// Content-space point over the left edge of character `column` on `line`
pub fn char_point(column: usize, line: usize) -> Point {
    Point::new(
        INSET_LEFT + column as f64 * ADVANCE + 1.0,
        INSET_TOP + line as f64 * LINE_HEIGHT + LINE_HEIGHT / 2.0,
    )
}

pub fn touch_began(view: &mut TextView, point: Point, time_ms: u64) -> Vec<Cmd> {
    send(view, TouchMsg::Began { point, time_ms })
}

pub fn touch_moved(view: &mut TextView, point: Point, time_ms: u64) -> Vec<Cmd> {
    send(view, TouchMsg::Moved { point, time_ms })
}

pub fn touch_ended(view: &mut TextView, point: Point, time_ms: u64) -> Vec<Cmd> {
    send(view, TouchMsg::Ended { point, time_ms })
}

/// Tap without movement
pub fn tap(view: &mut TextView, point: Point) -> Vec<Cmd> {
    let mut cmds = touch_began(view, point, 0);
    cmds.extend(touch_ended(view, point, 50));
    cmds
}

/// Deliver the armed timer of `kind`, as the host would once it elapses
pub fn fire(view: &mut TextView, kind: TimerKind) -> Vec<Cmd> {
    let token = view
        .armed_timers()
        .into_iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, token)| token);
    match token {
        Some(token) => send(view, TimerMsg::Fired { kind, token }),
        None => panic!("{:?} timer is not armed", kind),
    }
}

pub fn scheduled(cmds: &[Cmd], kind: TimerKind) -> bool {
    cmds.iter()
        .any(|c| matches!(c, Cmd::ScheduleTimer { kind: k, .. } if *k == kind))
}

/// Delegate that records every callback it receives
#[derive(Default)]
pub struct RecordingDelegate {
    pub events: Vec<String>,
    /// Reject edits whose replacement contains this string
    pub veto: Option<String>,
}

impl TextViewDelegate for RecordingDelegate {
    fn did_begin_editing(&mut self, _view: ViewId) {
        self.events.push("begin".into());
    }

    fn did_end_editing(&mut self, _view: ViewId) {
        self.events.push("end".into());
    }

    fn should_change_text(&mut self, _view: ViewId, _range: Range<usize>, replacement: &str) -> bool {
        match &self.veto {
            Some(word) => !replacement.contains(word.as_str()),
            None => true,
        }
    }

    fn did_change(&mut self, _view: ViewId) {
        self.events.push("change".into());
    }

    fn did_change_selection(&mut self, _view: ViewId) {
        self.events.push("selection".into());
    }

    fn did_tap_highlight(
        &mut self,
        _view: ViewId,
        _highlight: &richedit::editable::Highlight,
        range: Range<usize>,
        _rect: Rect,
    ) {
        self.events.push(format!("tap {:?}", range));
    }
}

pub fn recording_delegate(view: &mut TextView) -> Rc<RefCell<RecordingDelegate>> {
    let delegate = Rc::new(RefCell::new(RecordingDelegate::default()));
    view.set_delegate(&delegate);
    delegate
}
