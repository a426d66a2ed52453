//! Fixtures shared by the unit tests

use std::rc::Rc;

use crate::geometry::Rect;
use crate::layout::{MonospaceLayoutEngine, MonospaceMetrics};
use crate::messages::{ResponderMsg, ViewportMsg};
use crate::model::TextView;
use crate::services::Services;
use crate::update::update;

pub(crate) const TEST_FRAME: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 320.0,
    height: 480.0,
};

/// A laid-out view holding `text`, caret at the end, not editing
pub(crate) fn view_with_text(text: &str) -> TextView {
    let services = Services::new();
    let engine = Rc::new(MonospaceLayoutEngine::new(MonospaceMetrics::default()));
    let mut view = TextView::new(&services, engine);
    update(&mut view, ViewportMsg::SetFrame(TEST_FRAME).into());
    view.set_text(text);
    view.flush();
    view
}

/// Like [`view_with_text`], but already first responder
pub(crate) fn editing_view(text: &str) -> TextView {
    let mut view = view_with_text(text);
    update(&mut view, ResponderMsg::Become.into());
    view
}
