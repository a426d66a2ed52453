//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through `update`. Handlers are split by
//! concern into `impl TextView` blocks in the submodules.

mod edit;
mod input;
mod properties;
mod query;
mod refresh;
mod responder;
mod timers;
mod touch;
mod viewport;

use crate::commands::Cmd;
use crate::messages::Msg;
use crate::model::TextView;

#[cfg(debug_assertions)]
use crate::messages::{TimerMsg, TouchMsg};
#[cfg(debug_assertions)]
use crate::model::TimerKind;
#[cfg(debug_assertions)]
use crate::tracing::SelectionSnapshot;
#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

/// Main update function - dispatches to the view's handlers and returns the
/// side effects queued during the turn
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update(view: &mut TextView, msg: Msg) -> Option<Cmd> {
    dispatch(view, msg);
    view.take_commands()
}

/// Run one message to completion, leaving its commands in the outbox
pub(crate) fn dispatch(view: &mut TextView, msg: Msg) {
    #[cfg(debug_assertions)]
    {
        update_traced(view, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(view, msg)
    }
}

/// Inner update logic (no tracing)
fn update_inner(view: &mut TextView, msg: Msg) {
    match msg {
        Msg::Input(m) => view.handle_input(m),
        Msg::Edit(m) => view.handle_edit(m),
        Msg::Touch(m) => view.handle_touch(m),
        Msg::Timer(m) => view.handle_timer(m),
        Msg::Responder(m) => view.handle_responder(m),
        Msg::Viewport(m) => view.handle_viewport(m),
    }
    // Coalesced refresh: however many mutations ran, relayout once
    view.end_turn();
}

/// Traced update wrapper (debug builds only)
///
/// Captures before/after selection state and logs diffs for debugging.
/// Filters out noisy messages like touch moves and auto-scroll ticks.
#[cfg(debug_assertions)]
fn update_traced(view: &mut TextView, msg: Msg) {
    let is_noisy = matches!(
        &msg,
        Msg::Touch(TouchMsg::Moved { .. })
            | Msg::Timer(TimerMsg::Fired {
                kind: TimerKind::AutoScroll,
                ..
            })
    );

    let msg_name = msg_type_name(&msg);
    let _span = if is_noisy {
        None
    } else {
        Some(span!(Level::DEBUG, "update", view = view.id().0, msg = %msg_name).entered())
    };

    let before = SelectionSnapshot::from_view(view);

    if !is_noisy {
        debug!(target: "message", msg = %msg_name, "processing");
    }

    update_inner(view, msg);

    let after = SelectionSnapshot::from_view(view);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "selection", %diff, "state changed");
    }

    view.assert_invariants_with_context(&msg_name);
}

/// Get a display name for a message type
///
/// Uses Debug formatting to include variant names and arguments.
/// Example outputs:
/// - `Input::InsertText("a")`
/// - `Touch::Began { point: .., time_ms: 0 }`
/// - `Edit::Undo`
#[cfg(debug_assertions)]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::Input(m) => format!("Input::{:?}", m),
        Msg::Edit(m) => format!("Edit::{:?}", m),
        Msg::Touch(m) => format!("Touch::{:?}", m),
        Msg::Timer(m) => format!("Timer::{:?}", m),
        Msg::Responder(m) => format!("Responder::{:?}", m),
        Msg::Viewport(m) => format!("Viewport::{:?}", m),
    }
}
