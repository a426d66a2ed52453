//! Text view model - the complete state of one editing widget
//!
//! This module contains the state types following the Elm Architecture
//! pattern. Transitions live in `crate::update`.

mod overlay;
mod scheduler;
mod text_view;
mod timers;
mod tracking;

pub use overlay::{
    ActiveHighlight, Magnifier, OverlayState, PlaceholderFrame, SelectionView, TOUCH_TEST_EXTEND,
};
pub use scheduler::UpdateScheduler;
pub use text_view::{TextView, Viewport};
pub use timers::{TimerKind, TimerToken, Timers, Timings};
pub use tracking::{Grabber, MoveDirection, TrackingMode, TrackingState};

