//! Per-purpose timer handles.
//!
//! The core never runs timers. Arming one hands out a fresh token and emits
//! a `Cmd::ScheduleTimer`; the host echoes the token back when it fires. A
//! firing whose token is no longer armed is stale and dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Touch held in place long enough to count as a long press
    LongPress,
    /// Repeating tick while the touch is outside the visible area
    AutoScroll,
    /// Re-position selection dots after the overlay settles
    SelectionDotFix,
    /// Re-enable touch handling after a magnifier closes
    TouchGuard,
    /// Become first responder after a tap
    DeferredFocus,
    /// Scroll the selection into view after becoming first responder
    DeferredScroll,
}

impl TimerKind {
    pub fn is_repeating(&self) -> bool {
        matches!(self, TimerKind::AutoScroll)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

/// Delays and thresholds for touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub long_press_ms: u64,
    pub auto_scroll_ms: u64,
    pub selection_dot_fix_ms: u64,
    pub touch_guard_ms: u64,
    /// Distance a touch may travel before it stops counting as stationary
    pub allowable_movement: f64,
    /// Largest content offset change per auto-scroll tick
    pub max_auto_scroll_step: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            long_press_ms: 500,
            auto_scroll_ms: 100,
            selection_dot_fix_ms: 1000 / 15,
            touch_guard_ms: 150,
            allowable_movement: 10.0,
            max_auto_scroll_step: 32.0,
        }
    }
}

impl Timings {
    pub fn delay_ms(&self, kind: TimerKind) -> u64 {
        match kind {
            TimerKind::LongPress => self.long_press_ms,
            TimerKind::AutoScroll => self.auto_scroll_ms,
            TimerKind::SelectionDotFix => self.selection_dot_fix_ms,
            TimerKind::TouchGuard => self.touch_guard_ms,
            TimerKind::DeferredFocus | TimerKind::DeferredScroll => 0,
        }
    }
}

/// Currently armed timers, one slot per kind.
#[derive(Debug, Clone, Default)]
pub struct Timers {
    armed: BTreeMap<TimerKind, TimerToken>,
    next_token: u64,
}

impl Timers {
    /// Arm `kind`, replacing any pending timer of the same kind. Returns the
    /// new token and the token it replaced.
    pub fn arm(&mut self, kind: TimerKind) -> (TimerToken, Option<TimerToken>) {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        let previous = self.armed.insert(kind, token);
        (token, previous)
    }

    pub fn cancel(&mut self, kind: TimerKind) -> Option<TimerToken> {
        self.armed.remove(&kind)
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.armed.contains_key(&kind)
    }

    pub fn token(&self, kind: TimerKind) -> Option<TimerToken> {
        self.armed.get(&kind).copied()
    }

    /// Accept a firing. One-shot timers are disarmed by it.
    pub fn accept(&mut self, kind: TimerKind, token: TimerToken) -> bool {
        if self.armed.get(&kind) != Some(&token) {
            return false;
        }
        if !kind.is_repeating() {
            self.armed.remove(&kind);
        }
        true
    }

    /// Disarm everything, returning what was pending
    pub fn cancel_all(&mut self) -> Vec<(TimerKind, TimerToken)> {
        std::mem::take(&mut self.armed).into_iter().collect()
    }

    pub fn armed(&self) -> impl Iterator<Item = (TimerKind, TimerToken)> + '_ {
        self.armed.iter().map(|(k, t)| (*k, *t))
    }
}
