//! Per-gesture touch tracking record.

use serde::Serialize;

use crate::editable::TextRange;
use crate::geometry::Point;

/// The state a touch gesture is in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    #[default]
    Inactive,
    GrabberStart,
    GrabberEnd,
    Caret,
    PreSelect,
    Highlight,
}

/// Which end of a ranged selection a grabber drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grabber {
    Start,
    End,
}

/// Dominant direction of the first movement beyond the allowable distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    #[default]
    None,
    Left,
    Top,
    Right,
    Bottom,
}

impl MoveDirection {
    pub fn is_moved(&self) -> bool {
        *self != MoveDirection::None
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, MoveDirection::Left | MoveDirection::Right)
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, MoveDirection::Top | MoveDirection::Bottom)
    }
}

/// Everything remembered between touch-began and touch-ended.
#[derive(Debug, Clone, Default)]
pub struct TrackingState {
    /// A touch is being tracked
    pub active: bool,
    /// Touch events belong to the text view, not the views behind it
    pub swallow: bool,
    pub grabber: Option<Grabber>,
    pub caret: bool,
    pub pre_select: bool,
    pub moved: MoveDirection,

    pub began_point: Point,
    pub began_time_ms: u64,
    pub point: Point,
    pub time_ms: u64,

    /// Candidate selection, committed on touch-ended
    pub range: Option<TextRange>,

    pub auto_scroll_offset: f64,
    pub auto_scroll_acceleration: u32,
    pub auto_scroll_ticked: bool,

    /// Vertical distance from the touch to the grabbed edge's line
    pub magnifier_ranged_offset: f64,
}

impl TrackingState {
    /// Start a fresh gesture at `point`
    pub fn begin(&mut self, point: Point, time_ms: u64, range: TextRange) {
        *self = TrackingState {
            active: true,
            swallow: true,
            began_point: point,
            began_time_ms: time_ms,
            point,
            time_ms,
            range: Some(range),
            ..Default::default()
        };
    }

    pub fn mode(&self, highlight_active: bool) -> TrackingMode {
        if !self.active {
            return TrackingMode::Inactive;
        }
        if highlight_active {
            return TrackingMode::Highlight;
        }
        match self.grabber {
            Some(Grabber::Start) => return TrackingMode::GrabberStart,
            Some(Grabber::End) => return TrackingMode::GrabberEnd,
            None => {}
        }
        if self.pre_select {
            TrackingMode::PreSelect
        } else if self.caret {
            TrackingMode::Caret
        } else {
            TrackingMode::Inactive
        }
    }

    /// Classify the movement from the start point along its dominant axis,
    /// `None` until it travels further than `allowable`
    pub fn move_direction(&self, allowable: f64) -> MoveDirection {
        let dx = self.point.x - self.began_point.x;
        let dy = self.point.y - self.began_point.y;
        if dx.abs() > dy.abs() {
            if dx.abs() > allowable {
                return if dx > 0.0 {
                    MoveDirection::Right
                } else {
                    MoveDirection::Left
                };
            }
        } else if dy.abs() > allowable {
            return if dy > 0.0 {
                MoveDirection::Bottom
            } else {
                MoveDirection::Top
            };
        }
        MoveDirection::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracking_from(a: Point, b: Point) -> TrackingState {
        let mut t = TrackingState::default();
        t.begin(a, 0, TextRange::default());
        t.point = b;
        t
    }

    #[test]
    fn test_move_direction_threshold() {
        let t = tracking_from(Point::new(10.0, 10.0), Point::new(15.0, 12.0));
        assert_eq!(t.move_direction(10.0), MoveDirection::None);

        let t = tracking_from(Point::new(10.0, 10.0), Point::new(40.0, 12.0));
        assert_eq!(t.move_direction(10.0), MoveDirection::Right);

        let t = tracking_from(Point::new(10.0, 40.0), Point::new(12.0, 0.0));
        assert_eq!(t.move_direction(10.0), MoveDirection::Top);
    }

    #[test]
    fn test_equal_axes_resolve_vertically() {
        let t = tracking_from(Point::new(0.0, 0.0), Point::new(20.0, 20.0));
        assert_eq!(t.move_direction(10.0), MoveDirection::Bottom);
    }

    #[test]
    fn test_mode_priority() {
        let mut t = TrackingState::default();
        assert_eq!(t.mode(false), TrackingMode::Inactive);
        t.begin(Point::ZERO, 0, TextRange::default());
        t.caret = true;
        assert_eq!(t.mode(false), TrackingMode::Caret);
        t.grabber = Some(Grabber::End);
        assert_eq!(t.mode(false), TrackingMode::GrabberEnd);
        assert_eq!(t.mode(true), TrackingMode::Highlight);
    }
}
