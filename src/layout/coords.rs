//! Conversion between layout space and the view's content space.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};

/// Where text sits when it is shorter than the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlignment {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Everything needed to map points between layout and content space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutFrame {
    pub bounding_size: Size,
    pub container_size: Size,
    pub view_size: Size,
    pub vertical_form: bool,
    pub alignment: VerticalAlignment,
}

impl LayoutFrame {
    /// Offset added when going from content space to layout space
    fn shift(&self) -> (f64, f64) {
        let bounding = self.bounding_size;
        let view = self.view_size;
        if self.vertical_form {
            let mut dx = self.container_size.width - bounding.width.max(view.width);
            if bounding.width < view.width {
                match self.alignment {
                    VerticalAlignment::Top => {}
                    VerticalAlignment::Center => dx += (view.width - bounding.width) * 0.5,
                    VerticalAlignment::Bottom => dx += view.width - bounding.width,
                }
            }
            (dx, 0.0)
        } else {
            let mut dy = 0.0;
            if bounding.height < view.height {
                match self.alignment {
                    VerticalAlignment::Top => {}
                    VerticalAlignment::Center => dy -= (view.height - bounding.height) * 0.5,
                    VerticalAlignment::Bottom => dy -= view.height - bounding.height,
                }
            }
            (0.0, dy)
        }
    }

    pub fn to_layout_point(&self, point: Point) -> Point {
        let (dx, dy) = self.shift();
        point.offset(dx, dy)
    }

    pub fn from_layout_point(&self, point: Point) -> Point {
        let (dx, dy) = self.shift();
        point.offset(-dx, -dy)
    }

    pub fn to_layout_rect(&self, rect: Rect) -> Rect {
        rect.with_origin(self.to_layout_point(rect.origin()))
    }

    pub fn from_layout_rect(&self, rect: Rect) -> Rect {
        rect.with_origin(self.from_layout_point(rect.origin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(vertical_form: bool, alignment: VerticalAlignment) -> LayoutFrame {
        LayoutFrame {
            bounding_size: Size::new(100.0, 40.0),
            container_size: Size::new(300.0, 1000.0),
            view_size: Size::new(200.0, 120.0),
            vertical_form,
            alignment,
        }
    }

    #[test]
    fn test_horizontal_alignment_shift() {
        let p = Point::new(10.0, 70.0);
        assert_eq!(frame(false, VerticalAlignment::Top).to_layout_point(p), p);
        assert_eq!(
            frame(false, VerticalAlignment::Center).to_layout_point(p),
            Point::new(10.0, 30.0)
        );
        assert_eq!(
            frame(false, VerticalAlignment::Bottom).to_layout_point(p),
            Point::new(10.0, -10.0)
        );
    }

    #[test]
    fn test_vertical_shift_uses_container_width() {
        let f = frame(true, VerticalAlignment::Top);
        assert_eq!(f.to_layout_point(Point::ZERO), Point::new(100.0, 0.0));
        let f = frame(true, VerticalAlignment::Center);
        assert_eq!(f.to_layout_point(Point::ZERO), Point::new(150.0, 0.0));
    }

    #[test]
    fn test_conversion_round_trips() {
        for vertical in [false, true] {
            for alignment in [
                VerticalAlignment::Top,
                VerticalAlignment::Center,
                VerticalAlignment::Bottom,
            ] {
                let f = frame(vertical, alignment);
                let p = Point::new(12.5, 33.0);
                assert_eq!(f.from_layout_point(f.to_layout_point(p)), p);
                let r = Rect::new(1.0, 2.0, 3.0, 4.0);
                assert_eq!(f.to_layout_rect(f.from_layout_rect(r)), r);
            }
        }
    }
}
