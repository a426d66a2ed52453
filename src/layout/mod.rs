//! Layout adapter.
//!
//! The text view never shapes text itself. A [`LayoutEngine`] turns an
//! attributed buffer plus a [`Container`] into an immutable [`TextLayout`]
//! that answers hit-testing and geometry queries in its own coordinate space.
//! [`LayoutFrame`] converts between that space and the view's content space.
//!
//! [`MonospaceLayoutEngine`] is a reference engine with fixed advances used by
//! the replay binary, tests and benches.

mod coords;
mod monospace;

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::editable::{AttributedBuffer, TextPosition, TextRange};
use crate::geometry::{EdgeInsets, Point, Rect, Size};

pub use coords::{LayoutFrame, VerticalAlignment};
pub use monospace::{MonospaceLayoutEngine, MonospaceMetrics};

/// Stand-in for an unbounded container axis
pub const CONTAINER_MAX: f64 = 1_048_576.0;

// ============================================================================
// Container
// ============================================================================

/// Adjusts line boxes after line breaking (custom line spacing, grids).
pub trait LinePositionModifier {
    fn modify_lines(&self, lines: &mut [LineBox], text: &AttributedBuffer, container: &Container);
}

/// Geometry the text is laid out into.
#[derive(Clone, Default)]
pub struct Container {
    pub size: Size,
    pub insets: EdgeInsets,
    /// Columns top-to-bottom, right-to-left
    pub vertical_form: bool,
    /// Bands intersecting these rects are left empty
    pub exclusion_paths: Vec<Rect>,
    pub line_position_modifier: Option<Rc<dyn LinePositionModifier>>,
}

impl Container {
    pub fn new(size: Size, insets: EdgeInsets) -> Self {
        Self {
            size,
            insets,
            ..Default::default()
        }
    }

    pub fn vertical(size: Size, insets: EdgeInsets) -> Self {
        Self {
            size,
            insets,
            vertical_form: true,
            ..Default::default()
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("size", &self.size)
            .field("insets", &self.insets)
            .field("vertical_form", &self.vertical_form)
            .field("exclusion_paths", &self.exclusion_paths)
            .field(
                "line_position_modifier",
                &self.line_position_modifier.is_some(),
            )
            .finish()
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        let same_modifier = match (&self.line_position_modifier, &other.line_position_modifier) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        self.size == other.size
            && self.insets == other.insets
            && self.vertical_form == other.vertical_form
            && self.exclusion_paths == other.exclusion_paths
            && same_modifier
    }
}

// ============================================================================
// Layout output
// ============================================================================

/// One laid-out line (a column in vertical form).
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    /// Chars on this line, including a trailing line break
    pub range: Range<usize>,
    pub bounds: Rect,
    /// Baseline origin
    pub position: Point,
    pub row: usize,
}

/// A piece of selection geometry. Start and end markers are zero-thickness
/// caret rects used to place grabbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub rect: Rect,
    pub contains_start: bool,
    pub contains_end: bool,
    pub is_vertical: bool,
}

impl SelectionRect {
    pub fn fill(rect: Rect, is_vertical: bool) -> Self {
        Self {
            rect,
            contains_start: false,
            contains_end: false,
            is_vertical,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.contains_start || self.contains_end
    }
}

/// Movement direction in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Immutable result of laying out one text snapshot.
pub trait TextLayout {
    fn container(&self) -> &Container;

    /// The text this layout was computed from
    fn text(&self) -> &AttributedBuffer;

    fn bounding_size(&self) -> Size;

    fn lines(&self) -> &[LineBox];

    /// Chars that made it into the container
    fn visible_range(&self) -> Range<usize>;

    fn line_index_for_position(&self, position: TextPosition) -> Option<usize>;

    fn closest_line_index(&self, point: Point) -> Option<usize>;

    fn closest_position(&self, point: Point) -> Option<TextPosition>;

    /// Closest position for a grabber being dragged from `old` while the other
    /// end of the selection stays at `other`. Never returns `other` itself and
    /// never crosses it.
    fn position_for_grabber(
        &self,
        point: Point,
        old: TextPosition,
        other: TextPosition,
    ) -> Option<TextPosition>;

    /// Cluster under `point`, `None` when the point hits no glyph
    fn text_range_at(&self, point: Point) -> Option<TextRange>;

    fn closest_text_range(&self, point: Point) -> Option<TextRange>;

    /// The cluster (or binding run) around `position`. Empty at a boundary.
    fn cluster_range_at(&self, position: TextPosition) -> Option<TextRange>;

    /// Extend from `position` by `offset` units in `direction`, snapping to
    /// clusters. Negative offsets reverse the direction.
    fn range_by_extending(
        &self,
        position: TextPosition,
        direction: LayoutDirection,
        offset: isize,
    ) -> Option<TextRange>;

    fn caret_rect(&self, position: TextPosition) -> Option<Rect>;

    fn first_rect(&self, range: &TextRange) -> Option<Rect>;

    /// Union of every line segment covered by `range`
    fn rect_for_range(&self, range: &TextRange) -> Option<Rect>;

    fn selection_rects(&self, range: &TextRange) -> Vec<SelectionRect>;

    fn selection_rects_without_ends(&self, range: &TextRange) -> Vec<SelectionRect> {
        self.selection_rects(range)
            .into_iter()
            .filter(|r| !r.is_marker())
            .collect()
    }

    fn selection_rects_only_ends(&self, range: &TextRange) -> Vec<SelectionRect> {
        self.selection_rects(range)
            .into_iter()
            .filter(|r| r.is_marker())
            .collect()
    }
}

/// Builds layouts. Returns `None` when the container has no area at all.
pub trait LayoutEngine {
    fn layout(&self, text: &AttributedBuffer, container: &Container) -> Option<Rc<dyn TextLayout>>;
}
