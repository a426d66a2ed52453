//! Fixed-advance reference layout.
//!
//! Every grapheme cluster takes `advance` points along the line, line breaks
//! take none, and attachments take their own width. Lines wrap greedily at
//! cluster boundaries. In vertical form lines become columns that run top to
//! bottom, stacked right to left.

use std::ops::Range;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use super::{Container, LayoutDirection, LayoutEngine, LineBox, SelectionRect, TextLayout};
use crate::editable::{
    Affinity, AttributeKey, AttributedBuffer, TextPosition, TextRange, ATTACHMENT_CHAR,
};
use crate::geometry::{Point, Rect, Size};

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonospaceMetrics {
    pub advance: f64,
    pub line_height: f64,
    pub ascent: f64,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            advance: 8.0,
            line_height: 16.0,
            ascent: 12.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MonospaceLayoutEngine {
    pub metrics: MonospaceMetrics,
}

impl MonospaceLayoutEngine {
    pub fn new(metrics: MonospaceMetrics) -> Self {
        Self { metrics }
    }
}

impl LayoutEngine for MonospaceLayoutEngine {
    fn layout(&self, text: &AttributedBuffer, container: &Container) -> Option<Rc<dyn TextLayout>> {
        if container.size.width <= 0.0 && container.size.height <= 0.0 {
            tracing::trace!(size = ?container.size, "container has no area, skipping layout");
            return None;
        }
        Some(Rc::new(MonospaceLayout::build(
            text.clone(),
            container.clone(),
            self.metrics,
        )))
    }
}

// ============================================================================
// Line breaking
// ============================================================================

struct Cluster {
    start: usize,
    end: usize,
    extent: f64,
    is_break: bool,
}

fn is_line_break(g: &str) -> bool {
    matches!(g, "\n" | "\r" | "\r\n" | "\u{85}" | "\u{2028}" | "\u{2029}")
}

fn clusters(text: &AttributedBuffer, metrics: &MonospaceMetrics) -> Vec<Cluster> {
    let s = text.text();
    let mut out = Vec::new();
    let mut offset = 0;
    for g in s.graphemes(true) {
        let n = g.chars().count();
        let is_break = is_line_break(g);
        let extent = if is_break {
            0.0
        } else if g.starts_with(ATTACHMENT_CHAR) {
            text.attributes_at(offset)
                .attachment()
                .map(|a| a.width)
                .unwrap_or(metrics.advance)
        } else {
            metrics.advance
        };
        out.push(Cluster {
            start: offset,
            end: offset + n,
            extent,
            is_break,
        });
        offset += n;
    }
    out
}

/// Per-line cluster stops. `edges[k]` is the distance from the line origin to
/// the leading edge of cluster `k`; the final entry is the line's extent.
#[derive(Debug, Clone)]
struct LineShape {
    starts: Vec<usize>,
    edges: Vec<f64>,
    terminated: bool,
}

pub struct MonospaceLayout {
    text: AttributedBuffer,
    container: Container,
    metrics: MonospaceMetrics,
    lines: Vec<LineBox>,
    shapes: Vec<LineShape>,
    /// Every cluster boundary in the visible range, ascending
    stops: Vec<usize>,
    bounding_size: Size,
}

impl MonospaceLayout {
    fn build(text: AttributedBuffer, container: Container, metrics: MonospaceMetrics) -> Self {
        let clusters = clusters(&text, &metrics);
        let insets = container.insets;
        let size = container.size;
        let vertical = container.vertical_form;
        let lh = metrics.line_height;

        let (along_limit, across_limit) = if vertical {
            (
                size.height - insets.top - insets.bottom,
                size.width - insets.left - insets.right,
            )
        } else {
            (
                size.width - insets.left - insets.right,
                size.height - insets.top - insets.bottom,
            )
        };

        let band = |across: f64| -> Rect {
            if vertical {
                Rect::new(size.width - insets.right - across - lh, insets.top, lh, along_limit)
            } else {
                Rect::new(insets.left, insets.top + across, along_limit, lh)
            }
        };
        let excluded = |r: &Rect| {
            container
                .exclusion_paths
                .iter()
                .any(|e| r.intersection(e).is_some_and(|i| i.width > 0.0 && i.height > 0.0))
        };

        let mut lines = Vec::new();
        let mut shapes = Vec::new();
        let mut across = 0.0;
        let mut i = 0;
        while i < clusters.len() {
            while excluded(&band(across)) && across + lh <= across_limit + EPSILON {
                across += lh;
            }
            if across + lh > across_limit + EPSILON && !lines.is_empty() {
                break;
            }

            let mut starts = Vec::new();
            let mut edges = vec![0.0];
            let mut extent = 0.0;
            let mut terminated = false;
            while let Some(c) = clusters.get(i) {
                if !c.is_break && !starts.is_empty() && extent + c.extent > along_limit + EPSILON {
                    break;
                }
                starts.push(c.start);
                extent += c.extent;
                edges.push(extent);
                i += 1;
                if c.is_break {
                    terminated = true;
                    break;
                }
            }

            let range = starts[0]..clusters[i - 1].end;
            let slot = band(across);
            let bounds = if vertical {
                Rect::new(slot.x, slot.y, lh, extent)
            } else {
                Rect::new(slot.x, slot.y, extent, lh)
            };
            let position = if vertical {
                Point::new(bounds.mid_x(), bounds.y)
            } else {
                Point::new(bounds.x, bounds.y + metrics.ascent)
            };
            lines.push(LineBox {
                range,
                bounds,
                position,
                row: lines.len(),
            });
            shapes.push(LineShape {
                starts,
                edges,
                terminated,
            });
            across += lh;
        }

        if let Some(modifier) = &container.line_position_modifier {
            modifier.modify_lines(&mut lines, &text, &container);
        }

        let mut stops: Vec<usize> = shapes.iter().flat_map(|s| s.starts.iter().copied()).collect();
        if let Some(last) = lines.last() {
            stops.push(last.range.end);
        }

        let bounding_size = Self::bounding(&lines, &container);
        tracing::trace!(
            lines = lines.len(),
            width = bounding_size.width,
            height = bounding_size.height,
            "monospace layout built"
        );

        Self {
            text,
            container,
            metrics,
            lines,
            shapes,
            stops,
            bounding_size,
        }
    }

    fn bounding(lines: &[LineBox], container: &Container) -> Size {
        let insets = container.insets;
        if lines.is_empty() {
            return Size::new(insets.left + insets.right, insets.top + insets.bottom);
        }
        let max_x = lines.iter().map(|l| l.bounds.max_x()).fold(f64::MIN, f64::max);
        let min_x = lines.iter().map(|l| l.bounds.min_x()).fold(f64::MAX, f64::min);
        let max_y = lines.iter().map(|l| l.bounds.max_y()).fold(f64::MIN, f64::max);
        if container.vertical_form {
            Size::new(
                (container.size.width - min_x + insets.left).ceil(),
                (max_y + insets.bottom).ceil(),
            )
        } else {
            Size::new((max_x + insets.right).ceil(), (max_y + insets.bottom).ceil())
        }
    }

    // ========================================================================
    // Axis helpers
    // ========================================================================

    fn along(&self, p: Point) -> f64 {
        if self.container.vertical_form {
            p.y
        } else {
            p.x
        }
    }

    fn across(&self, p: Point) -> f64 {
        if self.container.vertical_form {
            p.x
        } else {
            p.y
        }
    }

    fn origin_along(&self, idx: usize) -> f64 {
        let b = &self.lines[idx].bounds;
        if self.container.vertical_form {
            b.y
        } else {
            b.x
        }
    }

    fn band(&self, idx: usize) -> (f64, f64) {
        let b = &self.lines[idx].bounds;
        if self.container.vertical_form {
            (b.min_x(), b.max_x())
        } else {
            (b.min_y(), b.max_y())
        }
    }

    /// Absolute along-coordinate of `offset` on line `idx`
    fn along_for_offset(&self, idx: usize, offset: usize) -> f64 {
        let shape = &self.shapes[idx];
        let origin = self.origin_along(idx);
        let extent = shape.edges.last().copied().unwrap_or(0.0);
        if offset >= self.lines[idx].range.end {
            return origin + extent;
        }
        let k = shape.starts.partition_point(|&s| s <= offset);
        if k == 0 {
            return origin;
        }
        origin + shape.edges[k - 1]
    }

    /// Caret stops on line `idx` as `(position, along)`
    fn line_stops(&self, idx: usize) -> Vec<(TextPosition, f64)> {
        let shape = &self.shapes[idx];
        let origin = self.origin_along(idx);
        let mut out: Vec<(TextPosition, f64)> = shape
            .starts
            .iter()
            .zip(&shape.edges)
            .map(|(&s, &e)| (TextPosition::new(s), origin + e))
            .collect();
        if !shape.terminated {
            let affinity = if idx + 1 < self.lines.len() {
                Affinity::Backward
            } else {
                Affinity::Forward
            };
            let end = self.lines[idx].range.end;
            let extent = shape.edges.last().copied().unwrap_or(0.0);
            out.push((TextPosition::with_affinity(end, affinity), origin + extent));
        }
        out
    }

    fn closest_stop_on_line(&self, idx: usize, along: f64) -> Option<TextPosition> {
        let mut best: Option<(TextPosition, f64)> = None;
        for (pos, a) in self.line_stops(idx) {
            let d = (a - along).abs();
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((pos, d));
            }
        }
        best.map(|(p, _)| p)
    }

    /// Binding run that `offset` falls strictly inside
    fn binding_around(&self, offset: usize) -> Option<Range<usize>> {
        let r = self
            .text
            .longest_effective_range(&AttributeKey::Binding, offset)?;
        (r.start < offset).then_some(r)
    }

    fn snap_out_of_binding(&self, pos: TextPosition) -> TextPosition {
        match self.binding_around(pos.offset) {
            Some(r) if pos.offset - r.start <= r.end - pos.offset => TextPosition::new(r.start),
            Some(r) => TextPosition::new(r.end),
            None => pos,
        }
    }

    fn cluster_end(&self, idx: usize, k: usize) -> usize {
        self.shapes[idx]
            .starts
            .get(k + 1)
            .copied()
            .unwrap_or(self.lines[idx].range.end)
    }

    fn segment_rect(&self, idx: usize, a0: f64, a1: f64) -> Rect {
        let b = &self.lines[idx].bounds;
        if self.container.vertical_form {
            Rect::new(b.x, a0, b.width, a1 - a0)
        } else {
            Rect::new(a0, b.y, a1 - a0, b.height)
        }
    }

    fn segments(&self, range: &TextRange) -> Vec<Rect> {
        let r = range.as_range();
        let mut out = Vec::new();
        for (idx, line) in self.lines.iter().enumerate() {
            let s = r.start.max(line.range.start);
            let e = r.end.min(line.range.end);
            if s >= e {
                continue;
            }
            let a0 = self.along_for_offset(idx, s);
            let a1 = self.along_for_offset(idx, e);
            out.push(self.segment_rect(idx, a0, a1));
        }
        out
    }

    fn empty_caret(&self) -> Rect {
        let insets = self.container.insets;
        let lh = self.metrics.line_height;
        if self.container.vertical_form {
            Rect::new(
                self.container.size.width - insets.right - lh,
                insets.top,
                lh,
                0.0,
            )
        } else {
            Rect::new(insets.left, insets.top, 0.0, lh)
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

impl TextLayout for MonospaceLayout {
    fn container(&self) -> &Container {
        &self.container
    }

    fn text(&self) -> &AttributedBuffer {
        &self.text
    }

    fn bounding_size(&self) -> Size {
        self.bounding_size
    }

    fn lines(&self) -> &[LineBox] {
        &self.lines
    }

    fn visible_range(&self) -> Range<usize> {
        0..self.stops.last().copied().unwrap_or(0)
    }

    fn line_index_for_position(&self, position: TextPosition) -> Option<usize> {
        let off = position.offset;
        for (i, line) in self.lines.iter().enumerate() {
            if off >= line.range.start && off < line.range.end {
                if position.affinity == Affinity::Backward
                    && off == line.range.start
                    && i > 0
                    && !self.shapes[i - 1].terminated
                {
                    return Some(i - 1);
                }
                return Some(i);
            }
        }
        let last = self.lines.len().checked_sub(1)?;
        (off == self.lines[last].range.end).then_some(last)
    }

    fn closest_line_index(&self, point: Point) -> Option<usize> {
        let a = self.across(point);
        let mut best: Option<(usize, f64)> = None;
        for idx in 0..self.lines.len() {
            let (lo, hi) = self.band(idx);
            let d = if a < lo {
                lo - a
            } else if a >= hi {
                a - hi
            } else {
                return Some(idx);
            };
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((idx, d));
            }
        }
        best.map(|(i, _)| i)
    }

    fn closest_position(&self, point: Point) -> Option<TextPosition> {
        if self.lines.is_empty() {
            return Some(TextPosition::new(0));
        }
        let idx = self.closest_line_index(point)?;
        let pos = self.closest_stop_on_line(idx, self.along(point))?;
        Some(self.snap_out_of_binding(pos))
    }

    fn position_for_grabber(
        &self,
        point: Point,
        old: TextPosition,
        other: TextPosition,
    ) -> Option<TextPosition> {
        let pos = self.closest_position(point)?;
        if old.offset < other.offset {
            if pos.offset < other.offset {
                return Some(pos);
            }
            let k = self.stops.partition_point(|&s| s < other.offset);
            Some(match k.checked_sub(1) {
                Some(k) => self.snap_out_of_binding(TextPosition::new(self.stops[k])),
                None => old,
            })
        } else {
            if pos.offset > other.offset {
                return Some(pos);
            }
            let k = self.stops.partition_point(|&s| s <= other.offset);
            Some(match self.stops.get(k) {
                Some(&s) => self.snap_out_of_binding(TextPosition::new(s)),
                None => old,
            })
        }
    }

    fn text_range_at(&self, point: Point) -> Option<TextRange> {
        let idx = self
            .lines
            .iter()
            .position(|line| line.bounds.contains(point))?;
        let shape = &self.shapes[idx];
        let a = self.along(point) - self.origin_along(idx);
        let k = (0..shape.starts.len()).find(|&k| a >= shape.edges[k] && a < shape.edges[k + 1])?;
        Some(TextRange::from_range(
            shape.starts[k]..self.cluster_end(idx, k),
        ))
    }

    fn closest_text_range(&self, point: Point) -> Option<TextRange> {
        let pos = self.closest_position(point)?;
        let idx = self.line_index_for_position(pos)?;
        let shape = &self.shapes[idx];
        let last = shape.starts.len().saturating_sub(1);
        if let Some(k) = shape.starts.iter().position(|&s| s == pos.offset) {
            if !(shape.terminated && k == last) {
                return Some(TextRange::from_range(
                    shape.starts[k]..self.cluster_end(idx, k),
                ));
            }
            if k > 0 {
                return Some(TextRange::from_range(shape.starts[k - 1]..shape.starts[k]));
            }
        } else if let Some(k) = (0..shape.starts.len()).find(|&k| self.cluster_end(idx, k) == pos.offset) {
            return Some(TextRange::from_range(shape.starts[k]..pos.offset));
        }
        Some(TextRange::caret(pos))
    }

    fn cluster_range_at(&self, position: TextPosition) -> Option<TextRange> {
        let visible = self.visible_range();
        let off = position.offset;
        if off < visible.start || off > visible.end {
            return None;
        }
        if off == visible.start {
            return Some(TextRange::with_range(off, 0));
        }
        if off == visible.end {
            return Some(TextRange::with_range_affinity(off, 0, Affinity::Backward));
        }
        if let Some(r) = self.binding_around(off) {
            return Some(TextRange::from_range(r));
        }
        let k = self.stops.partition_point(|&s| s <= off);
        let prev = self.stops[k - 1];
        if prev == off {
            return Some(TextRange::caret(position));
        }
        let next = self.stops.get(k).copied().unwrap_or(visible.end);
        Some(TextRange::from_range(prev..next))
    }

    fn range_by_extending(
        &self,
        position: TextPosition,
        direction: LayoutDirection,
        offset: isize,
    ) -> Option<TextRange> {
        let visible = self.visible_range();
        let off = position.offset;
        if off < visible.start || off > visible.end {
            return None;
        }
        if offset == 0 {
            return self.cluster_range_at(position);
        }

        let (line_move, mut forward) = if self.container.vertical_form {
            (
                matches!(direction, LayoutDirection::Left | LayoutDirection::Right),
                matches!(direction, LayoutDirection::Left | LayoutDirection::Down),
            )
        } else {
            (
                matches!(direction, LayoutDirection::Up | LayoutDirection::Down),
                matches!(direction, LayoutDirection::Down | LayoutDirection::Right),
            )
        };
        if offset < 0 {
            forward = !forward;
        }
        let count = offset.unsigned_abs();

        if !forward && off == visible.start {
            return Some(TextRange::with_range(visible.start, 0));
        }
        if forward && off == visible.end {
            return Some(TextRange::with_range_affinity(off, 0, Affinity::Backward));
        }

        let from = self.cluster_range_at(position)?;
        let all_forward = TextRange::new(from.start, TextPosition::new(visible.end));
        let all_backward = TextRange::new(TextPosition::new(visible.start), from.end);

        if line_move {
            let idx = self.line_index_for_position(position)?;
            let row = self.lines[idx].row;
            let target = if forward {
                row.checked_add(count)
                    .filter(|&r| r < self.lines.len())
            } else {
                row.checked_sub(count)
            };
            let Some(target) = target else {
                return Some(if forward { all_forward } else { all_backward });
            };
            let along = self.along_for_offset(idx, off);
            let pos = self.closest_stop_on_line(target, along)?;
            let ext = self.cluster_range_at(pos)?;
            Some(if forward {
                TextRange::new(from.start, ext.end)
            } else {
                TextRange::new(ext.start, from.end)
            })
        } else {
            let to = if forward {
                off.checked_add(count)
            } else {
                off.checked_sub(count)
            };
            let to = match to {
                Some(to) if to > visible.start && to < visible.end => to,
                _ if forward => return Some(all_forward),
                _ => return Some(all_backward),
            };
            let to_range = self.cluster_range_at(TextPosition::new(to))?;
            let start = from.start.offset.min(to_range.start.offset);
            let end = from.end.offset.max(to_range.end.offset);
            Some(TextRange::from_range(start..end))
        }
    }

    fn caret_rect(&self, position: TextPosition) -> Option<Rect> {
        if self.lines.is_empty() {
            return Some(self.empty_caret());
        }
        let idx = self.line_index_for_position(position)?;
        let a = self.along_for_offset(idx, position.offset);
        let b = &self.lines[idx].bounds;
        Some(if self.container.vertical_form {
            Rect::new(b.x, a, b.width, 0.0)
        } else {
            Rect::new(a, b.y, 0.0, b.height)
        })
    }

    fn first_rect(&self, range: &TextRange) -> Option<Rect> {
        match self.segments(range).first() {
            Some(r) => Some(*r),
            None => self.caret_rect(range.start),
        }
    }

    fn rect_for_range(&self, range: &TextRange) -> Option<Rect> {
        let segments = self.segments(range);
        let mut iter = segments.iter();
        let Some(first) = iter.next() else {
            return self.caret_rect(range.start);
        };
        Some(iter.fold(*first, |acc, r| acc.union(r)))
    }

    fn selection_rects(&self, range: &TextRange) -> Vec<SelectionRect> {
        if range.is_empty() {
            return Vec::new();
        }
        let vertical = self.container.vertical_form;
        let mut out = Vec::new();
        if let Some(rect) = self.caret_rect(TextPosition::new(range.start.offset)) {
            out.push(SelectionRect {
                rect,
                contains_start: true,
                contains_end: false,
                is_vertical: vertical,
            });
        }
        out.extend(
            self.segments(range)
                .into_iter()
                .map(|r| SelectionRect::fill(r, vertical)),
        );
        let end = TextPosition::with_affinity(range.end.offset, Affinity::Backward);
        if let Some(rect) = self.caret_rect(end) {
            out.push(SelectionRect {
                rect,
                contains_start: false,
                contains_end: true,
                is_vertical: vertical,
            });
        }
        out
    }
}
