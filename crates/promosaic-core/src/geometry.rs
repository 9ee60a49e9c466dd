//! Image-space geometry and selection regions.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Integer point in either view or image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle covering `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Inclusive left edge.
    pub left: i32,
    /// Inclusive top edge.
    pub top: i32,
    /// Exclusive right edge.
    pub right: i32,
    /// Exclusive bottom edge.
    pub bottom: i32,
}

impl Rect {
    /// Creates a rect from raw edges without normalizing them.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates the normalized rect spanned by two corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    /// Horizontal extent; zero for inverted rects.
    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    /// Vertical extent; zero for inverted rects.
    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    /// Returns `true` when the rect covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Returns the overlap of two rects, or `None` when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let clipped = Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        (!clipped.is_empty()).then_some(clipped)
    }

    /// Smallest rect covering both inputs; empty inputs are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Returns `true` when `point` lies inside the rect, right and bottom
    /// edges included.
    pub fn contains_inclusive(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }

    /// Clamps `point` onto the rect, edges included.
    pub fn clamp_point(&self, point: Point) -> Point {
        Point {
            x: point.x.clamp(self.left, self.right.max(self.left)),
            y: point.y.clamp(self.top, self.bottom.max(self.top)),
        }
    }
}

/// Ordered polyline in image space.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Path {
    points: Vec<Point>,
}

impl Path {
    /// Starts a path at `start`.
    pub fn starting_at(start: Point) -> Self {
        Self {
            points: vec![start],
        }
    }

    /// Builds a path from an ordered point list.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Extends the path with a line segment to `point`.
    pub fn line_to(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Ordered path vertices.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` when the path has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the vertices, grown by `margin` on every side.
    pub fn bounds(&self, margin: i32) -> Rect {
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return Rect::default();
        };

        let mut rect = Rect::new(first.x, first.y, first.x, first.y);
        for point in iter {
            rect.left = rect.left.min(point.x);
            rect.top = rect.top.min(point.y);
            rect.right = rect.right.max(point.x);
            rect.bottom = rect.bottom.max(point.y);
        }

        Rect::new(
            rect.left - margin,
            rect.top - margin,
            rect.right + margin + 1,
            rect.bottom + margin + 1,
        )
    }
}

/// Whether a region paints the mask or clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Paint the shape opaque (source-over).
    #[default]
    Add,
    /// Clear the shape to transparent.
    Erase,
}

/// Obscuring effect used to fill the cover layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Pixelated grid sampled from each cell's top-left pixel.
    #[default]
    Grid,
    /// Single flat color.
    Color,
    /// Box-blurred copy of the source.
    Blur,
}

/// Gesture interpretation for pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Drag-to-rectangle selection.
    Grid,
    /// Freehand stroke selection.
    #[default]
    Path,
}

/// Geometry carried by one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Filled rectangle.
    Rect(Rect),
    /// Round-joined, round-capped stroked polyline.
    Path(Path),
}

/// One immutable add/erase selection contributed by a single gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    shape: Shape,
    polarity: Polarity,
}

impl Region {
    /// Creates a rectangular region.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidGeometry`] when the rect has zero area.
    pub fn rect(rect: Rect, polarity: Polarity) -> Result<Self, CoreError> {
        if rect.is_empty() {
            return Err(CoreError::InvalidGeometry(format!(
                "rect {},{},{},{} has zero area",
                rect.left, rect.top, rect.right, rect.bottom
            )));
        }

        Ok(Self {
            shape: Shape::Rect(rect),
            polarity,
        })
    }

    /// Creates a path region.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidGeometry`] when the path has fewer than two
    /// vertices (a bare move-to strokes nothing).
    pub fn path(path: Path, polarity: Polarity) -> Result<Self, CoreError> {
        if path.len() < 2 {
            return Err(CoreError::InvalidGeometry(format!(
                "path needs at least 2 points, got {}",
                path.len()
            )));
        }

        Ok(Self {
            shape: Shape::Path(path),
            polarity,
        })
    }

    /// Region geometry.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Add/erase tag.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Returns `true` for add regions.
    pub fn is_add(&self) -> bool {
        self.polarity == Polarity::Add
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for geometry helpers and region validation.

    use super::*;

    #[test]
    fn from_corners_normalizes_drag_direction() {
        let rect = Rect::from_corners(Point::new(10, 2), Point::new(3, 8));
        assert_eq!(rect, Rect::new(3, 2, 10, 8));
        assert_eq!(rect.width(), 7);
        assert_eq!(rect.height(), 6);
    }

    #[test]
    fn intersect_and_union_follow_half_open_edges() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(4, 0, 8, 4);
        assert_eq!(a.intersect(&b), None);
        assert_eq!(a.union(&b), Rect::new(0, 0, 8, 4));
        assert_eq!(Rect::default().union(&b), b);
    }

    #[test]
    fn clamp_point_pins_to_edges() {
        let rect = Rect::new(10, 20, 110, 70);
        assert_eq!(rect.clamp_point(Point::new(500, -3)), Point::new(110, 20));
        assert!(rect.contains_inclusive(Point::new(110, 70)));
        assert!(!rect.contains_inclusive(Point::new(111, 70)));
    }

    #[test]
    fn zero_area_geometry_is_rejected() {
        assert!(Region::rect(Rect::new(3, 3, 3, 9), Polarity::Add).is_err());
        assert!(Region::path(Path::starting_at(Point::new(1, 1)), Polarity::Erase).is_err());

        let mut path = Path::starting_at(Point::new(1, 1));
        path.line_to(Point::new(1, 1));
        let region = Region::path(path, Polarity::Erase).expect("dot stroke is drawable");
        assert!(!region.is_add());
    }

    #[test]
    fn path_bounds_include_margin() {
        let path = Path::from_points(vec![Point::new(5, 5), Point::new(9, 2)]);
        assert_eq!(path.bounds(2), Rect::new(3, 0, 12, 8));
    }
}
