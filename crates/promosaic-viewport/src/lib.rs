#![warn(missing_docs)]
//! # promosaic-viewport
//!
//! ## Purpose
//! Maps between on-screen view coordinates and source-image pixels, and turns
//! raw pointer events into rectangle or path selections.
//!
//! ## Responsibilities
//! - Fit the image inside a padded view while preserving aspect ratio.
//! - Convert view points and rects to image space.
//! - Track the in-progress gesture for grid (rect) and path modes.
//!
//! ## Data flow
//! Host layout -> [`ViewportMapper::fit`]. Host pointer feed ->
//! [`GestureTracker::handle`] -> [`GestureUpdate`] consumed by the session.
//!
//! ## Ownership and lifetimes
//! The mapper is a small `Copy` value recomputed on every layout change. The
//! tracker owns the only mutable gesture state; committed geometry is handed
//! out by value.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Events that
//! cannot contribute (outside the image in path mode, or with no layout) are
//! reported as [`GestureUpdate::Ignored`].

mod gesture;

use promosaic_core::{Point, Rect};

pub use gesture::{GestureTracker, GestureUpdate, PointerEvent, PointerKind};

/// Fit-to-bounds transform between view space and image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportMapper {
    image_rect: Rect,
    image_width: u32,
    image_height: u32,
}

impl ViewportMapper {
    /// Fits a `image_width x image_height` image into a padded view.
    ///
    /// # Returns
    /// `None` when the image is empty or the padded view has no room left.
    pub fn fit(
        view_width: u32,
        view_height: u32,
        image_width: u32,
        image_height: u32,
        padding: u32,
    ) -> Option<Self> {
        let image_rect =
            compute_image_rect(view_width, view_height, image_width, image_height, padding)?;
        Some(Self {
            image_rect,
            image_width,
            image_height,
        })
    }

    /// View-space rect the image is drawn into.
    pub fn image_rect(&self) -> Rect {
        self.image_rect
    }

    /// Source image width in pixels.
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    /// Source image height in pixels.
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// View pixels per image pixel, derived from the fitted rect width.
    pub fn ratio(&self) -> f64 {
        self.image_rect.width() as f64 / self.image_width as f64
    }

    /// Maps a view point to image space, rejecting points outside the image
    /// rect.
    pub fn view_to_image(&self, point: Point) -> Option<Point> {
        if !self.image_rect.contains_inclusive(point) {
            return None;
        }
        Some(self.map_unchecked(point))
    }

    /// Maps a view point to image space after clamping it onto the image rect.
    pub fn view_to_image_clamped(&self, point: Point) -> Point {
        self.map_unchecked(self.image_rect.clamp_point(point))
    }

    /// Maps a view rect, clamped to the image rect, into image space.
    pub fn view_rect_to_image(&self, rect: Rect) -> Rect {
        let top_left = self.view_to_image_clamped(Point::new(rect.left, rect.top));
        let bottom_right = self.view_to_image_clamped(Point::new(rect.right, rect.bottom));
        Rect::from_corners(top_left, bottom_right)
    }

    fn map_unchecked(&self, point: Point) -> Point {
        // x' = (x - left) * image_width / rect_width. Both axes share the
        // width-derived ratio; the far edges of the rect pin to the image size.
        let view_span = self.image_rect.width() as f64;
        let scale = |offset: i32| (offset as f64 * self.image_width as f64 / view_span) as i32;
        let axis = |position: i32, start: i32, end: i32, extent: u32| {
            if position >= end {
                extent as i32
            } else {
                scale(position - start).clamp(0, extent as i32)
            }
        };
        Point::new(
            axis(point.x, self.image_rect.left, self.image_rect.right, self.image_width),
            axis(point.y, self.image_rect.top, self.image_rect.bottom, self.image_height),
        )
    }
}

/// Centers an image inside a view, preserving aspect ratio.
///
/// `ratio = min((view_w - 2p) / image_w, (view_h - 2p) / image_h)` and the
/// result is `image_w * ratio x image_h * ratio` (truncated) centered in the
/// view.
pub fn compute_image_rect(
    view_width: u32,
    view_height: u32,
    image_width: u32,
    image_height: u32,
    padding: u32,
) -> Option<Rect> {
    if image_width == 0 || image_height == 0 {
        return None;
    }

    let inner_width = view_width as i64 - 2 * padding as i64;
    let inner_height = view_height as i64 - 2 * padding as i64;
    if inner_width <= 0 || inner_height <= 0 {
        return None;
    }

    let ratio = (inner_width as f64 / image_width as f64).min(inner_height as f64 / image_height as f64);
    let real_width = (image_width as f64 * ratio) as i32;
    let real_height = (image_height as f64 * ratio) as i32;
    if real_width <= 0 || real_height <= 0 {
        return None;
    }

    let left = (view_width as i32 - real_width) / 2;
    let top = (view_height as i32 - real_height) / 2;
    Some(Rect::new(left, top, left + real_width, top + real_height))
}
