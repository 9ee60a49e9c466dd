//! Replays add/erase regions into a coverage mask.
//!
//! Coverage is binary: a pixel is covered when its center lies inside a rect,
//! or within half the stroke width of a path segment. Add regions paint with
//! [`BlendOp::Over`], erase regions with [`BlendOp::Clear`], strictly in
//! arrival order.

use promosaic_core::{PixelBuffer, Point, Polarity, Rect, Region, Shape, argb};

use crate::composite::BlendOp;

/// Mask value written under add coverage.
pub const MASK_COVERED: u32 = argb(0xff, 0, 0, 0xff);

/// Segments used to flatten one rounded corner.
const CORNER_STEPS: usize = 8;

/// Stroke geometry for path regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    /// Full stroke width in image pixels.
    pub width: u32,
    /// Corner rounding radius applied to the centerline before stroking.
    pub corner_radius: u32,
}

/// Rasterizes `regions` in order onto a fresh transparent mask.
pub fn rasterize(regions: &[Region], width: u32, height: u32, stroke: StrokeStyle) -> PixelBuffer {
    let mut mask = PixelBuffer::transparent(width, height);
    for region in regions {
        paint_region(&mut mask, region, stroke);
    }
    mask
}

/// Paints one region onto `mask`.
///
/// # Returns
/// Bounds of the pixels the region may have touched, clipped to the mask, or
/// `None` when the region lies entirely outside it.
pub fn paint_region(mask: &mut PixelBuffer, region: &Region, stroke: StrokeStyle) -> Option<Rect> {
    let op = match region.polarity() {
        Polarity::Add => BlendOp::Over,
        Polarity::Erase => BlendOp::Clear,
    };

    match region.shape() {
        Shape::Rect(rect) => paint_rect(mask, *rect, op),
        Shape::Path(path) => paint_stroke(mask, path.points(), stroke, op),
    }
}

/// Image bounds a region can touch, clipped to a `width x height` mask.
pub fn region_bounds(region: &Region, stroke: StrokeStyle, width: u32, height: u32) -> Option<Rect> {
    let bounds = match region.shape() {
        Shape::Rect(rect) => *rect,
        Shape::Path(path) => path.bounds(stroke_margin(stroke)),
    };
    bounds.intersect(&Rect::new(0, 0, width as i32, height as i32))
}

fn paint_rect(mask: &mut PixelBuffer, rect: Rect, op: BlendOp) -> Option<Rect> {
    let clip = rect.intersect(&mask.bounds())?;
    let stride = mask.width() as usize;
    let pixels = mask.pixels_mut();
    for y in clip.top as usize..clip.bottom as usize {
        for pixel in &mut pixels[y * stride + clip.left as usize..y * stride + clip.right as usize] {
            *pixel = op.apply(*pixel, MASK_COVERED);
        }
    }
    Some(clip)
}

fn paint_stroke(
    mask: &mut PixelBuffer,
    points: &[Point],
    stroke: StrokeStyle,
    op: BlendOp,
) -> Option<Rect> {
    let centerline = smooth_corners(points, stroke.corner_radius as f32);
    let half = stroke.width.max(1) as f32 / 2.0;
    let mask_bounds = mask.bounds();
    let mut touched: Option<Rect> = None;

    let segments = centerline
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .chain(
            // A lone vertex still stamps a round dot.
            (centerline.len() == 1).then(|| (centerline[0], centerline[0])),
        );

    for (a, b) in segments {
        let bounds = Rect::new(
            (a.0.min(b.0) - half).floor() as i32,
            (a.1.min(b.1) - half).floor() as i32,
            (a.0.max(b.0) + half).ceil() as i32 + 1,
            (a.1.max(b.1) + half).ceil() as i32 + 1,
        );
        let Some(clip) = bounds.intersect(&mask_bounds) else {
            continue;
        };

        for y in clip.top..clip.bottom {
            for x in clip.left..clip.right {
                let center = (x as f32 + 0.5, y as f32 + 0.5);
                if distance_sq_to_segment(center, a, b) <= half * half {
                    let current = mask.pixel(x, y);
                    mask.set_pixel(x, y, op.apply(current, MASK_COVERED));
                }
            }
        }
        touched = Some(touched.map_or(clip, |rect| rect.union(&clip)));
    }

    touched
}

fn stroke_margin(stroke: StrokeStyle) -> i32 {
    (stroke.width.max(1) as f32 / 2.0).ceil() as i32 + 1
}

fn distance_sq_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    (p.0 - cx) * (p.0 - cx) + (p.1 - cy) * (p.1 - cy)
}

/// Rounds interior corners of a polyline.
///
/// Each interior vertex is replaced by a quadratic curve that starts and ends
/// `min(radius, half the adjacent segment)` away from the vertex, with the
/// vertex as control point. Endpoints are kept.
pub fn smooth_corners(points: &[Point], radius: f32) -> Vec<(f32, f32)> {
    let raw: Vec<(f32, f32)> = points.iter().map(|p| (p.x as f32, p.y as f32)).collect();
    if raw.len() < 3 || radius <= 0.0 {
        return raw;
    }

    let mut out = Vec::with_capacity(raw.len() * (CORNER_STEPS + 1));
    out.push(raw[0]);
    for window in raw.windows(3) {
        let (prev, corner, next) = (window[0], window[1], window[2]);
        let entry = toward(corner, prev, radius);
        let exit = toward(corner, next, radius);

        out.push(entry);
        for step in 1..=CORNER_STEPS {
            let t = step as f32 / CORNER_STEPS as f32;
            let u = 1.0 - t;
            out.push((
                u * u * entry.0 + 2.0 * u * t * corner.0 + t * t * exit.0,
                u * u * entry.1 + 2.0 * u * t * corner.1 + t * t * exit.1,
            ));
        }
    }
    if let Some(last) = raw.last() {
        out.push(*last);
    }
    out
}

/// Point on segment `from -> to` at `min(radius, |to - from| / 2)` from `from`.
fn toward(from: (f32, f32), to: (f32, f32), radius: f32) -> (f32, f32) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return from;
    }
    let distance = radius.min(length / 2.0);
    (from.0 + dx / length * distance, from.1 + dy / length * distance)
}

#[cfg(test)]
mod tests {
    //! Unit tests for rasterization primitives.

    use promosaic_core::{Path, TRANSPARENT};

    use super::*;

    const STROKE: StrokeStyle = StrokeStyle {
        width: 4,
        corner_radius: 0,
    };

    #[test]
    fn rect_fill_covers_half_open_interval() {
        let region = Region::rect(Rect::new(1, 1, 3, 2), Polarity::Add).expect("valid rect");
        let mask = rasterize(&[region], 4, 4, STROKE);

        assert_eq!(mask.pixel(1, 1), MASK_COVERED);
        assert_eq!(mask.pixel(2, 1), MASK_COVERED);
        assert_eq!(mask.pixel(3, 1), TRANSPARENT);
        assert_eq!(mask.pixel(1, 2), TRANSPARENT);
    }

    #[test]
    fn stroke_has_round_caps_of_half_width() {
        let path = Path::from_points(vec![Point::new(10, 10), Point::new(20, 10)]);
        let region = Region::path(path, Polarity::Add).expect("valid path");
        let mask = rasterize(&[region], 32, 32, STROKE);

        // Along the segment, up to 2 px away from the centerline.
        assert_eq!(mask.pixel(15, 10), MASK_COVERED);
        assert_eq!(mask.pixel(15, 11), MASK_COVERED);
        assert_eq!(mask.pixel(15, 13), TRANSPARENT);
        // Past the end point: the cap reaches 1 px beyond, not 3.
        assert_eq!(mask.pixel(21, 10), MASK_COVERED);
        assert_eq!(mask.pixel(23, 10), TRANSPARENT);
    }

    #[test]
    fn smoothing_keeps_endpoints_and_cuts_the_corner() {
        let points = [Point::new(0, 0), Point::new(20, 0), Point::new(20, 20)];
        let smoothed = smooth_corners(&points, 10.0);

        assert_eq!(smoothed.first(), Some(&(0.0, 0.0)));
        assert_eq!(smoothed.last(), Some(&(20.0, 20.0)));
        assert!(!smoothed.contains(&(20.0, 0.0)));
        assert!(smoothed.contains(&(10.0, 0.0)));
        assert!(smoothed.contains(&(20.0, 10.0)));
    }

    #[test]
    fn region_bounds_grow_paths_by_stroke_margin() {
        let path = Path::from_points(vec![Point::new(5, 5), Point::new(6, 5)]);
        let region = Region::path(path, Polarity::Erase).expect("valid path");
        let bounds = region_bounds(&region, STROKE, 100, 100).expect("inside mask");
        assert_eq!(bounds, Rect::new(2, 2, 10, 9));
    }
}
