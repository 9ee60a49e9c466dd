#![warn(missing_docs)]
//! # promosaic-benchmarks
//!
//! Deterministic fixtures for the latency smoke tests under `tests/`.

use promosaic_core::{PixelBuffer, Point, argb};

/// Diagonal RGB gradient, fully opaque.
pub fn gradient_image(width: u32, height: u32) -> PixelBuffer {
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push(argb(
                255,
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x + y) % 256) as u8,
            ));
        }
    }
    PixelBuffer::new(width, height, pixels).unwrap_or_else(|_| PixelBuffer::transparent(width, height))
}

/// Zig-zag polyline of `count` points spanning a `width x height` image.
pub fn zigzag_points(width: u32, height: u32, count: usize) -> Vec<Point> {
    let count = count.max(2);
    (0..count)
        .map(|index| {
            let x = (index as u64 * (width.saturating_sub(1)) as u64 / (count - 1) as u64) as i32;
            let y = if index % 2 == 0 { height as i32 / 4 } else { height as i32 * 3 / 4 };
            Point::new(x, y)
        })
        .collect()
}
