//! ARGB pixel storage and channel helpers.

use crate::CoreError;
use crate::geometry::Rect;

/// Fully transparent pixel.
pub const TRANSPARENT: u32 = 0;

/// Packs four 8-bit channels into one ARGB32 pixel.
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Alpha channel of an ARGB32 pixel.
pub const fn alpha(pixel: u32) -> u8 {
    (pixel >> 24) as u8
}

/// Red channel of an ARGB32 pixel.
pub const fn red(pixel: u32) -> u8 {
    (pixel >> 16) as u8
}

/// Green channel of an ARGB32 pixel.
pub const fn green(pixel: u32) -> u8 {
    (pixel >> 8) as u8
}

/// Blue channel of an ARGB32 pixel.
pub const fn blue(pixel: u32) -> u8 {
    pixel as u8
}

/// Returns `true` when the pixel has full alpha.
pub const fn opaque(pixel: u32) -> bool {
    alpha(pixel) == 0xff
}

/// Unpacks a pixel into `[r, g, b, a]` bytes.
pub const fn rgba_bytes(pixel: u32) -> [u8; 4] {
    [red(pixel), green(pixel), blue(pixel), alpha(pixel)]
}

/// Unpacks a pixel into `[r, g, b]` bytes, dropping alpha.
pub const fn rgb_bytes(pixel: u32) -> [u8; 3] {
    [red(pixel), green(pixel), blue(pixel)]
}

/// Width x height grid of ARGB32 pixels in row-major order.
///
/// Invariant: `pixels.len() == width * height`. Zero-sized buffers are legal
/// and represent "no image".
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Constructs a buffer from existing ARGB32 storage.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidBufferShape`] when `pixels.len()` is not
    /// exactly `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, CoreError> {
        let expected = pixel_count(width, height)?;
        if pixels.len() != expected {
            return Err(CoreError::InvalidBufferShape {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates a buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![color; len],
        }
    }

    /// Creates a fully transparent buffer.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    /// Builds a buffer from row-major RGBA bytes (`[r, g, b, a]` per pixel).
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidByteLength`] when the byte count is not a
    /// multiple of 4 and [`CoreError::InvalidBufferShape`] when the pixel count
    /// does not match the geometry.
    pub fn from_rgba_bytes(width: u32, height: u32, rgba: &[u8]) -> Result<Self, CoreError> {
        if rgba.len() % 4 != 0 {
            return Err(CoreError::InvalidByteLength(rgba.len()));
        }

        let pixels = rgba
            .chunks_exact(4)
            .map(|px| argb(px[3], px[0], px[1], px[2]))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Serializes the buffer to row-major RGBA bytes.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&rgba_bytes(*pixel));
        }
        bytes
    }

    /// Serializes the buffer to row-major RGB bytes, dropping alpha.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&rgb_bytes(*pixel));
        }
        bytes
    }

    /// Buffer width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` when the buffer holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Returns `true` when `other` has the same width and height.
    pub fn same_size(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Full-buffer bounds as an image-space rect.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Reads a pixel with coordinates clamped into `[0,width) x [0,height)`.
    ///
    /// Returns [`TRANSPARENT`] for an empty buffer.
    pub fn pixel(&self, x: i32, y: i32) -> u32 {
        if self.is_empty() {
            return TRANSPARENT;
        }
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        self.pixels[y * self.width as usize + x]
    }

    /// Writes one pixel; out-of-bounds coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.pixels[index] = color;
    }

    /// Fills `rect` (clipped to the buffer) with `color`.
    pub fn fill_rect(&mut self, rect: Rect, color: u32) {
        let Some(clip) = rect.intersect(&self.bounds()) else {
            return;
        };

        let stride = self.width as usize;
        for y in clip.top..clip.bottom {
            let row = y as usize * stride;
            self.pixels[row + clip.left as usize..row + clip.right as usize].fill(color);
        }
    }

    /// Row-major pixel storage.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutable row-major pixel storage.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Consumes the buffer and returns its storage.
    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize, CoreError> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(CoreError::DimensionOverflow { width, height })
}

#[cfg(test)]
mod tests {
    //! Unit tests for pixel storage.

    use super::*;

    #[test]
    fn channel_helpers_unpack_packed_pixel() {
        let pixel = argb(0x80, 0x12, 0x34, 0x56);
        assert_eq!(pixel, 0x8012_3456);
        assert_eq!(alpha(pixel), 0x80);
        assert_eq!(red(pixel), 0x12);
        assert_eq!(green(pixel), 0x34);
        assert_eq!(blue(pixel), 0x56);
        assert!(!opaque(pixel));
    }

    #[test]
    fn new_rejects_mismatched_storage() {
        let error = PixelBuffer::new(2, 2, vec![0; 3]).expect_err("shape should be rejected");
        assert!(matches!(
            error,
            CoreError::InvalidBufferShape {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn pixel_reads_clamp_to_edges() {
        let mut buffer = PixelBuffer::transparent(3, 2);
        buffer.set_pixel(2, 1, 7);
        assert_eq!(buffer.pixel(10, 10), 7);
        assert_eq!(buffer.pixel(-5, -5), 0);
        assert_eq!(PixelBuffer::transparent(0, 0).pixel(0, 0), TRANSPARENT);
    }

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut buffer = PixelBuffer::transparent(4, 4);
        buffer.fill_rect(Rect::new(2, 2, 10, 10), 9);
        assert_eq!(buffer.pixels().iter().filter(|p| **p == 9).count(), 4);
        assert_eq!(buffer.pixel(3, 3), 9);
        assert_eq!(buffer.pixel(1, 1), 0);
    }

    #[test]
    fn rgba_bytes_preserve_channel_order() {
        let buffer = PixelBuffer::from_rgba_bytes(1, 1, &[1, 2, 3, 4]).expect("valid bytes");
        assert_eq!(buffer.pixel(0, 0), argb(4, 1, 2, 3));
        assert_eq!(buffer.to_rgba_bytes(), vec![1, 2, 3, 4]);
        assert_eq!(buffer.to_rgb_bytes(), vec![1, 2, 3]);
    }
}
