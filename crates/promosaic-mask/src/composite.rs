//! Alpha compositing operators and layer assembly.
//!
//! Pixels are straight (non-premultiplied) ARGB32. Every operation reads its
//! inputs immutably and writes a separate destination.

use promosaic_core::{PixelBuffer, Rect, TRANSPARENT, alpha, argb, blue, green, red};

use crate::CompositeError;

/// Porter-Duff style operator applied per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendOp {
    /// Source over destination.
    Over,
    /// Destination forced transparent wherever the source has coverage.
    Clear,
    /// Destination kept only where the source is opaque, scaled by source alpha.
    DestIn,
}

impl BlendOp {
    /// Combines one destination pixel with one source pixel.
    pub fn apply(self, dst: u32, src: u32) -> u32 {
        match self {
            BlendOp::Over => over(dst, src),
            BlendOp::Clear => {
                if alpha(src) == 0 {
                    dst
                } else {
                    TRANSPARENT
                }
            }
            BlendOp::DestIn => dest_in(dst, src),
        }
    }
}

fn over(dst: u32, src: u32) -> u32 {
    let sa = alpha(src) as u32;
    if sa == 0xff {
        return src;
    }
    if sa == 0 {
        return dst;
    }

    let da = alpha(dst) as u32;
    let dst_weight = (da * (0xff - sa) + 127) / 0xff;
    let out_a = sa + dst_weight;
    if out_a == 0 {
        return TRANSPARENT;
    }

    let channel = |s: u8, d: u8| -> u8 {
        ((s as u32 * sa + d as u32 * dst_weight + out_a / 2) / out_a) as u8
    };
    argb(
        out_a as u8,
        channel(red(src), red(dst)),
        channel(green(src), green(dst)),
        channel(blue(src), blue(dst)),
    )
}

fn dest_in(dst: u32, src: u32) -> u32 {
    let sa = alpha(src) as u32;
    if sa == 0xff {
        return dst;
    }

    let out_a = (alpha(dst) as u32 * sa + 127) / 0xff;
    if out_a == 0 {
        return TRANSPARENT;
    }
    (out_a << 24) | (dst & 0x00ff_ffff)
}

/// Applies `op` with `src` onto `dst`, producing a new buffer.
///
/// # Errors
/// Returns [`CompositeError::DimensionMismatch`] when the buffers differ in size.
pub fn blend(dst: &PixelBuffer, src: &PixelBuffer, op: BlendOp) -> Result<PixelBuffer, CompositeError> {
    ensure_same_size(dst, src)?;

    let pixels = dst
        .pixels()
        .iter()
        .zip(src.pixels())
        .map(|(d, s)| op.apply(*d, *s))
        .collect();
    Ok(PixelBuffer::new(dst.width(), dst.height(), pixels)?)
}

/// Stencils `cover` through `mask` into a new mosaic layer.
///
/// The cover is drawn onto a cleared buffer, then [`BlendOp::DestIn`] keeps
/// only pixels where the mask has alpha.
///
/// # Errors
/// Returns [`CompositeError::DimensionMismatch`] when cover and mask differ.
pub fn composite_mosaic_layer(
    cover: &PixelBuffer,
    mask: &PixelBuffer,
) -> Result<PixelBuffer, CompositeError> {
    let cleared = PixelBuffer::transparent(cover.width(), cover.height());
    let drawn = blend(&cleared, cover, BlendOp::Over)?;
    blend(&drawn, mask, BlendOp::DestIn)
}

/// Recomputes `layer` inside `dirty` only, from `cover` and `mask`.
///
/// Produces exactly the pixels [`composite_mosaic_layer`] would produce
/// inside `dirty`; pixels outside are left untouched.
///
/// # Errors
/// Returns [`CompositeError::DimensionMismatch`] when the three buffers differ.
pub fn composite_mosaic_region(
    layer: &mut PixelBuffer,
    cover: &PixelBuffer,
    mask: &PixelBuffer,
    dirty: Rect,
) -> Result<(), CompositeError> {
    ensure_same_size(layer, cover)?;
    ensure_same_size(layer, mask)?;

    let Some(clip) = dirty.intersect(&layer.bounds()) else {
        return Ok(());
    };

    let stride = layer.width() as usize;
    let cover_pixels = cover.pixels();
    let mask_pixels = mask.pixels();
    let out = layer.pixels_mut();
    for y in clip.top as usize..clip.bottom as usize {
        for x in clip.left as usize..clip.right as usize {
            let index = y * stride + x;
            let drawn = BlendOp::Over.apply(TRANSPARENT, cover_pixels[index]);
            out[index] = BlendOp::DestIn.apply(drawn, mask_pixels[index]);
        }
    }

    Ok(())
}

/// Draws `base`, then `mosaic_layer` over it when present.
///
/// `flatten(base, None)` returns an exact copy of `base`.
///
/// # Errors
/// Returns [`CompositeError::DimensionMismatch`] when the layer size differs
/// from the base.
pub fn flatten(
    base: &PixelBuffer,
    mosaic_layer: Option<&PixelBuffer>,
) -> Result<PixelBuffer, CompositeError> {
    match mosaic_layer {
        Some(layer) => blend(base, layer, BlendOp::Over),
        None => Ok(base.clone()),
    }
}

fn ensure_same_size(a: &PixelBuffer, b: &PixelBuffer) -> Result<(), CompositeError> {
    if a.same_size(b) {
        return Ok(());
    }
    Err(CompositeError::DimensionMismatch {
        expected: (a.width(), a.height()),
        actual: (b.width(), b.height()),
    })
}
