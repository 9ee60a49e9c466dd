#![warn(missing_docs)]
//! # promosaic-cover
//!
//! ## Purpose
//! Derives full-image cover layers: the obscuring effect before any masking.
//!
//! ## Responsibilities
//! - Pixelate a source into solid grid cells sampled at each cell's top-left.
//! - Fill a flat-color cover.
//! - Blur a source with a separable sliding-window box blur.
//!
//! ## Data flow
//! Source [`PixelBuffer`] + [`EffectKind`] -> [`CoverLayerGenerator::generate`]
//! -> cover buffer consumed by the compositor.
//!
//! ## Ownership and lifetimes
//! Generators borrow the source immutably and return a freshly owned cover
//! buffer. Callers drop the previous cover before installing the new one.
//!
//! ## Error model
//! An empty source yields `None` ("not yet available"). Invalid blur
//! parameters fail with [`CoverError`].

mod blur;

use std::time::Instant;

use promosaic_core::{CoreError, EffectKind, MosaicConfig, PixelBuffer, Rect};
use thiserror::Error;

pub use blur::box_blur;

/// Settings that determine cover layer content.
///
/// Any change to these values (or to the source) invalidates a cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverLayerGenerator {
    /// Grid cell edge in device pixels.
    pub grid_width: u32,
    /// Flat fill for [`EffectKind::Color`].
    pub color: u32,
    /// Blur window radius for [`EffectKind::Blur`].
    pub blur_radius: u32,
    /// Blur pass-pair count for [`EffectKind::Blur`].
    pub blur_iterations: u32,
}

impl CoverLayerGenerator {
    /// Creates a generator from session configuration.
    pub fn from_config(config: &MosaicConfig) -> Self {
        Self {
            grid_width: config.grid_width_px(),
            color: config.mosaic_color,
            blur_radius: config.blur_radius,
            blur_iterations: config.blur_iterations,
        }
    }

    /// Produces the cover layer for `effect`.
    ///
    /// # Returns
    /// `Ok(None)` when `source` has no pixels.
    ///
    /// # Errors
    /// Returns [`CoverError::InvalidBlurParameters`] when the blur effect is
    /// selected with a zero radius or iteration count.
    pub fn generate(
        &self,
        source: &PixelBuffer,
        effect: EffectKind,
    ) -> Result<Option<PixelBuffer>, CoverError> {
        if source.is_empty() {
            return Ok(None);
        }

        let started = Instant::now();
        let cover = match effect {
            EffectKind::Grid => grid_cover(source, self.grid_width),
            EffectKind::Color => color_cover(source.width(), source.height(), self.color),
            EffectKind::Blur => box_blur(source, self.blur_radius, self.blur_iterations)?,
        };
        log::debug!(
            "stage=cover action=generated effect={effect:?} size={}x{} elapsed_ms={}",
            cover.width(),
            cover.height(),
            started.elapsed().as_millis()
        );

        Ok(Some(cover))
    }
}

/// Pixelates `source` into `grid_width`-sized cells.
///
/// Each cell takes the color of its top-left source pixel. The last row and
/// column of cells are clipped to the image bounds.
pub fn grid_cover(source: &PixelBuffer, grid_width: u32) -> PixelBuffer {
    let cell = grid_width.clamp(1, source.width().max(source.height()).max(1)) as i32;
    let width = source.width() as i32;
    let height = source.height() as i32;
    let mut cover = PixelBuffer::transparent(source.width(), source.height());

    for top in (0..height).step_by(cell as usize) {
        for left in (0..width).step_by(cell as usize) {
            let rect = Rect::new(left, top, (left + cell).min(width), (top + cell).min(height));
            cover.fill_rect(rect, source.pixel(left, top));
        }
    }

    cover
}

/// Fills a `width x height` cover with one flat color.
pub fn color_cover(width: u32, height: u32, color: u32) -> PixelBuffer {
    PixelBuffer::filled(width, height, color)
}

/// Error type for cover layer generation.
#[derive(Debug, Error)]
pub enum CoverError {
    /// Blur radius or iteration count is zero.
    #[error("invalid blur parameters: radius {radius}, iterations {iterations}")]
    InvalidBlurParameters {
        /// Requested window radius.
        radius: u32,
        /// Requested pass-pair count.
        iterations: u32,
    },
    /// Core model error while assembling output.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}
