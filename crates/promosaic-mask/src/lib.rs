#![warn(missing_docs)]
//! # promosaic-mask
//!
//! ## Purpose
//! Turns an ordered log of add/erase regions into a coverage mask and
//! stencils the cover layer through it.
//!
//! ## Responsibilities
//! - Replay [`Region`] values left-to-right into a mask buffer.
//! - Keep the mask current incrementally as regions are appended.
//! - Provide the [`BlendOp`] operators and the layer/flatten compositors.
//!
//! ## Data flow
//! Regions -> [`RegionMask`] -> [`composite_mosaic_layer`] (with the cover)
//! -> mosaic layer -> [`flatten`] (with the source) -> output buffer.
//!
//! ## Ownership and lifetimes
//! [`RegionMask`] owns both the region log and the cached mask. Compositors
//! borrow inputs and return (or write into) a separate destination buffer.
//!
//! ## Error model
//! Buffer size mismatches are precondition violations reported immediately as
//! [`CompositeError::DimensionMismatch`].

mod composite;
mod raster;

use promosaic_core::{CoreError, PixelBuffer, Rect, Region};
use thiserror::Error;

pub use composite::{BlendOp, blend, composite_mosaic_layer, composite_mosaic_region, flatten};
pub use raster::{
    MASK_COVERED, StrokeStyle, paint_region, rasterize, region_bounds, smooth_corners,
};

/// Ordered region log with an incrementally maintained mask.
///
/// Invariant: `mask == rasterize(regions, width, height, stroke)` after every
/// public call.
#[derive(Debug, Clone)]
pub struct RegionMask {
    mask: PixelBuffer,
    regions: Vec<Region>,
    stroke: StrokeStyle,
}

impl RegionMask {
    /// Creates an empty mask for a `width x height` image.
    pub fn new(width: u32, height: u32, stroke: StrokeStyle) -> Self {
        Self {
            mask: PixelBuffer::transparent(width, height),
            regions: Vec::new(),
            stroke,
        }
    }

    /// Appends one region and paints only that region onto the cached mask.
    ///
    /// # Returns
    /// The clipped bounds the region touched, or `None` when it lies outside
    /// the image.
    pub fn push(&mut self, region: Region) -> Option<Rect> {
        let dirty = paint_region(&mut self.mask, &region, self.stroke);
        self.regions.push(region);
        log::debug!(
            "stage=mask action=region_appended count={} dirty={dirty:?}",
            self.regions.len()
        );
        dirty
    }

    /// Returns the committed mask with `pending` painted on top.
    ///
    /// The committed log is untouched; this backs live previews of a gesture
    /// still in progress.
    pub fn with_pending(&self, pending: &Region) -> (PixelBuffer, Option<Rect>) {
        let mut preview = self.mask.clone();
        let dirty = paint_region(&mut preview, pending, self.stroke);
        (preview, dirty)
    }

    /// Changes stroke geometry and re-rasterizes every region.
    pub fn set_stroke(&mut self, stroke: StrokeStyle) {
        if self.stroke == stroke {
            return;
        }
        self.stroke = stroke;
        self.mask = rasterize(
            &self.regions,
            self.mask.width(),
            self.mask.height(),
            self.stroke,
        );
    }

    /// Drops every region and clears the mask.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.mask = PixelBuffer::transparent(self.mask.width(), self.mask.height());
    }

    /// Current mask.
    pub fn mask(&self) -> &PixelBuffer {
        &self.mask
    }

    /// Committed regions in arrival order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Current stroke geometry.
    pub fn stroke(&self) -> StrokeStyle {
        self.stroke
    }

    /// Returns `true` when no region has been committed.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Error type for compositing.
#[derive(Debug, Error)]
pub enum CompositeError {
    /// Two buffers taking part in one operation differ in size.
    #[error("buffer size mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Size of the destination buffer.
        expected: (u32, u32),
        /// Size of the offending operand.
        actual: (u32, u32),
    },
    /// Core model error while assembling output.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}
