#![warn(missing_docs)]
//! # promosaic-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `promosaic` workspace.
//!
//! ## Responsibilities
//! - Own ARGB pixel storage ([`PixelBuffer`]) and its channel helpers.
//! - Represent image-space geometry ([`Rect`], [`Point`], [`Path`]).
//! - Represent user selections as immutable tagged [`Region`] values.
//! - Carry the runtime configuration surface ([`MosaicConfig`]).
//!
//! ## Data flow
//! A decoded source becomes a [`PixelBuffer`]. Pointer gestures become
//! [`Region`] values that the mask crate replays into a mask buffer.
//! [`MosaicConfig`] feeds grid, path, and color settings to every stage.
//!
//! ## Ownership and lifetimes
//! Buffers own their pixel storage (`Vec<u32>`). Components hand buffers off by
//! value or borrow them immutably while producing a new output buffer; no
//! buffer is aliased mutably across components.
//!
//! ## Error model
//! Shape mismatches, malformed geometry, and invalid configuration return
//! [`CoreError`] variants.
//!
//! ## Example
//! ```rust
//! use promosaic_core::{PixelBuffer, Polarity, Rect, Region, argb};
//!
//! let red = argb(255, 255, 0, 0);
//! let buffer = PixelBuffer::filled(4, 4, red);
//! assert_eq!(buffer.pixel(3, 3), red);
//!
//! let region = Region::rect(Rect::new(0, 0, 2, 2), Polarity::Add).unwrap();
//! assert!(region.is_add());
//! ```

mod buffer;
mod config;
mod geometry;

use thiserror::Error;

pub use buffer::{
    PixelBuffer, TRANSPARENT, alpha, argb, blue, green, opaque, red, rgb_bytes, rgba_bytes,
};
pub use config::{MosaicConfig, dp_to_px};
pub use geometry::{EffectKind, InteractionMode, Path, Point, Polarity, Rect, Region, Shape};

/// Error type for core model validation and configuration parsing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Pixel storage length does not match declared geometry.
    #[error("invalid buffer shape: expected {expected} pixels, got {actual}")]
    InvalidBufferShape {
        /// Expected pixel count (`width * height`).
        expected: usize,
        /// Actual pixel count.
        actual: usize,
    },
    /// Byte storage length is not a whole number of pixels.
    #[error("invalid byte buffer length {0}; expected a multiple of 4")]
    InvalidByteLength(usize),
    /// Buffer dimensions overflow addressable memory.
    #[error("buffer dimension overflow: {width}x{height}")]
    DimensionOverflow {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// Geometry is malformed or covers no pixels.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// JSON configuration decoding error.
    #[error("configuration codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
