//! Runtime configuration surface.

use serde::{Deserialize, Serialize};

use crate::CoreError;
use crate::buffer::argb;
use crate::geometry::{EffectKind, InteractionMode, Polarity};

/// Default grid cell width, in device-independent units.
pub const DEFAULT_GRID_WIDTH_DP: u32 = 5;
/// Default freehand stroke width, in device-independent units.
pub const DEFAULT_PATH_WIDTH_DP: u32 = 20;
/// Default inner padding around the fitted image, in device-independent units.
pub const DEFAULT_INNER_PADDING_DP: u32 = 6;
/// Default preview outline width, in pixels.
pub const DEFAULT_STROKE_WIDTH_PX: u32 = 6;
/// Default preview outline color.
pub const DEFAULT_STROKE_COLOR: u32 = 0xff2a_5caa;
/// Default flat fill for the color effect.
pub const DEFAULT_MOSAIC_COLOR: u32 = argb(0xff, 0, 0, 0);
/// Default blur window radius.
pub const DEFAULT_BLUR_RADIUS: u32 = 8;
/// Default number of horizontal+vertical blur pass pairs.
pub const DEFAULT_BLUR_ITERATIONS: u32 = 1;
/// Default corner rounding radius applied to freehand paths, in pixels.
pub const DEFAULT_CORNER_RADIUS_PX: u32 = 10;

/// All runtime-settable knobs of a mosaic session.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// Grid cell width in device-independent units.
    pub grid_width_dp: u32,
    /// Freehand stroke width in device-independent units.
    pub path_width_dp: u32,
    /// Padding between the view edge and the fitted image.
    pub inner_padding_dp: u32,
    /// Outline width for the in-progress grid selection.
    pub stroke_width_px: u32,
    /// Outline color for the in-progress grid selection.
    pub stroke_color: u32,
    /// Flat fill used by [`EffectKind::Color`].
    pub mosaic_color: u32,
    /// Device pixels per device-independent unit.
    pub density: f32,
    /// Blur window radius used by [`EffectKind::Blur`].
    pub blur_radius: u32,
    /// Blur pass-pair count used by [`EffectKind::Blur`].
    pub blur_iterations: u32,
    /// Corner rounding radius for freehand paths, in pixels.
    pub corner_radius_px: u32,
    /// Initial obscuring effect.
    pub effect: EffectKind,
    /// Initial gesture interpretation.
    pub mode: InteractionMode,
    /// Initial add/erase polarity.
    pub polarity: Polarity,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            grid_width_dp: DEFAULT_GRID_WIDTH_DP,
            path_width_dp: DEFAULT_PATH_WIDTH_DP,
            inner_padding_dp: DEFAULT_INNER_PADDING_DP,
            stroke_width_px: DEFAULT_STROKE_WIDTH_PX,
            stroke_color: DEFAULT_STROKE_COLOR,
            mosaic_color: DEFAULT_MOSAIC_COLOR,
            density: 1.0,
            blur_radius: DEFAULT_BLUR_RADIUS,
            blur_iterations: DEFAULT_BLUR_ITERATIONS,
            corner_radius_px: DEFAULT_CORNER_RADIUS_PX,
            effect: EffectKind::Grid,
            mode: InteractionMode::Path,
            polarity: Polarity::Add,
        }
    }
}

impl MosaicConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] for malformed JSON and
    /// [`CoreError::InvalidConfig`] for out-of-range values.
    pub fn from_json_str(raw: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "density must be positive, got {}",
                self.density
            )));
        }

        for (field, value) in [
            ("grid_width_dp", self.grid_width_dp),
            ("path_width_dp", self.path_width_dp),
            ("blur_radius", self.blur_radius),
            ("blur_iterations", self.blur_iterations),
        ] {
            if value == 0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{field} must be greater than zero"
                )));
            }
        }

        Ok(())
    }

    /// Grid cell width converted to device pixels.
    pub fn grid_width_px(&self) -> u32 {
        dp_to_px(self.grid_width_dp, self.density)
    }

    /// Freehand stroke width converted to device pixels.
    pub fn path_width_px(&self) -> u32 {
        dp_to_px(self.path_width_dp, self.density)
    }

    /// Inner padding converted to device pixels.
    pub fn inner_padding_px(&self) -> u32 {
        (self.inner_padding_dp as f32 * self.density).round() as u32
    }
}

/// Converts device-independent units to device pixels.
///
/// Widths never collapse below one pixel.
pub fn dp_to_px(dp: u32, density: f32) -> u32 {
    ((dp as f32 * density).round() as u32).max(1)
}
