#![warn(missing_docs)]
//! # promosaic-app
//!
//! ## Purpose
//! Orchestrates cover generation, region masking, viewport mapping, and
//! image I/O into one editing session for `promosaic`.
//!
//! ## Responsibilities
//! - Own the [`MosaicSession`] aggregate and its buffer lifecycle.
//! - Apply environment overrides on top of [`MosaicConfig`].
//! - Replay JSON gesture scripts for headless runs.
//! - Install the per-run file logger.
//!
//! ## Data flow
//! Source provider -> session (cover + mask) -> pointer events through the
//! viewport -> incremental mosaic layer -> flatten -> persistence sink.
//!
//! ## Ownership and lifetimes
//! The session exclusively owns every pixel buffer. Compositing always reads
//! one buffer and writes another; callers only ever see shared borrows.
//!
//! ## Error model
//! Subsystem failures surface as [`SessionError`] and are wrapped in
//! [`AppError`] at the application boundary. Nothing here is fatal: failed
//! loads and saves leave the session as it was.

mod logging;
mod script;
mod session;

use promosaic_core::{EffectKind, InteractionMode, MosaicConfig};
use thiserror::Error;

pub use logging::{RunLogger, format_log_line, init_run_logger};
pub use script::{GestureScript, ReplaySummary, ScriptStep, ViewSize};
pub use session::{MosaicSession, SelectionOutline, SessionError};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("PROMOSAIC_VERSION");

/// Environment variable overriding the grid cell width (dp).
pub const ENV_GRID_WIDTH: &str = "PROMOSAIC_GRID_WIDTH";
/// Environment variable overriding the freehand stroke width (dp).
pub const ENV_PATH_WIDTH: &str = "PROMOSAIC_PATH_WIDTH";
/// Environment variable overriding display density.
pub const ENV_DENSITY: &str = "PROMOSAIC_DENSITY";
/// Environment variable overriding the effect (`grid`, `color`, `blur`).
pub const ENV_EFFECT: &str = "PROMOSAIC_EFFECT";
/// Environment variable overriding the mode (`grid`, `path`).
pub const ENV_MODE: &str = "PROMOSAIC_MODE";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Default configuration with process environment overrides applied.
pub fn config_from_env() -> MosaicConfig {
    apply_overrides(MosaicConfig::default(), |key| std::env::var(key).ok())
}

/// Applies overrides fetched through `lookup` to `base`.
///
/// Semantics:
/// - Unset => base value kept.
/// - Unparsable or out-of-range values => ignored with a warning.
/// - Effect and mode names are case-insensitive.
pub fn apply_overrides(
    mut base: MosaicConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> MosaicConfig {
    let read = |key: &str| lookup(key).map(|value| value.trim().to_ascii_lowercase());

    if let Some(raw) = read(ENV_GRID_WIDTH) {
        match raw.parse::<u32>() {
            Ok(width) if width > 0 => base.grid_width_dp = width,
            _ => ignored(ENV_GRID_WIDTH, &raw),
        }
    }
    if let Some(raw) = read(ENV_PATH_WIDTH) {
        match raw.parse::<u32>() {
            Ok(width) if width > 0 => base.path_width_dp = width,
            _ => ignored(ENV_PATH_WIDTH, &raw),
        }
    }
    if let Some(raw) = read(ENV_DENSITY) {
        match raw.parse::<f32>() {
            Ok(density) if density.is_finite() && density > 0.0 => base.density = density,
            _ => ignored(ENV_DENSITY, &raw),
        }
    }
    if let Some(raw) = read(ENV_EFFECT) {
        match raw.as_str() {
            "grid" => base.effect = EffectKind::Grid,
            "color" => base.effect = EffectKind::Color,
            "blur" => base.effect = EffectKind::Blur,
            _ => ignored(ENV_EFFECT, &raw),
        }
    }
    if let Some(raw) = read(ENV_MODE) {
        match raw.as_str() {
            "grid" => base.mode = InteractionMode::Grid,
            "path" => base.mode = InteractionMode::Path,
            _ => ignored(ENV_MODE, &raw),
        }
    }

    base
}

fn ignored(key: &str, raw: &str) {
    log::warn!("stage=config action=override_ignored key={key} value={raw:?}");
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session operation failed.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    /// Gesture script could not be parsed.
    #[error("script error: {0}")]
    Script(#[from] serde_json::Error),
    /// Run logger could not be installed.
    #[error("logging error: {0}")]
    Logging(String),
    /// File read failure outside the image providers.
    #[error("io error for {path}: {reason}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error text.
        reason: String,
    },
}
