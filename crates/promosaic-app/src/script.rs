//! JSON gesture scripts for headless replay.
//!
//! ```json
//! {
//!   "view": { "width": 400, "height": 300 },
//!   "steps": [
//!     { "action": "set_effect", "effect": "blur" },
//!     { "action": "set_mode", "mode": "grid" },
//!     { "action": "pointer", "kind": "down", "x": 10.0, "y": 60.0 },
//!     { "action": "pointer", "kind": "up", "x": 120.0, "y": 140.0 },
//!     { "action": "stroke", "points": [[20.0, 80.0], [60.0, 90.0]] }
//!   ]
//! }
//! ```

use promosaic_core::{EffectKind, InteractionMode, Polarity};
use promosaic_viewport::{GestureUpdate, PointerEvent, PointerKind};
use serde::{Deserialize, Serialize};

use crate::{AppError, MosaicSession};

/// View size the script's pointer coordinates refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSize {
    /// View width in pixels.
    pub width: u32,
    /// View height in pixels.
    pub height: u32,
}

/// One scripted session action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Select the obscuring effect.
    SetEffect {
        /// New effect.
        effect: EffectKind,
    },
    /// Select the gesture interpretation.
    SetMode {
        /// New mode.
        mode: InteractionMode,
    },
    /// Select add or erase.
    SetPolarity {
        /// New polarity.
        polarity: Polarity,
    },
    /// Change the grid cell width.
    SetGridWidth {
        /// Width in device-independent units.
        dp: u32,
    },
    /// Change the freehand stroke width.
    SetPathWidth {
        /// Width in device-independent units.
        dp: u32,
    },
    /// Change the flat color effect fill.
    SetMosaicColor {
        /// ARGB color.
        color: u32,
    },
    /// Deliver one raw pointer event.
    Pointer(PointerEvent),
    /// Down at the first point, move through the rest, up at the last.
    Stroke {
        /// View-space points.
        points: Vec<[f32; 2]>,
    },
    /// Drop every region.
    Clear,
}

/// Parsed gesture script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureScript {
    /// Layout applied before the first step.
    pub view: ViewSize,
    /// Steps in order.
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

/// Outcome counters of one replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Pointer events delivered.
    pub events: usize,
    /// Pointer events the session ignored.
    pub ignored: usize,
    /// Gestures that finished with a commit.
    pub commits: usize,
}

impl GestureScript {
    /// Parses a script document.
    ///
    /// # Errors
    /// Returns [`AppError::Script`] for malformed JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Applies the layout and every step to `session`.
    ///
    /// # Errors
    /// Returns the first [`AppError::Session`] raised by a step.
    pub fn replay(&self, session: &mut MosaicSession) -> Result<ReplaySummary, AppError> {
        session.layout(self.view.width, self.view.height);
        let mut summary = ReplaySummary::default();

        for step in &self.steps {
            match step {
                ScriptStep::SetEffect { effect } => session.set_effect(*effect)?,
                ScriptStep::SetMode { mode } => session.set_mode(*mode)?,
                ScriptStep::SetPolarity { polarity } => session.set_polarity(*polarity),
                ScriptStep::SetGridWidth { dp } => session.set_grid_width(*dp)?,
                ScriptStep::SetPathWidth { dp } => session.set_path_width(*dp)?,
                ScriptStep::SetMosaicColor { color } => session.set_mosaic_color(*color)?,
                ScriptStep::Pointer(event) => deliver(session, *event, &mut summary)?,
                ScriptStep::Stroke { points } => {
                    let last = points.len().saturating_sub(1);
                    for (index, [x, y]) in points.iter().copied().enumerate() {
                        let kind = match index {
                            0 => PointerKind::Down,
                            i if i == last => PointerKind::Up,
                            _ => PointerKind::Move,
                        };
                        deliver(session, PointerEvent::new(kind, x, y), &mut summary)?;
                    }
                }
                ScriptStep::Clear => session.clear(),
            }
        }

        log::info!(
            "stage=script action=replayed steps={} events={} ignored={} commits={}",
            self.steps.len(),
            summary.events,
            summary.ignored,
            summary.commits
        );
        Ok(summary)
    }
}

fn deliver(
    session: &mut MosaicSession,
    event: PointerEvent,
    summary: &mut ReplaySummary,
) -> Result<(), AppError> {
    summary.events += 1;
    match session.handle_event(event)? {
        GestureUpdate::Ignored => summary.ignored += 1,
        GestureUpdate::CommitRect(_) | GestureUpdate::CommitPath(_) => summary.commits += 1,
        GestureUpdate::RectPreview(_) | GestureUpdate::PathExtended => {}
    }
    Ok(())
}
