//! Editing session aggregate.
//!
//! Owns the source, cover, mask, and mosaic layer buffers together with the
//! viewport and gesture state. Buffers are replaced, never aliased: the cover
//! is regenerated on effect/grid/color/source changes and the mosaic layer on
//! region or mode changes.

use std::path::{Path, PathBuf};
use std::time::Instant;

use promosaic_core::{
    CoreError, EffectKind, InteractionMode, MosaicConfig, PixelBuffer, Polarity, Rect, Region,
};
use promosaic_cover::{CoverError, CoverLayerGenerator};
use promosaic_io::{
    PersistError, PersistenceSink, SourceError, SourceImageProvider, default_output_path,
};
use promosaic_mask::{
    CompositeError, RegionMask, StrokeStyle, composite_mosaic_layer, composite_mosaic_region,
    flatten,
};
use promosaic_viewport::{GestureTracker, GestureUpdate, PointerEvent, ViewportMapper};
use thiserror::Error;

/// Outline the host draws around an in-progress grid selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionOutline {
    /// View-space rectangle.
    pub rect: Rect,
    /// Stroke color (ARGB).
    pub color: u32,
    /// Stroke width in view pixels.
    pub width: u32,
}

/// Aggregate root of one editing session.
#[derive(Debug)]
pub struct MosaicSession {
    config: MosaicConfig,
    source: Option<PixelBuffer>,
    cover: Option<PixelBuffer>,
    mask: Option<RegionMask>,
    layer: Option<PixelBuffer>,
    output_path: Option<PathBuf>,
    view_size: Option<(u32, u32)>,
    mapper: Option<ViewportMapper>,
    gesture: GestureTracker,
    preview_dirty: Option<Rect>,
}

impl MosaicSession {
    /// Creates an empty session.
    ///
    /// # Errors
    /// Returns [`SessionError::Config`] when `config` fails validation.
    pub fn new(config: MosaicConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            config,
            source: None,
            cover: None,
            mask: None,
            layer: None,
            output_path: None,
            view_size: None,
            mapper: None,
            gesture: GestureTracker::new(),
            preview_dirty: None,
        })
    }

    /// Probes, decodes, and installs the image at `path`.
    ///
    /// The default output path becomes `<stem>_mosaic.<ext>` next to `path`.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidSource`] when the image is missing,
    /// empty, or undecodable. The previous session state is kept in that case.
    pub fn load_source(
        &mut self,
        provider: &dyn SourceImageProvider,
        path: &Path,
    ) -> Result<(), SessionError> {
        let size = provider.probe_size(path).inspect_err(|error| {
            log::warn!("stage=session action=load_rejected path={} error={error}", path.display());
        })?;
        if size.width == 0 || size.height == 0 {
            log::warn!(
                "stage=session action=load_rejected path={} size={}x{}",
                path.display(),
                size.width,
                size.height
            );
            return Err(SourceError::EmptyDimensions {
                width: size.width,
                height: size.height,
            }
            .into());
        }

        let image = provider.decode(path)?;
        self.install_source(image)?;
        self.output_path = Some(default_output_path(path));
        log::info!(
            "stage=session action=source_loaded path={} size={}x{}",
            path.display(),
            size.width,
            size.height
        );
        Ok(())
    }

    /// Installs an already decoded image, clearing every prior region.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidSource`] for an empty buffer.
    pub fn load_buffer(&mut self, image: PixelBuffer) -> Result<(), SessionError> {
        self.install_source(image)
    }

    /// Fits the image into a `view_width x view_height` view.
    pub fn layout(&mut self, view_width: u32, view_height: u32) {
        self.view_size = Some((view_width, view_height));
        self.refresh_mapper();
    }

    /// Routes one pointer event through the gesture tracker.
    ///
    /// Events arriving with no source or no layout are ignored.
    ///
    /// # Errors
    /// Returns [`SessionError::Composite`] if session buffers disagree in
    /// size, which indicates a bug rather than bad input.
    pub fn handle_event(&mut self, event: PointerEvent) -> Result<GestureUpdate, SessionError> {
        let Some(mapper) = self.mapper else {
            return Ok(GestureUpdate::Ignored);
        };
        if self.source.is_none() {
            return Ok(GestureUpdate::Ignored);
        }

        let update = self.gesture.handle(event, self.config.mode, &mapper);
        match &update {
            GestureUpdate::PathExtended => self.refresh_path_preview()?,
            GestureUpdate::CommitRect(rect) => {
                self.commit(Region::rect(*rect, self.config.polarity))?;
            }
            GestureUpdate::CommitPath(path) => {
                self.commit(Region::path(path.clone(), self.config.polarity))?;
            }
            GestureUpdate::Ignored | GestureUpdate::RectPreview(_) => {}
        }
        Ok(update)
    }

    /// Selects the obscuring effect and regenerates the cover.
    ///
    /// # Errors
    /// Returns [`SessionError::Cover`] if the cover cannot be generated.
    pub fn set_effect(&mut self, effect: EffectKind) -> Result<(), SessionError> {
        if self.config.effect == effect {
            return Ok(());
        }
        self.config.effect = effect;
        self.refresh_cover()
    }

    /// Switches between grid and path gestures.
    ///
    /// Any gesture in progress is abandoned and the mosaic layer is
    /// regenerated from the full region log.
    ///
    /// # Errors
    /// Returns [`SessionError::Composite`] on internal size mismatch.
    pub fn set_mode(&mut self, mode: InteractionMode) -> Result<(), SessionError> {
        if self.config.mode == mode {
            return Ok(());
        }
        self.config.mode = mode;
        self.gesture.cancel();
        self.rebuild_layer()
    }

    /// Sets add/erase polarity for subsequent regions.
    pub fn set_polarity(&mut self, polarity: Polarity) {
        self.config.polarity = polarity;
    }

    /// Convenience toggle for erase polarity.
    pub fn set_erase(&mut self, erase: bool) {
        self.set_polarity(if erase { Polarity::Erase } else { Polarity::Add });
    }

    /// Sets the grid cell width in device-independent units.
    ///
    /// # Errors
    /// Returns [`SessionError::Config`] for zero, or [`SessionError::Cover`]
    /// if regeneration fails.
    pub fn set_grid_width(&mut self, grid_width_dp: u32) -> Result<(), SessionError> {
        if grid_width_dp == 0 {
            return Err(CoreError::InvalidConfig("grid_width_dp must be greater than zero".into()).into());
        }
        if self.config.grid_width_dp == grid_width_dp {
            return Ok(());
        }
        self.config.grid_width_dp = grid_width_dp;
        self.refresh_cover()
    }

    /// Sets the flat fill used by the color effect.
    ///
    /// # Errors
    /// Returns [`SessionError::Cover`] if regeneration fails.
    pub fn set_mosaic_color(&mut self, color: u32) -> Result<(), SessionError> {
        if self.config.mosaic_color == color {
            return Ok(());
        }
        self.config.mosaic_color = color;
        self.refresh_cover()
    }

    /// Sets the freehand stroke width and re-rasterizes every region.
    ///
    /// # Errors
    /// Returns [`SessionError::Config`] for zero.
    pub fn set_path_width(&mut self, path_width_dp: u32) -> Result<(), SessionError> {
        if path_width_dp == 0 {
            return Err(CoreError::InvalidConfig("path_width_dp must be greater than zero".into()).into());
        }
        if self.config.path_width_dp == path_width_dp {
            return Ok(());
        }
        self.config.path_width_dp = path_width_dp;
        let stroke = self.stroke_style();
        if let Some(mask) = self.mask.as_mut() {
            mask.set_stroke(stroke);
        }
        self.rebuild_layer()
    }

    /// Sets the selection outline color.
    pub fn set_stroke_color(&mut self, color: u32) {
        self.config.stroke_color = color;
    }

    /// Sets the selection outline width.
    pub fn set_stroke_width(&mut self, width_px: u32) {
        self.config.stroke_width_px = width_px.max(1);
    }

    /// Overrides the output path used by [`MosaicSession::save`].
    pub fn set_output_path(&mut self, path: impl Into<PathBuf>) {
        self.output_path = Some(path.into());
    }

    /// Drops every region and the mosaic layer; source and cover are kept.
    pub fn clear(&mut self) {
        if let Some(mask) = self.mask.as_mut() {
            mask.clear();
        }
        self.layer = None;
        self.preview_dirty = None;
        self.gesture.cancel();
        log::info!("stage=session action=cleared");
    }

    /// Drops everything, including the source image.
    pub fn reset(&mut self) {
        self.source = None;
        self.cover = None;
        self.mask = None;
        self.layer = None;
        self.output_path = None;
        self.mapper = None;
        self.preview_dirty = None;
        self.gesture.cancel();
        log::info!("stage=session action=reset");
    }

    /// Returns `true` while a mosaic layer exists.
    pub fn has_edits(&self) -> bool {
        self.layer.is_some()
    }

    /// Returns `true` once a source image is installed.
    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    /// Flattens source and mosaic layer into the output image.
    ///
    /// # Errors
    /// Returns [`SessionError::NoSource`] when nothing is loaded.
    pub fn flattened(&self) -> Result<PixelBuffer, SessionError> {
        let source = self.source.as_ref().ok_or(SessionError::NoSource)?;
        Ok(flatten(source, self.layer.as_ref())?)
    }

    /// Flattens and persists to the current output path.
    ///
    /// # Errors
    /// Returns [`SessionError::NoOutputPath`] when no path is known, or
    /// [`SessionError::Persistence`] when the sink fails. Session state is
    /// untouched on failure so the caller can retry.
    pub fn save(&self, sink: &dyn PersistenceSink) -> Result<PathBuf, SessionError> {
        let path = self.output_path.clone().ok_or(SessionError::NoOutputPath)?;
        self.save_to(sink, &path)?;
        Ok(path)
    }

    /// Flattens and persists to `path`.
    ///
    /// # Errors
    /// See [`MosaicSession::save`].
    pub fn save_to(&self, sink: &dyn PersistenceSink, path: &Path) -> Result<(), SessionError> {
        let output = self.flattened()?;
        sink.preflight(path)
            .and_then(|()| sink.persist(&output, path))
            .inspect_err(|error| {
                log::error!("stage=session action=save_failed path={} error={error}", path.display());
            })?;
        log::info!(
            "stage=session action=saved path={} edited={}",
            path.display(),
            self.has_edits()
        );
        Ok(())
    }

    /// Active configuration.
    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Loaded source image.
    pub fn source(&self) -> Option<&PixelBuffer> {
        self.source.as_ref()
    }

    /// Current cover layer.
    pub fn cover(&self) -> Option<&PixelBuffer> {
        self.cover.as_ref()
    }

    /// Current mosaic layer, absent until the first edit.
    pub fn mosaic_layer(&self) -> Option<&PixelBuffer> {
        self.layer.as_ref()
    }

    /// Committed regions in arrival order.
    pub fn regions(&self) -> &[Region] {
        self.mask.as_ref().map(RegionMask::regions).unwrap_or_default()
    }

    /// Current fit-to-bounds mapping, if laid out.
    pub fn mapper(&self) -> Option<&ViewportMapper> {
        self.mapper.as_ref()
    }

    /// Current output path.
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Outline of the grid selection in progress.
    pub fn selection_outline(&self) -> Option<SelectionOutline> {
        self.gesture.preview_rect().map(|rect| SelectionOutline {
            rect,
            color: self.config.stroke_color,
            width: self.config.stroke_width_px,
        })
    }

    fn install_source(&mut self, image: PixelBuffer) -> Result<(), SessionError> {
        if image.is_empty() {
            return Err(SourceError::EmptyDimensions {
                width: image.width(),
                height: image.height(),
            }
            .into());
        }

        let cover = CoverLayerGenerator::from_config(&self.config).generate(&image, self.config.effect)?;
        self.mask = Some(RegionMask::new(image.width(), image.height(), self.stroke_style()));
        self.cover = cover;
        self.source = Some(image);
        self.layer = None;
        self.output_path = None;
        self.preview_dirty = None;
        self.gesture.cancel();
        self.refresh_mapper();
        Ok(())
    }

    fn refresh_mapper(&mut self) {
        self.gesture.cancel();
        self.discard_preview_state();
        self.mapper = match (self.view_size, self.source.as_ref()) {
            (Some((view_width, view_height)), Some(source)) => ViewportMapper::fit(
                view_width,
                view_height,
                source.width(),
                source.height(),
                self.config.inner_padding_px(),
            ),
            _ => None,
        };
    }

    fn refresh_cover(&mut self) -> Result<(), SessionError> {
        let Some(source) = self.source.as_ref() else {
            return Ok(());
        };
        self.cover = None;
        self.cover = CoverLayerGenerator::from_config(&self.config).generate(source, self.config.effect)?;
        self.rebuild_layer()
    }

    fn rebuild_layer(&mut self) -> Result<(), SessionError> {
        let started = Instant::now();
        self.preview_dirty = None;
        self.layer = match (self.cover.as_ref(), self.mask.as_ref()) {
            (Some(cover), Some(mask)) if !mask.is_empty() => {
                Some(composite_mosaic_layer(cover, mask.mask())?)
            }
            _ => None,
        };
        log::debug!(
            "stage=session action=layer_rebuilt regions={} elapsed_us={}",
            self.regions().len(),
            started.elapsed().as_micros()
        );
        Ok(())
    }

    fn commit(&mut self, region: Result<Region, CoreError>) -> Result<(), SessionError> {
        let region = match region {
            Ok(region) => region,
            Err(error) => {
                log::debug!("stage=session action=region_dropped reason={error}");
                return self.restore_committed();
            }
        };
        let Some(mask) = self.mask.as_mut() else {
            return Ok(());
        };

        let started = Instant::now();
        let dirty = union_dirty(mask.push(region), self.preview_dirty.take());
        self.recomposite(dirty, None)?;
        log::debug!(
            "stage=session action=region_committed regions={} dirty={dirty:?} elapsed_us={}",
            self.regions().len(),
            started.elapsed().as_micros()
        );
        Ok(())
    }

    fn refresh_path_preview(&mut self) -> Result<(), SessionError> {
        let Some(path) = self.gesture.pending_path() else {
            return Ok(());
        };
        let Ok(pending) = Region::path(path.clone(), self.config.polarity) else {
            return Ok(());
        };
        let Some(mask) = self.mask.as_ref() else {
            return Ok(());
        };

        let started = Instant::now();
        let (preview, dirty) = mask.with_pending(&pending);
        let dirty = union_dirty(dirty, self.preview_dirty);
        self.recomposite(dirty, Some(&preview))?;
        self.preview_dirty = dirty;
        log::debug!(
            "stage=session action=preview_recomposited dirty={dirty:?} elapsed_us={}",
            started.elapsed().as_micros()
        );
        Ok(())
    }

    fn restore_committed(&mut self) -> Result<(), SessionError> {
        let dirty = self.preview_dirty.take();
        self.recomposite(dirty, None)?;
        if self.mask.as_ref().is_none_or(RegionMask::is_empty) {
            self.layer = None;
        }
        Ok(())
    }

    fn discard_preview_state(&mut self) {
        if self.preview_dirty.is_some() {
            if let Err(error) = self.restore_committed() {
                log::warn!("stage=session action=preview_discard_failed error={error}");
                self.preview_dirty = None;
            }
        }
    }

    /// Recomputes the layer inside `dirty` from the cover and either the
    /// committed mask or `preview_mask`.
    fn recomposite(
        &mut self,
        dirty: Option<Rect>,
        preview_mask: Option<&PixelBuffer>,
    ) -> Result<(), SessionError> {
        let (Some(dirty), Some(cover), Some(mask)) = (dirty, self.cover.as_ref(), self.mask.as_ref())
        else {
            return Ok(());
        };
        let mask = preview_mask.unwrap_or(mask.mask());
        let layer = self
            .layer
            .get_or_insert_with(|| PixelBuffer::transparent(cover.width(), cover.height()));
        composite_mosaic_region(layer, cover, mask, dirty)?;
        Ok(())
    }

    fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle {
            width: self.config.path_width_px(),
            corner_radius: self.config.corner_radius_px,
        }
    }
}

fn union_dirty(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (a, b) => a.or(b),
    }
}

/// Session-level error type.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Operation requires a loaded source image.
    #[error("no source image loaded")]
    NoSource,
    /// Save requested with no output path known.
    #[error("no output path set")]
    NoOutputPath,
    /// Source image could not be loaded.
    #[error("invalid source: {0}")]
    InvalidSource(#[from] SourceError),
    /// Output could not be written.
    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistError),
    /// Cover generation failed.
    #[error("cover error: {0}")]
    Cover(#[from] CoverError),
    /// Internal buffer size mismatch.
    #[error("composite error: {0}")]
    Composite(#[from] CompositeError),
    /// Rejected configuration value.
    #[error("config error: {0}")]
    Config(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for session lifecycle rules.

    use promosaic_core::argb;
    use promosaic_mask::rasterize;
    use promosaic_viewport::PointerKind;

    use super::*;

    fn loaded_session(mode: InteractionMode) -> MosaicSession {
        let config = MosaicConfig {
            inner_padding_dp: 0,
            mode,
            ..MosaicConfig::default()
        };
        let mut session = MosaicSession::new(config).expect("default config is valid");
        let mut image = PixelBuffer::filled(40, 40, argb(255, 10, 20, 30));
        image.fill_rect(Rect::new(20, 0, 40, 40), argb(255, 200, 100, 50));
        session.load_buffer(image).expect("image should load");
        session.layout(40, 40);
        session
    }

    fn drive(session: &mut MosaicSession, events: &[(PointerKind, f32, f32)]) {
        for (kind, x, y) in events {
            session
                .handle_event(PointerEvent::new(*kind, *x, *y))
                .expect("event should apply");
        }
    }

    #[test]
    fn events_before_layout_are_ignored() {
        let mut session = MosaicSession::new(MosaicConfig::default()).expect("valid config");
        let update = session
            .handle_event(PointerEvent::new(PointerKind::Down, 1.0, 1.0))
            .expect("no-op");
        assert_eq!(update, GestureUpdate::Ignored);
        assert!(!session.has_edits());
    }

    #[test]
    fn incremental_path_layer_matches_full_recompute() {
        let mut session = loaded_session(InteractionMode::Path);
        drive(
            &mut session,
            &[
                (PointerKind::Down, 5.0, 5.0),
                (PointerKind::Move, 15.0, 8.0),
                (PointerKind::Move, 30.0, 20.0),
                (PointerKind::Move, 10.0, 35.0),
                (PointerKind::Up, 10.0, 35.0),
            ],
        );
        assert_eq!(session.regions().len(), 1);

        let mask = rasterize(session.regions(), 40, 40, session.stroke_style());
        let cover = session.cover().expect("cover exists");
        let expected = composite_mosaic_layer(cover, &mask).expect("same size");
        assert_eq!(session.mosaic_layer(), Some(&expected));
    }

    #[test]
    fn single_point_path_is_dropped_without_edits() {
        let mut session = loaded_session(InteractionMode::Path);
        drive(&mut session, &[(PointerKind::Down, 5.0, 5.0), (PointerKind::Up, 5.0, 5.0)]);
        assert!(session.regions().is_empty());
        assert!(!session.has_edits());
    }

    #[test]
    fn mode_switch_regenerates_layer_and_keeps_regions() {
        let mut session = loaded_session(InteractionMode::Grid);
        drive(
            &mut session,
            &[(PointerKind::Down, 0.0, 0.0), (PointerKind::Up, 10.0, 10.0)],
        );
        let before = session.mosaic_layer().cloned();

        session.set_mode(InteractionMode::Path).expect("mode switch");
        assert_eq!(session.regions().len(), 1);
        assert_eq!(session.mosaic_layer().cloned(), before);
    }

    #[test]
    fn clear_keeps_source_and_reset_drops_it() {
        let mut session = loaded_session(InteractionMode::Grid);
        drive(
            &mut session,
            &[(PointerKind::Down, 0.0, 0.0), (PointerKind::Up, 10.0, 10.0)],
        );
        assert!(session.has_edits());

        session.clear();
        assert!(!session.has_edits());
        assert!(session.is_loaded());
        assert!(session.cover().is_some());

        session.reset();
        assert!(!session.is_loaded());
        assert!(matches!(session.flattened(), Err(SessionError::NoSource)));
    }

    #[test]
    fn grid_drag_exposes_selection_outline() {
        let mut session = loaded_session(InteractionMode::Grid);
        drive(
            &mut session,
            &[(PointerKind::Down, 2.0, 2.0), (PointerKind::Move, 12.0, 8.0)],
        );
        let outline = session.selection_outline().expect("drag in progress");
        assert_eq!(outline.rect, Rect::new(2, 2, 12, 8));
        assert_eq!(outline.color, session.config().stroke_color);
    }

    #[test]
    fn zero_widths_are_rejected() {
        let mut session = loaded_session(InteractionMode::Path);
        assert!(matches!(session.set_grid_width(0), Err(SessionError::Config(_))));
        assert!(matches!(session.set_path_width(0), Err(SessionError::Config(_))));
    }
}
