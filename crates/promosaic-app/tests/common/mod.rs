//! Shared fixtures for app integration tests.

use promosaic_app::MosaicSession;
use promosaic_core::{InteractionMode, MosaicConfig, PixelBuffer, argb};
use promosaic_viewport::{PointerEvent, PointerKind};
use tempfile::TempDir;

/// Opaque red used by the uniform fixtures.
#[allow(dead_code)]
pub const RED: u32 = argb(255, 255, 0, 0);

/// Config with no inner padding so view and image coordinates coincide.
#[allow(dead_code)]
pub fn unpadded_config(mode: InteractionMode) -> MosaicConfig {
    MosaicConfig {
        inner_padding_dp: 0,
        mode,
        ..MosaicConfig::default()
    }
}

/// Two-tone 64x48 image: left half dark blue, right half orange.
#[allow(dead_code)]
pub fn two_tone_image() -> PixelBuffer {
    let mut image = PixelBuffer::filled(64, 48, argb(255, 20, 30, 120));
    image.fill_rect(promosaic_core::Rect::new(32, 0, 64, 48), argb(255, 240, 140, 20));
    image
}

/// Session loaded with `image` and laid out 1:1.
#[allow(dead_code)]
pub fn session_with(image: PixelBuffer, mode: InteractionMode) -> MosaicSession {
    let (width, height) = (image.width(), image.height());
    let mut session = MosaicSession::new(unpadded_config(mode)).expect("config should be valid");
    session.load_buffer(image).expect("fixture image should load");
    session.layout(width, height);
    session
}

/// Delivers `(kind, x, y)` events in order.
#[allow(dead_code)]
pub fn drive(session: &mut MosaicSession, events: &[(PointerKind, f32, f32)]) {
    for (kind, x, y) in events {
        session
            .handle_event(PointerEvent::new(*kind, *x, *y))
            .expect("event should apply");
    }
}

/// Scratch directory removed when the returned guard drops.
#[allow(dead_code)]
pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().expect("scratch dir should be creatable")
}
