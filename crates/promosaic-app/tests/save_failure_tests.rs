//! Integration tests for non-destructive save failures and real JPEG output.

mod common;

use common::{drive, scratch_dir, session_with, two_tone_image};
use promosaic_app::SessionError;
use promosaic_core::InteractionMode;
use promosaic_io::{ImageFileProvider, JpegFileSink, MemorySink, PersistError, SourceImageProvider};
use promosaic_viewport::PointerKind;

#[test_log::test]
fn save_failure_tests_unwritable_target_fails_without_touching_state() {
    let scratch = scratch_dir();
    let dir = scratch.path();
    let mut session = session_with(two_tone_image(), InteractionMode::Grid);
    drive(&mut session, &[(PointerKind::Down, 0.0, 0.0), (PointerKind::Up, 16.0, 16.0)]);
    let layer_before = session.mosaic_layer().cloned();

    let target = dir.join("missing-subdir").join("out.jpg");
    session.set_output_path(&target);
    let result = session.save(&JpegFileSink::default());

    assert!(matches!(
        result,
        Err(SessionError::Persistence(PersistError::Unwritable { .. }))
    ));
    assert!(!target.exists());
    assert_eq!(session.mosaic_layer().cloned(), layer_before);
    assert!(session.has_edits());

    let retry = dir.join("out.jpg");
    session.set_output_path(&retry);
    session.save(&JpegFileSink::default()).expect("retry should succeed");
    let size = ImageFileProvider.probe_size(&retry).expect("saved jpeg readable");
    assert_eq!((size.width, size.height), (64, 48));
}

#[test]
fn save_failure_tests_failing_sink_keeps_session_retryable() {
    let mut session = session_with(two_tone_image(), InteractionMode::Grid);
    drive(&mut session, &[(PointerKind::Down, 0.0, 0.0), (PointerKind::Up, 16.0, 16.0)]);
    session.set_output_path("/virtual/out.jpg");

    assert!(matches!(
        session.save(&MemorySink::failing()),
        Err(SessionError::Persistence(PersistError::Write { .. }))
    ));

    let sink = MemorySink::new();
    session.save(&sink).expect("second attempt should succeed");
    assert_eq!(sink.saved().expect("records readable").len(), 1);
}

#[test]
fn save_failure_tests_save_without_output_path_is_rejected() {
    let session = session_with(two_tone_image(), InteractionMode::Path);
    assert!(matches!(
        session.save(&MemorySink::new()),
        Err(SessionError::NoOutputPath)
    ));
}
