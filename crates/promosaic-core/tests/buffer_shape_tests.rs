//! Tests pixel buffer shape invariants at the crate boundary.

use promosaic_core::{CoreError, PixelBuffer, argb};

#[test]
fn buffer_shape_tests_reject_partial_pixels() {
    let error = PixelBuffer::from_rgba_bytes(1, 1, &[1, 2, 3]).expect_err("3 bytes is not a pixel");
    assert!(matches!(error, CoreError::InvalidByteLength(3)));
}

#[test]
fn buffer_shape_tests_zero_sized_buffer_is_empty_but_valid() {
    let buffer = PixelBuffer::new(0, 7, Vec::new()).expect("zero width is representable");
    assert!(buffer.is_empty());
    assert!(buffer.bounds().is_empty());
}

#[test]
fn buffer_shape_tests_filled_buffer_reports_uniform_pixels() {
    let color = argb(255, 10, 20, 30);
    let buffer = PixelBuffer::filled(3, 5, color);
    assert_eq!(buffer.pixels().len(), 15);
    assert!(buffer.pixels().iter().all(|pixel| *pixel == color));
    assert!(buffer.same_size(&PixelBuffer::transparent(3, 5)));
}
