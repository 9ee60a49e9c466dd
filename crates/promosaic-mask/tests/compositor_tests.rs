//! Tests mosaic layer stenciling and flattening.

use promosaic_core::{PixelBuffer, Polarity, Rect, Region, TRANSPARENT, argb};
use promosaic_mask::{
    CompositeError, RegionMask, StrokeStyle, composite_mosaic_layer, composite_mosaic_region,
    flatten,
};

const STROKE: StrokeStyle = StrokeStyle {
    width: 6,
    corner_radius: 10,
};

fn textured(width: u32, height: u32) -> PixelBuffer {
    let mut buffer = PixelBuffer::transparent(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            buffer.set_pixel(x, y, argb(255, (x * 7) as u8, (y * 11) as u8, 99));
        }
    }
    buffer
}

#[test]
fn compositor_tests_layer_is_cover_inside_mask_and_clear_outside() {
    let cover = textured(20, 20);
    let mut mask = RegionMask::new(20, 20, STROKE);
    mask.push(Region::rect(Rect::new(5, 5, 10, 10), Polarity::Add).expect("rect is valid"));

    let layer = composite_mosaic_layer(&cover, mask.mask()).expect("layer should composite");
    assert_eq!(layer.pixel(7, 7), cover.pixel(7, 7));
    assert_eq!(layer.pixel(4, 7), TRANSPARENT);
    assert_eq!(layer.pixel(10, 10), TRANSPARENT);
}

#[test]
fn compositor_tests_flatten_without_layer_is_identity() {
    let base = textured(9, 4);
    let flattened = flatten(&base, None).expect("flatten should succeed");
    assert_eq!(flattened.to_rgba_bytes(), base.to_rgba_bytes());
}

#[test]
fn compositor_tests_flatten_puts_layer_on_top() {
    let base = textured(12, 12);
    let cover = PixelBuffer::filled(12, 12, argb(255, 1, 2, 3));
    let mut mask = RegionMask::new(12, 12, STROKE);
    mask.push(Region::rect(Rect::new(0, 0, 6, 12), Polarity::Add).expect("rect is valid"));

    let layer = composite_mosaic_layer(&cover, mask.mask()).expect("layer should composite");
    let output = flatten(&base, Some(&layer)).expect("flatten should succeed");

    assert_eq!(output.pixel(2, 2), argb(255, 1, 2, 3));
    assert_eq!(output.pixel(8, 2), base.pixel(8, 2));
}

#[test]
fn compositor_tests_dirty_region_update_matches_full_composite() {
    let cover = textured(30, 30);
    let mut mask = RegionMask::new(30, 30, STROKE);
    mask.push(Region::rect(Rect::new(0, 0, 15, 15), Polarity::Add).expect("rect is valid"));
    let mut layer = composite_mosaic_layer(&cover, mask.mask()).expect("layer should composite");

    let dirty = mask
        .push(Region::rect(Rect::new(10, 10, 25, 25), Polarity::Erase).expect("rect is valid"))
        .expect("region is inside the image");
    composite_mosaic_region(&mut layer, &cover, mask.mask(), dirty)
        .expect("dirty composite should succeed");

    let full = composite_mosaic_layer(&cover, mask.mask()).expect("layer should composite");
    assert_eq!(layer, full);
}

#[test]
fn compositor_tests_mismatched_mask_is_rejected() {
    let cover = textured(8, 8);
    let mask = PixelBuffer::transparent(8, 9);
    assert!(matches!(
        composite_mosaic_layer(&cover, &mask),
        Err(CompositeError::DimensionMismatch { .. })
    ));
}
