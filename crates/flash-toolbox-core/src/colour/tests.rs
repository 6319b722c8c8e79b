use googletest::prelude::*;

use super::*;
use crate::frame::Frame;

#[googletest::test]
fn endpoints_are_exact() {
    let table = ColourTable::new();
    expect_that!((table.lookup(0) - 0.0).abs(), le(1e-6));
    expect_that!((table.lookup(255) - 1.0).abs(), le(1e-6));
}

#[googletest::test]
fn is_monotonically_increasing() {
    let table = ColourTable::new();
    for i in 0..255u8 {
        expect_that!(table.lookup(i), lt(table.lookup(i + 1)));
    }
}

#[googletest::test]
fn linear_segment_matches_formula() {
    let table = ColourTable::new();
    // i = 10 -> v = 10/255 ~= 0.0392, which is below the 0.04045 breakpoint.
    let v = 10.0 / 255.0;
    expect_that!((table.lookup(10) - v / 12.92).abs(), le(1e-6));
}

#[googletest::test]
fn power_segment_matches_formula() {
    let table = ColourTable::new();
    // i = 200 -> v is well above the 0.04045 breakpoint.
    let v = 200.0 / 255.0;
    let expected = ((v + 0.055) / 1.055).powf(2.4);
    expect_that!((table.lookup(200) - expected).abs(), le(1e-6));
}

#[googletest::test]
fn convert_maps_every_pixel() {
    let table = ColourTable::new();
    let frame = Frame { index: 0, timestamp_ms: 0, width: 2, height: 1, pixels: vec![0, 0, 0, 255, 255, 255] };
    let srgb = table.convert(&frame);
    expect_that!(srgb.bgr_at(0, 0), eq((0.0, 0.0, 0.0)));
    let (b, g, r) = srgb.bgr_at(1, 0);
    expect_that!((b - 1.0).abs(), le(1e-6));
    expect_that!((g - 1.0).abs(), le(1e-6));
    expect_that!((r - 1.0).abs(), le(1e-6));
}
