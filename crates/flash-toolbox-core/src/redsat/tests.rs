use googletest::prelude::*;

use super::*;
use crate::colour::ColourTable;
use crate::frame::Frame;

fn srgb_of(pixels: Vec<u8>, width: u32, height: u32) -> SrgbFrame {
    let table = ColourTable::new();
    table.convert(&Frame { index: 0, timestamp_ms: 0, width, height, pixels })
}

#[googletest::test]
fn pure_red_hits_the_scaled_coefficient() {
    // BGR order: blue=0, green=0, red=255.
    let field = compute(&srgb_of(vec![0, 0, 255], 1, 1));
    expect_that!((field.get(0, 0) - 320.0).abs(), le(1e-2));
}

#[googletest::test]
fn white_is_not_red_saturated() {
    let field = compute(&srgb_of(vec![255, 255, 255], 1, 1));
    expect_that!(field.get(0, 0), eq(0.0));
}

#[googletest::test]
fn black_is_not_red_saturated() {
    let field = compute(&srgb_of(vec![0, 0, 0], 1, 1));
    expect_that!(field.get(0, 0), eq(0.0));
}

#[googletest::test]
fn negative_coefficient_is_clamped_to_zero() {
    // A pixel with r/(r+g+b) >= 0.8 but r < g + b cannot occur with non-negative
    // channels, but the clamp also guards against float rounding pushing the raw
    // coefficient just under zero.
    let field = compute(&srgb_of(vec![0, 0, 1], 1, 1));
    expect_that!(field.get(0, 0), ge(0.0));
}
