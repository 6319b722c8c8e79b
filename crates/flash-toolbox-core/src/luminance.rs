//! Per-pixel relative luminance.

use crate::field::ScalarField;
use crate::frame::SrgbFrame;


/// Rec. 709-weighted relative luminance coefficients applied to the sRGB channels.
const BLUE_COEFFICIENT: f32 = 0.0722;
const GREEN_COEFFICIENT: f32 = 0.7152;
const RED_COEFFICIENT: f32 = 0.2126;

/// Computes the per-pixel relative luminance field of an sRGB frame.
///
/// Every output value lies in `[0, 1]`; there are no failure modes.
pub fn compute(frame: &SrgbFrame) -> ScalarField {
    let (width, height) = (frame.width() as usize, frame.height() as usize);
    let mut values = Vec::with_capacity(width * height);
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let (b, g, r) = frame.bgr_at(x, y);
            values.push(BLUE_COEFFICIENT * b + GREEN_COEFFICIENT * g + RED_COEFFICIENT * r);
        }
    }
    ScalarField::from_values(width, height, values)
}
