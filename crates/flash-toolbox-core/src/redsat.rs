//! Per-pixel red-saturation metric.

use crate::field::ScalarField;
use crate::frame::SrgbFrame;

#[cfg(test)]
mod tests;

/// Minimum fraction of `r / (r + g + b)` for a pixel to be considered red-saturated.
const RED_FRACTION_THRESHOLD: f32 = 0.8;

/// Scaling factor applied to the red-saturation coefficient.
const RED_COEFFICIENT_SCALE: f32 = 320.0;

/// Computes the per-pixel red-saturation field of an sRGB frame.
///
/// Every output value is non-negative; there are no failure modes.
pub fn compute(frame: &SrgbFrame) -> ScalarField {
    let (width, height) = (frame.width() as usize, frame.height() as usize);
    let mut values = Vec::with_capacity(width * height);
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let (b, g, r) = frame.bgr_at(x, y);
            let total = r + g + b;
            let red_coef = if total > 0.0 && r / total >= RED_FRACTION_THRESHOLD {
                (r - g - b) * RED_COEFFICIENT_SCALE
            } else {
                0.0
            };
            values.push(red_coef.max(0.0));
        }
    }
    ScalarField::from_values(width, height, values)
}
