//! Frequency-domain helpers used by the pattern detector: min/max normalisation,
//! a naive row-then-column 2D DFT/IDFT built on [`rustfft`], Otsu thresholding, and
//! the disk mask applied around the DC component.

use rustfft::num_complex::Complex32;
use rustfft::FftPlanner;

use crate::field::ScalarField;

/// Normalises a scalar field into an 8-bit image using min/max scaling.
///
/// Returns the normalised bytes in row-major order, plus the minimum and maximum
/// values used for the scaling (useful for inverting the normalisation later).
pub(crate) fn normalise_to_u8(field: &ScalarField) -> (Vec<u8>, f32, f32) {
    let min = field.iter().copied().fold(f32::INFINITY, f32::min);
    let max = field.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    let bytes = field
        .iter()
        .map(|&v| {
            if range <= 0.0 {
                0u8
            } else {
                (((v - min) / range) * 255.0).round().clamp(0.0, 255.0) as u8
            }
        })
        .collect();
    (bytes, min, max)
}

/// Runs a 2D forward DFT (rows, then columns) over an 8-bit image, returning
/// `(magnitude, phase)` arrays in row-major order.
pub(crate) fn forward_dft_2d(image: &[u8], width: usize, height: usize) -> (Vec<f32>, Vec<f32>) {
    let mut buffer: Vec<Complex32> =
        image.iter().map(|&v| Complex32::new(v as f32, 0.0)).collect();
    transform_rows_then_columns(&mut buffer, width, height, false);

    let magnitude = buffer.iter().map(|c| c.norm()).collect();
    let phase = buffer.iter().map(|c| c.arg()).collect();
    (magnitude, phase)
}

/// Runs a 2D inverse DFT given a magnitude/phase pair, returning a min/max-normalised
/// 8-bit image.
pub(crate) fn inverse_dft_2d(
    magnitude: &[f32],
    phase: &[f32],
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut buffer: Vec<Complex32> = magnitude
        .iter()
        .zip(phase)
        .map(|(&m, &p)| Complex32::from_polar(m, p))
        .collect();
    transform_rows_then_columns(&mut buffer, width, height, true);

    let total = (width * height) as f32;
    let real: Vec<f32> = buffer.iter().map(|c| c.re / total).collect();
    let field = ScalarField::from_values(width, height, real);
    normalise_to_u8(&field).0
}

fn transform_rows_then_columns(buffer: &mut [Complex32], width: usize, height: usize, inverse: bool) {
    let mut planner = FftPlanner::new();
    let row_fft = if inverse { planner.plan_fft_inverse(width) } else { planner.plan_fft_forward(width) };
    for row in buffer.chunks_mut(width) {
        row_fft.process(row);
    }

    let col_fft =
        if inverse { planner.plan_fft_inverse(height) } else { planner.plan_fft_forward(height) };
    let mut column = vec![Complex32::new(0.0, 0.0); height];
    for x in 0..width {
        for (y, slot) in column.iter_mut().enumerate() {
            *slot = buffer[y * width + x];
        }
        col_fft.process(&mut column);
        for (y, value) in column.iter().enumerate() {
            buffer[y * width + x] = *value;
        }
    }
}

/// Swaps quadrants so the DC component lands at the centre of the image, matching the
/// conventional visualisation of a power spectrum.
pub(crate) fn fft_shift(data: &mut [f32], width: usize, height: usize) {
    let half_w = width / 2;
    let half_h = height / 2;
    let mut shifted = vec![0.0; data.len()];
    for y in 0..height {
        for x in 0..width {
            let new_x = (x + half_w) % width;
            let new_y = (y + half_h) % height;
            shifted[new_y * width + new_x] = data[y * width + x];
        }
    }
    data.copy_from_slice(&shifted);
}

/// Otsu's method: picks the grey-level threshold that minimises intra-class variance.
pub(crate) fn otsu_threshold(image: &[u8]) -> u8 {
    let mut histogram = [0u32; 256];
    for &v in image {
        histogram[v as usize] += 1;
    }
    let total = image.len() as f64;
    if total == 0.0 {
        return 0;
    }

    let sum_all: f64 = histogram.iter().enumerate().map(|(i, &c)| i as f64 * c as f64).sum();
    let mut sum_background = 0.0;
    let mut weight_background = 0.0;
    let mut best_threshold = 0u8;
    let mut best_variance = 0.0;

    for (threshold, &count) in histogram.iter().enumerate() {
        weight_background += count as f64;
        if weight_background == 0.0 {
            continue;
        }
        let weight_foreground = total - weight_background;
        if weight_foreground <= 0.0 {
            break;
        }

        sum_background += threshold as f64 * count as f64;
        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_all - sum_background) / weight_foreground;

        let between_class_variance = weight_background
            * weight_foreground
            * (mean_background - mean_foreground).powi(2);
        if between_class_variance > best_variance {
            best_variance = between_class_variance;
            best_threshold = threshold as u8;
        }
    }
    best_threshold
}

/// Masks out a disk of the given radius around the image centre, in place.
pub(crate) fn mask_disk_at_centre(mask: &mut [bool], width: usize, height: usize, radius: i32) {
    let (cx, cy) = (width as i32 / 2, height as i32 / 2);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if (x - cx).pow(2) + (y - cy).pow(2) <= radius.pow(2) {
                mask[(y as usize) * width + x as usize] = false;
            }
        }
    }
}
