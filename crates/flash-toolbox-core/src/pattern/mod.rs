//! The spatial pattern detector: a frequency-domain sweep for periodic content,
//! followed by a contour/shape pass that reconstructs the candidate pattern region,
//! and a temporal persistence gate before a frame is scored a failure.

use serde::{Deserialize, Serialize};

use crate::config::PatternConfig;
use crate::error::FrameWarning;
use crate::field::ScalarField;
use crate::tracker::TransitionCounter;

mod contour;
mod fft;

#[cfg(test)]
mod tests;

/// Minimum contour area, as a fraction of the downscaled frame area, to survive the
/// contour pass.
const CONTOUR_MIN_AREA_FRACTION: f32 = 0.00155;

/// Minimum fraction of pixels that must survive the FFT-reconstruction difference
/// pass for the frame to be worth a contour pass at all.
const DIFF_THRESHOLD_AREA_FRACTION: f32 = 0.10;

/// Binary threshold applied to the reconstruction-vs-original difference image.
const DIFF_BINARY_THRESHOLD: u8 = 50;

/// Radius, in (shifted) frequency-domain pixels, of the disk excluded from peak
/// detection around the DC component.
const DC_MASK_RADIUS: i32 = 5;

/// Height, in pixels, at or above which the luminance field is downscaled by half
/// before analysis.
const DOWNSCALE_HEIGHT_THRESHOLD: u32 = 480;

/// Per-frame verdict of the pattern detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternResult {
    /// No harmful stripe pattern detected, or the persistence window has not yet
    /// filled.
    Pass,
    /// A harmful stripe pattern persisted for at least the configured time threshold.
    Fail,
}

/// Per-frame measurements produced by [`PatternDetector::detect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternFrameObservables {
    /// Fraction of the downscaled frame area occupied by the candidate pattern
    /// region.
    pub pattern_area_percent: f32,
    /// Number of similar-shaped components making up the candidate pattern region.
    pub pattern_detected_lines: u32,
    /// This frame's pattern verdict.
    pub result: PatternResult,
}

/// Detects spatially repetitive, high-contrast stripe patterns in the luminance
/// channel, enforcing a temporal persistence requirement before failing.
#[derive(Debug)]
pub struct PatternDetector {
    min_stripes: u32,
    dark_luminance_threshold: f32,
    downscaled_width: usize,
    downscaled_height: usize,
    safe_area_px: f32,
    contour_min_px: f32,
    diff_threshold_px: f32,
    persistence_frames: u32,
    streak: TransitionCounter,
    fail_frame_count: u32,
    ever_failed: bool,
}

impl PatternDetector {
    /// Creates a detector sized for a stream of `stream_width` by `stream_height`
    /// frames at `fps`.
    pub fn new(config: &PatternConfig, fps: u32, stream_width: u32, stream_height: u32) -> Self {
        let scale = if stream_height >= DOWNSCALE_HEIGHT_THRESHOLD { 0.5 } else { 1.0 };
        let downscaled_width = ((stream_width as f32 * scale) as usize).max(1);
        let downscaled_height = ((stream_height as f32 * scale) as usize).max(1);
        let downscaled_area = (downscaled_width * downscaled_height) as f32;

        PatternDetector {
            min_stripes: config.min_stripes,
            dark_luminance_threshold: config.dark_luminance_threshold,
            downscaled_width,
            downscaled_height,
            safe_area_px: downscaled_area * config.area_proportion,
            contour_min_px: downscaled_area * CONTOUR_MIN_AREA_FRACTION,
            diff_threshold_px: downscaled_area * DIFF_THRESHOLD_AREA_FRACTION,
            persistence_frames: (config.time_threshold_seconds * fps as f32).round().max(1.0) as u32,
            streak: TransitionCounter::default(),
            fail_frame_count: 0,
            ever_failed: false,
        }
    }

    fn downscale(&self, field: &ScalarField) -> ScalarField {
        if field.width() == self.downscaled_width && field.height() == self.downscaled_height {
            return field.clone();
        }
        let x_ratio = field.width() as f32 / self.downscaled_width as f32;
        let y_ratio = field.height() as f32 / self.downscaled_height as f32;
        let mut values = Vec::with_capacity(self.downscaled_width * self.downscaled_height);
        for y in 0..self.downscaled_height {
            let src_y = ((y as f32 * y_ratio) as usize).min(field.height() - 1);
            for x in 0..self.downscaled_width {
                let src_x = ((x as f32 * x_ratio) as usize).min(field.width() - 1);
                values.push(field.get(src_x, src_y));
            }
        }
        ScalarField::from_values(self.downscaled_width, self.downscaled_height, values)
    }

    /// Runs the full detection pipeline on one frame's luminance field.
    pub fn detect(&mut self, luminance: &ScalarField) -> (PatternFrameObservables, Option<FrameWarning>) {
        let downscaled = self.downscale(luminance);
        let width = self.downscaled_width;
        let height = self.downscaled_height;

        let (normalised, _min, _max) = fft::normalise_to_u8(&downscaled);
        let (magnitude, phase) = fft::forward_dft_2d(&normalised, width, height);

        let magnitude_field = ScalarField::from_values(width, height, magnitude.clone());
        let (magnitude_bytes, _, _) = fft::normalise_to_u8(&magnitude_field);
        let psd: Vec<f32> = magnitude_bytes
            .iter()
            .map(|&b| {
                let normalised = b as f32 / 255.0;
                (1.0 + (1.0 - normalised).powi(2)).ln()
            })
            .collect();

        // Shift the DC component to the centre so the exclusion disk and peak search
        // match the conventional power-spectrum layout, then shift the resulting peak
        // mask back before applying it to the (unshifted) magnitude array.
        let mut shifted_psd = psd;
        fft::fft_shift(&mut shifted_psd, width, height);
        let shifted_psd_bytes = to_u8(&shifted_psd);
        let threshold = fft::otsu_threshold(&shifted_psd_bytes);
        let mut peak_mask: Vec<bool> = shifted_psd_bytes.iter().map(|&v| v > threshold).collect();
        fft::mask_disk_at_centre(&mut peak_mask, width, height, DC_MASK_RADIUS);

        let mut unshifted_mask: Vec<f32> =
            peak_mask.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect();
        fft::fft_shift(&mut unshifted_mask, width, height);

        let mut filtered_magnitude = magnitude;
        for (value, &is_peak) in filtered_magnitude.iter_mut().zip(&unshifted_mask) {
            if is_peak > 0.5 {
                *value = 0.0;
            }
        }

        let reconstructed = fft::inverse_dft_2d(&filtered_magnitude, &phase, width, height);

        let diff_count = normalised
            .iter()
            .zip(&reconstructed)
            .filter(|(&a, &b)| (a as i32 - b as i32).unsigned_abs() > DIFF_BINARY_THRESHOLD as u32)
            .count();

        if (diff_count as f32) < self.diff_threshold_px {
            return (self.push_observation(false, 0.0, 0), None);
        }

        let binary_mask: Vec<bool> = normalised
            .iter()
            .zip(&reconstructed)
            .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs() as u8 > DIFF_BINARY_THRESHOLD)
            .collect();

        let mut components = contour::find_components(&binary_mask, width, height);
        components.retain(|c| c.area as f32 > self.contour_min_px);

        if components.is_empty() {
            // Degenerate input: nothing survived the contour pass. Recovered locally
            // without touching the persistence streak.
            return (
                PatternFrameObservables {
                    pattern_area_percent: 0.0,
                    pattern_detected_lines: 0,
                    result: PatternResult::Pass,
                },
                Some(FrameWarning::PatternPipelineSkipped),
            );
        }

        let selected = contour::select_pattern_components(&components);
        let rect_area = union_bounding_rect_area(&selected);
        let component_count = selected.len() as u32;
        let mean_light_luminance = mean_light_luminance(&normalised, width, &selected);

        let harmful = rect_area as f32 >= self.safe_area_px
            && component_count >= self.min_stripes
            && mean_light_luminance >= self.dark_luminance_threshold;

        let area_percent = rect_area as f32 / (width * height) as f32;
        (self.push_observation(harmful, area_percent, component_count), None)
    }

    fn push_observation(
        &mut self,
        harmful: bool,
        pattern_area_percent: f32,
        pattern_detected_lines: u32,
    ) -> PatternFrameObservables {
        self.streak.push(harmful);
        if self.streak.len() as u32 >= self.persistence_frames {
            self.streak.age_out(1);
        }
        let result = if self.streak.current() >= self.persistence_frames {
            self.fail_frame_count += 1;
            self.ever_failed = true;
            PatternResult::Fail
        } else {
            PatternResult::Pass
        };
        PatternFrameObservables { pattern_area_percent, pattern_detected_lines, result }
    }

    /// Total frames scored `Fail` so far.
    pub fn fail_frame_count(&self) -> u32 {
        self.fail_frame_count
    }

    /// Whether any frame has ever been scored `Fail`.
    pub fn ever_failed(&self) -> bool {
        self.ever_failed
    }
}

fn union_bounding_rect_area(components: &[&contour::Component]) -> usize {
    let mut min_x = usize::MAX;
    let mut min_y = usize::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for component in components {
        for &(x, y) in &component.pixels {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if min_x > max_x || min_y > max_y {
        0
    } else {
        (max_x - min_x + 1) * (max_y - min_y + 1)
    }
}

fn mean_light_luminance(normalised: &[u8], width: usize, components: &[&contour::Component]) -> f32 {
    let mut pixels: Vec<u8> = Vec::new();
    for component in components {
        for &(x, y) in &component.pixels {
            pixels.push(normalised[y * width + x]);
        }
    }
    if pixels.is_empty() {
        return 0.0;
    }
    let threshold = fft::otsu_threshold(&pixels);
    let light: Vec<f32> =
        pixels.iter().filter(|&&p| p > threshold).map(|&p| p as f32 / 255.0).collect();
    if light.is_empty() {
        0.0
    } else {
        light.iter().sum::<f32>() / light.len() as f32
    }
}

fn to_u8(values: &[f32]) -> Vec<u8> {
    values.iter().map(|&v| v.clamp(0.0, 255.0) as u8).collect()
}
