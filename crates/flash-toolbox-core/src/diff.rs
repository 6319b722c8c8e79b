//! Frame-to-frame differencing, the safe-area gate, and sign-coherent transition
//! detection — run once per channel (luminance, red-saturation).

use std::collections::VecDeque;

use crate::field::ScalarField;


/// The outcome of observing one new frame on a [`FrameDifferencer`], once a previous
/// frame is available to compare against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionObservation {
    /// Whether this frame is the frame at which a new transition is emitted.
    pub is_transition: bool,

    /// The signed mean difference after the safe-area gate, before accumulation.
    pub signed_diff: f32,

    /// The sign-coherent accumulated signed diff after incorporating this frame.
    pub accumulator: f32,

    /// Fraction of pixels that changed between the previous and current frame.
    pub flash_area_proportion: f32,
}

/// Tracks the previous/current frame pair for one channel and classifies
/// frame-to-frame changes into transition events.
///
/// See the module-level invariant: `accumulator` always equals the sum of
/// `rolling_window`'s entries while they share a sign; a sign flip clears the window
/// to the single new entry.
#[derive(Debug, Clone)]
pub struct FrameDifferencer {
    flash_threshold: f32,
    dark_threshold: f32,
    dark_gate_enabled: bool,
    area_proportion: f32,
    window_capacity: usize,
    previous_field: Option<ScalarField>,
    current_field: Option<ScalarField>,
    previous_mean: f32,
    current_mean: f32,
    accumulator: f32,
    rolling_window: VecDeque<f32>,
}

fn sign_matches(a: f32, b: f32) -> bool {
    a == 0.0 || b == 0.0 || a.signum() == b.signum()
}

impl FrameDifferencer {
    /// Creates a differencer for one channel.
    ///
    /// `fps` sets the rolling window's capacity: it holds up to one second's worth of
    /// per-step signed contributions.
    pub fn new(
        flash_threshold: f32,
        dark_threshold: f32,
        dark_gate_enabled: bool,
        area_proportion: f32,
        fps: u32,
    ) -> Self {
        FrameDifferencer {
            flash_threshold,
            dark_threshold,
            dark_gate_enabled,
            area_proportion,
            window_capacity: fps.max(1) as usize,
            previous_field: None,
            current_field: None,
            previous_mean: 0.0,
            current_mean: 0.0,
            accumulator: 0.0,
            rolling_window: VecDeque::new(),
        }
    }

    /// Rotates `current` into `previous` and installs `field` as the new `current`,
    /// updating the tracked per-frame means.
    pub fn set_current_frame(&mut self, field: ScalarField) {
        let mean = field.mean();
        self.previous_field = self.current_field.take();
        self.previous_mean = self.current_mean;
        self.current_mean = mean;
        self.current_field = Some(field);
    }

    /// The elementwise `current - previous` field, or `None` before a previous frame
    /// exists.
    pub fn frame_difference(&self) -> Option<ScalarField> {
        match (&self.previous_field, &self.current_field) {
            (Some(previous), Some(current)) => Some(current.difference(previous)),
            _ => None,
        }
    }

    /// Gates a frame difference by the fraction of the frame that actually changed,
    /// returning the signed mean difference if the safe-area threshold is met, or `0`
    /// otherwise.
    pub fn check_safe_area(&self, diff_field: &ScalarField) -> f32 {
        let total_pixels = diff_field.total_pixels();
        let variation = diff_field.count_nonzero();
        if total_pixels == 0 || (variation as f32) < total_pixels as f32 * self.area_proportion {
            0.0
        } else {
            self.current_mean - self.previous_mean
        }
    }

    /// Fraction of pixels that changed on the most recent [`Self::check_safe_area`]
    /// call's input.
    pub fn flash_area_proportion(&self, diff_field: &ScalarField) -> f32 {
        let total_pixels = diff_field.total_pixels();
        if total_pixels == 0 {
            0.0
        } else {
            diff_field.count_nonzero() as f32 / total_pixels as f32
        }
    }

    /// Folds a new gated signed diff into the rolling accumulator and classifies
    /// whether this frame is a new transition.
    pub fn check_transition(&mut self, signed_diff: f32) -> (bool, f32) {
        let last_accumulator = self.accumulator;
        let mut carried = last_accumulator;

        let combined = if sign_matches(signed_diff, last_accumulator) {
            if self.rolling_window.len() >= self.window_capacity {
                if let Some(oldest) = self.rolling_window.pop_front() {
                    carried -= oldest;
                }
            }
            self.rolling_window.push_back(signed_diff);
            signed_diff + carried
        } else {
            self.rolling_window.clear();
            self.rolling_window.push_back(signed_diff);
            signed_diff
        };

        let darker_mean = self.previous_mean.min(self.current_mean);
        let dark_gate_open = !self.dark_gate_enabled || darker_mean < self.dark_threshold;
        let already_crossed = sign_matches(last_accumulator, combined)
            && last_accumulator.abs() >= self.flash_threshold;

        let is_transition =
            combined.abs() >= self.flash_threshold && dark_gate_open && !already_crossed;

        self.accumulator = combined;
        (is_transition, combined)
    }

    /// Runs the full per-frame pipeline for a new field: rotates it in, and — once a
    /// previous frame exists — differences, gates, and classifies it.
    pub fn observe(&mut self, field: ScalarField) -> Option<TransitionObservation> {
        self.set_current_frame(field);
        let diff_field = self.frame_difference()?;
        let flash_area_proportion = self.flash_area_proportion(&diff_field);
        let signed_diff = self.check_safe_area(&diff_field);
        let (is_transition, accumulator) = self.check_transition(signed_diff);
        Some(TransitionObservation { is_transition, signed_diff, accumulator, flash_area_proportion })
    }

    /// The most recently observed per-frame mean.
    pub fn current_mean(&self) -> f32 {
        self.current_mean
    }

    /// The current sign-coherent accumulated signed diff.
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }
}
