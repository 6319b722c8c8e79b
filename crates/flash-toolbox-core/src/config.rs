//! Stream-scoped configuration for the analysis pipeline.
//!
//! A [`Config`] is validated once, at construction of the [`crate::analyser::Analyser`],
//! using [`garde::Validate`]; a failing validation becomes
//! [`crate::error::InnerError::InvalidConfiguration`].

use garde::Validate;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{InvalidConfigurationSnafu, Result};

#[cfg(test)]
mod tests;

/// Per-channel flash-detection thresholds, shared between the luminance and
/// red-saturation channels.
#[derive(Debug, Clone, Copy, PartialEq, Validate, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Threshold on the sign-coherent accumulated signed-diff above which a frame is
    /// considered to be part of a transition.
    #[garde(custom(is_finite_nonnegative))]
    pub flash_threshold: f32,

    /// Darker-mean gate: a transition is suppressed unless `min(previous_mean,
    /// current_mean)` is below this value.
    #[garde(custom(is_finite))]
    pub dark_threshold: f32,

    /// Whether the darker-mean gate above is applied to this channel at all.
    ///
    /// The corpus this crate's analysis is modelled on is inconsistent about whether
    /// the gate applies to the red-saturation channel, so it is exposed here instead of
    /// hard-coded.
    #[garde(skip)]
    pub dark_gate_enabled: bool,
}

/// Configuration for the transition tracker's sliding-window evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Validate, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Strictly-exceeding this many transitions in the 1-second window triggers
    /// `FlashFail`.
    #[garde(custom(check_order(&self)))]
    pub max_transitions: u32,

    /// A window count at or above this value is eligible for `ExtendedFail`.
    #[garde(custom(check_order(&self)))]
    pub min_transitions: u32,

    /// A window count at or above this value, but below [`Self::max_transitions`],
    /// produces `PassWithWarning`.
    #[garde(custom(check_order(&self)))]
    pub warning_transitions: u32,

    /// Length, in seconds, of the `W4` window used in the extended-failure
    /// calculation. Typically `4`.
    #[garde(custom(is_finite_positive))]
    pub extended_fail_seconds: f32,

    /// Length, in seconds, of the `W5` window used in the extended-failure
    /// calculation. Typically `5`.
    #[garde(custom(is_finite_positive))]
    pub extended_fail_window_seconds: f32,

    /// `false` selects frame-count windowing (fixed FPS); `true` selects
    /// wall-clock-timestamp windowing (variable / real-time streams).
    #[garde(skip)]
    pub analyse_by_time: bool,
}

/// `min_transitions <= warning_transitions <= max_transitions` must hold across the
/// whole struct, so each of the three fields is checked against the struct as a whole.
fn check_order(config: &TransitionConfig) -> impl FnOnce(&u32, &()) -> garde::Result + '_ {
    move |_value, _ctx| {
        if config.min_transitions <= config.warning_transitions
            && config.warning_transitions <= config.max_transitions
        {
            Ok(())
        } else {
            Err(garde::Error::new(format!(
                "transition thresholds must satisfy min ({}) <= warning ({}) <= max ({})",
                config.min_transitions, config.warning_transitions, config.max_transitions
            )))
        }
    }
}

/// Configuration for the spatial-pattern detector.
#[derive(Debug, Clone, Copy, PartialEq, Validate, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Whether the pattern detector runs at all.
    #[garde(skip)]
    pub enabled: bool,

    /// Minimum number of similar-shaped components for a detected region to count as a
    /// harmful stripe pattern.
    #[garde(range(min = 1))]
    pub min_stripes: u32,

    /// Normalised luminance threshold below which a pattern component is not
    /// considered bright enough to be harmful.
    #[garde(custom(is_finite))]
    pub dark_luminance_threshold: f32,

    /// Consecutive seconds of harmful frames required before `PatternFailure` is
    /// raised.
    #[garde(custom(is_finite_nonnegative))]
    pub time_threshold_seconds: f32,

    /// Minimum fraction of the (downscaled) frame area the detected pattern region must
    /// occupy.
    #[garde(custom(is_finite_positive_at_most_one))]
    pub area_proportion: f32,
}

/// Pre-analysis frame downscaling.
#[derive(Debug, Clone, Copy, PartialEq, Validate, Serialize, Deserialize)]
pub struct FrameResizeConfig {
    /// Whether incoming frames are downscaled before analysis.
    #[garde(skip)]
    pub enabled: bool,

    /// Downscale factor applied to both width and height when enabled.
    #[garde(range(min = 0.0, max = 1.0))]
    pub proportion: f32,
}

/// Top-level, validated configuration for one analysis stream.
#[derive(Debug, Clone, Copy, PartialEq, Validate, Serialize, Deserialize)]
pub struct Config {
    /// Luminance-channel thresholds.
    #[garde(dive)]
    pub luminance: ChannelConfig,

    /// Red-saturation-channel thresholds.
    #[garde(dive)]
    pub red: ChannelConfig,

    /// Minimum changed-pixel fraction, of the total frame area, to count a frame
    /// difference as non-zero for the purposes of the safe-area gate.
    #[garde(custom(is_finite_positive_at_most_one))]
    pub flash_area_proportion: f32,

    /// Transition tracker configuration.
    #[garde(dive)]
    pub transitions: TransitionConfig,

    /// Pattern detector configuration.
    #[garde(dive)]
    pub pattern: PatternConfig,

    /// Pre-analysis frame resize.
    #[garde(dive)]
    pub frame_resize: FrameResizeConfig,
}

impl Config {
    /// Validates the configuration, returning a [`crate::error::Error`] wrapping a
    /// [`garde::Report`] if any constraint fails.
    pub(crate) fn validated(self) -> Result<Self> {
        self.validate().context(InvalidConfigurationSnafu)?;
        Ok(self)
    }
}

impl Default for Config {
    /// Typical thresholds drawn from the corpus this analysis is modelled on.
    fn default() -> Self {
        Config {
            luminance: ChannelConfig {
                flash_threshold: 0.1,
                dark_threshold: 0.8,
                dark_gate_enabled: true,
            },
            red: ChannelConfig { flash_threshold: 20.0, dark_threshold: 0.8, dark_gate_enabled: false },
            flash_area_proportion: 0.25,
            transitions: TransitionConfig {
                max_transitions: 6,
                min_transitions: 4,
                warning_transitions: 4,
                extended_fail_seconds: 4.0,
                extended_fail_window_seconds: 5.0,
                analyse_by_time: false,
            },
            pattern: PatternConfig {
                enabled: true,
                min_stripes: 5,
                dark_luminance_threshold: 0.25,
                time_threshold_seconds: 1.0,
                area_proportion: 0.25,
            },
            frame_resize: FrameResizeConfig { enabled: false, proportion: 1.0 },
        }
    }
}

fn is_finite(value: &f32, _ctx: &()) -> garde::Result {
    if value.is_finite() {
        Ok(())
    } else {
        Err(garde::Error::new("value must be finite"))
    }
}

fn is_finite_nonnegative(value: &f32, _ctx: &()) -> garde::Result {
    if value.is_finite() && *value >= 0.0 {
        Ok(())
    } else {
        Err(garde::Error::new("value must be finite and non-negative"))
    }
}

fn is_finite_positive(value: &f32, _ctx: &()) -> garde::Result {
    if value.is_finite() && *value > 0.0 {
        Ok(())
    } else {
        Err(garde::Error::new("value must be finite and positive"))
    }
}

fn is_finite_positive_at_most_one(value: &f32, _ctx: &()) -> garde::Result {
    if value.is_finite() && *value > 0.0 && *value <= 1.0 {
        Ok(())
    } else {
        Err(garde::Error::new("value must be in (0, 1]"))
    }
}
