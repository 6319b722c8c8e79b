//! Top-level orchestration: wires the colour conversion, per-channel differencing,
//! transition tracking, and pattern detection stages together into one per-frame call.

use std::collections::BTreeSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::colour::ColourTable;
use crate::config::Config;
use crate::diff::FrameDifferencer;
use crate::error::{FrameGeometryMismatchSnafu, FrameWarning, Result};
use crate::frame::Frame;
use crate::luminance;
use crate::pattern::{PatternDetector, PatternResult};
use crate::redsat;
use crate::tracker::{FlashResult, IncidentTotals, TransitionTracker, VerdictFlags};

#[cfg(test)]
mod tests;

/// Per-frame measurements and verdicts produced by [`Analyser::analyse_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// 0-indexed position of this frame within the stream.
    pub frame_index: u32,
    /// Presentation timestamp, in milliseconds, as reported by the decoder.
    pub timestamp_ms: u64,

    /// Mean luminance over the whole frame.
    pub luminance_mean: f32,
    /// Mean red-saturation metric over the whole frame.
    pub red_mean: f32,
    /// Fraction of the frame that changed from the previous frame, luminance channel.
    pub luminance_flash_area_percent: f32,
    /// Fraction of the frame that changed from the previous frame, red channel.
    pub red_flash_area_percent: f32,
    /// This frame's safe-area-gated signed mean difference, luminance channel.
    pub luminance_diff: f32,
    /// This frame's safe-area-gated signed mean difference, red channel.
    pub red_diff: f32,
    /// Sign-coherent accumulated signed diff, luminance channel.
    pub luminance_accumulator: f32,
    /// Sign-coherent accumulated signed diff, red channel.
    pub red_accumulator: f32,

    /// Count of transitions currently inside the 1-second window, luminance channel.
    pub luminance_transitions: u32,
    /// Count of transitions currently inside the 1-second window, red channel.
    pub red_transitions: u32,
    /// Count of near-threshold frames currently inside the 5-second window, luminance
    /// channel.
    pub luminance_extended_fail_count: u32,
    /// Count of near-threshold frames currently inside the 5-second window, red
    /// channel.
    pub red_extended_fail_count: u32,
    /// Per-frame verdict, luminance channel.
    pub luminance_result: FlashResult,
    /// Per-frame verdict, red channel.
    pub red_result: FlashResult,

    /// Fraction of the (downscaled) frame area occupied by the candidate pattern
    /// region, if the pattern detector ran.
    pub pattern_area_percent: f32,
    /// Number of similar-shaped components making up the candidate pattern region.
    pub pattern_detected_lines: u32,
    /// Per-frame pattern verdict, if the pattern detector is enabled.
    pub pattern_result: Option<PatternResult>,

    /// A per-frame anomaly recovered from locally, if one occurred on this frame.
    pub warning: Option<FrameWarning>,
}

/// Stream-level verdict, the roll-up of every channel's cumulative flags and the
/// pattern detector's cumulative state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallResult {
    /// No channel ever reached `PassWithWarning`, `ExtendedFail`, or `FlashFail`, and
    /// the pattern detector never failed.
    Pass,
    /// At least one channel reached `PassWithWarning`, but no channel failed and the
    /// pattern detector never failed.
    PassWithWarning,
    /// At least one channel reached `FlashFail` or `ExtendedFail`, or the pattern
    /// detector failed at least once.
    Fail,
}

/// One specific reason the stream's [`OverallResult`] is not a plain `Pass`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FailureKind {
    /// The luminance channel reached `FlashFail` at least once.
    LuminanceFlashFailure,
    /// The red-saturation channel reached `FlashFail` at least once.
    RedFlashFailure,
    /// The luminance channel reached `ExtendedFail` at least once.
    LuminanceExtendedFlashFailure,
    /// The red-saturation channel reached `ExtendedFail` at least once.
    RedExtendedFlashFailure,
    /// The pattern detector scored `Fail` at least once.
    PatternFailure,
}

/// Stream-level summary returned by [`Analyser::finalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Total number of frames observed.
    pub total_frames: u32,
    /// Length of the stream, in milliseconds, from the first to the last observed
    /// timestamp.
    pub video_length_ms: u64,
    /// Wall-clock time spent analysing the stream, in milliseconds.
    pub analysis_time_ms: u64,

    /// Cumulative verdict flags, luminance channel.
    pub luminance_flags: VerdictFlags,
    /// Cumulative verdict flags, red channel.
    pub red_flags: VerdictFlags,
    /// Cumulative incident totals, luminance channel.
    pub luminance_incidents: IncidentTotals,
    /// Cumulative incident totals, red channel.
    pub red_incidents: IncidentTotals,

    /// Total frames the pattern detector scored `Fail`.
    pub pattern_fail_frames: u32,
    /// Whether the pattern detector ever scored a frame `Fail`.
    pub pattern_ever_failed: bool,

    /// The stream's overall verdict.
    pub overall_result: OverallResult,
    /// The specific failure kinds contributing to `overall_result`, empty unless
    /// `overall_result` is `Fail`.
    pub results: BTreeSet<FailureKind>,
}

/// Orchestrates the full per-frame analysis pipeline for one stream.
#[derive(Debug)]
pub struct Analyser {
    width: u32,
    height: u32,
    colour_table: ColourTable,
    luminance_differencer: FrameDifferencer,
    red_differencer: FrameDifferencer,
    tracker: TransitionTracker,
    pattern_detector: Option<PatternDetector>,
    frames_seen: u32,
    first_timestamp_ms: Option<u64>,
    last_timestamp_ms: u64,
    start_time: Instant,
}

impl Analyser {
    /// Validates `config` and constructs an analyser for a stream of `width` by
    /// `height` frames at nominal `fps`.
    pub fn new(config: &Config, fps: u32, width: u32, height: u32) -> Result<Self> {
        let config = config.validated()?;

        let pattern_detector = config
            .pattern
            .enabled
            .then(|| PatternDetector::new(&config.pattern, fps, width, height));

        Ok(Analyser {
            width,
            height,
            colour_table: ColourTable::new(),
            luminance_differencer: FrameDifferencer::new(
                config.luminance.flash_threshold,
                config.luminance.dark_threshold,
                config.luminance.dark_gate_enabled,
                config.flash_area_proportion,
                fps,
            ),
            red_differencer: FrameDifferencer::new(
                config.red.flash_threshold,
                config.red.dark_threshold,
                config.red.dark_gate_enabled,
                config.flash_area_proportion,
                fps,
            ),
            tracker: TransitionTracker::new(&config.transitions, fps),
            pattern_detector,
            frames_seen: 0,
            first_timestamp_ms: None,
            last_timestamp_ms: 0,
            start_time: Instant::now(),
        })
    }

    /// Runs the full pipeline on one new frame.
    ///
    /// The first frame observed establishes the baseline for differencing and produces
    /// no transitions; its [`FrameRecord`] reports zeroed transition fields.
    pub fn analyse_frame(&mut self, frame: &Frame) -> Result<FrameRecord> {
        if frame.width != self.width || frame.height != self.height {
            FrameGeometryMismatchSnafu {
                frame_index: frame.index,
                width: frame.width,
                height: frame.height,
                expected_width: self.width,
                expected_height: self.height,
            }
            .fail()?;
        }

        self.frames_seen += 1;
        self.first_timestamp_ms.get_or_insert(frame.timestamp_ms);
        self.last_timestamp_ms = frame.timestamp_ms;

        let srgb = self.colour_table.convert(frame);
        let luminance_field = luminance::compute(&srgb);
        let red_field = redsat::compute(&srgb);
        let luminance_field_for_pattern = luminance_field.clone();

        let luminance_observation = self.luminance_differencer.observe(luminance_field);
        let red_observation = self.red_differencer.observe(red_field);

        let mut warning = self.tracker.on_frame_arrival(frame.timestamp_ms);

        let tracker_outcome = match (luminance_observation, red_observation) {
            (Some(l), Some(r)) => Some(self.tracker.observe_transitions(l.is_transition, r.is_transition)),
            _ => None,
        };

        // The pattern detector runs on every frame, including the first: it has no
        // baseline-frame concept of its own, unlike the per-channel differencers above.
        let (pattern_area_percent, pattern_detected_lines, pattern_result) =
            if let Some(detector) = &mut self.pattern_detector {
                let (observables, pattern_warning) = detector.detect(&luminance_field_for_pattern);
                warning = warning.or(pattern_warning);
                (observables.pattern_area_percent, observables.pattern_detected_lines, Some(observables.result))
            } else {
                (0.0, 0, None)
            };

        let (luminance_observation, red_observation, tracker_outcome) =
            match (luminance_observation, red_observation, tracker_outcome) {
                (Some(l), Some(r), Some(outcome)) => (l, r, outcome),
                _ => {
                    return Ok(FrameRecord {
                        frame_index: frame.index,
                        timestamp_ms: frame.timestamp_ms,
                        luminance_mean: self.luminance_differencer.current_mean(),
                        red_mean: self.red_differencer.current_mean(),
                        luminance_flash_area_percent: 0.0,
                        red_flash_area_percent: 0.0,
                        luminance_diff: 0.0,
                        red_diff: 0.0,
                        luminance_accumulator: 0.0,
                        red_accumulator: 0.0,
                        luminance_transitions: 0,
                        red_transitions: 0,
                        luminance_extended_fail_count: 0,
                        red_extended_fail_count: 0,
                        luminance_result: FlashResult::Pass,
                        red_result: FlashResult::Pass,
                        pattern_area_percent,
                        pattern_detected_lines,
                        pattern_result,
                        warning,
                    });
                }
            };

        Ok(FrameRecord {
            frame_index: frame.index,
            timestamp_ms: frame.timestamp_ms,
            luminance_mean: self.luminance_differencer.current_mean(),
            red_mean: self.red_differencer.current_mean(),
            luminance_flash_area_percent: luminance_observation.flash_area_proportion,
            red_flash_area_percent: red_observation.flash_area_proportion,
            luminance_diff: luminance_observation.signed_diff,
            red_diff: red_observation.signed_diff,
            luminance_accumulator: luminance_observation.accumulator,
            red_accumulator: red_observation.accumulator,
            luminance_transitions: tracker_outcome.luminance_transitions,
            red_transitions: tracker_outcome.red_transitions,
            luminance_extended_fail_count: tracker_outcome.luminance_extended_fail_count,
            red_extended_fail_count: tracker_outcome.red_extended_fail_count,
            luminance_result: tracker_outcome.luminance_result,
            red_result: tracker_outcome.red_result,
            pattern_area_percent,
            pattern_detected_lines,
            pattern_result,
            warning,
        })
    }

    /// Summarises the stream observed so far.
    pub fn finalize(&mut self) -> AnalysisResult {
        let luminance_flags = self.tracker.luminance_flags();
        let red_flags = self.tracker.red_flags();
        let pattern_fail_frames = self.pattern_detector.as_ref().map_or(0, |p| p.fail_frame_count());
        let pattern_ever_failed = self.pattern_detector.as_ref().is_some_and(|p| p.ever_failed());

        let mut results = BTreeSet::new();
        if luminance_flags.flash_fail {
            results.insert(FailureKind::LuminanceFlashFailure);
        }
        if red_flags.flash_fail {
            results.insert(FailureKind::RedFlashFailure);
        }
        if luminance_flags.extended_fail {
            results.insert(FailureKind::LuminanceExtendedFlashFailure);
        }
        if red_flags.extended_fail {
            results.insert(FailureKind::RedExtendedFlashFailure);
        }
        if pattern_ever_failed {
            results.insert(FailureKind::PatternFailure);
        }

        let overall_result = if !results.is_empty() {
            OverallResult::Fail
        } else if luminance_flags.pass_with_warning || red_flags.pass_with_warning {
            OverallResult::PassWithWarning
        } else {
            OverallResult::Pass
        };

        AnalysisResult {
            total_frames: self.frames_seen,
            video_length_ms: self.last_timestamp_ms.saturating_sub(self.first_timestamp_ms.unwrap_or(0)),
            analysis_time_ms: self.start_time.elapsed().as_millis() as u64,
            luminance_flags,
            red_flags,
            luminance_incidents: self.tracker.luminance_incidents(),
            red_incidents: self.tracker.red_incidents(),
            pattern_fail_frames,
            pattern_ever_failed,
            overall_result,
            results,
        }
    }
}
