//! The transition tracker: sliding-window evaluation of per-channel flash transitions
//! into per-frame verdicts and cumulative incident totals.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::TransitionConfig;
use crate::error::FrameWarning;
use crate::window::{
    FrameCountWindowManager, SlidingWindowManager, TimestampWindowManager, WindowHandle,
};

#[cfg(test)]
mod tests;

/// Per-frame verdict for one channel's transition activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashResult {
    /// No elevated transition activity in the current window.
    Pass,
    /// Transition activity at or above the warning threshold, but not failing.
    PassWithWarning,
    /// Sustained near-threshold transition activity over several seconds.
    ExtendedFail,
    /// More transitions in the 1-second window than the configured maximum.
    FlashFail,
}

/// Three monotonic flags recording whether a channel has ever reached each verdict
/// tier over the life of the stream. Once set, a flag is never cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictFlags {
    /// Whether the channel has ever been `PassWithWarning`.
    pub pass_with_warning: bool,
    /// Whether the channel has ever been `FlashFail`.
    pub flash_fail: bool,
    /// Whether the channel has ever been `ExtendedFail`.
    pub extended_fail: bool,
}

impl VerdictFlags {
    fn record(&mut self, result: FlashResult) {
        match result {
            FlashResult::Pass => {}
            FlashResult::PassWithWarning => self.pass_with_warning = true,
            FlashResult::FlashFail => self.flash_fail = true,
            FlashResult::ExtendedFail => self.extended_fail = true,
        }
    }
}

/// Cumulative per-channel frame counts at each verdict tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentTotals {
    /// Frames scored `PassWithWarning`.
    pub warning_frames: u32,
    /// Frames scored `ExtendedFail`.
    pub extended_fail_frames: u32,
    /// Frames scored `FlashFail`.
    pub flash_fail_frames: u32,
}

impl IncidentTotals {
    fn record(&mut self, result: FlashResult) {
        match result {
            FlashResult::Pass => {}
            FlashResult::PassWithWarning => self.warning_frames += 1,
            FlashResult::FlashFail => self.flash_fail_frames += 1,
            FlashResult::ExtendedFail => self.extended_fail_frames += 1,
        }
    }
}

/// A cumulative per-frame event count, aged by whole prefix chunks as the sliding
/// window reports frames leaving it.
///
/// `cumulative` holds one entry per frame observed, each the running total of `true`
/// events up to and including that frame; `passed` is the cumulative total as of the
/// oldest frame still excluded from the window. The window's current count is always
/// `cumulative.back() - passed`.
#[derive(Debug, Clone, Default)]
pub struct TransitionCounter {
    cumulative: VecDeque<u32>,
    passed: u32,
}

impl TransitionCounter {
    /// Advances `passed` to the cumulative value recorded `aged_out` frames ago,
    /// dropping those entries.
    pub fn age_out(&mut self, aged_out: u32) {
        for _ in 0..aged_out {
            match self.cumulative.pop_front() {
                Some(value) => self.passed = value,
                None => break,
            }
        }
    }

    /// Appends one frame's observation to the running total.
    pub fn push(&mut self, event: bool) {
        let back = self.cumulative.back().copied().unwrap_or(self.passed);
        self.cumulative.push_back(back + u32::from(event));
    }

    /// The number of events currently inside the window.
    pub fn current(&self) -> u32 {
        self.cumulative.back().copied().unwrap_or(self.passed) - self.passed
    }

    /// Clears all history, as happens on a window reset.
    pub fn reset(&mut self) {
        self.cumulative.clear();
        self.passed = 0;
    }

    /// Number of frames currently retained in the cumulative history.
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// Whether any frame has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }
}

/// Per-frame output of [`TransitionTracker::observe_transitions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerFrameOutcome {
    /// Luminance-channel verdict for this frame.
    pub luminance_result: FlashResult,
    /// Red-saturation-channel verdict for this frame.
    pub red_result: FlashResult,
    /// Luminance transitions currently inside the 1-second window (`W1`).
    pub luminance_transitions: u32,
    /// Red-saturation transitions currently inside the 1-second window (`W1`).
    pub red_transitions: u32,
    /// Luminance near-threshold frames currently inside the 5-second window (`W5`).
    pub luminance_extended_fail_count: u32,
    /// Red-saturation near-threshold frames currently inside the 5-second window
    /// (`W5`).
    pub red_extended_fail_count: u32,
}

/// Consumes per-frame `(luminance_transition, red_transition)` booleans and maintains
/// the 1-, 4-, and 5-second sliding-window counters that drive the per-frame and
/// cumulative flash verdicts.
#[derive(Debug)]
pub struct TransitionTracker {
    windows: Box<dyn SlidingWindowManager + Send>,
    w1: WindowHandle,
    w4: WindowHandle,
    w5: WindowHandle,
    lum_in_w1: TransitionCounter,
    red_in_w1: TransitionCounter,
    lum_in_w5: TransitionCounter,
    red_in_w5: TransitionCounter,
    lum_flags: VerdictFlags,
    red_flags: VerdictFlags,
    lum_incidents: IncidentTotals,
    red_incidents: IncidentTotals,
    max_transitions: u32,
    min_transitions: u32,
    warning_transitions: u32,
    analyse_by_time: bool,
    last_timestamp_ms: Option<u64>,
}

impl TransitionTracker {
    /// Creates a tracker for one stream. `fps` sizes the frame-count windowing
    /// strategy; `config` selects frame-count vs. timestamp windowing and carries the
    /// verdict thresholds.
    pub fn new(config: &TransitionConfig, fps: u32) -> Self {
        let mut windows: Box<dyn SlidingWindowManager + Send> = if config.analyse_by_time {
            Box::new(TimestampWindowManager::new())
        } else {
            Box::new(FrameCountWindowManager::new())
        };
        let w1 = windows.register_window(fps, 1.0);
        let w4 = windows.register_window(
            (fps as f32 * config.extended_fail_seconds) as u32,
            config.extended_fail_seconds,
        );
        let w5 = windows.register_window(
            (fps as f32 * config.extended_fail_window_seconds) as u32,
            config.extended_fail_window_seconds,
        );

        TransitionTracker {
            windows,
            w1,
            w4,
            w5,
            lum_in_w1: TransitionCounter::default(),
            red_in_w1: TransitionCounter::default(),
            lum_in_w5: TransitionCounter::default(),
            red_in_w5: TransitionCounter::default(),
            lum_flags: VerdictFlags::default(),
            red_flags: VerdictFlags::default(),
            lum_incidents: IncidentTotals::default(),
            red_incidents: IncidentTotals::default(),
            max_transitions: config.max_transitions,
            min_transitions: config.min_transitions,
            warning_transitions: config.warning_transitions,
            analyse_by_time: config.analyse_by_time,
            last_timestamp_ms: None,
        }
    }

    /// Notifies the tracker's sliding windows of a new frame's arrival, ageing out
    /// the window counters accordingly.
    ///
    /// In timestamp-windowed mode, a timestamp that fails to strictly increase resets
    /// the tracker's windows and counters, keeping only the new frame, and returns
    /// [`FrameWarning::NonMonotonicTimestamp`].
    pub fn on_frame_arrival(&mut self, timestamp_ms: u64) -> Option<FrameWarning> {
        self.windows.on_frame_arrival(timestamp_ms);

        let non_monotonic = self.analyse_by_time
            && self.last_timestamp_ms.is_some_and(|last| timestamp_ms <= last);
        if self.analyse_by_time {
            self.last_timestamp_ms = Some(timestamp_ms);
        }

        if non_monotonic {
            self.windows.reset(self.w1, true);
            self.windows.reset(self.w4, true);
            self.windows.reset(self.w5, true);
            self.lum_in_w1.reset();
            self.red_in_w1.reset();
            self.lum_in_w5.reset();
            self.red_in_w5.reset();
            return Some(FrameWarning::NonMonotonicTimestamp);
        }

        let aged_w1 = self.windows.aged_out(self.w1);
        let aged_w5 = self.windows.aged_out(self.w5);
        self.lum_in_w1.age_out(aged_w1);
        self.red_in_w1.age_out(aged_w1);
        self.lum_in_w5.age_out(aged_w5);
        self.red_in_w5.age_out(aged_w5);
        None
    }

    /// Folds one frame's transition booleans into the window counters and returns the
    /// resulting per-frame verdicts.
    ///
    /// Must be called after [`Self::on_frame_arrival`] for the same frame, and only
    /// for frames beyond the first (the first frame establishes the baseline and
    /// produces no transitions).
    pub fn observe_transitions(&mut self, luminance_transition: bool, red_transition: bool) -> TrackerFrameOutcome {
        self.lum_in_w1.push(luminance_transition);
        self.red_in_w1.push(red_transition);

        let lum_w1_current = self.lum_in_w1.current();
        let red_w1_current = self.red_in_w1.current();

        self.lum_in_w5.push(self.in_risky_band(lum_w1_current));
        self.red_in_w5.push(self.in_risky_band(red_w1_current));

        let f4 = self.windows.size(self.w4);
        let lum_w5_current = self.lum_in_w5.current();
        let red_w5_current = self.red_in_w5.current();

        let luminance_result = self.evaluate(lum_w1_current, lum_w5_current, f4);
        self.lum_flags.record(luminance_result);
        self.lum_incidents.record(luminance_result);

        let red_result = self.evaluate(red_w1_current, red_w5_current, f4);
        self.red_flags.record(red_result);
        self.red_incidents.record(red_result);

        TrackerFrameOutcome {
            luminance_result,
            red_result,
            luminance_transitions: lum_w1_current,
            red_transitions: red_w1_current,
            luminance_extended_fail_count: lum_w5_current,
            red_extended_fail_count: red_w5_current,
        }
    }

    fn in_risky_band(&self, w1_current: u32) -> bool {
        w1_current >= self.min_transitions && w1_current <= self.max_transitions
    }

    fn evaluate(&self, w1_current: u32, w5_current: u32, f4: u32) -> FlashResult {
        if w1_current > self.max_transitions {
            FlashResult::FlashFail
        } else if w5_current >= f4 && w1_current >= self.min_transitions {
            FlashResult::ExtendedFail
        } else if w1_current >= self.warning_transitions {
            FlashResult::PassWithWarning
        } else {
            FlashResult::Pass
        }
    }

    /// Cumulative flags recorded so far for the luminance channel.
    pub fn luminance_flags(&self) -> VerdictFlags {
        self.lum_flags
    }

    /// Cumulative flags recorded so far for the red-saturation channel.
    pub fn red_flags(&self) -> VerdictFlags {
        self.red_flags
    }

    /// Cumulative incident totals for the luminance channel.
    pub fn luminance_incidents(&self) -> IncidentTotals {
        self.lum_incidents
    }

    /// Cumulative incident totals for the red-saturation channel.
    pub fn red_incidents(&self) -> IncidentTotals {
        self.red_incidents
    }
}
