use googletest::prelude::*;

use super::*;
use crate::config::TransitionConfig;

fn config() -> TransitionConfig {
    TransitionConfig {
        max_transitions: 6,
        min_transitions: 4,
        warning_transitions: 4,
        extended_fail_seconds: 4.0,
        extended_fail_window_seconds: 5.0,
        analyse_by_time: false,
    }
}

fn feed(tracker: &mut TransitionTracker, fps: u32, count: u32, lum: bool, red: bool) -> TrackerFrameOutcome {
    let mut outcome = None;
    for i in 0..count {
        tracker.on_frame_arrival(u64::from(i) * 1000 / u64::from(fps));
        outcome = Some(tracker.observe_transitions(lum, red));
    }
    outcome.unwrap()
}

#[googletest::test]
fn w1_invariant_tracks_window_size_of_transitions() {
    let mut tracker = TransitionTracker::new(&config(), 7);
    let outcome = feed(&mut tracker, 7, 3, true, false);
    expect_that!(outcome.luminance_transitions, eq(3));
    expect_that!(outcome.red_transitions, eq(0));
}

#[googletest::test]
fn one_more_than_max_triggers_flash_fail() {
    let mut tracker = TransitionTracker::new(&config(), 8);
    // fps=8, W1 capacity=8: 7 consecutive transitions land in the window before any
    // frame ages out, exceeding max_transitions=6.
    let outcome = feed(&mut tracker, 8, 7, true, false);
    expect_that!(outcome.luminance_result, eq(FlashResult::FlashFail));
    expect_that!(tracker.luminance_incidents().flash_fail_frames, eq(1));
}

#[googletest::test]
fn scenario_s3_extended_fail_after_23_transitioning_frames() {
    // S3: fps=5, 23 frames each with (luminance_transition, red_transition) = (true,
    // true); both channels end up in ExtendedFail, with 19 prior warning frames.
    let fps = 5;
    let mut tracker = TransitionTracker::new(&config(), fps);
    let mut last = None;
    for i in 0..23u32 {
        tracker.on_frame_arrival(u64::from(i) * 1000 / u64::from(fps));
        last = Some(tracker.observe_transitions(true, true));
    }
    let last = last.unwrap();
    expect_that!(last.luminance_result, eq(FlashResult::ExtendedFail));
    expect_that!(last.red_result, eq(FlashResult::ExtendedFail));
    expect_that!(tracker.luminance_flags().extended_fail, eq(true));
    expect_that!(tracker.red_flags().extended_fail, eq(true));
    expect_that!(tracker.luminance_incidents().extended_fail_frames, eq(1));
    expect_that!(tracker.luminance_incidents().warning_frames, eq(19));
    expect_that!(tracker.red_incidents().extended_fail_frames, eq(1));
    expect_that!(tracker.red_incidents().warning_frames, eq(19));
}

#[googletest::test]
fn verdict_flags_are_monotonic() {
    let mut tracker = TransitionTracker::new(&config(), 8);
    feed(&mut tracker, 8, 7, true, false);
    expect_that!(tracker.luminance_flags().flash_fail, eq(true));
    // A subsequent quiet frame must not clear the flag.
    tracker.on_frame_arrival(1000);
    tracker.observe_transitions(false, false);
    expect_that!(tracker.luminance_flags().flash_fail, eq(true));
}

#[googletest::test]
fn non_monotonic_timestamp_resets_and_warns() {
    let mut config = config();
    config.analyse_by_time = true;
    let mut tracker = TransitionTracker::new(&config, 10);
    tracker.on_frame_arrival(100);
    tracker.observe_transitions(true, false);
    let warning = tracker.on_frame_arrival(50);
    expect_that!(warning, some(eq(FrameWarning::NonMonotonicTimestamp)));
}

#[googletest::test]
fn transition_counter_current_is_back_minus_passed() {
    let mut counter = TransitionCounter::default();
    counter.push(true);
    counter.push(true);
    counter.push(false);
    expect_that!(counter.current(), eq(2));
    counter.age_out(1);
    expect_that!(counter.current(), eq(1));
}
