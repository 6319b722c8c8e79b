use display_error_chain::ErrorChainExt;
use googletest::prelude::*;

use super::*;
use crate::config::{Config, PatternConfig};

fn solid_frame(index: u32, width: u32, height: u32, bgr: (u8, u8, u8)) -> Frame {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for _ in 0..(width * height) {
        pixels.push(bgr.0);
        pixels.push(bgr.1);
        pixels.push(bgr.2);
    }
    Frame { index, timestamp_ms: u64::from(index) * 1000 / 7, width, height, pixels }
}

fn close(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

/// Solid colours alternating: black, white, red, white, red at 100x100/fps=7.
#[googletest::test]
fn scenario_s1_solid_colours_alternating() {
    let mut config = Config::default();
    config.pattern.enabled = false;
    let mut analyser = Analyser::new(&config, 7, 100, 100).unwrap();

    let black = solid_frame(0, 100, 100, (0, 0, 0));
    let white = solid_frame(1, 100, 100, (255, 255, 255));
    let red = solid_frame(2, 100, 100, (0, 0, 255));
    let white2 = solid_frame(3, 100, 100, (255, 255, 255));
    let red2 = solid_frame(4, 100, 100, (0, 0, 255));

    analyser.analyse_frame(&black).unwrap();
    analyser.analyse_frame(&white).unwrap();
    analyser.analyse_frame(&red).unwrap();
    analyser.analyse_frame(&white2).unwrap();
    let record = analyser.analyse_frame(&red2).unwrap();

    expect_true!(close(record.luminance_mean, 0.2126, 1e-4));
    expect_true!(close(record.luminance_flash_area_percent, 1.0, 1e-6));
    expect_true!(close(record.luminance_diff, -0.7874, 1e-4));
    expect_true!(close(record.luminance_accumulator, -0.7874, 1e-4));
    expect_true!(close(record.red_mean, 320.0, 1e-2));
    expect_that!(record.luminance_transitions, eq(4));
    expect_that!(record.red_transitions, eq(3));
    expect_that!(record.luminance_result, eq(FlashResult::PassWithWarning));
    expect_that!(record.red_result, eq(FlashResult::Pass));

    let summary = analyser.finalize();
    expect_that!(summary.overall_result, eq(OverallResult::PassWithWarning));
}

#[googletest::test]
fn first_frame_reports_zeroed_transition_fields_and_no_verdicts() {
    let config = Config::default();
    let mut analyser = Analyser::new(&config, 10, 16, 16).unwrap();
    let frame = solid_frame(0, 16, 16, (10, 20, 30));
    let record = analyser.analyse_frame(&frame).unwrap();

    expect_that!(record.luminance_transitions, eq(0));
    expect_that!(record.red_transitions, eq(0));
    expect_that!(record.luminance_extended_fail_count, eq(0));
    expect_that!(record.red_extended_fail_count, eq(0));
    expect_that!(record.luminance_result, eq(FlashResult::Pass));
    expect_that!(record.warning, none());
    // The pattern detector has no baseline-frame concept of its own, so it must have
    // already produced a verdict for this very first frame.
    expect_true!(record.pattern_result.is_some());
}

fn striped_frame(index: u32, width: u32, height: u32, stripe_width: u32) -> Frame {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let bright = (x / stripe_width) % 2 == 0;
            let value = if bright { 230 } else { 10 };
            let _ = y;
            pixels.push(value);
            pixels.push(value);
            pixels.push(value);
        }
    }
    Frame { index, timestamp_ms: u64::from(index) * 1000 / 5, width, height, pixels }
}

/// Drives exactly `persistence_frames` harmful frames through [`Analyser::analyse_frame`]
/// starting at frame 0. The pattern detector must be fed the very first frame for the
/// streak to complete by the last of these frames; if frame 0 were skipped, this would
/// need one extra frame to reach `Fail`.
#[googletest::test]
fn pattern_detector_streak_counts_the_first_frame() {
    let mut config = Config::default();
    config.pattern = PatternConfig {
        enabled: true,
        min_stripes: 5,
        dark_luminance_threshold: 0.25,
        time_threshold_seconds: 1.0,
        area_proportion: 0.1,
    };
    let mut analyser = Analyser::new(&config, 5, 64, 64).unwrap();

    let mut saw_fail = false;
    for i in 0..5u32 {
        let frame = striped_frame(i, 64, 64, 4);
        let record = analyser.analyse_frame(&frame).unwrap();
        if record.pattern_result == Some(PatternResult::Fail) {
            saw_fail = true;
        }
    }
    expect_true!(saw_fail);
}

#[googletest::test]
fn mismatched_frame_geometry_is_an_error() {
    let config = Config::default();
    let mut analyser = Analyser::new(&config, 10, 16, 16).unwrap();
    let wrong_size = solid_frame(0, 8, 8, (0, 0, 0));
    let err = analyser.analyse_frame(&wrong_size).unwrap_err();
    expect_true!(err.chain().to_string().contains("16x16"));
}

#[googletest::test]
fn round_trip_determinism() {
    let frames: Vec<Frame> = (0..12)
        .map(|i| {
            let value = ((i * 37) % 256) as u8;
            solid_frame(i, 32, 32, (value, value.wrapping_add(10), value.wrapping_add(50)))
        })
        .collect();

    let run = |config: &Config| {
        let mut analyser = Analyser::new(config, 9, 32, 32).unwrap();
        let records: Vec<FrameRecord> =
            frames.iter().map(|f| analyser.analyse_frame(f).unwrap()).collect();
        (records, analyser.finalize())
    };

    let config = Config::default();
    let (records_a, mut result_a) = run(&config);
    let (records_b, mut result_b) = run(&config);

    // analysis_time_ms is wall-clock, not part of the deterministic output.
    result_a.analysis_time_ms = 0;
    result_b.analysis_time_ms = 0;

    expect_that!(records_a, eq(records_b));
    expect_that!(result_a, eq(result_b));
}
