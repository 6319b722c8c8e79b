use googletest::prelude::*;

use super::*;
use crate::config::PatternConfig;

fn config() -> PatternConfig {
    PatternConfig {
        enabled: true,
        min_stripes: 5,
        dark_luminance_threshold: 0.25,
        time_threshold_seconds: 1.0,
        area_proportion: 0.1,
    }
}

fn striped_field(width: usize, height: usize, stripe_width: usize) -> ScalarField {
    let mut values = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            values.push(if (x / stripe_width) % 2 == 0 { 0.9 } else { 0.05 });
            let _ = y;
        }
    }
    ScalarField::from_values(width, height, values)
}

fn flat_field(width: usize, height: usize, value: f32) -> ScalarField {
    ScalarField::filled(width, height, value)
}

#[googletest::test]
fn flat_field_never_fails() {
    let mut detector = PatternDetector::new(&config(), 25, 64, 64);
    let field = flat_field(64, 64, 0.5);
    for _ in 0..50 {
        let (observables, warning) = detector.detect(&field);
        expect_that!(observables.result, eq(PatternResult::Pass));
        // A perfectly flat field should either be skipped outright or contour cleanly
        // to nothing; either way no streak of harmful frames should ever start.
        let _ = warning;
    }
    expect_that!(detector.ever_failed(), eq(false));
}

#[googletest::test]
fn persistent_high_contrast_stripes_eventually_fail() {
    let mut detector = PatternDetector::new(&config(), 10, 64, 64);
    let field = striped_field(64, 64, 4);
    let mut saw_fail = false;
    for _ in 0..40 {
        let (observables, _warning) = detector.detect(&field);
        if observables.result == PatternResult::Fail {
            saw_fail = true;
            break;
        }
    }
    expect_that!(saw_fail, eq(true));
    expect_that!(detector.fail_frame_count(), gt(0));
}

#[googletest::test]
fn a_single_harmful_frame_is_not_enough() {
    let mut detector = PatternDetector::new(&config(), 10, 64, 64);
    let stripes = striped_field(64, 64, 4);
    let flat = flat_field(64, 64, 0.5);
    let (first, _) = detector.detect(&stripes);
    expect_that!(first.result, eq(PatternResult::Pass));
    // Interrupting with a flat frame should prevent the streak from ever completing.
    for _ in 0..5 {
        detector.detect(&flat);
        detector.detect(&stripes);
    }
    expect_that!(detector.fail_frame_count(), eq(0));
}

#[googletest::test]
fn downscale_preserves_dimensions_below_threshold() {
    let detector = PatternDetector::new(&config(), 25, 320, 240);
    expect_that!(detector.downscaled_width, eq(320));
    expect_that!(detector.downscaled_height, eq(240));
}

#[googletest::test]
fn downscale_halves_dimensions_at_or_above_threshold() {
    let detector = PatternDetector::new(&config(), 25, 1920, 1080);
    expect_that!(detector.downscaled_width, eq(960));
    expect_that!(detector.downscaled_height, eq(540));
}
