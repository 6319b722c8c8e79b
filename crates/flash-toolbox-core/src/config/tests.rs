use garde::Validate;
use googletest::prelude::*;
use serde_test::Token;

use super::*;

#[googletest::test]
fn default_config_validates() {
    expect_true!(Config::default().validate().is_ok());
}

#[googletest::test]
fn transition_thresholds_out_of_order_fails_validation() {
    let mut config = TransitionConfig {
        max_transitions: 4,
        min_transitions: 6,
        warning_transitions: 4,
        extended_fail_seconds: 4.0,
        extended_fail_window_seconds: 5.0,
        analyse_by_time: false,
    };
    expect_true!(config.validate().is_err());

    config.min_transitions = 2;
    expect_true!(config.validate().is_ok());
}

#[googletest::test]
fn non_finite_threshold_fails_validation() {
    let channel =
        ChannelConfig { flash_threshold: f32::NAN, dark_threshold: 0.8, dark_gate_enabled: true };
    expect_true!(channel.validate().is_err());
}

#[googletest::test]
fn area_proportion_out_of_range_fails_validation() {
    let resize = FrameResizeConfig { enabled: true, proportion: 1.5 };
    expect_true!(resize.validate().is_err());
}

#[googletest::test]
fn pattern_area_proportion_of_zero_fails_validation() {
    let mut config = Config::default();
    config.pattern.area_proportion = 0.0;
    expect_true!(config.validate().is_err());

    config.pattern.area_proportion = 1.0;
    expect_true!(config.validate().is_ok());
}

#[googletest::test]
fn flash_area_proportion_of_zero_fails_validation() {
    let mut config = Config::default();
    config.flash_area_proportion = 0.0;
    expect_true!(config.validate().is_err());
}

#[googletest::test]
fn frame_resize_config_serializes_as_expected_tokens() {
    let resize = FrameResizeConfig { enabled: true, proportion: 0.5 };
    serde_test::assert_tokens(
        &resize,
        &[
            Token::Struct { name: "FrameResizeConfig", len: 2 },
            Token::Str("enabled"),
            Token::Bool(true),
            Token::Str("proportion"),
            Token::F32(0.5),
            Token::StructEnd,
        ],
    );
}
