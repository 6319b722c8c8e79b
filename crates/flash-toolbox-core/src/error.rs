//! Error types for the photosensitivity analysis pipeline.
//!
//! Two kinds of failure are distinguished. A [`struct@Error`] is fatal: it escapes the
//! core and aborts the stream. A [`FrameWarning`] is a per-frame anomaly the pipeline
//! recovered from locally; it is recorded on the affected [`crate::analyser::FrameRecord`]
//! and the stream continues.

use serde::Serialize;
use snafu::Snafu;

/// Result type used throughout the crate for fallible, stream-level operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type returned by fallible, stream-level operations of the crate.
///
/// Per-frame anomalies that the pipeline can recover from locally are not represented
/// here; see [`FrameWarning`] instead.
#[derive(Debug, Snafu)]
pub struct Error(InnerError);

pub(crate) type InnerResult<T, E = InnerError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub(crate) enum InnerError {
    /// The decoder could not be opened.
    ///
    /// The core never constructs this variant itself; it exists so a hosting
    /// application can fold its own decoder error into this crate's error type via
    /// [`snafu::ResultExt::context`].
    #[snafu(display("could not open the decoded frame stream"))]
    StreamOpenFailed {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        backtrace: snafu::Backtrace,
    },

    #[snafu(display(
        "frame {frame_index} is {width}x{height}, but the stream was opened at \
        {expected_width}x{expected_height}"
    ))]
    FrameGeometryMismatch {
        frame_index: u32,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
        backtrace: snafu::Backtrace,
    },

    #[snafu(display("configuration failed validation: {source}"))]
    InvalidConfiguration { source: garde::Report, backtrace: snafu::Backtrace },
}

/// A per-frame anomaly that the pipeline recovered from locally.
///
/// Unlike [`struct@Error`], a `FrameWarning` never aborts the stream, and since it can
/// occur at high frequency on adversarial input, it carries no backtrace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu, Serialize)]
pub enum FrameWarning {
    /// A frame's timestamp was not strictly greater than the previous frame's, in
    /// timestamp-windowed mode. The affected sliding windows were reset, keeping only
    /// the new frame.
    #[snafu(display("frame timestamp did not strictly increase; affected windows were reset"))]
    NonMonotonicTimestamp,

    /// An arithmetic edge case in the pattern-detection pipeline (for example, an empty
    /// contour set) prevented the frame from being evaluated. The frame was scored
    /// `Pass` and did not extend or reset the harmful-frame streak.
    #[snafu(display("pattern detection was skipped for this frame due to a degenerate input"))]
    PatternPipelineSkipped,
}
