//! This crate analyses an already-decoded stream of video frames for compliance with
//! photosensitive-epilepsy safety guidelines (e.g. WCAG / Harding-style criteria).
//!
//! For each frame it reports luminance and red-saturation flash behaviour over sliding
//! time windows, the presence of spatially repetitive stripe-like patterns, and
//! aggregate pass / warning / fail verdicts, both per frame and for the whole stream.
//!
//! The entry point is [`analyser::Analyser`]: construct one with a [`config::Config`]
//! and the stream's nominal frame rate, then call [`analyser::Analyser::analyse_frame`]
//! once per decoded frame. Demuxing, decoding, CLI handling, and result serialization
//! are all left to the hosting application; this crate only holds the analysis
//! pipeline itself.

#![warn(missing_docs)]

pub mod analyser;
pub mod colour;
pub mod config;
pub mod diff;
pub mod error;
pub mod field;
pub mod frame;
pub mod luminance;
pub mod pattern;
pub mod redsat;
pub mod tracker;
pub mod window;

pub use analyser::{AnalysisResult, Analyser, FailureKind, FrameRecord, OverallResult};
pub use config::Config;
pub use error::{Error, FrameWarning, Result};
pub use frame::{Frame, SrgbFrame};
