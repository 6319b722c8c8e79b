//! Sliding-window bookkeeping shared by the transition tracker's 1-, 4-, and
//! 5-second windows.
//!
//! Two implementations are provided: [`frame_count::FrameCountWindowManager`] for
//! fixed-FPS streams, and [`timestamp::TimestampWindowManager`] for variable or
//! real-time streams. Both implement [`SlidingWindowManager`].

use derive_more::{Display, From};

pub mod frame_count;
pub mod timestamp;

pub use frame_count::FrameCountWindowManager;
pub use timestamp::TimestampWindowManager;

/// An opaque handle to a window registered with a [`SlidingWindowManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
pub struct WindowHandle(usize);

/// Tracks how many of a window's oldest frame arrivals have aged out as new frames
/// arrive, either by frame count or by wall-clock time.
///
/// Implementations are single-threaded and assume frames arrive in non-decreasing
/// timestamp order; [`SlidingWindowManager::reset`] is the caller's recovery path when
/// that assumption is violated.
pub trait SlidingWindowManager: std::fmt::Debug {
    /// Registers a new window and returns a handle to it.
    ///
    /// `max_frames` bounds the window for frame-count implementations; `max_seconds`
    /// bounds it for timestamp implementations. Each implementation ignores whichever
    /// parameter it does not use.
    fn register_window(&mut self, max_frames: u32, max_seconds: f32) -> WindowHandle;

    /// Notifies every registered window that a new frame arrived at `timestamp_ms`.
    fn on_frame_arrival(&mut self, timestamp_ms: u64);

    /// How many of the window's oldest entries aged out as a result of the most recent
    /// [`Self::on_frame_arrival`] call.
    fn aged_out(&self, handle: WindowHandle) -> u32;

    /// How many frames currently fall inside the window.
    fn size(&self, handle: WindowHandle) -> u32;

    /// Clears the window. If `keep_last` is set, the most recently arrived frame is
    /// kept as the window's sole remaining entry.
    fn reset(&mut self, handle: WindowHandle, keep_last: bool);
}
