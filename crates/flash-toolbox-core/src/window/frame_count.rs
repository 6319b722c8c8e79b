//! Frame-count windowing, for streams with a fixed nominal frame rate.

use super::{SlidingWindowManager, WindowHandle};

#[cfg(test)]
mod tests;

struct WindowState {
    max_frames: u32,
    arrivals: u32,
    last_aged_out: u32,
}

/// Sizes windows by a fixed count of frame arrivals.
///
/// A window with capacity `N` is full once `N` frames have arrived; every arrival
/// after that reports exactly one aged-out frame, and [`SlidingWindowManager::size`]
/// saturates at `N`.
#[derive(Debug, Default)]
pub struct FrameCountWindowManager {
    windows: Vec<WindowState>,
}

impl std::fmt::Debug for WindowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowState")
            .field("max_frames", &self.max_frames)
            .field("arrivals", &self.arrivals)
            .finish()
    }
}

impl FrameCountWindowManager {
    /// Creates an empty manager with no registered windows.
    pub fn new() -> Self {
        FrameCountWindowManager { windows: Vec::new() }
    }
}

impl SlidingWindowManager for FrameCountWindowManager {
    fn register_window(&mut self, max_frames: u32, _max_seconds: f32) -> WindowHandle {
        self.windows.push(WindowState { max_frames: max_frames.max(1), arrivals: 0, last_aged_out: 0 });
        WindowHandle::from(self.windows.len() - 1)
    }

    fn on_frame_arrival(&mut self, _timestamp_ms: u64) {
        for window in &mut self.windows {
            window.arrivals = window.arrivals.saturating_add(1);
            window.last_aged_out = u32::from(window.arrivals > window.max_frames);
        }
    }

    fn aged_out(&self, handle: WindowHandle) -> u32 {
        self.windows[handle.0].last_aged_out
    }

    fn size(&self, handle: WindowHandle) -> u32 {
        let window = &self.windows[handle.0];
        window.arrivals.min(window.max_frames)
    }

    fn reset(&mut self, handle: WindowHandle, keep_last: bool) {
        let window = &mut self.windows[handle.0];
        window.arrivals = u32::from(keep_last);
        window.last_aged_out = 0;
    }
}
