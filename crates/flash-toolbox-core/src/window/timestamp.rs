//! Wall-clock-timestamp windowing, for variable-rate or real-time streams.

use std::collections::VecDeque;

use super::{SlidingWindowManager, WindowHandle};


#[derive(Debug)]
struct WindowState {
    max_millis: u64,
    timestamps: VecDeque<u64>,
    deltas: VecDeque<u64>,
    time_sum: u64,
    last_aged_out: u32,
}

impl WindowState {
    fn new(max_seconds: f32) -> Self {
        WindowState {
            max_millis: (max_seconds.max(0.0) as f64 * 1000.0) as u64,
            timestamps: VecDeque::new(),
            deltas: VecDeque::new(),
            time_sum: 0,
            last_aged_out: 0,
        }
    }

    fn clear(&mut self, keep: Option<u64>) {
        self.timestamps.clear();
        self.deltas.clear();
        self.time_sum = 0;
        if let Some(t) = keep {
            self.timestamps.push_back(t);
        }
    }

    fn on_arrival(&mut self, t: u64) {
        let Some(&last_ts) = self.timestamps.back() else {
            self.timestamps.push_back(t);
            self.last_aged_out = 0;
            return;
        };

        let dt = t.saturating_sub(last_ts);
        if dt >= self.max_millis {
            let prior_size = self.timestamps.len() as u32;
            self.clear(Some(t));
            self.last_aged_out = prior_size;
            return;
        }

        let mut aged_out = 0;
        while self.time_sum + dt >= self.max_millis {
            let (Some(_), Some(oldest_delta)) = (self.timestamps.pop_front(), self.deltas.pop_front())
            else {
                break;
            };
            self.time_sum -= oldest_delta;
            aged_out += 1;
        }
        self.timestamps.push_back(t);
        self.deltas.push_back(dt);
        self.time_sum += dt;
        self.last_aged_out = aged_out;
    }
}

/// Sizes windows by wall-clock arrival timestamps, in milliseconds.
///
/// Maintains, per window, the ordered arrival timestamps still inside the window and
/// the running sum of the deltas between them, so that amortised per-arrival cost stays
/// O(1).
#[derive(Debug, Default)]
pub struct TimestampWindowManager {
    windows: Vec<WindowState>,
}

impl TimestampWindowManager {
    /// Creates an empty manager with no registered windows.
    pub fn new() -> Self {
        TimestampWindowManager { windows: Vec::new() }
    }
}

impl SlidingWindowManager for TimestampWindowManager {
    fn register_window(&mut self, _max_frames: u32, max_seconds: f32) -> WindowHandle {
        self.windows.push(WindowState::new(max_seconds));
        WindowHandle::from(self.windows.len() - 1)
    }

    fn on_frame_arrival(&mut self, timestamp_ms: u64) {
        for window in &mut self.windows {
            window.on_arrival(timestamp_ms);
        }
    }

    fn aged_out(&self, handle: WindowHandle) -> u32 {
        self.windows[handle.0].last_aged_out
    }

    fn size(&self, handle: WindowHandle) -> u32 {
        self.windows[handle.0].timestamps.len() as u32
    }

    fn reset(&mut self, handle: WindowHandle, keep_last: bool) {
        let window = &mut self.windows[handle.0];
        let keep = if keep_last { window.timestamps.back().copied() } else { None };
        window.clear(keep);
        window.last_aged_out = 0;
    }
}
