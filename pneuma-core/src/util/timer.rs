//! Millisecond interval timer over an externally supplied clock.
//!
//! The clock is whatever monotonic millisecond counter the platform has;
//! callers pass the current reading in. Wrapping subtraction keeps the
//! timer correct across `u32` rollover (about 49 days).

/// Expires once `interval` milliseconds have elapsed since the last reset.
#[derive(Debug, Clone, Copy)]
pub struct MsTimer {
    interval: u32,
    start: u32,
}

impl MsTimer {
    pub const fn new(interval: u32) -> Self {
        Self { interval, start: 0 }
    }

    pub fn reset(&mut self, now: u32) {
        self.start = now;
    }

    pub fn expired(&self, now: u32) -> bool {
        now.wrapping_sub(self.start) >= self.interval
    }
}
