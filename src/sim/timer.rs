//! Frame-counted periodic timers
//!
//! The level runs three independent countdowns (side tween, color pulse,
//! rotation flip). Each is a `FrameTimer`: a counter, the period it was last
//! armed with, and an expiry edge reported by `tick()`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTimer {
    remaining: u32,
    period: u32,
}

impl FrameTimer {
    /// Timer armed to expire after `period` ticks
    pub fn new(period: u32) -> Self {
        Self {
            remaining: period,
            period,
        }
    }

    /// Timer that is not running
    pub fn idle() -> Self {
        Self {
            remaining: 0,
            period: 0,
        }
    }

    /// Re-arm with a new period
    pub fn reset(&mut self, period: u32) {
        self.remaining = period;
        self.period = period;
    }

    /// Advance one frame. Returns true on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    pub fn is_running(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Frames elapsed since the timer was armed
    pub fn elapsed(&self) -> u32 {
        self.period - self.remaining
    }

    /// Fraction of the period elapsed, in [0, 1]. An idle timer reads 1.
    pub fn progress(&self) -> f64 {
        if self.period == 0 {
            return 1.0;
        }
        self.elapsed() as f64 / self.period as f64
    }
}
