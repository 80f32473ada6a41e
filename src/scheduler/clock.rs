// src/scheduler/clock.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Time source for the control loop, in seconds.
pub trait ControlClock: Send + Sync {
    /// Seconds elapsed since the clock's epoch. Must never decrease.
    fn now_seconds(&self) -> f64;
    /// Block (or pretend to) for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Monotonic wall-clock time since construction.
#[derive(Debug, Clone)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlClock for StdClock {
    fn now_seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}

/// Caller-driven clock for deterministic replay. `sleep` advances it instantly.
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            bits: AtomicU64::new(start.to_bits()),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        let _ = self.bits.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
            Some((f64::from_bits(bits) + seconds).to_bits())
        });
    }
}

impl ControlClock for ManualClock {
    fn now_seconds(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration.as_secs_f64());
    }
}
