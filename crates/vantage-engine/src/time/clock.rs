use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

/// Monotonic time source, in seconds since an arbitrary reference.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock measured against the instant it was created.
#[derive(Debug, Clone)]
pub struct SystemClock {
    reference: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            reference: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Instant::now()
            .saturating_duration_since(self.reference)
            .as_secs_f64()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one clone and hand the
/// other to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, seconds: f64) {
        *self.now.lock() += seconds;
    }

    pub fn set(&self, seconds: f64) {
        *self.now.lock() = seconds;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(a >= 0.0);
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(view.now(), 0.75);

        view.set(2.0);
        assert_eq!(clock.now(), 2.0);
    }
}
