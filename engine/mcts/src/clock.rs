//! Time sources for the search budget.
//!
//! The search loop only asks "how much time has passed"; injecting the
//! answer keeps budget-bounded tests deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock: Send + Sync {
    /// Time elapsed since some fixed origin.
    fn elapsed(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Fake clock that advances by a fixed tick every time it is read.
///
/// With a tick of 1ms and a budget of 60ms the search loop completes
/// exactly 59 simulations, whatever the machine speed.
#[derive(Debug)]
pub struct TickClock {
    tick_nanos: u64,
    now_nanos: AtomicU64,
}

impl TickClock {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick_nanos: tick.as_nanos() as u64,
            now_nanos: AtomicU64::new(0),
        }
    }
}

impl Clock for TickClock {
    fn elapsed(&self) -> Duration {
        let now = self.now_nanos.fetch_add(self.tick_nanos, Ordering::Relaxed) + self.tick_nanos;
        Duration::from_nanos(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_clock_advances_per_read() {
        let clock = TickClock::new(Duration::from_millis(2));
        assert_eq!(clock.elapsed(), Duration::from_millis(2));
        assert_eq!(clock.elapsed(), Duration::from_millis(4));
        assert_eq!(clock.elapsed(), Duration::from_millis(6));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
    }
}
