use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Monotonic time source shared by the pacer, the session ticker and the
/// demo-mode countdown.
///
/// Everything time-driven reads the clock through this trait so tests can
/// substitute a virtual clock and step it by hand.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Calendar time in milliseconds since the Unix epoch. Used for
    /// timestamps only, never for scheduling.
    fn unix_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Wall-clock implementation backed by `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Virtual clock: `now() = origin + offset`.
    ///
    /// Clones share the same offset, so a test can hand one clone to the
    /// controller and keep another to advance time. `sleep(d)` advances by
    /// `d` without blocking. Calendar time starts at the Unix epoch unless
    /// set with [`TestClock::at_unix_ms`] and moves with the offset.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        unix_origin_ms: u64,
        offset: Arc<Mutex<Duration>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self::at_unix_ms(0)
        }

        /// Virtual clock whose calendar time starts at `unix_ms`.
        pub fn at_unix_ms(unix_ms: u64) -> Self {
            Self {
                origin: Instant::now(),
                unix_origin_ms: unix_ms,
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Shorthand for `advance(Duration::from_millis(ms))`.
        pub fn advance_ms(&self, ms: u64) {
            self.advance(Duration::from_millis(ms));
        }

        /// Total virtual time elapsed since construction.
        pub fn elapsed(&self) -> Duration {
            self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            self.origin + self.elapsed()
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }

        fn unix_ms(&self) -> u64 {
            let elapsed = u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX);
            self.unix_origin_ms.saturating_add(elapsed)
        }
    }
}
