use parking_lot::Mutex;
use serde_derive::{Deserialize, Serialize};
use std::ops::Add;
use std::time::{Duration, Instant};

/// Point in time measured from an arbitrary monotonic origin.
///
/// Detections and render queries must be stamped against the same origin.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    #[inline]
    pub fn from_duration(d: Duration) -> Self {
        Self(d)
    }

    #[inline]
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    #[inline]
    pub fn from_micros(us: u64) -> Self {
        Self(Duration::from_micros(us))
    }

    /// Stamps `instant` relative to `origin`. Instants before the origin map to zero.
    #[inline]
    pub fn from_instant(origin: Instant, instant: Instant) -> Self {
        Self(instant.saturating_duration_since(origin))
    }

    #[inline]
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Moves forward by `d`, stopping at the largest representable timestamp.
    #[inline]
    pub fn saturating_add(self, d: Duration) -> Self {
        Self(self.0.checked_add(d).unwrap_or(Duration::MAX))
    }

    /// Elapsed time from `earlier` to `self`, zero if `earlier` is later.
    #[inline]
    pub fn saturating_since(&self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn add(self, rhs: Duration) -> Timestamp {
        self.saturating_add(rhs)
    }
}

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by `Instant`, with the origin fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    #[inline]
    pub fn stamp(&self, instant: Instant) -> Timestamp {
        Timestamp::from_instant(self.origin, instant)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Timestamp {
        self.stamp(Instant::now())
    }
}

/// Clock that only moves when told to. Useful for replaying recorded detections.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, ts: Timestamp) {
        *self.now.lock() = ts;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(by);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
