//! Monotonic time abstraction

use crate::error::HalResult;

/// A monotonic sample split the way the kernel reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp {
    pub secs: u64,
    pub nanos: u32,
}

impl Timestamp {
    pub fn new(secs: u64, nanos: u32) -> Self {
        Self { secs, nanos }
    }

    /// Whole milliseconds, truncating sub-millisecond nanoseconds.
    pub fn as_millis(&self) -> u64 {
        self.secs * 1_000 + u64::from(self.nanos / 1_000_000)
    }

    /// Whole microseconds, truncating sub-microsecond nanoseconds.
    pub fn as_micros(&self) -> u64 {
        self.secs * 1_000_000 + u64::from(self.nanos / 1_000)
    }
}

/// Source of monotonic time, immune to wall-clock adjustments
pub trait MonotonicSource {
    fn now(&self) -> HalResult<Timestamp>;
}
