//! Monotonic elapsed-time base and blocking delays.

use std::thread;
use std::time::Duration;

use hal::timer::MonotonicSource;
use log::trace;

use crate::error::{WiringError, WiringResult};

/// Baselines captured by [`Clock::init_epoch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Epoch {
    pub millis: u64,
    pub micros: u64,
}

/// Elapsed-time counter over a monotonic source
///
/// Until [`init_epoch`](Self::init_epoch) runs the baselines are zero, so
/// elapsed values are the raw monotonic time.
#[derive(Debug)]
pub struct Clock<S: MonotonicSource> {
    source: S,
    epoch: Epoch,
}

impl<S: MonotonicSource> Clock<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            epoch: Epoch::default(),
        }
    }

    /// Samples the source once and stores the millisecond and microsecond
    /// baselines.
    pub fn init_epoch(&mut self) -> WiringResult<()> {
        let now = self.source.now().map_err(WiringError::ClockUnavailable)?;
        self.epoch = Epoch {
            millis: now.as_millis(),
            micros: now.as_micros(),
        };
        trace!("clock epoch set at {} ms", self.epoch.millis);
        Ok(())
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Milliseconds since the epoch, or 0 when the source cannot be sampled.
    pub fn elapsed_millis(&self) -> u64 {
        match self.source.now() {
            Ok(now) => now.as_millis().saturating_sub(self.epoch.millis),
            Err(err) => {
                trace!("clock sample failed: {err}");
                0
            }
        }
    }

    /// Microseconds since the epoch, or 0 when the source cannot be sampled.
    pub fn elapsed_micros(&self) -> u64 {
        match self.source.now() {
            Ok(now) => now.as_micros().saturating_sub(self.epoch.micros),
            Err(err) => {
                trace!("clock sample failed: {err}");
                0
            }
        }
    }
}

/// Blocks the calling thread for `ms` milliseconds.
pub fn delay(ms: u32) {
    thread::sleep(Duration::from_millis(u64::from(ms)));
}

/// Blocks the calling thread for `us` microseconds.
///
/// Accuracy is bounded by the scheduler, short waits overshoot.
pub fn delay_micros(us: u32) {
    thread::sleep(Duration::from_micros(u64::from(us)));
}
