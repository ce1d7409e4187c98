//! Monotonic time from `CLOCK_MONOTONIC_RAW`

use std::io;

use hal::error::HalResult;
use hal::timer::{MonotonicSource, Timestamp};

/// Hardware-based monotonic clock, not slewed by NTP
#[derive(Debug, Clone, Copy, Default)]
pub struct RawMonotonic;

impl MonotonicSource for RawMonotonic {
    fn now(&self) -> HalResult<Timestamp> {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid, writable timespec.
        if unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, &mut ts) } < 0 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(Timestamp::new(ts.tv_sec as u64, ts.tv_nsec as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_goes_backwards() {
        let clock = RawMonotonic;
        let a = clock.now().unwrap();
        let b = clock.now().unwrap();
        assert!(b >= a);
        assert!(a.nanos < 1_000_000_000);
    }
}
