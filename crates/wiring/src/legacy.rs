//! Numeric status-code surface.
//!
//! Flat, Arduino-style entry points that report failures as small negative
//! codes instead of [`WiringError`]s. Every call runs behind
//! `catch_unwind`, so a panic inside a provider surfaces as the generic `-1`
//! rather than unwinding into the caller.
//!
//! | call | 0 | -1 | -2 | -3 | -4 | -5 |
//! |------|---|----|----|----|----|----|
//! | `pin_mode` | ok | unexpected | chip open | line get | input request | output request |
//! | `digital_write` | ok | not registered | write rejected | | | |
//! | `pin_close` | ok | not registered | | | | |
//! | `spi_setup_mode` | ok | unexpected | open | mode | bits per word | speed |
//! | `spi_close` | ok | not registered | close failed | bookkeeping | | |
//! | `init_timer` | ok | unexpected | clock unavailable | | | |
//!
//! `spi_data_rw` returns the byte count or `-1` for any failure.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use hal::gpio::{GpioBackend, PinMode};
use hal::spi::SpiBackend;
use hal::timer::MonotonicSource;

use crate::context::{TeardownReport, Wiring};
use crate::error::{WiringError, WiringResult};

pub use crate::clock::{delay, delay_micros};

pub const LOW: u8 = 0;
pub const HIGH: u8 = 1;

pub const INPUT: u8 = 0;
pub const OUTPUT: u8 = 1;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic".to_owned()
    }
}

fn guarded<T>(f: impl FnOnce() -> WiringResult<T>) -> WiringResult<T> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(WiringError::Unexpected(panic_message(&*payload))))
}

fn status(result: WiringResult<()>) -> i8 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            log::debug!("{err}");
            err.code()
        }
    }
}

impl<G, S, C> Wiring<G, S, C>
where
    G: GpioBackend,
    S: SpiBackend,
    C: MonotonicSource,
{
    /// Registers a line: `mode` 0 is input, anything else output.
    pub fn pin_mode(&mut self, chip: u8, pin: u8, mode: u8) -> i8 {
        status(guarded(|| {
            self.gpio_mut().register(chip, pin, PinMode::from_raw(mode))
        }))
    }

    /// Reads a registered line as 0 or 1.
    ///
    /// Failures are not folded into the value: a missing line or a rejected
    /// read comes back as an error for the caller to handle.
    pub fn digital_read(&self, chip: u8, pin: u8) -> WiringResult<u8> {
        guarded(|| self.gpio().read(chip, pin).map(|level| level.as_u8()))
    }

    pub fn digital_write(&mut self, chip: u8, pin: u8, state: u8) -> i8 {
        status(guarded(|| self.gpio_mut().write(chip, pin, state)))
    }

    pub fn pin_close(&mut self, chip: u8, pin: u8) -> i8 {
        status(guarded(|| self.gpio_mut().release(chip, pin)))
    }

    pub fn spi_setup_mode(&mut self, bus: u8, channel: u8, speed: u32, mode: u8) -> i8 {
        status(guarded(|| self.spi_mut().configure(bus, channel, speed, mode)))
    }

    pub fn spi_setup(&mut self, bus: u8, channel: u8, speed: u32) -> i8 {
        self.spi_setup_mode(bus, channel, speed, 0)
    }

    /// Transfers the first `len` bytes of `data` in place.
    pub fn spi_data_rw(&mut self, bus: u8, channel: u8, data: &mut [u8], len: u32) -> i32 {
        let available = data.len();
        let Some(buf) = data.get_mut(..len as usize) else {
            log::debug!("spi {bus}.{channel}: length {len} exceeds buffer of {available}");
            return -1;
        };
        match guarded(|| self.spi_mut().transfer(bus, channel, buf)) {
            Ok(count) => i32::try_from(count).unwrap_or(-1),
            Err(err) => {
                log::debug!("{err}");
                -1
            }
        }
    }

    pub fn spi_close(&mut self, bus: u8, channel: u8) -> i8 {
        status(guarded(|| self.spi_mut().close(bus, channel)))
    }

    pub fn init_timer(&mut self) -> i8 {
        status(guarded(|| self.clock_mut().init_epoch()))
    }

    pub fn millis(&self) -> u64 {
        guarded(|| Ok(self.clock().elapsed_millis())).unwrap_or(0)
    }

    pub fn micros(&self) -> u64 {
        guarded(|| Ok(self.clock().elapsed_micros())).unwrap_or(0)
    }

    /// Frees every line and device still held.
    pub fn cleanup(&mut self) -> TeardownReport {
        self.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panics_become_unexpected() {
        let result: WiringResult<()> = guarded(|| panic!("provider blew up"));
        let err = result.unwrap_err();
        assert_eq!(err.code(), -1);
        assert_eq!(err.to_string(), "unexpected fault: provider blew up");
    }

    #[test]
    fn formatted_panics_keep_their_message() {
        let result: WiringResult<()> = guarded(|| panic!("line {} exploded", 7));
        assert!(matches!(result, Err(WiringError::Unexpected(msg)) if msg == "line 7 exploded"));
    }
}
