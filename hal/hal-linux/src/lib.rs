//! Linux HAL implementation
//!
//! Hardware abstraction layer implementation for single-board computers
//! running a mainline Linux kernel.
//!
//! This crate provides concrete implementations of the HAL traits on top of
//! the kernel's user-space interfaces:
//!
//! - [`gpio`]  – GPIO character devices (`/dev/gpiochipN`) via `gpio-cdev`
//! - [`spi`]   – spidev nodes (`/dev/spidevB.C`) via the `spidev` ioctls
//! - [`timer`] – `CLOCK_MONOTONIC_RAW` via `clock_gettime`
//!
//! ## Example
//! ```no_run
//! use hal::gpio::{GpioBackend, GpioChip, GpioLine, Level, LineHandle};
//! use hal_linux::gpio::CdevGpio;
//!
//! let mut gpio = CdevGpio::default();
//! let mut chip = gpio.open_chip(0).unwrap();
//! let mut led = chip.line(17).unwrap().request_output("blink", Level::Low).unwrap();
//! led.set_value(Level::High).unwrap();
//! ```

pub mod gpio;
pub mod spi;
pub mod timer;

// Re-export commonly used types
pub use gpio::CdevGpio;
pub use spi::Spidev;
pub use timer::RawMonotonic;

/// Default location of the kernel's device nodes.
pub const DEFAULT_DEV_ROOT: &str = "/dev";
