//! # wiring
//!
//! GPIO lines and SPI devices on single-board Linux computers, addressed by
//! small numeric ids instead of kernel descriptors: `(chip, pin)` for lines,
//! `(bus, channel)` for SPI devices.
//!
//! ## Module Overview
//! - [`gpio`]    – line registry: register, read, write, release.
//! - [`spi`]     – device registry: configure, transfer, close.
//! - [`clock`]   – monotonic epoch, elapsed milliseconds, delays.
//! - [`context`] – the [`Wiring`] context owning all three, with teardown.
//! - [`legacy`]  – numeric status-code adapter over the typed API.
//!
//! The registries are written against the provider traits in `hal`; the
//! `linux` feature wires them to `hal-linux`.
//!
//! ```no_run
//! use hal::gpio::PinMode;
//! use wiring::{LinuxWiring, WiringConfig};
//!
//! let mut io = LinuxWiring::linux(&WiringConfig::default());
//! io.gpio_mut().register(0, 5, PinMode::Output)?;
//! io.gpio_mut().write(0, 5, 1)?;
//! io.spi_mut().configure(0, 0, 500_000, 0)?;
//! let mut frame = [0x9F, 0, 0, 0];
//! io.spi_mut().transfer(0, 0, &mut frame)?;
//! # Ok::<(), wiring::WiringError>(())
//! ```

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod gpio;
pub mod key;
pub mod legacy;
pub mod registry;
pub mod spi;

pub use clock::{delay, delay_micros, Clock, Epoch};
pub use config::{WiringConfig, WiringConfigBuilder};
pub use context::{TeardownReport, Wiring};
#[cfg(feature = "linux")]
pub use context::LinuxWiring;
pub use error::{AcquireStage, ConfigStage, ErrorKind, IoOp, WiringError, WiringResult};
pub use gpio::GpioRegistry;
pub use key::ResourceKey;
pub use registry::{Registry, Sweep};
pub use spi::{DeviceConfig, SpiRegistry};

#[cfg(test)]
mod tests;
