//! Hardware Abstraction Layer (HAL) for Linux single-board computers
//!
//! This crate provides the provider traits that the `wiring` registries are
//! written against. Each trait mirrors one kernel-facing capability:
//!
//! - [`gpio`]  – open a chip, get a line, request it as input or output.
//! - [`spi`]   – open a spidev node, apply mode/bits-per-word/speed, transfer.
//! - [`timer`] – sample a monotonic clock that ignores wall-clock changes.
//!
//! Concrete Linux implementations live in `hal-linux`. In-memory providers
//! for tests are available behind the `mock` feature.

pub mod error;
pub mod gpio;
pub mod spi;
pub mod timer;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{HalError, HalResult};
pub use gpio::{GpioBackend, GpioChip, GpioLine, Level, LineHandle, PinMode};
pub use spi::{SpiBackend, SpiDevice, SpiMode, TransferParams};
pub use timer::{MonotonicSource, Timestamp};
