//! GPIO (General Purpose Input/Output) abstraction
//!
//! The traits follow the kernel's character-device flow: a chip is opened by
//! index, a line is taken from the chip by offset, and the line is requested
//! with a fixed direction. Only the requested handle can read or drive the
//! line; dropping or releasing it hands the line back to the kernel.

use crate::error::HalResult;

/// GPIO line direction, fixed when the line is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinMode {
    /// Input (floating)
    Input,
    /// Output (push-pull), requested low
    Output,
}

impl PinMode {
    /// Decodes the numeric mode used by the legacy API: `0` is input,
    /// anything else is output.
    pub fn from_raw(mode: u8) -> Self {
        if mode == 0 {
            Self::Input
        } else {
            Self::Output
        }
    }

    pub fn as_raw(self) -> u8 {
        match self {
            Self::Input => 0,
            Self::Output => 1,
        }
    }
}

/// GPIO pin levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Level {
    /// Low level (0V)
    #[default]
    Low,
    /// High level (VCC)
    High,
}

impl Level {
    /// Boolean-normalises a raw state: any non-zero value is high.
    pub fn from_state(state: u8) -> Self {
        if state != 0 {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Strict decoding of a value read back from the kernel.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Low),
            1 => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

/// Entry point to the GPIO subsystem: opens chips by numeric index.
pub trait GpioBackend {
    /// Chip handle produced by this backend
    type Chip: GpioChip;

    /// Open the chip with the given index (`gpiochip<index>` on Linux).
    fn open_chip(&mut self, index: u8) -> HalResult<Self::Chip>;
}

/// An opened GPIO controller
pub trait GpioChip {
    /// Unrequested line type produced by this chip
    type Line: GpioLine;

    /// Get the line at `offset` without requesting it.
    fn line(&mut self, offset: u8) -> HalResult<Self::Line>;

    /// Chip label as reported by the kernel, for diagnostics.
    fn label(&self) -> &str {
        ""
    }
}

/// A line taken from a chip but not yet requested
pub trait GpioLine {
    /// Requested handle type
    type Handle: LineHandle;

    /// Request the line as an input.
    fn request_input(self, consumer: &str) -> HalResult<Self::Handle>;

    /// Request the line as an output driven to `initial`.
    fn request_output(self, consumer: &str, initial: Level) -> HalResult<Self::Handle>;
}

/// A requested line with a fixed direction
pub trait LineHandle {
    /// Read the raw value reported by the kernel.
    ///
    /// Implementations return the value untouched so that callers can reject
    /// anything outside `0`/`1`.
    fn value(&self) -> HalResult<u8>;

    /// Drive the line (output handles only).
    fn set_value(&mut self, level: Level) -> HalResult<()>;

    /// Hand the line back to the kernel.
    fn release(self) -> HalResult<()>;
}
