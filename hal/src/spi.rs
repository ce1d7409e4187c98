//! SPI (Serial Peripheral Interface) abstraction

use std::path::{Path, PathBuf};

use crate::error::HalResult;

/// Word size used by every transfer.
pub const BITS_PER_WORD: u8 = 8;

/// SPI mode (clock polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

impl SpiMode {
    /// Keeps only the CPOL/CPHA bits, so 4..=255 fold onto 0..=3.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Mode0,
            1 => Self::Mode1,
            2 => Self::Mode2,
            _ => Self::Mode3,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode1 => 1,
            Self::Mode2 => 2,
            Self::Mode3 => 3,
        }
    }
}

/// Per-transfer parameters handed to the kernel with every message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferParams {
    pub speed_hz: u32,
    pub bits_per_word: u8,
    pub delay_usecs: u16,
}

impl TransferParams {
    /// Parameters applied at setup: 8-bit words, no inter-transfer delay.
    pub fn with_speed(speed_hz: u32) -> Self {
        Self {
            speed_hz,
            bits_per_word: BITS_PER_WORD,
            delay_usecs: 0,
        }
    }
}

/// Device node for `bus`/`channel` under `dev_root`, e.g. `/dev/spidev0.1`.
pub fn device_path(dev_root: &Path, bus: u8, channel: u8) -> PathBuf {
    dev_root.join(format!("spidev{bus}.{channel}"))
}

/// Opens SPI device nodes
pub trait SpiBackend {
    /// Open device handle type
    type Device: SpiDevice;

    /// Open the node at `path` for reading and writing.
    fn open(&mut self, path: &Path) -> HalResult<Self::Device>;
}

/// An open SPI device node
///
/// The three setters map one-to-one onto the kernel's configuration requests
/// and are applied separately so a caller can tell which one was rejected.
pub trait SpiDevice {
    fn set_mode(&mut self, mode: SpiMode) -> HalResult<()>;

    fn set_bits_per_word(&mut self, bits: u8) -> HalResult<()>;

    fn set_max_speed_hz(&mut self, speed_hz: u32) -> HalResult<()>;

    /// Full-duplex transfer in place: `buf` is transmitted and overwritten
    /// with the bytes clocked in. Returns the kernel's non-negative result.
    fn transfer(&mut self, buf: &mut [u8], params: &TransferParams) -> HalResult<usize>;

    /// Close the handle, reporting any error from the close itself.
    fn close(self) -> HalResult<()>;
}
