//! SPI implementation using the spidev ioctl interface
//!
//! The node is opened as a plain `File` and every configuration step is issued
//! as its own ioctl, so a rejection can be attributed to the exact step. The
//! fd is closed explicitly on [`SpiDevice::close`] so a failing `close(2)` is
//! reported instead of being swallowed by `Drop`.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::{AsRawFd, IntoRawFd};
use std::path::{Path, PathBuf};

use hal::error::HalResult;
use hal::spi::{SpiBackend, SpiDevice, SpiMode, TransferParams};
use spidev::spidevioctl::{self, SpidevTransfer};
use spidev::SpiModeFlags;

/// Opens spidev nodes read-write
#[derive(Debug, Clone, Copy, Default)]
pub struct Spidev;

impl SpiBackend for Spidev {
    type Device = SpidevDevice;

    fn open(&mut self, path: &Path) -> HalResult<SpidevDevice> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(SpidevDevice {
            file,
            path: path.to_path_buf(),
        })
    }
}

fn mode_flags(mode: SpiMode) -> SpiModeFlags {
    match mode {
        SpiMode::Mode0 => SpiModeFlags::SPI_MODE_0,
        SpiMode::Mode1 => SpiModeFlags::SPI_MODE_1,
        SpiMode::Mode2 => SpiModeFlags::SPI_MODE_2,
        SpiMode::Mode3 => SpiModeFlags::SPI_MODE_3,
    }
}

/// An open spidev node
#[derive(Debug)]
pub struct SpidevDevice {
    file: File,
    path: PathBuf,
}

impl SpidevDevice {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SpiDevice for SpidevDevice {
    fn set_mode(&mut self, mode: SpiMode) -> HalResult<()> {
        spidevioctl::set_mode(self.file.as_raw_fd(), mode_flags(mode))?;
        Ok(())
    }

    fn set_bits_per_word(&mut self, bits: u8) -> HalResult<()> {
        spidevioctl::set_bits_per_word(self.file.as_raw_fd(), bits)?;
        Ok(())
    }

    fn set_max_speed_hz(&mut self, speed_hz: u32) -> HalResult<()> {
        spidevioctl::set_max_speed_hz(self.file.as_raw_fd(), speed_hz)?;
        Ok(())
    }

    fn transfer(&mut self, buf: &mut [u8], params: &TransferParams) -> HalResult<usize> {
        // spi_ioc_transfer takes separate tx/rx pointers; the kernel allows
        // them to alias but the safe wrapper does not, so transmit a copy.
        let tx = buf.to_vec();
        let mut xfer = SpidevTransfer::read_write(&tx, buf);
        xfer.speed_hz = params.speed_hz;
        xfer.delay_usecs = params.delay_usecs;
        xfer.bits_per_word = params.bits_per_word;
        spidevioctl::transfer(self.file.as_raw_fd(), &mut xfer)?;
        Ok(tx.len())
    }

    fn close(self) -> HalResult<()> {
        let fd = self.file.into_raw_fd();
        // SAFETY: `fd` was just released from the owning `File`, nothing else
        // refers to it.
        if unsafe { libc::close(fd) } < 0 {
            return Err(io::Error::last_os_error().into());
        }
        log::trace!("closed {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_flag_mapping() {
        assert_eq!(mode_flags(SpiMode::Mode0), SpiModeFlags::SPI_MODE_0);
        assert_eq!(mode_flags(SpiMode::Mode3), SpiModeFlags::SPI_MODE_3);
    }

    #[test]
    fn missing_node_fails_to_open() {
        let mut spi = Spidev;
        let err = spi.open(Path::new("/nonexistent-dev-root/spidev0.0"));
        assert!(err.is_err());
    }
}
