//! GPIO implementation using the Linux character-device ABI

use std::path::{Path, PathBuf};

use gpio_cdev::{Chip, Line, LineRequestFlags};
use hal::error::{HalError, HalResult};
use hal::gpio::{GpioBackend, GpioChip, GpioLine, Level, LineHandle};

use crate::DEFAULT_DEV_ROOT;

fn cdev_error(err: gpio_cdev::Error) -> HalError {
    HalError::Backend(err.to_string())
}

/// Opens `gpiochipN` nodes below a device root
#[derive(Debug, Clone)]
pub struct CdevGpio {
    dev_root: PathBuf,
}

impl CdevGpio {
    pub fn new(dev_root: impl Into<PathBuf>) -> Self {
        Self {
            dev_root: dev_root.into(),
        }
    }

    /// Path of the character device for chip `index`.
    pub fn chip_path(&self, index: u8) -> PathBuf {
        self.dev_root.join(format!("gpiochip{index}"))
    }

    pub fn dev_root(&self) -> &Path {
        &self.dev_root
    }
}

impl Default for CdevGpio {
    fn default() -> Self {
        Self::new(DEFAULT_DEV_ROOT)
    }
}

impl GpioBackend for CdevGpio {
    type Chip = CdevChip;

    fn open_chip(&mut self, index: u8) -> HalResult<CdevChip> {
        let path = self.chip_path(index);
        let chip = Chip::new(&path).map_err(cdev_error)?;
        log::trace!("opened {} ({})", path.display(), chip.label());
        Ok(CdevChip { chip })
    }
}

/// An open GPIO chip
pub struct CdevChip {
    chip: Chip,
}

impl GpioChip for CdevChip {
    type Line = CdevLine;

    fn line(&mut self, offset: u8) -> HalResult<CdevLine> {
        let line = self.chip.get_line(u32::from(offset)).map_err(cdev_error)?;
        Ok(CdevLine { line })
    }

    fn label(&self) -> &str {
        self.chip.label()
    }
}

/// A line of an open chip, not yet requested
pub struct CdevLine {
    line: Line,
}

impl GpioLine for CdevLine {
    type Handle = CdevHandle;

    fn request_input(self, consumer: &str) -> HalResult<CdevHandle> {
        let handle = self
            .line
            .request(LineRequestFlags::INPUT, 0, consumer)
            .map_err(cdev_error)?;
        Ok(CdevHandle { handle })
    }

    fn request_output(self, consumer: &str, initial: Level) -> HalResult<CdevHandle> {
        let handle = self
            .line
            .request(LineRequestFlags::OUTPUT, initial.as_u8(), consumer)
            .map_err(cdev_error)?;
        Ok(CdevHandle { handle })
    }
}

/// Requested line; the kernel frees it when the handle's fd is closed
pub struct CdevHandle {
    handle: gpio_cdev::LineHandle,
}

impl LineHandle for CdevHandle {
    fn value(&self) -> HalResult<u8> {
        self.handle.get_value().map_err(cdev_error)
    }

    fn set_value(&mut self, level: Level) -> HalResult<()> {
        self.handle.set_value(level.as_u8()).map_err(cdev_error)
    }

    fn release(self) -> HalResult<()> {
        // gpio-cdev closes the line fd on drop
        drop(self.handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chip_paths() {
        let gpio = CdevGpio::default();
        assert_eq!(gpio.chip_path(0), PathBuf::from("/dev/gpiochip0"));

        let gpio = CdevGpio::new("/tmp/fake-dev");
        assert_eq!(gpio.chip_path(12), PathBuf::from("/tmp/fake-dev/gpiochip12"));
    }

    #[test]
    fn missing_chip_fails_to_open() {
        let mut gpio = CdevGpio::new("/nonexistent-dev-root");
        assert!(gpio.open_chip(0).is_err());
    }
}
