//! SPI device registry.
//!
//! Devices are addressed by `(bus, channel)` and backed by the spidev node
//! `spidev<bus>.<channel>` under the configured device root. Setup applies
//! mode, bits-per-word and max speed as three separate kernel requests; the
//! entry records exactly what was applied so every transfer carries the same
//! parameters the kernel holds.
//!
//! A handle is never left open behind the registry's back: if a late setup
//! step fails the fresh handle is closed before the error is returned, and
//! re-running setup for a live key closes the handle it replaces.

use std::path::{Path, PathBuf};

use hal::spi::{self, SpiBackend, SpiDevice, SpiMode, TransferParams};
use hal::HalError;
use log::{debug, warn};

use crate::error::{AcquireStage, ConfigStage, IoOp, WiringError, WiringResult};
use crate::key::ResourceKey;
use crate::registry::{Registry, Sweep};

/// Configuration held for one open device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub path: PathBuf,
    pub mode: SpiMode,
    pub params: TransferParams,
}

struct DeviceEntry<D> {
    device: D,
    config: DeviceConfig,
}

/// Keyed store of open, configured SPI devices
pub struct SpiRegistry<B: SpiBackend> {
    backend: B,
    dev_root: PathBuf,
    devices: Registry<DeviceEntry<B::Device>>,
}

fn apply<D: SpiDevice>(
    device: &mut D,
    mode: SpiMode,
    params: &TransferParams,
) -> Result<(), (ConfigStage, HalError)> {
    device
        .set_mode(mode)
        .map_err(|err| (ConfigStage::Mode, err))?;
    device
        .set_bits_per_word(params.bits_per_word)
        .map_err(|err| (ConfigStage::BitsPerWord, err))?;
    device
        .set_max_speed_hz(params.speed_hz)
        .map_err(|err| (ConfigStage::MaxSpeed, err))
}

impl<B: SpiBackend> SpiRegistry<B> {
    pub fn new(backend: B, dev_root: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            dev_root: dev_root.into(),
            devices: Registry::new(),
        }
    }

    /// Device node backing `bus`/`channel`.
    pub fn path(&self, bus: u8, channel: u8) -> PathBuf {
        spi::device_path(&self.dev_root, bus, channel)
    }

    pub fn dev_root(&self) -> &Path {
        &self.dev_root
    }

    /// Opens and configures the device; `mode` keeps only its low two bits.
    pub fn configure(&mut self, bus: u8, channel: u8, speed_hz: u32, mode: u8) -> WiringResult<()> {
        let key = ResourceKey::new(bus, channel);
        let path = self.path(bus, channel);
        let mode = SpiMode::from_bits(mode);
        let params = TransferParams::with_speed(speed_hz);

        let mut device = self
            .backend
            .open(&path)
            .map_err(|source| WiringError::Acquisition {
                key,
                stage: AcquireStage::DeviceOpen,
                source,
            })?;

        if let Err((stage, source)) = apply(&mut device, mode, &params) {
            warn!("spi {key}: {stage} rejected, closing {}", path.display());
            if let Err(err) = device.close() {
                warn!("spi {key}: closing after failed setup: {err}");
            }
            return Err(WiringError::Configuration { key, stage, source });
        }

        debug!(
            "spi {key}: {} mode {} at {} Hz",
            path.display(),
            mode.bits(),
            speed_hz
        );
        let entry = DeviceEntry {
            device,
            config: DeviceConfig { path, mode, params },
        };
        if let Some(stale) = self.devices.insert(key, entry) {
            warn!("spi {key}: reconfigured while open, closing previous handle");
            if let Err(err) = stale.device.close() {
                warn!("spi {key}: closing previous handle failed: {err}");
            }
        }
        Ok(())
    }

    /// [`configure`](Self::configure) in mode 0.
    pub fn configure_default(&mut self, bus: u8, channel: u8, speed_hz: u32) -> WiringResult<()> {
        self.configure(bus, channel, speed_hz, 0)
    }

    /// Full-duplex transfer of the whole buffer, in place.
    ///
    /// `buf` supplies the bytes sent and receives the bytes clocked in.
    pub fn transfer(&mut self, bus: u8, channel: u8, buf: &mut [u8]) -> WiringResult<usize> {
        let key = ResourceKey::new(bus, channel);
        let entry = self
            .devices
            .get_mut(&key)
            .ok_or(WiringError::NotRegistered(key))?;
        entry
            .device
            .transfer(buf, &entry.config.params)
            .map_err(|source| WiringError::Io {
                key,
                op: IoOp::Transfer,
                source,
            })
    }

    /// Closes the handle and forgets the device.
    pub fn close(&mut self, bus: u8, channel: u8) -> WiringResult<()> {
        let key = ResourceKey::new(bus, channel);
        if !self.devices.contains(&key) {
            return Err(WiringError::NotRegistered(key));
        }
        let entry = self
            .devices
            .remove(&key)
            .ok_or(WiringError::InvariantViolation { key, removed: 0 })?;
        entry.device.close().map_err(|source| WiringError::Io {
            key,
            op: IoOp::Close,
            source,
        })?;
        debug!("spi {key}: closed");
        Ok(())
    }

    /// Closes every open device.
    pub fn close_all(&mut self) -> Sweep {
        let mut sweep = Sweep::default();
        for (key, entry) in self.devices.drain() {
            sweep.removed += 1;
            if let Err(source) = entry.device.close() {
                warn!("spi {key}: close during sweep failed: {source}");
                sweep.failures.push(WiringError::Io {
                    key,
                    op: IoOp::Close,
                    source,
                });
            }
        }
        if sweep.removed > 0 {
            debug!("spi: closed {} device(s)", sweep.removed);
        }
        sweep
    }

    /// Configuration currently applied to a device.
    pub fn config(&self, bus: u8, channel: u8) -> Option<&DeviceConfig> {
        self.devices
            .get(&ResourceKey::new(bus, channel))
            .map(|entry| &entry.config)
    }

    pub fn is_configured(&self, bus: u8, channel: u8) -> bool {
        self.devices.contains(&ResourceKey::new(bus, channel))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.devices.keys()
    }
}
