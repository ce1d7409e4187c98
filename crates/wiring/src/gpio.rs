//! GPIO line registry.
//!
//! Lines are addressed by `(chip, pin)`. Registration opens the chip, takes
//! the line and requests it with a fixed direction; the requested handle then
//! lives in the registry until it is released. Changing direction means
//! release followed by a fresh registration, the kernel has no way to flip a
//! live request.

use hal::gpio::{GpioBackend, GpioChip, GpioLine, Level, LineHandle, PinMode};
use log::{debug, warn};

use crate::error::{AcquireStage, IoOp, WiringError, WiringResult};
use crate::key::ResourceKey;
use crate::registry::{Registry, Sweep};

type LineOf<B> = <<B as GpioBackend>::Chip as GpioChip>::Line;
type HandleOf<B> = <LineOf<B> as GpioLine>::Handle;

/// A requested line together with the chip that produced it
pub struct LineEntry<B: GpioBackend> {
    handle: HandleOf<B>,
    chip: B::Chip,
    mode: PinMode,
}

impl<B: GpioBackend> LineEntry<B> {
    pub fn mode(&self) -> PinMode {
        self.mode
    }

    pub fn chip_label(&self) -> &str {
        self.chip.label()
    }
}

/// Keyed store of requested GPIO lines
pub struct GpioRegistry<B: GpioBackend> {
    backend: B,
    consumer: String,
    lines: Registry<LineEntry<B>>,
}

impl<B: GpioBackend> GpioRegistry<B> {
    pub fn new(backend: B, consumer: impl Into<String>) -> Self {
        Self {
            backend,
            consumer: consumer.into(),
            lines: Registry::new(),
        }
    }

    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    /// Requests `pin` on `chip` as an input or as an output driven low.
    ///
    /// Nothing is stored unless every step succeeds.
    pub fn register(&mut self, chip: u8, pin: u8, mode: PinMode) -> WiringResult<()> {
        let key = ResourceKey::new(chip, pin);
        let acquisition = move |stage| move |source| WiringError::Acquisition { key, stage, source };

        let mut chip_handle = self
            .backend
            .open_chip(chip)
            .map_err(acquisition(AcquireStage::ChipOpen))?;
        let line = chip_handle
            .line(pin)
            .map_err(acquisition(AcquireStage::LineGet))?;
        let handle = match mode {
            PinMode::Input => line
                .request_input(&self.consumer)
                .map_err(acquisition(AcquireStage::InputRequest))?,
            PinMode::Output => line
                .request_output(&self.consumer, Level::Low)
                .map_err(acquisition(AcquireStage::OutputRequest))?,
        };

        debug!("gpio {key}: requested as {mode:?} on {}", chip_handle.label());
        let entry = LineEntry {
            handle,
            chip: chip_handle,
            mode,
        };
        if let Some(stale) = self.lines.insert(key, entry) {
            warn!("gpio {key}: replaced a live {:?} request", stale.mode);
            if let Err(err) = stale.handle.release() {
                warn!("gpio {key}: releasing replaced line failed: {err}");
            }
        }
        Ok(())
    }

    /// Current logic level of a registered line.
    pub fn read(&self, chip: u8, pin: u8) -> WiringResult<Level> {
        let key = ResourceKey::new(chip, pin);
        let entry = self.lines.get(&key).ok_or(WiringError::NotRegistered(key))?;
        let raw = entry.handle.value().map_err(|source| WiringError::Io {
            key,
            op: IoOp::Read,
            source,
        })?;
        Level::from_raw(raw).ok_or(WiringError::InvalidLevel { key, raw })
    }

    /// Drives a registered line; any non-zero `state` is high.
    pub fn write(&mut self, chip: u8, pin: u8, state: u8) -> WiringResult<()> {
        self.set_level(chip, pin, Level::from_state(state))
    }

    pub fn set_level(&mut self, chip: u8, pin: u8, level: Level) -> WiringResult<()> {
        let key = ResourceKey::new(chip, pin);
        let entry = self
            .lines
            .get_mut(&key)
            .ok_or(WiringError::NotRegistered(key))?;
        entry
            .handle
            .set_value(level)
            .map_err(|source| WiringError::Io {
                key,
                op: IoOp::Write,
                source,
            })
    }

    /// Removes the entry and hands the line back to the kernel.
    ///
    /// The release itself is best-effort: once attempted the entry is gone,
    /// and a failure is only logged.
    pub fn release(&mut self, chip: u8, pin: u8) -> WiringResult<()> {
        let key = ResourceKey::new(chip, pin);
        let entry = self
            .lines
            .remove(&key)
            .ok_or(WiringError::NotRegistered(key))?;
        if let Err(err) = entry.handle.release() {
            warn!("gpio {key}: release failed: {err}");
        } else {
            debug!("gpio {key}: released");
        }
        Ok(())
    }

    /// Releases every live line.
    pub fn release_all(&mut self) -> Sweep {
        let mut sweep = Sweep::default();
        for (key, entry) in self.lines.drain() {
            sweep.removed += 1;
            if let Err(source) = entry.handle.release() {
                warn!("gpio {key}: release during sweep failed: {source}");
                sweep.failures.push(WiringError::Io {
                    key,
                    op: IoOp::Release,
                    source,
                });
            }
        }
        if sweep.removed > 0 {
            debug!("gpio: released {} line(s)", sweep.removed);
        }
        sweep
    }

    /// Direction a line was registered with.
    pub fn mode(&self, chip: u8, pin: u8) -> Option<PinMode> {
        self.lines
            .get(&ResourceKey::new(chip, pin))
            .map(LineEntry::mode)
    }

    pub fn entry(&self, chip: u8, pin: u8) -> Option<&LineEntry<B>> {
        self.lines.get(&ResourceKey::new(chip, pin))
    }

    pub fn is_registered(&self, chip: u8, pin: u8) -> bool {
        self.lines.contains(&ResourceKey::new(chip, pin))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.lines.keys()
    }
}
