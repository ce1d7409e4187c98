//! In-memory providers
//!
//! Each mock shares its state through an `Arc<Mutex<..>>`, so a test keeps a
//! clone of the provider to inject failures and to inspect what the "kernel"
//! side saw after the code under test took ownership of its own clone.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{HalError, HalResult};
use crate::gpio::{GpioBackend, GpioChip, GpioLine, Level, LineHandle, PinMode};
use crate::spi::{SpiBackend, SpiDevice, SpiMode, TransferParams};
use crate::timer::{MonotonicSource, Timestamp};

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().expect("mock state poisoned")
}

fn busy() -> HalError {
    HalError::Io(std::io::Error::from_raw_os_error(16))
}

fn eio() -> HalError {
    HalError::Io(std::io::Error::from_raw_os_error(5))
}

// ---------------------------------------------------------------------------
// GPIO
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct RequestedLine {
    mode: PinMode,
    consumer: String,
    raw: u8,
}

#[derive(Debug, Default)]
struct GpioState {
    chips: BTreeMap<u8, u8>,
    requested: BTreeMap<(u8, u8), RequestedLine>,
    inputs: BTreeMap<(u8, u8), u8>,
    reject_requests: BTreeSet<(u8, u8)>,
    reject_reads: BTreeSet<(u8, u8)>,
    reject_writes: BTreeSet<(u8, u8)>,
    reject_releases: BTreeSet<(u8, u8)>,
    chip_opens: usize,
    releases: usize,
}

/// GPIO backend with a fixed set of chips
#[derive(Debug, Clone, Default)]
pub struct MockGpio {
    state: Arc<Mutex<GpioState>>,
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds chip `index` exposing `lines` lines.
    pub fn with_chip(self, index: u8, lines: u8) -> Self {
        lock(&self.state).chips.insert(index, lines);
        self
    }

    /// Sets the raw value an input line reads back.
    pub fn drive(&self, chip: u8, pin: u8, raw: u8) {
        let mut state = lock(&self.state);
        state.inputs.insert((chip, pin), raw);
        if let Some(line) = state.requested.get_mut(&(chip, pin)) {
            line.raw = raw;
        }
    }

    pub fn reject_requests(&self, chip: u8, pin: u8) {
        lock(&self.state).reject_requests.insert((chip, pin));
    }

    pub fn reject_reads(&self, chip: u8, pin: u8) {
        lock(&self.state).reject_reads.insert((chip, pin));
    }

    pub fn reject_writes(&self, chip: u8, pin: u8) {
        lock(&self.state).reject_writes.insert((chip, pin));
    }

    pub fn reject_releases(&self, chip: u8, pin: u8) {
        lock(&self.state).reject_releases.insert((chip, pin));
    }

    pub fn is_requested(&self, chip: u8, pin: u8) -> bool {
        lock(&self.state).requested.contains_key(&(chip, pin))
    }

    pub fn requested_mode(&self, chip: u8, pin: u8) -> Option<PinMode> {
        lock(&self.state).requested.get(&(chip, pin)).map(|line| line.mode)
    }

    pub fn consumer(&self, chip: u8, pin: u8) -> Option<String> {
        lock(&self.state)
            .requested
            .get(&(chip, pin))
            .map(|line| line.consumer.clone())
    }

    /// Level currently held by a requested line.
    pub fn level(&self, chip: u8, pin: u8) -> Option<Level> {
        lock(&self.state)
            .requested
            .get(&(chip, pin))
            .and_then(|line| Level::from_raw(line.raw))
    }

    pub fn requested_count(&self) -> usize {
        lock(&self.state).requested.len()
    }

    pub fn chip_opens(&self) -> usize {
        lock(&self.state).chip_opens
    }

    pub fn releases(&self) -> usize {
        lock(&self.state).releases
    }
}

impl GpioBackend for MockGpio {
    type Chip = MockChip;

    fn open_chip(&mut self, index: u8) -> HalResult<MockChip> {
        let mut state = lock(&self.state);
        let lines = *state
            .chips
            .get(&index)
            .ok_or_else(|| HalError::Unavailable(format!("gpiochip{index}")))?;
        state.chip_opens += 1;
        Ok(MockChip {
            index,
            lines,
            label: format!("mock-chip{index}"),
            state: Arc::clone(&self.state),
        })
    }
}

#[derive(Debug)]
pub struct MockChip {
    index: u8,
    lines: u8,
    label: String,
    state: Arc<Mutex<GpioState>>,
}

impl GpioChip for MockChip {
    type Line = MockLine;

    fn line(&mut self, offset: u8) -> HalResult<MockLine> {
        if offset >= self.lines {
            return Err(HalError::InvalidParameter("line offset out of range"));
        }
        Ok(MockLine {
            key: (self.index, offset),
            state: Arc::clone(&self.state),
        })
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Debug)]
pub struct MockLine {
    key: (u8, u8),
    state: Arc<Mutex<GpioState>>,
}

impl MockLine {
    fn request(self, consumer: &str, mode: PinMode, initial: Level) -> HalResult<MockHandle> {
        let mut state = lock(&self.state);
        if state.reject_requests.contains(&self.key) || state.requested.contains_key(&self.key) {
            return Err(busy());
        }
        let raw = match mode {
            PinMode::Input => state.inputs.get(&self.key).copied().unwrap_or(0),
            PinMode::Output => initial.as_u8(),
        };
        state.requested.insert(
            self.key,
            RequestedLine {
                mode,
                consumer: consumer.to_owned(),
                raw,
            },
        );
        drop(state);
        Ok(MockHandle {
            key: self.key,
            state: self.state,
        })
    }
}

impl GpioLine for MockLine {
    type Handle = MockHandle;

    fn request_input(self, consumer: &str) -> HalResult<MockHandle> {
        self.request(consumer, PinMode::Input, Level::Low)
    }

    fn request_output(self, consumer: &str, initial: Level) -> HalResult<MockHandle> {
        self.request(consumer, PinMode::Output, initial)
    }
}

/// Requested mock line; dropping it frees the line like closing the fd would.
#[derive(Debug)]
pub struct MockHandle {
    key: (u8, u8),
    state: Arc<Mutex<GpioState>>,
}

impl LineHandle for MockHandle {
    fn value(&self) -> HalResult<u8> {
        let state = lock(&self.state);
        if state.reject_reads.contains(&self.key) {
            return Err(eio());
        }
        state
            .requested
            .get(&self.key)
            .map(|line| line.raw)
            .ok_or_else(|| HalError::Unavailable("line not requested".into()))
    }

    fn set_value(&mut self, level: Level) -> HalResult<()> {
        let mut state = lock(&self.state);
        if state.reject_writes.contains(&self.key) {
            return Err(eio());
        }
        match state.requested.get_mut(&self.key) {
            Some(line) if line.mode == PinMode::Output => {
                line.raw = level.as_u8();
                Ok(())
            }
            Some(_) => Err(HalError::Io(std::io::Error::from_raw_os_error(1))),
            None => Err(HalError::Unavailable("line not requested".into())),
        }
    }

    fn release(self) -> HalResult<()> {
        let rejected = lock(&self.state).reject_releases.contains(&self.key);
        drop(self);
        if rejected {
            Err(eio())
        } else {
            Ok(())
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        if state.requested.remove(&self.key).is_some() {
            state.releases += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// SPI
// ---------------------------------------------------------------------------

/// Kernel call a test can make fail for one device node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpiFailure {
    Open,
    Mode,
    BitsPerWord,
    Speed,
    Transfer,
    Close,
}

/// Configuration the mock "kernel" holds for one open handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KernelSpiConfig {
    pub mode: Option<SpiMode>,
    pub bits_per_word: Option<u8>,
    pub max_speed_hz: Option<u32>,
}

/// One transfer as seen by the mock "kernel"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub path: PathBuf,
    pub tx: Vec<u8>,
    pub params: TransferParams,
}

#[derive(Debug, Default)]
struct SpiState {
    nodes: BTreeSet<PathBuf>,
    open: BTreeMap<u64, (PathBuf, KernelSpiConfig)>,
    next_id: u64,
    failures: BTreeSet<(PathBuf, SpiFailure)>,
    replies: BTreeMap<PathBuf, Vec<u8>>,
    transfers: Vec<TransferRecord>,
    closes: Vec<PathBuf>,
}

/// SPI backend with a fixed set of device nodes
///
/// Transfers loop back by default: the bytes clocked in equal the bytes sent,
/// unless a reply was queued with [`MockSpi::reply`].
#[derive(Debug, Clone, Default)]
pub struct MockSpi {
    state: Arc<Mutex<SpiState>>,
}

impl MockSpi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(self, path: impl AsRef<Path>) -> Self {
        lock(&self.state).nodes.insert(path.as_ref().to_path_buf());
        self
    }

    pub fn fail(&self, path: impl AsRef<Path>, failure: SpiFailure) {
        lock(&self.state)
            .failures
            .insert((path.as_ref().to_path_buf(), failure));
    }

    /// Bytes the device answers with on the next transfers to `path`.
    pub fn reply(&self, path: impl AsRef<Path>, bytes: &[u8]) {
        lock(&self.state)
            .replies
            .insert(path.as_ref().to_path_buf(), bytes.to_vec());
    }

    pub fn open_handles(&self) -> usize {
        lock(&self.state).open.len()
    }

    pub fn open_handles_for(&self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        lock(&self.state)
            .open
            .values()
            .filter(|(p, _)| p == path)
            .count()
    }

    /// Kernel-side configuration of the most recently opened live handle.
    pub fn kernel_config(&self, path: impl AsRef<Path>) -> Option<KernelSpiConfig> {
        let path = path.as_ref();
        lock(&self.state)
            .open
            .values()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, cfg)| *cfg)
    }

    pub fn transfers(&self) -> Vec<TransferRecord> {
        lock(&self.state).transfers.clone()
    }

    pub fn closes(&self) -> Vec<PathBuf> {
        lock(&self.state).closes.clone()
    }
}

impl SpiBackend for MockSpi {
    type Device = MockSpiDevice;

    fn open(&mut self, path: &Path) -> HalResult<MockSpiDevice> {
        let mut state = lock(&self.state);
        if !state.nodes.contains(path) {
            return Err(HalError::Io(std::io::Error::from_raw_os_error(2)));
        }
        if state.failures.contains(&(path.to_path_buf(), SpiFailure::Open)) {
            return Err(HalError::Io(std::io::Error::from_raw_os_error(13)));
        }
        let id = state.next_id;
        state.next_id += 1;
        state
            .open
            .insert(id, (path.to_path_buf(), KernelSpiConfig::default()));
        Ok(MockSpiDevice {
            id,
            path: path.to_path_buf(),
            state: Arc::clone(&self.state),
            closed: false,
        })
    }
}

#[derive(Debug)]
pub struct MockSpiDevice {
    id: u64,
    path: PathBuf,
    state: Arc<Mutex<SpiState>>,
    closed: bool,
}

impl MockSpiDevice {
    fn apply(&mut self, failure: SpiFailure, f: impl FnOnce(&mut KernelSpiConfig)) -> HalResult<()> {
        let mut state = lock(&self.state);
        if state.failures.contains(&(self.path.clone(), failure)) {
            return Err(HalError::Io(std::io::Error::from_raw_os_error(22)));
        }
        let (_, cfg) = state
            .open
            .get_mut(&self.id)
            .ok_or_else(|| HalError::Unavailable("handle closed".into()))?;
        f(cfg);
        Ok(())
    }

    fn shut(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        let mut state = lock(&self.state);
        state.open.remove(&self.id);
        state.closes.push(self.path.clone());
        state
            .failures
            .contains(&(self.path.clone(), SpiFailure::Close))
    }
}

impl SpiDevice for MockSpiDevice {
    fn set_mode(&mut self, mode: SpiMode) -> HalResult<()> {
        self.apply(SpiFailure::Mode, |cfg| cfg.mode = Some(mode))
    }

    fn set_bits_per_word(&mut self, bits: u8) -> HalResult<()> {
        self.apply(SpiFailure::BitsPerWord, |cfg| cfg.bits_per_word = Some(bits))
    }

    fn set_max_speed_hz(&mut self, speed_hz: u32) -> HalResult<()> {
        self.apply(SpiFailure::Speed, |cfg| cfg.max_speed_hz = Some(speed_hz))
    }

    fn transfer(&mut self, buf: &mut [u8], params: &TransferParams) -> HalResult<usize> {
        let mut state = lock(&self.state);
        if state
            .failures
            .contains(&(self.path.clone(), SpiFailure::Transfer))
        {
            return Err(eio());
        }
        state.transfers.push(TransferRecord {
            path: self.path.clone(),
            tx: buf.to_vec(),
            params: *params,
        });
        if let Some(reply) = state.replies.get(&self.path) {
            for (dst, src) in buf.iter_mut().zip(reply.iter()) {
                *dst = *src;
            }
        }
        Ok(buf.len())
    }

    fn close(mut self) -> HalResult<()> {
        if self.shut() {
            Err(eio())
        } else {
            Ok(())
        }
    }
}

impl Drop for MockSpiDevice {
    fn drop(&mut self) {
        self.shut();
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ClockState {
    now: Timestamp,
    unavailable: bool,
}

/// Manually advanced monotonic source
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    state: Arc<Mutex<ClockState>>,
}

impl MockClock {
    pub fn starting_at(now: Timestamp) -> Self {
        let clock = Self::default();
        lock(&clock.state).now = now;
        clock
    }

    pub fn advance(&self, by: Duration) {
        let mut state = lock(&self.state);
        let total = Duration::new(state.now.secs, state.now.nanos) + by;
        state.now = Timestamp::new(total.as_secs(), total.subsec_nanos());
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        lock(&self.state).unavailable = unavailable;
    }
}

impl MonotonicSource for MockClock {
    fn now(&self) -> HalResult<Timestamp> {
        let state = lock(&self.state);
        if state.unavailable {
            return Err(HalError::NotSupported);
        }
        Ok(state.now)
    }
}
