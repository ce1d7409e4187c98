//! Error taxonomy shared by every registry operation.

use core::fmt;

use hal::HalError;
use thiserror::Error;

use crate::key::ResourceKey;

/// Broad failure class, the thing callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No live entry for the key
    NotRegistered,
    /// Opening or requesting the resource failed
    Acquisition,
    /// A kernel configuration step was rejected
    Configuration,
    /// A value read/write, transfer or close was rejected
    IoFault,
    /// Registry bookkeeping disagreed with itself
    InvariantViolation,
    /// Anything else
    Unexpected,
}

/// Acquisition step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquireStage {
    ChipOpen,
    LineGet,
    InputRequest,
    OutputRequest,
    DeviceOpen,
}

impl fmt::Display for AcquireStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChipOpen => write!(f, "chip open"),
            Self::LineGet => write!(f, "line lookup"),
            Self::InputRequest => write!(f, "input request"),
            Self::OutputRequest => write!(f, "output request"),
            Self::DeviceOpen => write!(f, "device open"),
        }
    }
}

/// SPI configuration step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigStage {
    Mode,
    BitsPerWord,
    MaxSpeed,
}

impl fmt::Display for ConfigStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mode => write!(f, "mode"),
            Self::BitsPerWord => write!(f, "bits per word"),
            Self::MaxSpeed => write!(f, "max speed"),
        }
    }
}

/// Operation on a live resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoOp {
    Read,
    Write,
    Release,
    Transfer,
    Close,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Release => write!(f, "release"),
            Self::Transfer => write!(f, "transfer"),
            Self::Close => write!(f, "close"),
        }
    }
}

/// Errors returned by registry and clock operations
#[derive(Error, Debug)]
pub enum WiringError {
    #[error("{0} is not registered")]
    NotRegistered(ResourceKey),
    #[error("{stage} failed for {key}: {source}")]
    Acquisition {
        key: ResourceKey,
        stage: AcquireStage,
        source: HalError,
    },
    #[error("monotonic clock unavailable: {0}")]
    ClockUnavailable(#[source] HalError),
    #[error("setting {stage} failed for {key}: {source}")]
    Configuration {
        key: ResourceKey,
        stage: ConfigStage,
        source: HalError,
    },
    #[error("{op} failed on {key}: {source}")]
    Io {
        key: ResourceKey,
        op: IoOp,
        source: HalError,
    },
    #[error("line {key} read back {raw}, expected 0 or 1")]
    InvalidLevel { key: ResourceKey, raw: u8 },
    #[error("removing {key} affected {removed} entries")]
    InvariantViolation { key: ResourceKey, removed: usize },
    #[error("unexpected fault: {0}")]
    Unexpected(String),
}

impl WiringError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotRegistered(_) => ErrorKind::NotRegistered,
            Self::Acquisition { .. } | Self::ClockUnavailable(_) => ErrorKind::Acquisition,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Io { .. } | Self::InvalidLevel { .. } => ErrorKind::IoFault,
            Self::InvariantViolation { .. } => ErrorKind::InvariantViolation,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Key the failure is about, if any.
    pub fn key(&self) -> Option<ResourceKey> {
        match self {
            Self::NotRegistered(key)
            | Self::Acquisition { key, .. }
            | Self::Configuration { key, .. }
            | Self::Io { key, .. }
            | Self::InvalidLevel { key, .. }
            | Self::InvariantViolation { key, .. } => Some(*key),
            Self::ClockUnavailable(_) | Self::Unexpected(_) => None,
        }
    }

    /// Legacy signed status code.
    ///
    /// Codes are per-operation in the legacy API; the step that failed already
    /// pins down the operation, so one mapping serves all of them.
    pub fn code(&self) -> i8 {
        match self {
            Self::NotRegistered(_) | Self::Unexpected(_) => -1,
            Self::Acquisition { stage, .. } => match stage {
                AcquireStage::ChipOpen | AcquireStage::DeviceOpen => -2,
                AcquireStage::LineGet => -3,
                AcquireStage::InputRequest => -4,
                AcquireStage::OutputRequest => -5,
            },
            Self::ClockUnavailable(_) => -2,
            Self::Configuration { stage, .. } => match stage {
                ConfigStage::Mode => -3,
                ConfigStage::BitsPerWord => -4,
                ConfigStage::MaxSpeed => -5,
            },
            Self::Io { .. } | Self::InvalidLevel { .. } => -2,
            Self::InvariantViolation { .. } => -3,
        }
    }
}

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;
