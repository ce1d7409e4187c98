//! Common error types for HAL operations

use std::io;

use thiserror::Error;

/// HAL operation errors
#[derive(Error, Debug)]
pub enum HalError {
    /// Invalid parameter provided
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// Operation not supported by this implementation
    #[error("operation not supported")]
    NotSupported,
    /// The requested chip, line or device does not exist or is busy
    #[error("device unavailable: {0}")]
    Unavailable(String),
    /// Kernel call failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Error reported by a backend library that has no `io::Error` form
    #[error("backend error: {0}")]
    Backend(String),
}

impl HalError {
    /// Raw OS error code, when the failure came straight from a syscall.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Io(err) => err.raw_os_error(),
            _ => None,
        }
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_os_code() {
        // EBUSY
        let err = HalError::from(io::Error::from_raw_os_error(16));
        assert_eq!(err.raw_os_error(), Some(16));
        assert!(HalError::NotSupported.raw_os_error().is_none());
    }
}
