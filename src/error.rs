//! Error types for simdpix operations.

use std::fmt;

use crate::simd::Tier;
use crate::types::ImageFileType;

/// Result type for simdpix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for simdpix operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid image dimensions (zero width or height, or overflow)
    InvalidDimensions {
        /// Image width in pixels
        width: usize,
        /// Image height in pixels
        height: usize,
    },
    /// Row stride is smaller than the bytes needed for one row
    InvalidStride {
        /// Row stride in bytes
        stride: usize,
        /// Bytes required by one row
        row_bytes: usize,
    },
    /// Buffer is too small for the described plane
    BufferSizeMismatch {
        /// Minimum buffer size in bytes
        expected: usize,
        /// Actual buffer size in bytes
        actual: usize,
    },
    /// Requested SIMD tier is not usable on this machine
    TierUnavailable(Tier),
    /// The encoder produced no output for this file type
    EncodingFailed(ImageFileType),
    /// I/O error
    IoError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDimensions { width, height } => {
                write!(f, "Invalid image dimensions: {}x{}", width, height)
            }
            Error::InvalidStride { stride, row_bytes } => {
                write!(
                    f,
                    "Invalid stride: {} is smaller than row size {}",
                    stride, row_bytes
                )
            }
            Error::BufferSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Buffer size mismatch: expected at least {}, got {}",
                    expected, actual
                )
            }
            Error::TierUnavailable(tier) => {
                write!(f, "SIMD tier {} is not available on this CPU", tier.name())
            }
            Error::EncodingFailed(file) => {
                write!(f, "Encoding failed for file type {:?}", file)
            }
            Error::IoError(msg) => {
                write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}
