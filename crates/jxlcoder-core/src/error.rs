//! Error types for jxlcoder operations

use thiserror::Error;

/// Result type for jxlcoder operations
pub type JxlResult<T> = Result<T, JxlError>;

/// Errors that can occur while sniffing, decoding or encoding
#[derive(Error, Debug)]
pub enum JxlError {
    /// The leading bytes do not carry a JPEG XL signature
    #[error("Unsupported format: no JPEG XL signature")]
    UnsupportedFormat,

    /// Header metadata is absent or truncated
    #[error("Image metadata not found")]
    NotFound,

    #[error("Decoding error: {0}")]
    DecodeError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Caller supplied encode parameters outside their documented range
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Out of memory: cannot allocate {requested} bytes")]
    OutOfMemory { requested: usize },

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel buffer violates its stride/length invariants
    #[error("Invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl JxlError {
    /// Errors a batch caller may skip and continue past
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, JxlError::InvalidSettings(_))
    }
}
