//! Core types and utilities for jxlcoder
//!
//! This crate provides the value types shared by every jxlcoder component:
//! pixel formats and buffers, scaling and tone mapping policies, encode
//! settings, decode options and the error taxonomy.

pub mod consts;
pub mod error;
pub mod image;
pub mod options;
pub mod predictor;
pub mod types;

pub use error::{JxlError, JxlResult};
pub use image::*;
pub use options::*;
pub use predictor::Predictor;
pub use types::*;

/// Naked codestream signature
pub const CODESTREAM_SIGNATURE: [u8; 2] = [0xFF, 0x0A];

/// Container signature box
///
/// Format: `\0\0\0\x0C JXL \x0D\x0A\x87\x0A`
pub const CONTAINER_SIGNATURE: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, // Box size = 12
    0x4A, 0x58, 0x4C, 0x20, // "JXL "
    0x0D, 0x0A, 0x87, 0x0A, // CR LF 0x87 LF
];
