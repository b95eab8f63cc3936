//! Bitstream reading and writing for jxlcoder
//!
//! This crate provides LSB-first bit I/O and the adaptive Golomb-Rice coder
//! used for prediction residuals.

pub mod bitreader;
pub mod bitwriter;
pub mod rice;

pub use bitreader::BitReader;
pub use bitwriter::BitWriter;
pub use rice::{pack_signed, unpack_signed, RiceDecoder, RiceEncoder, RiceState};
