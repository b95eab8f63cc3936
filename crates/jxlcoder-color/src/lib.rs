//! Color and pixel format conversion for jxlcoder
//!
//! This crate implements:
//! - binary16 <-> f32 conversion and the ordered integer mapping of halves
//! - tone mapping curves for high dynamic range sources
//! - unpacking pixel buffers into channel planes and packing RGBA back

pub mod convert;
pub mod half;
pub mod tone;

pub use convert::*;
pub use half::*;
pub use tone::*;
