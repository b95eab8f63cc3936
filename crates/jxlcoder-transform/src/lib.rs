//! Transform operations for jxlcoder
//!
//! This crate implements modular prediction with MA-tree context modeling,
//! the reversible squeeze pyramid used for scaled decoding, quantization
//! for lossy compression, target size planning and software resampling.

pub mod layout;
pub mod modular;
pub mod quantization;
pub mod resample;
pub mod squeeze;

pub use layout::*;
pub use modular::*;
pub use quantization::*;
pub use resample::*;
pub use squeeze::*;
