//! # jxlcoder
//!
//! An in-process JPEG XL image codec façade: signature sniffing, bounded
//! metadata reads, decoding into a chosen pixel format with optional
//! scaled decode, and encoding at a chosen quality and effort.
//!
//! ## Quick Start
//!
//! ### Decoding
//!
//! ```no_run
//! use jxlcoder::{DecodeOptions, JxlCoder, PixelFormat, ScaleMode};
//!
//! let data = std::fs::read("input.jxl").unwrap();
//! let coder = JxlCoder::new();
//! if coder.is_supported(&data) {
//!     let size = coder.read_size(&data).unwrap();
//!     let options = DecodeOptions::new()
//!         .format(PixelFormat::Rgba8888)
//!         .bounds(size.width / 4, size.height / 4)
//!         .scale_mode(ScaleMode::Fit);
//!     let pixels = coder.decode(&data, &options).unwrap();
//!     println!("Decoded {}x{}", pixels.width(), pixels.height());
//! }
//! ```
//!
//! ### Encoding
//!
//! ```no_run
//! use jxlcoder::{EncodeSettings, JxlCoder, PixelBuffer, PixelFormat};
//!
//! let pixels = PixelBuffer::new(800, 600, PixelFormat::Rgba8888).unwrap();
//! let settings = EncodeSettings::new().quality(90).effort(7);
//! let bytes = JxlCoder::new().encode(&pixels, &settings).unwrap();
//! std::fs::write("output.jxl", bytes).unwrap();
//! ```
//!
//! Every call is synchronous and keeps no state between calls, so one
//! [`JxlCoder`] can be shared across threads. [`batch`] runs many decodes
//! on the rayon pool and reports results over a channel.

pub mod batch;

use log::debug;

// Re-export core types
pub use jxlcoder_core::consts;
pub use jxlcoder_core::{CODESTREAM_SIGNATURE, CONTAINER_SIGNATURE};
pub use jxlcoder_core::{
    AnimationFrame, ColorEncoding, ColorSpace, CompressionOption, DecodeDefaults, DecodeOptions,
    DecodeRequest, EncodeSettings, FrameInfo, ImageSize, JxlError, JxlResult, Orientation,
    PixelBuffer, PixelFormat, ResizeFilter, SampleKind, ScaleMode, ToneMapper,
};

// Re-export codec components
pub use jxlcoder_decoder::JxlDecoder;
pub use jxlcoder_encoder::JxlEncoder;
pub use jxlcoder_headers::{AnimationHeader, ImageHeader, Signature};

pub use batch::{spawn_decode_batch, DecodeJob, DecodeOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration shared by every call on a [`JxlCoder`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoderConfig {
    /// Values for decode options left unset by the caller
    pub decode_defaults: DecodeDefaults,
    /// Largest image, in pixels, the decoder accepts
    pub max_pixels: u64,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            decode_defaults: DecodeDefaults::default(),
            max_pixels: consts::DEFAULT_MAX_PIXELS,
        }
    }
}

/// JPEG XL codec façade
#[derive(Debug, Clone)]
pub struct JxlCoder {
    config: CoderConfig,
    decoder: JxlDecoder,
}

impl JxlCoder {
    pub fn new() -> Self {
        Self::with_config(CoderConfig::default())
    }

    pub fn with_config(config: CoderConfig) -> Self {
        Self {
            config,
            decoder: JxlDecoder::with_max_pixels(config.max_pixels),
        }
    }

    pub fn config(&self) -> &CoderConfig {
        &self.config
    }

    /// Whether `data` starts with a JPEG XL signature
    pub fn is_supported(&self, data: &[u8]) -> bool {
        jxlcoder_headers::is_supported(data)
    }

    /// Which signature `data` starts with, if any
    pub fn signature(&self, data: &[u8]) -> Option<Signature> {
        jxlcoder_headers::detect_signature(data)
    }

    /// Intrinsic size, reading only the header region
    pub fn read_size(&self, data: &[u8]) -> JxlResult<ImageSize> {
        jxlcoder_headers::read_size(data)
    }

    /// Full image header, reading only the header region
    pub fn read_header(&self, data: &[u8]) -> JxlResult<ImageHeader> {
        jxlcoder_headers::read_header(data)
    }

    pub fn is_animated(&self, data: &[u8]) -> bool {
        jxlcoder_headers::is_animated(data)
    }

    /// Frame indices and durations of an image
    pub fn frames(&self, data: &[u8]) -> JxlResult<Vec<FrameInfo>> {
        self.decoder.frames(data)
    }

    /// Decode with `options`, filling unset values from the configured defaults
    pub fn decode(&self, data: &[u8], options: &DecodeOptions) -> JxlResult<PixelBuffer> {
        let request = options.resolve(&self.config.decode_defaults);
        debug!("decode request {:?}", request);
        self.decoder.decode(data, &request)
    }

    /// Decode into `bounds`, overriding any bounds set in `options`
    pub fn decode_sampled(
        &self,
        data: &[u8],
        bounds: ImageSize,
        options: &DecodeOptions,
    ) -> JxlResult<PixelBuffer> {
        let options = options.bounds(bounds.width, bounds.height);
        self.decode(data, &options)
    }

    /// Encode a still image
    pub fn encode(&self, buffer: &PixelBuffer, settings: &EncodeSettings) -> JxlResult<Vec<u8>> {
        JxlEncoder::new(*settings).encode(buffer)
    }

    /// Encode an animation; `num_loops` 0 loops forever
    pub fn encode_animation(
        &self,
        frames: &[AnimationFrame],
        settings: &EncodeSettings,
        num_loops: u32,
    ) -> JxlResult<Vec<u8>> {
        JxlEncoder::new(*settings).encode_animation(frames, num_loops)
    }
}

impl Default for JxlCoder {
    fn default() -> Self {
        Self::new()
    }
}
