//! Constants used throughout jxlcoder

/// Maximum supported image dimension
pub const MAX_IMAGE_DIMENSION: u32 = 1 << 28;

/// Default pixel budget for a single decode (256 megapixels)
pub const DEFAULT_MAX_PIXELS: u64 = 1 << 28;

/// Number of header bytes the metadata reader is allowed to inspect
pub const MAX_HEADER_BYTES: usize = 64;

/// Default quality for lossy encoding (0-100)
pub const DEFAULT_QUALITY: u8 = 90;

/// Default encoding effort (0-9)
pub const DEFAULT_EFFORT: u8 = 7;

/// Minimum and maximum quality values
pub const MIN_QUALITY: u8 = 0;
pub const MAX_QUALITY: u8 = 100;

/// Minimum and maximum effort values
pub const MIN_EFFORT: u8 = 0;
pub const MAX_EFFORT: u8 = 9;

/// Most squeeze levels a frame may carry
pub const MAX_SQUEEZE_LEVELS: usize = 8;

/// Largest quantization step a frame may carry
pub const MAX_QUANT_STEP: u32 = 1 << 16;

/// Lowest effort that stores a squeeze pyramid
pub const SQUEEZE_MIN_EFFORT: u8 = 3;

/// Lowest effort that searches predictors per channel
pub const PREDICTOR_SEARCH_MIN_EFFORT: u8 = 5;

/// Lowest effort that searches every predictor
pub const EXHAUSTIVE_SEARCH_MIN_EFFORT: u8 = 8;

/// Intensity target of standard dynamic range content, in nits
pub const SDR_INTENSITY_TARGET: f32 = 255.0;

/// Ticks per second used for animation frame durations
pub const ANIMATION_TICKS_PER_SECOND: u32 = 1000;
