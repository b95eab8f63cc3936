//! Core value types for jxlcoder

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel layout of a [`PixelBuffer`](crate::PixelBuffer)
///
/// Multi-byte samples are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PixelFormat {
    /// 8-bit R, G, B, A
    Rgba8888,
    /// 8-bit R, G, B and an ignored padding byte
    Rgb8888,
    /// 16-bit packed `R << 11 | G << 5 | B`
    Rgb565,
    /// IEEE-754 binary16 R, G, B, A
    RgbaF16,
    /// 32-bit packed `R | G << 10 | B << 20 | A << 30`
    Rgba1010102,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 5] = [
        PixelFormat::Rgba8888,
        PixelFormat::Rgb8888,
        PixelFormat::Rgb565,
        PixelFormat::RgbaF16,
        PixelFormat::Rgba1010102,
    ];

    /// Returns the size in bytes of one pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8888 | PixelFormat::Rgb8888 | PixelFormat::Rgba1010102 => 4,
            PixelFormat::Rgb565 => 2,
            PixelFormat::RgbaF16 => 8,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(
            self,
            PixelFormat::Rgba8888 | PixelFormat::RgbaF16 | PixelFormat::Rgba1010102
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, PixelFormat::RgbaF16)
    }

    /// Sample domain the codestream uses for this format
    pub fn sample_kind(&self) -> SampleKind {
        match self {
            PixelFormat::Rgba8888 | PixelFormat::Rgb8888 | PixelFormat::Rgb565 => {
                SampleKind::Unsigned { bits: 8 }
            }
            PixelFormat::Rgba1010102 => SampleKind::Unsigned { bits: 10 },
            PixelFormat::RgbaF16 => SampleKind::Float16,
        }
    }
}

/// Integer domain of stored samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    /// Unsigned integers in `0..(1 << bits)`
    Unsigned { bits: u8 },
    /// Order-preserving integer image of binary16 bit patterns
    Float16,
}

impl SampleKind {
    pub fn bits(&self) -> u8 {
        match self {
            SampleKind::Unsigned { bits } => *bits,
            SampleKind::Float16 => 16,
        }
    }

    pub fn min_value(&self) -> i32 {
        match self {
            SampleKind::Unsigned { .. } => 0,
            SampleKind::Float16 => -32768,
        }
    }

    pub fn max_value(&self) -> i32 {
        match self {
            SampleKind::Unsigned { bits } => (1i32 << bits) - 1,
            SampleKind::Float16 => 32767,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SampleKind::Float16)
    }
}

/// Color encoding information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorEncoding {
    /// sRGB color space
    SRGB,
    /// Linear sRGB
    LinearSRGB,
}

/// Orientation of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Identity = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    Transpose = 5,
    Rotate90 = 6,
    AntiTranspose = 7,
    Rotate270 = 8,
}

impl Orientation {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Orientation::Identity,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90,
            7 => Orientation::AntiTranspose,
            8 => Orientation::Rotate270,
            _ => return None,
        })
    }
}

/// How a requested bounding box is reconciled with the intrinsic size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScaleMode {
    /// Largest size inside the bounds that keeps the aspect ratio
    #[default]
    Fit,
    /// Cover the bounds, keep the aspect ratio, crop the overflow
    Fill,
    /// Exactly the bounds, aspect ratio ignored
    Resize,
}

/// Interpolation kernel for software resampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResizeFilter {
    Nearest,
    Bilinear,
    /// Catmull-Rom
    #[default]
    Bicubic,
    Gaussian,
    Lanczos3,
}

/// Curve applied when high dynamic range samples are narrowed to an
/// integer pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ToneMapper {
    /// Clip values above 1.0
    #[default]
    None,
    /// `ln(1 + x) / ln(1 + peak)`
    Logarithmic,
    /// Extended Reinhard with the white point at the source peak
    Rec2408,
    /// Hable filmic curve normalized to the source peak
    Filmic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CompressionOption {
    #[default]
    Lossy,
    Lossless,
}

/// Channels the encoder stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColorSpace {
    /// Color only; alpha is discarded
    Rgb,
    /// Color and alpha
    #[default]
    Rgba,
}

impl ColorSpace {
    pub fn channel_count(&self) -> usize {
        match self {
            ColorSpace::Rgb => 3,
            ColorSpace::Rgba => 4,
        }
    }
}

/// Position and display time of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameInfo {
    pub index: usize,
    /// Display duration in milliseconds (0 for still images)
    pub duration_ms: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::Rgba8888.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Rgb565.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::RgbaF16.bytes_per_pixel(), 8);
        assert_eq!(PixelFormat::Rgba1010102.bytes_per_pixel(), 4);
    }

    #[test]
    fn test_sample_kind_range() {
        let kind = PixelFormat::Rgba1010102.sample_kind();
        assert_eq!(kind.min_value(), 0);
        assert_eq!(kind.max_value(), 1023);
        assert_eq!(SampleKind::Float16.min_value(), -32768);
    }

    #[test]
    fn test_orientation_from_u8() {
        assert_eq!(Orientation::from_u8(6), Some(Orientation::Rotate90));
        assert_eq!(Orientation::from_u8(0), None);
    }
}
