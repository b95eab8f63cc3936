//! Encode settings and decode options

use crate::{
    consts, ColorSpace, CompressionOption, ImageSize, JxlError, JxlResult, PixelFormat,
    ResizeFilter, ScaleMode, ToneMapper,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Encoder settings
///
/// Values are stored as given; [`EncodeSettings::validate`] rejects out of
/// range values before any encoding work starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EncodeSettings {
    /// Whether alpha is stored
    pub color_space: ColorSpace,
    /// Lossy or lossless compression
    pub compression: CompressionOption,
    /// Encoding effort (0-9, higher is slower but smaller)
    pub effort: u8,
    /// Quality (0-100, higher is better). Ignored by lossless compression.
    pub quality: u8,
    /// Wrap the codestream in the box container
    pub container: bool,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            color_space: ColorSpace::Rgba,
            compression: CompressionOption::Lossy,
            effort: consts::DEFAULT_EFFORT,
            quality: consts::DEFAULT_QUALITY,
            container: false,
        }
    }
}

impl EncodeSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn effort(mut self, effort: u8) -> Self {
        self.effort = effort;
        self
    }

    pub fn lossless(mut self, lossless: bool) -> Self {
        self.compression = if lossless {
            CompressionOption::Lossless
        } else {
            CompressionOption::Lossy
        };
        self
    }

    pub fn color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    pub fn container(mut self, container: bool) -> Self {
        self.container = container;
        self
    }

    pub fn is_lossless(&self) -> bool {
        self.compression == CompressionOption::Lossless
    }

    /// Check every range-limited field
    pub fn validate(&self) -> JxlResult<()> {
        if !(consts::MIN_QUALITY..=consts::MAX_QUALITY).contains(&self.quality) {
            return Err(JxlError::InvalidSettings(format!(
                "quality {} outside {}..={}",
                self.quality,
                consts::MIN_QUALITY,
                consts::MAX_QUALITY
            )));
        }
        if !(consts::MIN_EFFORT..=consts::MAX_EFFORT).contains(&self.effort) {
            return Err(JxlError::InvalidSettings(format!(
                "effort {} outside {}..={}",
                self.effort,
                consts::MIN_EFFORT,
                consts::MAX_EFFORT
            )));
        }
        Ok(())
    }
}

/// Values used for decode options a caller leaves unset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodeDefaults {
    pub format: PixelFormat,
    pub scale_mode: ScaleMode,
    pub filter: ResizeFilter,
    pub tone_mapper: ToneMapper,
}

impl Default for DecodeDefaults {
    fn default() -> Self {
        Self {
            format: PixelFormat::Rgba8888,
            scale_mode: ScaleMode::Fit,
            filter: ResizeFilter::Bicubic,
            tone_mapper: ToneMapper::None,
        }
    }
}

/// Optional decode parameters
///
/// - `format`: output pixel format; the output always has exactly this format
/// - `bounds`: target bounding box; `None` decodes at intrinsic size
/// - `scale_mode`: how `bounds` is applied, see [`ScaleMode`]
/// - `filter`: kernel used when software resampling is needed
/// - `tone_mapper`: curve for narrowing HDR samples to integer formats
/// - `frame`: frame index of an animated image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodeOptions {
    pub format: Option<PixelFormat>,
    pub bounds: Option<ImageSize>,
    pub scale_mode: Option<ScaleMode>,
    pub filter: Option<ResizeFilter>,
    pub tone_mapper: Option<ToneMapper>,
    pub frame: usize,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: PixelFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn bounds(mut self, width: u32, height: u32) -> Self {
        self.bounds = Some(ImageSize::new(width, height));
        self
    }

    pub fn scale_mode(mut self, scale_mode: ScaleMode) -> Self {
        self.scale_mode = Some(scale_mode);
        self
    }

    pub fn filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn tone_mapper(mut self, tone_mapper: ToneMapper) -> Self {
        self.tone_mapper = Some(tone_mapper);
        self
    }

    pub fn frame(mut self, frame: usize) -> Self {
        self.frame = frame;
        self
    }

    /// Fill unset values from `defaults`
    pub fn resolve(&self, defaults: &DecodeDefaults) -> DecodeRequest {
        DecodeRequest {
            format: self.format.unwrap_or(defaults.format),
            bounds: self.bounds,
            scale_mode: self.scale_mode.unwrap_or(defaults.scale_mode),
            filter: self.filter.unwrap_or(defaults.filter),
            tone_mapper: self.tone_mapper.unwrap_or(defaults.tone_mapper),
            frame: self.frame,
        }
    }
}

/// Fully resolved decode parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeRequest {
    pub format: PixelFormat,
    pub bounds: Option<ImageSize>,
    pub scale_mode: ScaleMode,
    pub filter: ResizeFilter,
    pub tone_mapper: ToneMapper,
    pub frame: usize,
}

impl DecodeRequest {
    /// Request for a full-resolution decode of the first frame
    pub fn new(format: PixelFormat) -> Self {
        DecodeOptions::new().format(format).resolve(&DecodeDefaults::default())
    }
}
