//! Pixel buffer data structures

use crate::{ImageSize, JxlError, JxlResult, PixelFormat};

/// Allocate a vector of `len` copies of `value`, reporting allocation
/// failure as [`JxlError::OutOfMemory`] instead of aborting
pub fn try_alloc<T: Clone>(len: usize, value: T) -> JxlResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| JxlError::OutOfMemory {
            requested: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    buf.resize(len, value);
    Ok(buf)
}

/// A decoded or to-be-encoded image in a concrete pixel format
///
/// Rows are `stride` bytes apart; only the first
/// `width * format.bytes_per_pixel()` bytes of each row carry pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    stride: u32,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zeroed buffer with a tightly packed stride
    pub fn new(width: u32, height: u32, format: PixelFormat) -> JxlResult<Self> {
        if width == 0 || height == 0 {
            return Err(JxlError::InvalidDimensions { width, height });
        }

        let stride = Self::min_stride(width, format)?;
        let len = stride as usize * height as usize;
        let samples = try_alloc(len, 0u8)?;

        Ok(Self {
            width,
            height,
            format,
            stride,
            samples,
        })
    }

    /// Wrap existing samples, validating the stride and length invariants
    pub fn from_samples(
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: u32,
        samples: Vec<u8>,
    ) -> JxlResult<Self> {
        if width == 0 || height == 0 {
            return Err(JxlError::InvalidDimensions { width, height });
        }

        let min_stride = Self::min_stride(width, format)?;
        if stride < min_stride {
            return Err(JxlError::InvalidBuffer(format!(
                "stride {} is smaller than {} bytes per row",
                stride, min_stride
            )));
        }

        let expected = stride as usize * height as usize;
        if samples.len() != expected {
            return Err(JxlError::InvalidBuffer(format!(
                "expected {} sample bytes, got {}",
                expected,
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            format,
            stride,
            samples,
        })
    }

    /// Wrap tightly packed samples
    pub fn from_packed(
        width: u32,
        height: u32,
        format: PixelFormat,
        samples: Vec<u8>,
    ) -> JxlResult<Self> {
        let stride = Self::min_stride(width, format)?;
        Self::from_samples(width, height, format, stride, samples)
    }

    fn min_stride(width: u32, format: PixelFormat) -> JxlResult<u32> {
        u32::try_from(width as u64 * format.bytes_per_pixel() as u64).map_err(|_| {
            JxlError::InvalidBuffer(format!("row of {} pixels overflows the stride", width))
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// Pixel bytes of row `y`, without stride padding
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride as usize;
        &self.samples[start..start + self.row_bytes()]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride as usize;
        let len = self.row_bytes();
        &mut self.samples[start..start + len]
    }

    /// Number of meaningful bytes per row
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }
}

/// One frame of an animation to be encoded
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub buffer: PixelBuffer,
    pub duration_ms: u32,
}

impl AnimationFrame {
    pub fn new(buffer: PixelBuffer, duration_ms: u32) -> Self {
        Self {
            buffer,
            duration_ms,
        }
    }
}
