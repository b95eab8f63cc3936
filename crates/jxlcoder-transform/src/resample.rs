//! Software resampling of decoded RGBA images

use crate::layout::CropRect;
use image::imageops::{self, FilterType};
use image::Rgba32FImage;
use jxlcoder_core::{ImageSize, JxlError, JxlResult, ResizeFilter};

/// Interpolation kernel used by `image` for a [`ResizeFilter`]
pub fn filter_type(filter: ResizeFilter) -> FilterType {
    match filter {
        ResizeFilter::Nearest => FilterType::Nearest,
        ResizeFilter::Bilinear => FilterType::Triangle,
        ResizeFilter::Bicubic => FilterType::CatmullRom,
        ResizeFilter::Gaussian => FilterType::Gaussian,
        ResizeFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Crop interleaved RGBA `pixels` of `size` to `crop` and resize to `target`
///
/// Returns the input untouched when no crop or resize is needed.
pub fn resample_rgba(
    pixels: Vec<f32>,
    size: ImageSize,
    crop: CropRect,
    target: ImageSize,
    filter: ResizeFilter,
) -> JxlResult<Vec<f32>> {
    if crop.is_full(size) && size == target {
        return Ok(pixels);
    }

    let image = Rgba32FImage::from_raw(size.width, size.height, pixels).ok_or_else(|| {
        JxlError::InvalidBuffer(format!(
            "RGBA buffer does not hold {}x{} pixels",
            size.width, size.height
        ))
    })?;

    if crop.x + crop.width > size.width || crop.y + crop.height > size.height {
        return Err(JxlError::InvalidDimensions {
            width: crop.width,
            height: crop.height,
        });
    }

    let cropped = if crop.is_full(size) {
        image
    } else {
        imageops::crop_imm(&image, crop.x, crop.y, crop.width, crop.height).to_image()
    };

    if cropped.dimensions() == (target.width, target.height) {
        return Ok(cropped.into_raw());
    }

    Ok(imageops::resize(&cropped, target.width, target.height, filter_type(filter)).into_raw())
}
