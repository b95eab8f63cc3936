//! Conversion between pixel formats and coded channel planes
//!
//! Encoding unpacks a [`PixelBuffer`] into one integer plane per channel in
//! the format's sample domain. Decoding turns planes into interleaved RGBA
//! `f32` (1.0 = full scale), which is resampled if needed and then packed
//! into the requested format. Tone mapping happens only in that last step.

use crate::half::{f16_bits_to_f32, f16_to_ordered, f32_to_f16_bits, ordered_to_f16};
use crate::tone::tone_map_rgba;
use byteorder::{ByteOrder, LittleEndian};
use jxlcoder_core::*;
use rayon::prelude::*;

/// Sample value of a fully opaque alpha channel
pub fn opaque_value(kind: SampleKind) -> i32 {
    match kind {
        SampleKind::Unsigned { bits } => (1i32 << bits) - 1,
        SampleKind::Float16 => f16_to_ordered(0x3c00),
    }
}

#[inline]
fn expand_5(v: u16) -> i32 {
    ((v << 3) | (v >> 2)) as i32
}

#[inline]
fn expand_6(v: u16) -> i32 {
    ((v << 2) | (v >> 4)) as i32
}

/// Split a pixel buffer into channel planes
///
/// Returns three planes for `ColorSpace::Rgb` and four for
/// `ColorSpace::Rgba`. Formats without alpha get an opaque alpha plane.
pub fn extract_planes(buffer: &PixelBuffer, color_space: ColorSpace) -> JxlResult<Vec<Vec<i32>>> {
    let format = buffer.format();
    let kind = format.sample_kind();
    let channels = color_space.channel_count();
    let pixels = buffer.size().pixel_count() as usize;
    let opaque = opaque_value(kind);

    let mut planes = (0..channels)
        .map(|_| try_alloc(pixels, 0i32))
        .collect::<JxlResult<Vec<_>>>()?;

    let width = buffer.width() as usize;
    for y in 0..buffer.height() {
        let row = buffer.row(y);
        let base = y as usize * width;
        for x in 0..width {
            let rgba = read_pixel(format, row, x, opaque);
            for (c, plane) in planes.iter_mut().enumerate() {
                plane[base + x] = rgba[c];
            }
        }
    }

    Ok(planes)
}

#[inline]
fn read_pixel(format: PixelFormat, row: &[u8], x: usize, opaque: i32) -> [i32; 4] {
    match format {
        PixelFormat::Rgba8888 => {
            let p = &row[x * 4..x * 4 + 4];
            [p[0] as i32, p[1] as i32, p[2] as i32, p[3] as i32]
        }
        PixelFormat::Rgb8888 => {
            let p = &row[x * 4..x * 4 + 4];
            [p[0] as i32, p[1] as i32, p[2] as i32, opaque]
        }
        PixelFormat::Rgb565 => {
            let v = LittleEndian::read_u16(&row[x * 2..x * 2 + 2]);
            [
                expand_5(v >> 11),
                expand_6((v >> 5) & 0x3f),
                expand_5(v & 0x1f),
                opaque,
            ]
        }
        PixelFormat::RgbaF16 => {
            let p = &row[x * 8..x * 8 + 8];
            let mut out = [0i32; 4];
            for (c, value) in out.iter_mut().enumerate() {
                *value = f16_to_ordered(LittleEndian::read_u16(&p[c * 2..c * 2 + 2]));
            }
            out
        }
        PixelFormat::Rgba1010102 => {
            let v = LittleEndian::read_u32(&row[x * 4..x * 4 + 4]);
            [
                (v & 0x3ff) as i32,
                ((v >> 10) & 0x3ff) as i32,
                ((v >> 20) & 0x3ff) as i32,
                (v >> 30) as i32 * 341,
            ]
        }
    }
}

#[inline]
fn sample_to_f32(value: i32, kind: SampleKind) -> f32 {
    match kind {
        SampleKind::Unsigned { .. } => {
            let max = kind.max_value();
            value.clamp(0, max) as f32 / max as f32
        }
        SampleKind::Float16 => f16_bits_to_f32(ordered_to_f16(value)),
    }
}

/// Interleave 3 or 4 planes into RGBA `f32`
///
/// A missing alpha plane reads as 1.0.
pub fn planes_to_rgba(planes: &[Vec<i32>], kind: SampleKind) -> JxlResult<Vec<f32>> {
    if planes.len() < 3 || planes.len() > 4 {
        return Err(JxlError::DecodeError(format!(
            "Expected 3 or 4 channels, got {}",
            planes.len()
        )));
    }
    let pixels = planes[0].len();
    if planes.iter().any(|p| p.len() != pixels) {
        return Err(JxlError::DecodeError(
            "Channel planes differ in size".to_string(),
        ));
    }

    let mut rgba = try_alloc(pixels * 4, 1.0f32)?;
    rgba.par_chunks_mut(4).enumerate().for_each(|(i, pixel)| {
        for (c, plane) in planes.iter().enumerate() {
            pixel[c] = sample_to_f32(plane[i], kind);
        }
    });

    Ok(rgba)
}

/// Brightest color sample of float planes, as a linear value
pub fn max_color_value(planes: &[Vec<i32>], kind: SampleKind) -> f32 {
    if !kind.is_float() {
        return 1.0;
    }
    planes
        .iter()
        .take(3)
        .flat_map(|plane| plane.iter())
        .map(|&v| sample_to_f32(v, kind))
        .filter(|v| v.is_finite())
        .fold(0.0f32, f32::max)
}

#[inline]
fn quantize_unit(value: f32, max: u32) -> u32 {
    let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    (v * max as f32).round() as u32
}

/// Pack interleaved RGBA `f32` into a buffer of `format`
///
/// Sources brighter than standard dynamic range (`peak > 1`) are tone
/// mapped with `tone_mapper` when the target is an integer format. Float
/// targets receive values unchanged.
pub fn pack_rgba(
    mut rgba: Vec<f32>,
    size: ImageSize,
    format: PixelFormat,
    tone_mapper: ToneMapper,
    peak: f32,
) -> JxlResult<PixelBuffer> {
    if rgba.len() as u64 != size.pixel_count() * 4 {
        return Err(JxlError::InvalidBuffer(format!(
            "RGBA data does not hold {}x{} pixels",
            size.width, size.height
        )));
    }
    if !format.is_float() {
        tone_map_rgba(&mut rgba, tone_mapper, peak);
    }

    let mut buffer = PixelBuffer::new(size.width, size.height, format)?;
    let stride = buffer.stride() as usize;
    let row_len = size.width as usize * 4;
    let bpp = format.bytes_per_pixel();

    buffer
        .samples_mut()
        .par_chunks_mut(stride)
        .zip(rgba.par_chunks(row_len))
        .for_each(|(row, src)| {
            for (out, p) in row.chunks_exact_mut(bpp).zip(src.chunks_exact(4)) {
                write_pixel(format, out, p);
            }
        });

    Ok(buffer)
}

#[inline]
fn write_pixel(format: PixelFormat, out: &mut [u8], p: &[f32]) {
    match format {
        PixelFormat::Rgba8888 => {
            for c in 0..4 {
                out[c] = quantize_unit(p[c], 255) as u8;
            }
        }
        PixelFormat::Rgb8888 => {
            for c in 0..3 {
                out[c] = quantize_unit(p[c], 255) as u8;
            }
            out[3] = 0xff;
        }
        PixelFormat::Rgb565 => {
            let r = quantize_unit(p[0], 31) as u16;
            let g = quantize_unit(p[1], 63) as u16;
            let b = quantize_unit(p[2], 31) as u16;
            LittleEndian::write_u16(out, (r << 11) | (g << 5) | b);
        }
        PixelFormat::RgbaF16 => {
            for c in 0..4 {
                LittleEndian::write_u16(&mut out[c * 2..c * 2 + 2], f32_to_f16_bits(p[c]));
            }
        }
        PixelFormat::Rgba1010102 => {
            let r = quantize_unit(p[0], 1023);
            let g = quantize_unit(p[1], 1023);
            let b = quantize_unit(p[2], 1023);
            let a = quantize_unit(p[3], 3);
            LittleEndian::write_u32(out, r | (g << 10) | (b << 20) | (a << 30));
        }
    }
}
