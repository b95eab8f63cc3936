//! Image header
//!
//! The image header follows the 16-bit signature and describes the whole
//! image: dimensions, sample kind, alpha, color encoding, orientation,
//! intensity target and the optional animation time base. It always fits
//! in [`MAX_HEADER_BYTES`](jxlcoder_core::consts::MAX_HEADER_BYTES).

use crate::animation::AnimationHeader;
use jxlcoder_bitstream::{BitReader, BitWriter};
use jxlcoder_core::consts::{MAX_IMAGE_DIMENSION, SDR_INTENSITY_TARGET};
use jxlcoder_core::*;
use std::io::{Read, Write};

/// Codestream signature as read LSB-first
pub const SIGNATURE_BITS: u64 = 0x0AFF;

const SIZE_BITS: [usize; 4] = [9, 13, 18, 30];
const DEPTH_BITS: [u8; 3] = [8, 10, 12];

/// Image-wide metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHeader {
    pub size: ImageSize,
    pub sample_kind: SampleKind,
    pub has_alpha: bool,
    pub color_encoding: ColorEncoding,
    pub orientation: Orientation,
    /// Peak luminance in nits; 255 for standard dynamic range
    pub intensity_target: f32,
    pub animation: Option<AnimationHeader>,
}

impl ImageHeader {
    pub fn new(size: ImageSize, sample_kind: SampleKind, has_alpha: bool) -> Self {
        Self {
            size,
            sample_kind,
            has_alpha,
            color_encoding: ColorEncoding::SRGB,
            orientation: Orientation::Identity,
            intensity_target: SDR_INTENSITY_TARGET,
            animation: None,
        }
    }

    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }

    /// Number of coded channels
    pub fn channel_count(&self) -> usize {
        if self.has_alpha {
            4
        } else {
            3
        }
    }

    /// Peak sample value relative to standard dynamic range white
    pub fn peak(&self) -> f32 {
        self.intensity_target / SDR_INTENSITY_TARGET
    }

    pub fn write<W: Write>(&self, writer: &mut BitWriter<W>) -> JxlResult<()> {
        writer.write_bits(SIGNATURE_BITS, 16)?;
        write_dimension(writer, self.size.width, self.size)?;
        write_dimension(writer, self.size.height, self.size)?;

        match self.sample_kind {
            SampleKind::Float16 => writer.write_bit(true)?,
            SampleKind::Unsigned { bits } => {
                writer.write_bit(false)?;
                if let Some(selector) = DEPTH_BITS.iter().position(|&b| b == bits) {
                    writer.write_bits(selector as u64, 2)?;
                } else if (1..=16).contains(&bits) {
                    writer.write_bits(3, 2)?;
                    writer.write_bits((bits - 1) as u64, 4)?;
                } else {
                    return Err(JxlError::EncodingError(format!(
                        "Unsupported bit depth: {}",
                        bits
                    )));
                }
            }
        }

        writer.write_bit(self.has_alpha)?;
        writer.write_bit(self.color_encoding == ColorEncoding::LinearSRGB)?;
        writer.write_bits((self.orientation as u8 - 1) as u64, 3)?;

        let default_intensity = self.intensity_target == SDR_INTENSITY_TARGET;
        writer.write_bit(default_intensity)?;
        if !default_intensity {
            writer.write_bits(self.intensity_target.to_bits() as u64, 32)?;
        }

        writer.write_bit(self.animation.is_some())?;
        if let Some(animation) = &self.animation {
            animation.write(writer)?;
        }

        writer.align_to_byte()
    }

    pub fn read<R: Read>(reader: &mut BitReader<R>) -> JxlResult<Self> {
        let signature = reader.read_bits(16)?;
        if signature != SIGNATURE_BITS {
            return Err(JxlError::UnsupportedFormat);
        }

        let width = read_dimension(reader)?;
        let height = read_dimension(reader)?;

        let sample_kind = if reader.read_bit()? {
            SampleKind::Float16
        } else {
            let bits = match reader.read_bits(2)? as usize {
                3 => reader.read_bits(4)? as u8 + 1,
                selector => DEPTH_BITS[selector],
            };
            SampleKind::Unsigned { bits }
        };

        let has_alpha = reader.read_bit()?;
        let color_encoding = if reader.read_bit()? {
            ColorEncoding::LinearSRGB
        } else {
            ColorEncoding::SRGB
        };
        let orientation = Orientation::from_u8(reader.read_bits(3)? as u8 + 1)
            .ok_or_else(|| JxlError::DecodeError("Invalid orientation".to_string()))?;

        let intensity_target = if reader.read_bit()? {
            SDR_INTENSITY_TARGET
        } else {
            let value = f32::from_bits(reader.read_bits(32)? as u32);
            if !value.is_finite() || value <= 0.0 {
                return Err(JxlError::DecodeError(format!(
                    "Invalid intensity target: {}",
                    value
                )));
            }
            value
        };

        let animation = if reader.read_bit()? {
            Some(AnimationHeader::read(reader)?)
        } else {
            None
        };

        reader.align_to_byte()?;

        Ok(Self {
            size: ImageSize::new(width, height),
            sample_kind,
            has_alpha,
            color_encoding,
            orientation,
            intensity_target,
            animation,
        })
    }
}

fn write_dimension<W: Write>(
    writer: &mut BitWriter<W>,
    value: u32,
    size: ImageSize,
) -> JxlResult<()> {
    if value == 0 || value > MAX_IMAGE_DIMENSION {
        return Err(JxlError::InvalidDimensions {
            width: size.width,
            height: size.height,
        });
    }
    let coded = (value - 1) as u64;
    let selector = SIZE_BITS
        .iter()
        .position(|&bits| coded < 1u64 << bits)
        .unwrap_or(SIZE_BITS.len() - 1);
    writer.write_bits(selector as u64, 2)?;
    writer.write_bits(coded, SIZE_BITS[selector])
}

fn read_dimension<R: Read>(reader: &mut BitReader<R>) -> JxlResult<u32> {
    let selector = reader.read_bits(2)? as usize;
    let value = reader.read_bits(SIZE_BITS[selector])? as u32 + 1;
    if value > MAX_IMAGE_DIMENSION {
        return Err(JxlError::DecodeError(format!(
            "Dimension {} exceeds maximum",
            value
        )));
    }
    Ok(value)
}
