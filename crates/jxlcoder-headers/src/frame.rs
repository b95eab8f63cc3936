//! Frame headers and section tables
//!
//! A frame header states how the frame's channels were coded. It is
//! followed by a table of big-endian chunk lengths, one per section and
//! channel, so a reader can skip sections without decoding them.

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use jxlcoder_bitstream::{BitReader, BitWriter};
use jxlcoder_core::consts::{MAX_QUANT_STEP, MAX_SQUEEZE_LEVELS};
use jxlcoder_core::{JxlError, JxlResult, Predictor};
use std::io::{Read, Write};

/// Per-frame coding parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Duration in ticks (animated images only)
    pub duration: u32,
    /// Whether this is the last frame
    pub is_last: bool,
    /// Squeeze levels, `None` for a flat frame
    pub squeeze_levels: Option<usize>,
    /// Quantization step of lossy frames
    pub quant_step: Option<u32>,
    /// First three channels hold YCoCg-R instead of RGB
    pub rct: bool,
    /// Predictor of each channel
    pub predictors: Vec<Predictor>,
}

impl FrameHeader {
    /// Number of sections in the frame
    pub fn num_sections(&self) -> usize {
        self.squeeze_levels.unwrap_or(0) + 1
    }

    pub fn write<W: Write>(&self, writer: &mut BitWriter<W>, animated: bool) -> JxlResult<()> {
        if animated {
            writer.write_bits(self.duration as u64, 32)?;
        }
        writer.write_bit(self.is_last)?;

        writer.write_bit(self.squeeze_levels.is_some())?;
        if let Some(levels) = self.squeeze_levels {
            if levels > MAX_SQUEEZE_LEVELS {
                return Err(JxlError::EncodingError(format!(
                    "Too many squeeze levels: {}",
                    levels
                )));
            }
            writer.write_bits(levels as u64, 4)?;
        }

        writer.write_bit(self.quant_step.is_some())?;
        if let Some(step) = self.quant_step {
            if step == 0 || step > MAX_QUANT_STEP {
                return Err(JxlError::EncodingError(format!(
                    "Quantization step out of range: {}",
                    step
                )));
            }
            writer.write_bits((step - 1) as u64, 16)?;
        }

        writer.write_bit(self.rct)?;
        for predictor in &self.predictors {
            writer.write_bits(predictor.to_bits() as u64, 3)?;
        }
        writer.align_to_byte()
    }

    pub fn read<R: Read>(
        reader: &mut BitReader<R>,
        animated: bool,
        channels: usize,
    ) -> JxlResult<Self> {
        let duration = if animated {
            reader.read_bits(32)? as u32
        } else {
            0
        };
        let is_last = reader.read_bit()?;

        let squeeze_levels = if reader.read_bit()? {
            let levels = reader.read_bits(4)? as usize;
            if levels > MAX_SQUEEZE_LEVELS {
                return Err(JxlError::DecodeError(format!(
                    "Too many squeeze levels: {}",
                    levels
                )));
            }
            Some(levels)
        } else {
            None
        };

        let quant_step = if reader.read_bit()? {
            Some(reader.read_bits(16)? as u32 + 1)
        } else {
            None
        };

        let rct = reader.read_bit()?;
        let predictors = (0..channels)
            .map(|_| Predictor::from_bits(reader.read_bits(3)? as u8))
            .collect::<JxlResult<Vec<_>>>()?;
        reader.align_to_byte()?;

        Ok(Self {
            duration,
            is_last,
            squeeze_levels,
            quant_step,
            rct,
            predictors,
        })
    }
}

/// Chunk lengths of a frame, section-major and channel-minor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTable {
    pub sections: usize,
    pub channels: usize,
    pub lengths: Vec<u32>,
}

impl SectionTable {
    pub fn new(sections: usize, channels: usize, lengths: Vec<u32>) -> JxlResult<Self> {
        if lengths.len() != sections * channels {
            return Err(JxlError::EncodingError(format!(
                "Section table has {} entries, expected {}",
                lengths.len(),
                sections * channels
            )));
        }
        Ok(Self {
            sections,
            channels,
            lengths,
        })
    }

    /// Size of the table itself in bytes
    pub fn byte_len(&self) -> usize {
        self.lengths.len() * 4
    }

    /// Total payload size of all chunks
    pub fn payload_len(&self) -> u64 {
        self.lengths.iter().map(|&l| l as u64).sum()
    }

    /// Byte range of chunk `(section, channel)` relative to the payload start
    pub fn chunk_range(&self, section: usize, channel: usize) -> (u64, u64) {
        let index = section * self.channels + channel;
        let start: u64 = self.lengths[..index].iter().map(|&l| l as u64).sum();
        (start, start + self.lengths[index] as u64)
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> JxlResult<()> {
        for &length in &self.lengths {
            writer.write_u32::<BigEndian>(length)?;
        }
        Ok(())
    }

    /// Parse a table from the start of `data`
    pub fn parse(data: &[u8], sections: usize, channels: usize) -> JxlResult<Self> {
        let count = sections * channels;
        let bytes = data.get(..count * 4).ok_or_else(|| {
            JxlError::DecodeError("Truncated section table".to_string())
        })?;
        let lengths = bytes.chunks_exact(4).map(BigEndian::read_u32).collect();
        Ok(Self {
            sections,
            channels,
            lengths,
        })
    }
}
