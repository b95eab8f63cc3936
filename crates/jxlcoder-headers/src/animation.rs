//! Animation support
//!
//! An animated image carries a time base and loop count in its image header
//! and a duration in every frame header.

use jxlcoder_bitstream::{BitReader, BitWriter};
use jxlcoder_core::consts::ANIMATION_TICKS_PER_SECOND;
use jxlcoder_core::{JxlError, JxlResult};
use std::io::{Read, Write};

/// Animation header information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationHeader {
    /// Ticks per second, numerator
    pub tps_numerator: u32,
    /// Ticks per second, denominator
    pub tps_denominator: u32,
    /// Number of loops (0 = infinite)
    pub num_loops: u32,
}

impl Default for AnimationHeader {
    fn default() -> Self {
        Self {
            tps_numerator: ANIMATION_TICKS_PER_SECOND,
            tps_denominator: 1,
            num_loops: 0,
        }
    }
}

impl AnimationHeader {
    pub fn with_loops(num_loops: u32) -> Self {
        Self {
            num_loops,
            ..Self::default()
        }
    }

    /// Convert a frame duration in ticks to milliseconds
    pub fn ticks_to_ms(&self, ticks: u32) -> u32 {
        let ms = ticks as u64 * 1000 * self.tps_denominator as u64 / self.tps_numerator as u64;
        ms.min(u32::MAX as u64) as u32
    }

    /// Convert milliseconds to ticks of this time base
    pub fn ms_to_ticks(&self, ms: u32) -> u32 {
        let ticks = ms as u64 * self.tps_numerator as u64 / (1000 * self.tps_denominator as u64);
        ticks.min(u32::MAX as u64) as u32
    }

    pub fn write<W: Write>(&self, writer: &mut BitWriter<W>) -> JxlResult<()> {
        writer.write_bits(self.tps_numerator as u64, 32)?;
        writer.write_bits(self.tps_denominator as u64, 32)?;
        writer.write_bits(self.num_loops as u64, 32)?;
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut BitReader<R>) -> JxlResult<Self> {
        let tps_numerator = reader.read_bits(32)? as u32;
        let tps_denominator = reader.read_bits(32)? as u32;
        let num_loops = reader.read_bits(32)? as u32;

        if tps_numerator == 0 || tps_denominator == 0 {
            return Err(JxlError::DecodeError(format!(
                "Invalid animation time base {}/{}",
                tps_numerator, tps_denominator
            )));
        }

        Ok(Self {
            tps_numerator,
            tps_denominator,
            num_loops,
        })
    }
}
