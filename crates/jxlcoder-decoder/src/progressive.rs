//! Level-limited channel reconstruction
//!
//! A squeezed channel is rebuilt from its base by applying detail sections
//! from coarse to fine. Stopping early yields the channel at a reduced
//! level without reading the finer sections at all.

use crate::frame::FrameLayout;
use jxlcoder_bitstream::BitReader;
use jxlcoder_core::{JxlError, JxlResult};
use jxlcoder_transform::{
    decode_plane, dequantize, detail_sizes, level_size, unsqueeze_level, MATreeNode, Plane,
    SqueezeLevel,
};

/// Decode one channel at pyramid level `target_level`
///
/// Flat frames always decode at full resolution. `quantized` marks channels
/// whose residual bands carry the frame's quantization step.
pub fn decode_channel(
    codestream: &[u8],
    layout: &FrameLayout,
    channel: usize,
    size: (usize, usize),
    target_level: usize,
    tree: &MATreeNode,
    quantized: bool,
) -> JxlResult<Plane> {
    let predictor = layout.header.predictors[channel];
    let step = if quantized {
        layout.header.quant_step.unwrap_or(1)
    } else {
        1
    };
    let (width, height) = size;

    let Some(levels) = layout.header.squeeze_levels else {
        let chunk = layout.chunk(codestream, 0, channel);
        check_chunk(chunk, width * height, 0, channel)?;
        let mut reader = BitReader::new(chunk);
        let mut data = decode_plane(&mut reader, width, height, predictor, tree)?;
        dequantize(&mut data, step);
        return Plane::from_data(width, height, data);
    };

    let target = target_level.min(levels);
    let (bw, bh) = level_size(width, height, levels);
    let chunk = layout.chunk(codestream, 0, channel);
    check_chunk(chunk, bw * bh, 0, channel)?;
    let mut reader = BitReader::new(chunk);
    let mut current = Plane::from_data(bw, bh, decode_plane(&mut reader, bw, bh, predictor, tree)?)?;

    for section in 1..=(levels - target) {
        let (fw, fh) = level_size(width, height, levels - section);
        let ((hw, hh), (vw, vh)) = detail_sizes(fw, fh);

        let chunk = layout.chunk(codestream, section, channel);
        check_chunk(chunk, hw * hh + vw * vh, section, channel)?;
        let mut reader = BitReader::new(chunk);
        let mut horizontal = decode_plane(&mut reader, hw, hh, predictor, tree)?;
        let mut vertical = decode_plane(&mut reader, vw, vh, predictor, tree)?;
        dequantize(&mut horizontal, step);
        dequantize(&mut vertical, step);

        let level = SqueezeLevel {
            horizontal: Plane::from_data(hw, hh, horizontal)?,
            vertical: Plane::from_data(vw, vh, vertical)?,
        };
        current = unsqueeze_level(&current, &level)?;
    }

    Ok(current)
}

/// Reject a chunk too short for its sample count before allocating planes
///
/// Every coded residual takes at least one bit.
fn check_chunk(chunk: &[u8], samples: usize, section: usize, channel: usize) -> JxlResult<()> {
    if (chunk.len() as u64) * 8 < samples as u64 {
        return Err(JxlError::DecodeError(format!(
            "Chunk {} of channel {} holds {} bytes for {} samples",
            section,
            channel,
            chunk.len(),
            samples
        )));
    }
    Ok(())
}
