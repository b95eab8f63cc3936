//! Frame encoding
//!
//! Each channel is coded independently into one chunk per section, so the
//! channels run in parallel and are gathered back in channel order.

use jxlcoder_bitstream::BitWriter;
use jxlcoder_core::{JxlError, JxlResult};
use jxlcoder_headers::{FrameHeader, SectionTable};
use jxlcoder_transform::{
    apply_rct, encode_plane, forward_squeeze, quantize, select_predictor, MATreeNode, Plane,
    Predictor,
};
use log::trace;
use rayon::prelude::*;

/// How every channel of a frame is coded
#[derive(Debug, Clone)]
pub struct FramePlan {
    pub width: usize,
    pub height: usize,
    pub squeeze_levels: Option<usize>,
    /// Step applied to the color channels, `None` when lossless
    pub quant_step: Option<u32>,
    pub rct: bool,
    pub candidates: &'static [Predictor],
}

/// A coded channel: its predictor and one chunk per section
struct ChannelChunks {
    predictor: Predictor,
    chunks: Vec<Vec<u8>>,
}

/// The planes coded for one channel, in section order
fn channel_bands(plan: &FramePlan, data: Vec<i32>, step: u32) -> JxlResult<Vec<Vec<Plane>>> {
    let plane = Plane::from_data(plan.width, plan.height, data)?;

    let Some(levels) = plan.squeeze_levels else {
        let mut plane = plane;
        quantize(&mut plane.data, step);
        return Ok(vec![vec![plane]]);
    };

    let pyramid = forward_squeeze(plane, levels)?;
    let mut sections = Vec::with_capacity(levels + 1);
    sections.push(vec![pyramid.base]);
    for level in pyramid.levels.into_iter().rev() {
        let mut horizontal = level.horizontal;
        let mut vertical = level.vertical;
        quantize(&mut horizontal.data, step);
        quantize(&mut vertical.data, step);
        sections.push(vec![horizontal, vertical]);
    }
    Ok(sections)
}

fn encode_channel(
    plan: &FramePlan,
    data: Vec<i32>,
    step: u32,
    tree: &MATreeNode,
) -> JxlResult<ChannelChunks> {
    let sections = channel_bands(plan, data, step)?;
    let bands: Vec<&Plane> = sections.iter().flatten().collect();
    let predictor = select_predictor(&bands, plan.candidates, tree);

    let chunks = sections
        .iter()
        .map(|bands| {
            let mut chunk = Vec::new();
            {
                let mut writer = BitWriter::new(&mut chunk);
                for band in bands {
                    encode_plane(&mut writer, &band.data, band.width, band.height, predictor, tree)?;
                }
                writer.flush()?;
            }
            Ok(chunk)
        })
        .collect::<JxlResult<Vec<_>>>()?;

    Ok(ChannelChunks { predictor, chunks })
}

/// Append one frame of `planes` to `out`
///
/// `animation` carries the duration in ticks and the last-frame flag of
/// animated images.
pub fn write_frame(
    out: &mut Vec<u8>,
    plan: &FramePlan,
    mut planes: Vec<Vec<i32>>,
    tree: &MATreeNode,
    animation: Option<(u32, bool)>,
) -> JxlResult<()> {
    if plan.rct {
        if let [r, g, b, ..] = planes.as_mut_slice() {
            apply_rct(r, g, b);
        }
    }

    let coded = planes
        .into_par_iter()
        .enumerate()
        .map(|(channel, data)| {
            let step = if channel < 3 {
                plan.quant_step.unwrap_or(1)
            } else {
                1
            };
            encode_channel(plan, data, step, tree)
        })
        .collect::<JxlResult<Vec<_>>>()?;

    let (duration, is_last) = animation.unwrap_or((0, true));
    let header = FrameHeader {
        duration,
        is_last,
        squeeze_levels: plan.squeeze_levels,
        quant_step: plan.quant_step,
        rct: plan.rct,
        predictors: coded.iter().map(|c| c.predictor).collect(),
    };
    trace!("frame header {:?}", header);

    {
        let mut writer = BitWriter::new(&mut *out);
        header.write(&mut writer, animation.is_some())?;
        writer.flush()?;
    }

    let sections = header.num_sections();
    let mut lengths = Vec::with_capacity(sections * coded.len());
    for section in 0..sections {
        for channel in &coded {
            let len = channel.chunks[section].len();
            lengths.push(u32::try_from(len).map_err(|_| {
                JxlError::EncodingError(format!("Chunk of {} bytes is too large", len))
            })?);
        }
    }
    SectionTable::new(sections, coded.len(), lengths)?.write(out)?;

    for section in 0..sections {
        for channel in &coded {
            out.extend_from_slice(&channel.chunks[section]);
        }
    }

    Ok(())
}
