//! JPEG XL decoder implementation
//!
//! Decoding reads the image header, walks to the requested frame and
//! rebuilds each channel in parallel. With a bounding box the decoder
//! plans the output size first and, for squeezed frames, stops at the
//! coarsest pyramid level that still covers it. What remains is cropped and
//! resampled in software before packing into the requested format.

pub mod frame;
pub mod progressive;

use frame::{FrameIter, FrameLayout};
use jxlcoder_bitstream::BitReader;
use jxlcoder_color::{pack_rgba, planes_to_rgba};
use jxlcoder_core::consts::DEFAULT_MAX_PIXELS;
use jxlcoder_core::*;
use jxlcoder_headers::{is_supported, locate_codestream, ImageHeader};
use jxlcoder_transform::{
    choose_level, crop_at_level, inverse_rct, level_size, plan_scale, resample_rgba, CropRect,
    MATreeNode, ScalePlan,
};
use log::{debug, trace};
use rayon::prelude::*;
use std::borrow::Cow;

/// A parsed codestream: image header and the offset of the first frame
struct Parsed<'a> {
    codestream: Cow<'a, [u8]>,
    header: ImageHeader,
    frames_offset: usize,
}

/// JPEG XL decoder
///
/// Holds only limits, so one instance can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct JxlDecoder {
    max_pixels: u64,
}

impl JxlDecoder {
    pub fn new() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    /// Refuse images with more than `max_pixels` pixels
    pub fn with_max_pixels(max_pixels: u64) -> Self {
        Self { max_pixels }
    }

    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }

    fn parse<'a>(&self, data: &'a [u8]) -> JxlResult<Parsed<'a>> {
        if !is_supported(data) {
            return Err(JxlError::UnsupportedFormat);
        }
        let codestream = locate_codestream(data)?;

        let mut reader = BitReader::new(&codestream[..]);
        let header = ImageHeader::read(&mut reader).map_err(|e| match e {
            JxlError::DecodeError(_) => e,
            other => JxlError::DecodeError(format!("Invalid image header: {}", other)),
        })?;
        let frames_offset = reader.bytes_consumed();

        Ok(Parsed {
            codestream,
            header,
            frames_offset,
        })
    }

    fn check_pixels(&self, size: ImageSize) -> JxlResult<()> {
        if size.pixel_count() > self.max_pixels {
            return Err(JxlError::OutOfMemory {
                requested: (size.pixel_count().saturating_mul(16)).min(usize::MAX as u64) as usize,
            });
        }
        Ok(())
    }

    /// Parse the full image header
    pub fn read_header(&self, data: &[u8]) -> JxlResult<ImageHeader> {
        self.parse(data).map(|parsed| parsed.header)
    }

    /// List every frame with its duration, without decoding pixels
    pub fn frames(&self, data: &[u8]) -> JxlResult<Vec<FrameInfo>> {
        let parsed = self.parse(data)?;
        let header = &parsed.header;

        FrameIter::new(&parsed.codestream, header, parsed.frames_offset)
            .enumerate()
            .map(|(index, layout)| {
                let layout = layout?;
                let duration_ms = header
                    .animation
                    .map(|animation| animation.ticks_to_ms(layout.header.duration))
                    .unwrap_or(0);
                Ok(FrameInfo { index, duration_ms })
            })
            .collect()
    }

    /// Decode one frame into the requested format and size
    pub fn decode(&self, data: &[u8], request: &DecodeRequest) -> JxlResult<PixelBuffer> {
        let parsed = self.parse(data)?;
        let header = &parsed.header;
        let size = header.size;
        self.check_pixels(size)?;

        let layout = select_frame(&parsed, request.frame)?;

        let plan = match request.bounds {
            Some(bounds) => plan_scale(size, bounds, request.scale_mode)?,
            None => ScalePlan {
                target: size,
                crop: CropRect::full(size),
            },
        };
        self.check_pixels(plan.target)?;

        let level = match layout.header.squeeze_levels {
            Some(levels) => choose_level(&plan, size, levels),
            None => 0,
        };
        debug!(
            "decoding {}x{} frame {} at level {} for {}x{} output",
            size.width, size.height, request.frame, level, plan.target.width, plan.target.height
        );

        let planes = self.decode_planes(&parsed.codestream, header, &layout, level)?;
        let (lw, lh) = level_size(size.width as usize, size.height as usize, level);
        let level_dims = ImageSize::new(lw as u32, lh as u32);

        let rgba = planes_to_rgba(&planes, header.sample_kind)?;
        let window = crop_at_level(plan.crop, size, level);
        trace!("resampling window {:?} of {}x{}", window, lw, lh);
        let rgba = resample_rgba(rgba, level_dims, window, plan.target, request.filter)?;

        pack_rgba(
            rgba,
            plan.target,
            request.format,
            request.tone_mapper,
            header.peak(),
        )
    }

    fn decode_planes(
        &self,
        codestream: &[u8],
        header: &ImageHeader,
        layout: &FrameLayout,
        level: usize,
    ) -> JxlResult<Vec<Vec<i32>>> {
        let size = (header.size.width as usize, header.size.height as usize);
        let tree = MATreeNode::build_for_bit_depth(header.sample_kind.bits());

        let mut planes = (0..header.channel_count())
            .into_par_iter()
            .map(|channel| {
                progressive::decode_channel(
                    codestream,
                    layout,
                    channel,
                    size,
                    level,
                    &tree,
                    channel < 3,
                )
                .map(|plane| plane.data)
            })
            .collect::<JxlResult<Vec<_>>>()?;

        if layout.header.rct {
            if let [y, co, cg, ..] = planes.as_mut_slice() {
                inverse_rct(y, co, cg);
            }
        }

        Ok(planes)
    }
}

fn select_frame(parsed: &Parsed<'_>, index: usize) -> JxlResult<FrameLayout> {
    let frames = FrameIter::new(&parsed.codestream, &parsed.header, parsed.frames_offset);
    for (i, layout) in frames.enumerate() {
        let layout = layout?;
        if i == index {
            return Ok(layout);
        }
    }
    Err(JxlError::DecodeError(format!("Frame {} does not exist", index)))
}

impl Default for JxlDecoder {
    fn default() -> Self {
        Self::new()
    }
}
