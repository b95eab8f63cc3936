//! JPEG XL encoder implementation
//!
//! Settings are validated before the pixel buffer is looked at. Effort
//! picks the frame structure:
//! - 0-2: flat predicted planes
//! - 3 and up: squeeze pyramid, which enables scaled decoding
//! - 5 and up: predictor search per channel (all predictors from 8)
//!
//! Output is deterministic: channels are coded in parallel but always
//! assembled in channel order.

pub mod frame;

use frame::{write_frame, FramePlan};
use jxlcoder_bitstream::BitWriter;
use jxlcoder_color::{extract_planes, max_color_value};
use jxlcoder_core::consts::{
    EXHAUSTIVE_SEARCH_MIN_EFFORT, PREDICTOR_SEARCH_MIN_EFFORT, SDR_INTENSITY_TARGET,
    SQUEEZE_MIN_EFFORT,
};
use jxlcoder_core::*;
use jxlcoder_headers::{AnimationHeader, Container, ImageHeader};
use jxlcoder_transform::{level_count, quant_step, MATreeNode, Predictor};
use log::debug;

/// Bit depth the quantizer assumes for float samples
const FLOAT_QUANT_BITS: u32 = 10;

/// JPEG XL encoder
#[derive(Debug, Clone, Default)]
pub struct JxlEncoder {
    settings: EncodeSettings,
}

impl JxlEncoder {
    pub fn new(settings: EncodeSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EncodeSettings {
        &self.settings
    }

    /// Encode a still image
    pub fn encode(&self, buffer: &PixelBuffer) -> JxlResult<Vec<u8>> {
        self.settings.validate()?;

        let planes = self.unpack(buffer)?;
        let header = self.image_header(buffer, max_peak(buffer.format(), [&planes]));
        let plan = self.frame_plan(buffer.size(), buffer.format());
        let tree = MATreeNode::build_for_bit_depth(header.sample_kind.bits());

        let mut codestream = self.write_header(&header)?;
        write_frame(&mut codestream, &plan, planes, &tree, None)?;
        self.finish(codestream)
    }

    /// Encode an animation; every frame must share one size and format
    pub fn encode_animation(&self, frames: &[AnimationFrame], num_loops: u32) -> JxlResult<Vec<u8>> {
        self.settings.validate()?;

        let first = frames
            .first()
            .ok_or_else(|| JxlError::InvalidBuffer("Animation has no frames".to_string()))?;
        let (size, format) = (first.buffer.size(), first.buffer.format());
        if let Some(frame) = frames
            .iter()
            .find(|f| f.buffer.size() != size || f.buffer.format() != format)
        {
            return Err(JxlError::InvalidBuffer(format!(
                "Frame is {}x{} {:?}, animation is {}x{} {:?}",
                frame.buffer.width(),
                frame.buffer.height(),
                frame.buffer.format(),
                size.width,
                size.height,
                format
            )));
        }

        let planes = frames
            .iter()
            .map(|f| self.unpack(&f.buffer))
            .collect::<JxlResult<Vec<_>>>()?;

        let animation = AnimationHeader::with_loops(num_loops);
        let mut header = self.image_header(&first.buffer, max_peak(format, planes.iter()));
        header.animation = Some(animation);
        let plan = self.frame_plan(size, format);
        let tree = MATreeNode::build_for_bit_depth(header.sample_kind.bits());

        let mut codestream = self.write_header(&header)?;
        let count = frames.len();
        for (index, (frame, planes)) in frames.iter().zip(planes).enumerate() {
            let duration = animation.ms_to_ticks(frame.duration_ms);
            write_frame(
                &mut codestream,
                &plan,
                planes,
                &tree,
                Some((duration, index + 1 == count)),
            )?;
        }
        debug!("encoded {} animation frames", count);
        self.finish(codestream)
    }

    fn unpack(&self, buffer: &PixelBuffer) -> JxlResult<Vec<Vec<i32>>> {
        extract_planes(buffer, self.settings.color_space)
    }

    fn image_header(&self, buffer: &PixelBuffer, peak: f32) -> ImageHeader {
        let format = buffer.format();
        let mut header = ImageHeader::new(
            buffer.size(),
            format.sample_kind(),
            self.settings.color_space == ColorSpace::Rgba,
        );
        if format.is_float() {
            header.color_encoding = ColorEncoding::LinearSRGB;
            header.intensity_target = peak.max(1.0) * SDR_INTENSITY_TARGET;
        }
        header
    }

    fn frame_plan(&self, size: ImageSize, format: PixelFormat) -> FramePlan {
        let settings = &self.settings;
        let (width, height) = (size.width as usize, size.height as usize);

        let squeeze_levels =
            (settings.effort >= SQUEEZE_MIN_EFFORT).then(|| level_count(width, height));

        let quant_step = if settings.is_lossless() {
            debug!(
                "lossless compression ignores quality {}",
                settings.quality
            );
            None
        } else {
            let bits = match format.sample_kind() {
                SampleKind::Unsigned { bits } => bits as u32,
                SampleKind::Float16 => FLOAT_QUANT_BITS,
            };
            Some(quant_step(settings.quality, bits)).filter(|&step| step > 1)
        };

        let candidates: &'static [Predictor] = if settings.effort >= EXHAUSTIVE_SEARCH_MIN_EFFORT {
            &Predictor::ALL
        } else if settings.effort >= PREDICTOR_SEARCH_MIN_EFFORT {
            &Predictor::COMMON
        } else {
            &[Predictor::Gradient]
        };

        debug!(
            "effort {}: squeeze levels {:?}, quant step {:?}, {} predictor candidates",
            settings.effort,
            squeeze_levels,
            quant_step,
            candidates.len()
        );

        FramePlan {
            width,
            height,
            squeeze_levels,
            quant_step,
            rct: settings.effort >= 1,
            candidates,
        }
    }

    fn write_header(&self, header: &ImageHeader) -> JxlResult<Vec<u8>> {
        let mut codestream = Vec::new();
        {
            let mut writer = BitWriter::new(&mut codestream);
            header.write(&mut writer)?;
            writer.flush()?;
        }
        Ok(codestream)
    }

    fn finish(&self, codestream: Vec<u8>) -> JxlResult<Vec<u8>> {
        if !self.settings.container {
            return Ok(codestream);
        }
        let mut out = Vec::with_capacity(codestream.len() + 64);
        Container::with_codestream(codestream).write(&mut out)?;
        Ok(out)
    }
}

/// Brightest color value over the planes of float images
fn max_peak<'a, I>(format: PixelFormat, planes: I) -> f32
where
    I: IntoIterator<Item = &'a Vec<Vec<i32>>>,
{
    if !format.is_float() {
        return 1.0;
    }
    planes
        .into_iter()
        .map(|p| max_color_value(p, format.sample_kind()))
        .fold(1.0, f32::max)
}
