//! Modular mode plane coding
//!
//! Planes of integer samples are coded as prediction residuals:
//! - one of several predictor modes per plane
//! - Meta-Adaptive (MA) tree selects a Rice context from local gradients
//! - reversible color transform decorrelates RGB before prediction

use crate::squeeze::Plane;
use jxlcoder_bitstream::{BitReader, BitWriter, RiceDecoder, RiceEncoder, RiceState};
use jxlcoder_core::{JxlError, JxlResult};

pub use jxlcoder_core::Predictor;
use std::io::{Read, Write};

/// Largest sample magnitude a decoded plane may contain
pub const MAX_PLANE_MAGNITUDE: i32 = 1 << 22;

/// Number of contexts produced by the default MA tree
pub const NUM_CONTEXTS: usize = 4;

/// Meta-Adaptive tree node for context modeling
#[derive(Debug, Clone)]
pub struct MATreeNode {
    /// Property index for decision
    pub property: usize,
    /// Split value
    pub split_value: i32,
    /// Left child (if property < split_value)
    pub left: Option<Box<MATreeNode>>,
    /// Right child (if property >= split_value)
    pub right: Option<Box<MATreeNode>>,
    /// Leaf context (if this is a leaf node)
    pub context: Option<u32>,
}

impl MATreeNode {
    /// Create a leaf node with context
    pub fn leaf(context: u32) -> Self {
        Self {
            property: 0,
            split_value: 0,
            left: None,
            right: None,
            context: Some(context),
        }
    }

    /// Create a split node
    pub fn split(property: usize, split_value: i32, left: MATreeNode, right: MATreeNode) -> Self {
        Self {
            property,
            split_value,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            context: None,
        }
    }

    /// Get context for given properties
    pub fn get_context(&self, properties: &[i32]) -> u32 {
        if let Some(ctx) = self.context {
            return ctx;
        }

        let property_value = properties.get(self.property).copied().unwrap_or(0);

        if property_value < self.split_value {
            if let Some(ref left) = self.left {
                left.get_context(properties)
            } else {
                0
            }
        } else if let Some(ref right) = self.right {
            right.get_context(properties)
        } else {
            0
        }
    }

    /// Build the 4-context tree with thresholds scaled for `bit_depth`
    ///
    /// Contexts: 0 smooth, 1 smooth with variation, 2 edge, 3 texture.
    pub fn build_for_bit_depth(bit_depth: u8) -> Self {
        let scale = 1i32 << bit_depth.saturating_sub(8).min(16);

        let grad_threshold = 32 * scale;
        let variance_threshold = 16 * scale;

        MATreeNode::split(
            0,
            grad_threshold,
            MATreeNode::split(
                1,
                variance_threshold,
                MATreeNode::leaf(0),
                MATreeNode::leaf(1),
            ),
            MATreeNode::split(
                1,
                variance_threshold,
                MATreeNode::leaf(2),
                MATreeNode::leaf(3),
            ),
        )
    }
}

/// Compute context properties for a pixel position
///
/// - 0: Gradient magnitude (|left - top_left| + |top - top_left|)
/// - 1: Local variance (|left - top|)
pub fn compute_context_properties(left: i32, top: i32, top_left: i32) -> [i32; 2] {
    let grad_left = (left - top_left).abs();
    let grad_top = (top - top_left).abs();
    let gradient_magnitude = grad_left + grad_top;

    let local_variance = (left - top).abs();

    [gradient_magnitude, local_variance]
}

/// Neighbours of `(x, y)` in an already reconstructed raster
///
/// Missing neighbours are replaced so that edge rows and columns predict
/// from the nearest available sample.
#[inline]
fn neighbours(data: &[i32], x: usize, y: usize, width: usize) -> (i32, i32, i32) {
    let idx = y * width + x;
    let above = if y > 0 { Some(data[idx - width]) } else { None };
    let left = if x > 0 {
        data[idx - 1]
    } else {
        above.unwrap_or(0)
    };
    let top = above.unwrap_or(left);
    let top_left = if x > 0 && y > 0 {
        data[idx - width - 1]
    } else {
        left
    };
    (left, top, top_left)
}

/// Encode a plane as context-coded prediction residuals
pub fn encode_plane<W: Write>(
    writer: &mut BitWriter<W>,
    plane: &[i32],
    width: usize,
    height: usize,
    predictor: Predictor,
    ma_tree: &MATreeNode,
) -> JxlResult<()> {
    if plane.len() != width * height {
        return Err(JxlError::EncodingError(format!(
            "Plane holds {} samples, expected {}x{}",
            plane.len(),
            width,
            height
        )));
    }

    let mut coder = RiceEncoder::new(NUM_CONTEXTS);
    for y in 0..height {
        for x in 0..width {
            let (left, top, top_left) = neighbours(plane, x, y, width);
            let properties = compute_context_properties(left, top, top_left);
            let context = ma_tree.get_context(&properties) as usize;
            let residual = plane[y * width + x] - predictor.predict(left, top, top_left);
            coder.encode(writer, context, residual)?;
        }
    }

    Ok(())
}

/// Decode a plane written by [`encode_plane`]
pub fn decode_plane<R: Read>(
    reader: &mut BitReader<R>,
    width: usize,
    height: usize,
    predictor: Predictor,
    ma_tree: &MATreeNode,
) -> JxlResult<Vec<i32>> {
    let mut plane = jxlcoder_core::try_alloc(width * height, 0i32)?;
    let mut coder = RiceDecoder::new(NUM_CONTEXTS);

    for y in 0..height {
        for x in 0..width {
            let (left, top, top_left) = neighbours(&plane, x, y, width);
            let properties = compute_context_properties(left, top, top_left);
            let context = ma_tree.get_context(&properties) as usize;
            let residual = coder.decode(reader, context)?;
            if residual.abs() > MAX_PLANE_MAGNITUDE {
                return Err(JxlError::DecodeError(format!(
                    "Residual {} out of range at ({}, {})",
                    residual, x, y
                )));
            }

            let value = predictor.predict(left, top, top_left) + residual;
            if value.abs() > MAX_PLANE_MAGNITUDE {
                return Err(JxlError::DecodeError(format!(
                    "Sample {} out of range at ({}, {})",
                    value, x, y
                )));
            }
            plane[y * width + x] = value;
        }
    }

    Ok(plane)
}

/// Estimated coded size of a plane in bits
///
/// Runs the same context adaptation as [`encode_plane`] without producing
/// output, so predictors can be compared.
pub fn estimate_plane_cost(
    plane: &[i32],
    width: usize,
    height: usize,
    predictor: Predictor,
    ma_tree: &MATreeNode,
) -> u64 {
    let mut states = [RiceState::default(); NUM_CONTEXTS];
    let mut bits = 0u64;

    for y in 0..height {
        for x in 0..width {
            let (left, top, top_left) = neighbours(plane, x, y, width);
            let properties = compute_context_properties(left, top, top_left);
            let context = (ma_tree.get_context(&properties) as usize).min(NUM_CONTEXTS - 1);
            let residual = plane[y * width + x] - predictor.predict(left, top, top_left);

            let u = jxlcoder_bitstream::pack_signed(residual);
            let state = &mut states[context];
            let k = state.k();
            bits += ((u >> k) as u64).min(jxlcoder_bitstream::rice::UNARY_LIMIT as u64 + 32)
                + 1
                + k as u64;
            state.update(u);
        }
    }

    bits
}

/// Pick the predictor with the lowest estimated cost summed over `bands`
pub fn select_predictor(bands: &[&Plane], candidates: &[Predictor], ma_tree: &MATreeNode) -> Predictor {
    if let [only] = candidates {
        return *only;
    }
    candidates
        .iter()
        .copied()
        .min_by_key(|&predictor| {
            bands
                .iter()
                .map(|band| estimate_plane_cost(&band.data, band.width, band.height, predictor, ma_tree))
                .sum::<u64>()
        })
        .unwrap_or(Predictor::Gradient)
}

/// Reversible Color Transform (YCoCg-R), applied in place to R, G, B planes
pub fn apply_rct(r: &mut [i32], g: &mut [i32], b: &mut [i32]) {
    for ((r, g), b) in r.iter_mut().zip(g.iter_mut()).zip(b.iter_mut()) {
        let co = *r - *b;
        let t = *b + (co >> 1);
        let cg = *g - t;
        let y = t + (cg >> 1);

        *r = y;
        *g = co;
        *b = cg;
    }
}

/// Inverse of [`apply_rct`]; planes hold Y, Co, Cg on input and R, G, B on output
pub fn inverse_rct(y: &mut [i32], co: &mut [i32], cg: &mut [i32]) {
    for ((y, co), cg) in y.iter_mut().zip(co.iter_mut()).zip(cg.iter_mut()) {
        let t = y.wrapping_sub(*cg >> 1);
        let g = cg.wrapping_add(t);
        let b = t.wrapping_sub(*co >> 1);
        let r = b.wrapping_add(*co);

        *y = r;
        *co = g;
        *cg = b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_plane(width: usize, height: usize) -> Vec<i32> {
        (0..height)
            .flat_map(|y| (0..width).map(move |x| ((x * 3 + y * 5) % 256) as i32))
            .collect()
    }

    #[test]
    fn test_ma_tree() {
        let tree = MATreeNode::split(0, 10, MATreeNode::leaf(0), MATreeNode::leaf(1));

        assert_eq!(tree.get_context(&[5]), 0);
        assert_eq!(tree.get_context(&[15]), 1);
    }

    #[test]
    fn test_plane_coding_every_predictor() {
        let (w, h) = (13, 7);
        let plane = gradient_plane(w, h);
        let tree = MATreeNode::build_for_bit_depth(8);

        for predictor in Predictor::ALL {
            let mut encoded = Vec::new();
            {
                let mut writer = BitWriter::new(&mut encoded);
                encode_plane(&mut writer, &plane, w, h, predictor, &tree).unwrap();
            }
            let mut reader = BitReader::new(&encoded[..]);
            let decoded = decode_plane(&mut reader, w, h, predictor, &tree).unwrap();
            assert_eq!(decoded, plane, "{:?}", predictor);
        }
    }

    #[test]
    fn test_truncated_plane_fails() {
        let plane = gradient_plane(32, 32);
        let tree = MATreeNode::build_for_bit_depth(8);
        let mut encoded = Vec::new();
        {
            let mut writer = BitWriter::new(&mut encoded);
            encode_plane(&mut writer, &plane, 32, 32, Predictor::Zero, &tree).unwrap();
        }
        encoded.truncate(encoded.len() / 2);
        let mut reader = BitReader::new(&encoded[..]);
        assert!(decode_plane(&mut reader, 32, 32, Predictor::Zero, &tree).is_err());
    }

    #[test]
    fn test_select_prefers_gradient_on_ramp() {
        let (w, h) = (32, 32);
        let plane: Vec<i32> = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x * 2 + y * 3) as i32))
            .collect();
        let tree = MATreeNode::build_for_bit_depth(8);
        let band = Plane::from_data(w, h, plane.clone()).unwrap();
        let chosen = select_predictor(&[&band], &Predictor::ALL, &tree);
        let zero_cost = estimate_plane_cost(&plane, w, h, Predictor::Zero, &tree);
        let chosen_cost = estimate_plane_cost(&plane, w, h, chosen, &tree);
        assert!(chosen_cost < zero_cost);
    }

    #[test]
    fn test_select_sums_over_bands() {
        let tree = MATreeNode::build_for_bit_depth(8);
        // Samples varying only along x favour Top, only along y favour Left
        let rows = Plane::from_data(16, 16, (0..256).map(|i| ((i % 16) * 9) as i32).collect()).unwrap();
        let cols = Plane::from_data(16, 16, (0..256).map(|i| ((i / 16) * 9) as i32).collect()).unwrap();
        let candidates = [Predictor::Left, Predictor::Top];

        assert_eq!(select_predictor(&[&rows], &candidates, &tree), Predictor::Top);
        assert_eq!(select_predictor(&[&cols], &candidates, &tree), Predictor::Left);
        assert_eq!(select_predictor(&[&rows, &cols], &[Predictor::Paeth], &tree), Predictor::Paeth);
    }

    #[test]
    fn test_rct_roundtrip() {
        let (mut r, mut g, mut b) = (vec![100, 150, 200, 0], vec![50, 100, 150, 255], vec![25, 75, 125, 255]);
        let (r0, g0, b0) = (r.clone(), g.clone(), b.clone());

        apply_rct(&mut r, &mut g, &mut b);
        inverse_rct(&mut r, &mut g, &mut b);

        assert_eq!(r, r0);
        assert_eq!(g, g0);
        assert_eq!(b, b0);
    }
}
