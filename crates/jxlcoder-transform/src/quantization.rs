//! Quantization for lossy compression

use jxlcoder_core::consts::MAX_QUANT_STEP;

/// Quantization step for a quality setting (0-100) and sample bit depth
///
/// Quality 100 gives step 1 (no loss). The step grows quadratically as
/// quality drops and is scaled with the sample range.
pub fn quant_step(quality: u8, bits: u32) -> u32 {
    let loss = (100.0 - quality.min(100) as f32) / 100.0;
    let base = 1.0 + loss * loss * 60.0;
    let scale = (1u32 << bits.saturating_sub(8).min(16)) as f32;
    ((base * scale).round() as u32).clamp(1, MAX_QUANT_STEP)
}

/// Quantize samples in place with a symmetric uniform quantizer
pub fn quantize(samples: &mut [i32], step: u32) {
    if step <= 1 {
        return;
    }
    let step = step as i64;
    for v in samples.iter_mut() {
        let x = *v as i64;
        let q = (x.abs() + step / 2) / step;
        *v = (if x < 0 { -q } else { q }) as i32;
    }
}

/// Dequantize samples in place
pub fn dequantize(samples: &mut [i32], step: u32) {
    if step <= 1 {
        return;
    }
    let step = step.min(i32::MAX as u32) as i32;
    for v in samples.iter_mut() {
        *v = v.saturating_mul(step);
    }
}
