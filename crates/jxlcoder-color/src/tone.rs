//! Tone mapping of high dynamic range samples
//!
//! Curves take linear values where 1.0 is standard dynamic range white and
//! `peak` is the brightest value the source can hold. Each curve maps
//! `0 -> 0` and `peak -> 1`.

use jxlcoder_core::ToneMapper;
use num_traits::Float;

#[inline]
fn constant<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::zero)
}

/// Hable's filmic curve without normalization
fn hable<T: Float>(x: T) -> T {
    let a = constant::<T>(0.15);
    let b = constant::<T>(0.50);
    let c = constant::<T>(0.10);
    let d = constant::<T>(0.20);
    let e = constant::<T>(0.02);
    let f = constant::<T>(0.30);
    ((x * (a * x + c * b) + d * e) / (x * (a * x + b) + d * f)) - e / f
}

/// Map `x` from `[0, peak]` into `[0, 1]` with `mapper`
///
/// `ToneMapper::None` returns `x` unchanged; callers clamp.
pub fn tone_map<T: Float>(mapper: ToneMapper, x: T, peak: T) -> T {
    let x = x.max(T::zero());
    let one = T::one();
    match mapper {
        ToneMapper::None => x,
        ToneMapper::Logarithmic => (one + x).ln() / (one + peak).ln(),
        ToneMapper::Rec2408 => x * (one + x / (peak * peak)) / (one + x),
        ToneMapper::Filmic => hable(x) / hable(peak),
    }
}

/// Tone map the color channels of interleaved RGBA pixels in place
///
/// Nothing happens unless `peak` exceeds standard dynamic range.
pub fn tone_map_rgba(pixels: &mut [f32], mapper: ToneMapper, peak: f32) {
    if mapper == ToneMapper::None || peak <= 1.0 {
        return;
    }
    for pixel in pixels.chunks_exact_mut(4) {
        for sample in &mut pixel[..3] {
            *sample = tone_map(mapper, *sample, peak);
        }
    }
}
