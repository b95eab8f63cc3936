//! IEEE-754 binary16 conversion
//!
//! Float images are coded as integers: each binary16 bit pattern maps to an
//! `i32` whose order matches the order of the float values, so prediction
//! and squeeze see a smooth signal.

/// Convert an `f32` to binary16 bits, rounding to nearest even
pub fn f32_to_f16_bits(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xff) as i32;
    let mant = bits & 0x007f_ffff;

    if exp == 0xff {
        // Inf or NaN; keep the top payload bits and force NaN to stay NaN
        let payload = (mant >> 13) as u16;
        let nan_bit = if mant != 0 && payload == 0 { 0x0200 } else { 0 };
        return sign | 0x7c00 | payload | nan_bit;
    }

    let half_exp = exp - 127 + 15;
    if half_exp >= 0x1f {
        return sign | 0x7c00;
    }

    if half_exp <= 0 {
        if half_exp < -10 {
            return sign;
        }
        // Subnormal: shift the implicit bit in
        let full = mant | 0x0080_0000;
        let shift = (14 - half_exp) as u32;
        let mut half_mant = full >> shift;
        let rem = full & ((1 << shift) - 1);
        let halfway = 1 << (shift - 1);
        if rem > halfway || (rem == halfway && half_mant & 1 == 1) {
            half_mant += 1;
        }
        return sign | half_mant as u16;
    }

    let mut half = ((half_exp as u32) << 10) | (mant >> 13);
    let rem = mant & 0x1fff;
    if rem > 0x1000 || (rem == 0x1000 && half & 1 == 1) {
        // May carry into the exponent, which rounds up to the next binade
        half += 1;
    }
    sign | half as u16
}

/// Convert binary16 bits to an `f32` (exact)
pub fn f16_bits_to_f32(bits: u16) -> f32 {
    let sign = ((bits & 0x8000) as u32) << 16;
    let exp = ((bits >> 10) & 0x1f) as u32;
    let mant = (bits & 0x03ff) as u32;

    let out = match exp {
        0 if mant == 0 => sign,
        0 => {
            // Subnormal: normalize
            let mut e = 127 - 15 + 1;
            let mut m = mant;
            while m & 0x0400 == 0 {
                m <<= 1;
                e -= 1;
            }
            sign | (e << 23) | ((m & 0x03ff) << 13)
        }
        0x1f => sign | 0x7f80_0000 | (mant << 13),
        _ => sign | ((exp + 127 - 15) << 23) | (mant << 13),
    };
    f32::from_bits(out)
}

/// Map binary16 bits to an order-preserving integer in `-32768..=32767`
pub fn f16_to_ordered(bits: u16) -> i32 {
    if bits & 0x8000 == 0 {
        bits as i32
    } else {
        -((bits & 0x7fff) as i32) - 1
    }
}

/// Inverse of [`f16_to_ordered`], clamping out-of-range values
pub fn ordered_to_f16(value: i32) -> u16 {
    let value = value.clamp(-32768, 32767);
    if value >= 0 {
        value as u16
    } else {
        0x8000 | ((-(value + 1)) as u16 & 0x7fff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(f32_to_f16_bits(1.0), 0x3c00);
        assert_eq!(f32_to_f16_bits(-2.0), 0xc000);
        assert_eq!(f32_to_f16_bits(0.5), 0x3800);
        assert_eq!(f32_to_f16_bits(65504.0), 0x7bff);
        assert_eq!(f32_to_f16_bits(1e6), 0x7c00);
        assert_eq!(f32_to_f16_bits(f32::INFINITY), 0x7c00);
        assert_eq!(f16_bits_to_f32(0x3555), 0.333_251_95);
    }

    #[test]
    fn test_every_half_roundtrips() {
        for bits in 0..=u16::MAX {
            let value = f16_bits_to_f32(bits);
            if value.is_nan() {
                assert!(f16_bits_to_f32(f32_to_f16_bits(value)).is_nan());
            } else {
                assert_eq!(f32_to_f16_bits(value), bits, "{:#06x}", bits);
            }
        }
    }

    #[test]
    fn test_rounding() {
        // 1 + 2^-11 is halfway between 1.0 and the next half; ties to even
        assert_eq!(f32_to_f16_bits(1.0 + 1.0 / 2048.0), 0x3c00);
        assert_eq!(f32_to_f16_bits(1.0 + 3.0 / 2048.0), 0x3c02);
        // Smallest subnormal
        assert_eq!(f32_to_f16_bits(5.960_464_5e-8), 0x0001);
    }

    #[test]
    fn test_ordered_mapping_is_monotonic() {
        let values = [-65504.0f32, -1.0, -0.0, 0.0, 1e-7, 0.5, 1.0, 65504.0];
        let ordered: Vec<i32> = values
            .iter()
            .map(|&v| f16_to_ordered(f32_to_f16_bits(v)))
            .collect();
        assert!(ordered.windows(2).all(|w| w[0] < w[1]));

        for bits in [0u16, 0x3c00, 0x8000, 0xbc00, 0xffff, 0x7fff] {
            assert_eq!(ordered_to_f16(f16_to_ordered(bits)), bits);
        }
    }
}
