//! Encode/decode round trips through the public API

use jxlcoder::*;
use jxlcoder_color::{f16_bits_to_f32, f32_to_f16_bits};

/// Smooth gradient with some texture, alpha varying across rows
fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut samples = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            samples.push((x * 255 / width.max(1)) as u8);
            samples.push((y * 255 / height.max(1)) as u8);
            samples.push(((x + y) * 3 % 256) as u8);
            samples.push((255 - y * 100 / height.max(1)) as u8);
        }
    }
    PixelBuffer::from_packed(width, height, PixelFormat::Rgba8888, samples).unwrap()
}

/// Deterministic noise-like content in any format
fn pattern(format: PixelFormat, width: u32, height: u32) -> PixelBuffer {
    let bpp = format.bytes_per_pixel();
    let len = (width * height) as usize * bpp;
    let mut samples: Vec<u8> = (0..len).map(|i| (i * 73 % 251) as u8).collect();
    match format {
        PixelFormat::Rgb8888 => {
            for pixel in samples.chunks_exact_mut(4) {
                pixel[3] = 0xff;
            }
        }
        PixelFormat::RgbaF16 => {
            for (i, half) in samples.chunks_exact_mut(2).enumerate() {
                let bits = f32_to_f16_bits((i % 37) as f32 / 16.0);
                half.copy_from_slice(&bits.to_le_bytes());
            }
        }
        _ => {}
    }
    PixelBuffer::from_packed(width, height, format, samples).unwrap()
}

fn mean_abs_diff(a: &[u8], b: &[u8]) -> f64 {
    assert_eq!(a.len(), b.len());
    let total: u64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| (x as i32 - y as i32).unsigned_abs() as u64)
        .sum();
    total as f64 / a.len() as f64
}

#[test]
fn test_lossless_roundtrip_every_format() {
    let coder = JxlCoder::new();
    for format in PixelFormat::ALL {
        let original = pattern(format, 23, 17);
        for effort in [0, 3, 7] {
            let settings = EncodeSettings::new().lossless(true).effort(effort);
            let encoded = coder.encode(&original, &settings).unwrap();
            let decoded = coder
                .decode(&encoded, &DecodeOptions::new().format(format))
                .unwrap();
            assert_eq!(
                decoded.samples(),
                original.samples(),
                "{:?} at effort {} not bit exact",
                format,
                effort
            );
        }
    }
}

#[test]
fn test_lossless_roundtrip_large_pyramid() {
    let coder = JxlCoder::new();
    let original = gradient(257, 131);
    let settings = EncodeSettings::new().lossless(true).effort(9);
    let encoded = coder.encode(&original, &settings).unwrap();
    let decoded = coder.decode(&encoded, &DecodeOptions::new()).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_lossy_roundtrip_close() {
    let coder = JxlCoder::new();
    let original = gradient(96, 64);
    for effort in [1, 7] {
        let settings = EncodeSettings::new().quality(90).effort(effort);
        let encoded = coder.encode(&original, &settings).unwrap();
        let decoded = coder.decode(&encoded, &DecodeOptions::new()).unwrap();

        assert_eq!(decoded.size(), original.size());
        let diff = mean_abs_diff(decoded.samples(), original.samples());
        assert!(diff < 8.0, "effort {}: mean error {}", effort, diff);
    }
}

#[test]
fn test_encode_deterministic() {
    let coder = JxlCoder::new();
    let original = gradient(64, 40);
    for effort in [0, 4, 8] {
        let settings = EncodeSettings::new().quality(75).effort(effort);
        let a = coder.encode(&original, &settings).unwrap();
        let b = coder.encode(&original, &settings).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_rgb_color_space_drops_alpha() {
    let coder = JxlCoder::new();
    let original = gradient(20, 10);
    let settings = EncodeSettings::new()
        .lossless(true)
        .color_space(ColorSpace::Rgb);
    let encoded = coder.encode(&original, &settings).unwrap();
    assert!(!coder.read_header(&encoded).unwrap().has_alpha);

    let decoded = coder.decode(&encoded, &DecodeOptions::new()).unwrap();
    for (out, src) in decoded
        .samples()
        .chunks_exact(4)
        .zip(original.samples().chunks_exact(4))
    {
        assert_eq!(&out[..3], &src[..3]);
        assert_eq!(out[3], 0xff);
    }
}

#[test]
fn test_decode_8bit_into_f16() {
    let coder = JxlCoder::new();
    let original = gradient(16, 8);
    let encoded = coder
        .encode(&original, &EncodeSettings::new().lossless(true))
        .unwrap();
    let decoded = coder
        .decode(&encoded, &DecodeOptions::new().format(PixelFormat::RgbaF16))
        .unwrap();

    assert_eq!(decoded.format(), PixelFormat::RgbaF16);
    for (half, &byte) in decoded
        .samples()
        .chunks_exact(2)
        .zip(original.samples().iter())
    {
        let value = f16_bits_to_f32(u16::from_le_bytes([half[0], half[1]]));
        assert!((value - byte as f32 / 255.0).abs() < 1e-3);
    }
}

#[test]
fn test_hdr_tone_mapping() {
    let coder = JxlCoder::new();
    // Two pixels: 4x diffuse white and diffuse white
    let mut samples = Vec::new();
    for value in [4.0f32, 4.0, 4.0, 1.0, 1.0, 1.0, 1.0, 1.0] {
        samples.extend_from_slice(&f32_to_f16_bits(value).to_le_bytes());
    }
    let original = PixelBuffer::from_packed(2, 1, PixelFormat::RgbaF16, samples).unwrap();
    let encoded = coder
        .encode(&original, &EncodeSettings::new().lossless(true))
        .unwrap();
    assert!((coder.read_header(&encoded).unwrap().intensity_target - 1020.0).abs() < 0.5);

    // Float output keeps the extended range
    let float = coder
        .decode(&encoded, &DecodeOptions::new().format(PixelFormat::RgbaF16))
        .unwrap();
    assert_eq!(float.samples(), original.samples());

    let clipped = coder
        .decode(&encoded, &DecodeOptions::new().tone_mapper(ToneMapper::None))
        .unwrap();
    assert_eq!(clipped.samples()[4], 255);

    let mapped = coder
        .decode(
            &encoded,
            &DecodeOptions::new().tone_mapper(ToneMapper::Logarithmic),
        )
        .unwrap();
    assert_eq!(mapped.samples()[0], 255);
    assert!(mapped.samples()[4] > 50 && mapped.samples()[4] < 200);
}
