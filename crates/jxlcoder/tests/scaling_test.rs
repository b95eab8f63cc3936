//! Scaled decoding through FIT, FILL and RESIZE

use jxlcoder::*;

fn checker(width: u32, height: u32) -> PixelBuffer {
    let mut samples = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let on = (x / 8 + y / 8) % 2 == 0;
            let v = if on { 220 } else { 30 };
            samples.extend_from_slice(&[v, (x % 256) as u8, (y % 256) as u8, 255]);
        }
    }
    PixelBuffer::from_packed(width, height, PixelFormat::Rgba8888, samples).unwrap()
}

fn encode(image: &PixelBuffer, effort: u8) -> Vec<u8> {
    JxlCoder::new()
        .encode(image, &EncodeSettings::new().quality(95).effort(effort))
        .unwrap()
}

#[test]
fn test_fit_keeps_aspect_ratio() {
    let coder = JxlCoder::new();
    let bytes = encode(&checker(64, 48), 7);
    let options = DecodeOptions::new().bounds(32, 32).scale_mode(ScaleMode::Fit);
    let decoded = coder.decode(&bytes, &options).unwrap();
    assert_eq!(decoded.size(), ImageSize::new(32, 24));
}

#[test]
fn test_fill_covers_bounds() {
    let coder = JxlCoder::new();
    let bytes = encode(&checker(64, 48), 7);
    let options = DecodeOptions::new().bounds(20, 20).scale_mode(ScaleMode::Fill);
    let decoded = coder.decode(&bytes, &options).unwrap();
    assert_eq!(decoded.size(), ImageSize::new(20, 20));
}

#[test]
fn test_resize_ignores_aspect_ratio() {
    let coder = JxlCoder::new();
    let bytes = encode(&checker(64, 48), 2);
    let options = DecodeOptions::new()
        .bounds(50, 70)
        .scale_mode(ScaleMode::Resize)
        .filter(ResizeFilter::Bilinear);
    let decoded = coder.decode(&bytes, &options).unwrap();
    assert_eq!(decoded.size(), ImageSize::new(50, 70));
}

#[test]
fn test_scaled_decode_from_pyramid() {
    let coder = JxlCoder::new();
    let bytes = encode(&checker(400, 300), 7);
    let bounds = ImageSize::new(80, 60);

    for format in PixelFormat::ALL {
        let decoded = coder
            .decode_sampled(&bytes, bounds, &DecodeOptions::new().format(format))
            .unwrap();
        assert_eq!(decoded.size(), bounds);
        assert_eq!(decoded.format(), format);
    }
}

#[test]
fn test_scaled_decode_matches_downscale() {
    let coder = JxlCoder::new();
    // Uniform image: every level of the pyramid is the same color
    let mut image = PixelBuffer::new(128, 96, PixelFormat::Rgba8888).unwrap();
    for pixel in image.samples_mut().chunks_exact_mut(4) {
        pixel.copy_from_slice(&[10, 120, 240, 255]);
    }
    let bytes = coder
        .encode(&image, &EncodeSettings::new().lossless(true).effort(5))
        .unwrap();

    let decoded = coder
        .decode(&bytes, &DecodeOptions::new().bounds(32, 24))
        .unwrap();
    assert_eq!(decoded.size(), ImageSize::new(32, 24));
    for pixel in decoded.samples().chunks_exact(4) {
        assert_eq!(pixel, &[10, 120, 240, 255]);
    }
}

#[test]
fn test_every_filter_produces_target() {
    let coder = JxlCoder::new();
    let bytes = encode(&checker(40, 30), 3);
    for filter in [
        ResizeFilter::Nearest,
        ResizeFilter::Bilinear,
        ResizeFilter::Bicubic,
        ResizeFilter::Gaussian,
        ResizeFilter::Lanczos3,
    ] {
        let options = DecodeOptions::new().bounds(17, 9).filter(filter);
        let decoded = coder.decode(&bytes, &options).unwrap();
        assert_eq!(decoded.size(), ImageSize::new(12, 9), "{:?}", filter);
    }
}

#[test]
fn test_upscale() {
    let coder = JxlCoder::new();
    let bytes = encode(&checker(10, 10), 7);
    let decoded = coder
        .decode(&bytes, &DecodeOptions::new().bounds(40, 40))
        .unwrap();
    assert_eq!(decoded.size(), ImageSize::new(40, 40));
}

/// Smooth content with independent ramps per channel
fn smooth(width: u32, height: u32) -> PixelBuffer {
    let mut samples = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            samples.push((x * 255 / (width - 1)) as u8);
            samples.push((y * 255 / (height - 1)) as u8);
            samples.push((x * y * 255 / ((width - 1) * (height - 1))) as u8);
            samples.push(255);
        }
    }
    PixelBuffer::from_packed(width, height, PixelFormat::Rgba8888, samples).unwrap()
}

fn mean_abs_diff(a: &PixelBuffer, b: &PixelBuffer) -> f64 {
    assert_eq!(a.size(), b.size());
    let total: u64 = a
        .samples()
        .iter()
        .zip(b.samples())
        .map(|(&x, &y)| (x as i32 - y as i32).unsigned_abs() as u64)
        .sum();
    total as f64 / a.samples().len() as f64
}

#[test]
fn test_pyramid_decode_matches_resampled_decode() {
    let coder = JxlCoder::new();
    let image = smooth(96, 64);
    // Effort 2 stores flat planes, effort 5 a squeeze pyramid
    let flat = coder
        .encode(&image, &EncodeSettings::new().lossless(true).effort(2))
        .unwrap();
    let pyramid = coder
        .encode(&image, &EncodeSettings::new().lossless(true).effort(5))
        .unwrap();

    for (mode, bounds) in [
        (ScaleMode::Fit, (40, 40)),
        (ScaleMode::Fill, (30, 30)),
        (ScaleMode::Resize, (50, 20)),
    ] {
        let options = DecodeOptions::new()
            .bounds(bounds.0, bounds.1)
            .scale_mode(mode)
            .filter(ResizeFilter::Bilinear);
        let from_flat = coder.decode(&flat, &options).unwrap();
        let from_pyramid = coder.decode(&pyramid, &options).unwrap();

        assert_eq!(from_flat.size(), from_pyramid.size(), "{:?}", mode);
        let diff = mean_abs_diff(&from_flat, &from_pyramid);
        assert!(diff < 6.0, "{:?}: mean difference {}", mode, diff);
    }
}

#[test]
fn test_large_image_fit_decode() {
    let coder = JxlCoder::new();
    let (width, height) = (4000u32, 3000u32);
    let mut samples = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            samples.extend_from_slice(&[
                (x * 255 / (width - 1)) as u8,
                (y * 255 / (height - 1)) as u8,
                64,
                255,
            ]);
        }
    }
    let image = PixelBuffer::from_packed(width, height, PixelFormat::Rgb8888, samples).unwrap();
    let settings = EncodeSettings::new()
        .lossless(true)
        .effort(3)
        .color_space(ColorSpace::Rgb);
    let bytes = coder.encode(&image, &settings).unwrap();

    let options = DecodeOptions::new()
        .bounds(800, 600)
        .scale_mode(ScaleMode::Fit);
    let decoded = coder.decode(&bytes, &options).unwrap();
    assert_eq!(decoded.size(), ImageSize::new(800, 600));

    let center = &decoded.row(300)[400 * 4..400 * 4 + 4];
    assert!((center[0] as i32 - 128).abs() <= 4, "{:?}", center);
    assert!((center[1] as i32 - 128).abs() <= 4, "{:?}", center);
    assert!((center[2] as i32 - 64).abs() <= 1, "{:?}", center);
}
