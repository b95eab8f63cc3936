//! End-to-end encoding/decoding benchmarks
//!
//! Run with: cargo bench --bench end_to_end

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jxlcoder::*;

fn create_test_image(width: u32, height: u32) -> PixelBuffer {
    let mut samples = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            samples.push((x * 255 / width) as u8);
            samples.push((y * 255 / height) as u8);
            samples.push(((x ^ y) & 0xff) as u8);
            samples.push(255);
        }
    }
    PixelBuffer::from_packed(width, height, PixelFormat::Rgba8888, samples).unwrap()
}

fn bench_encode_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("Encode by Image Size");
    let coder = JxlCoder::new();
    let settings = EncodeSettings::new();

    for &size in &[64u32, 256, 1024] {
        let image = create_test_image(size, size);
        group.throughput(Throughput::Elements(size as u64 * size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &image,
            |b, image| b.iter(|| coder.encode(black_box(image), &settings).unwrap()),
        );
    }

    group.finish();
}

fn bench_encode_by_effort(c: &mut Criterion) {
    let mut group = c.benchmark_group("Encode by Effort");
    let coder = JxlCoder::new();
    let image = create_test_image(256, 256);

    for effort in [0u8, 3, 5, 7, 9] {
        let settings = EncodeSettings::new().effort(effort);
        group.bench_with_input(BenchmarkId::from_parameter(effort), &settings, |b, settings| {
            b.iter(|| coder.encode(black_box(&image), settings).unwrap())
        });
    }

    group.finish();
}

fn bench_decode_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("Decode by Image Size");
    let coder = JxlCoder::new();
    let options = DecodeOptions::new();

    for &size in &[64u32, 256, 1024] {
        // Pre-encode the image
        let encoded = coder
            .encode(&create_test_image(size, size), &EncodeSettings::new())
            .unwrap();

        group.throughput(Throughput::Elements(size as u64 * size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &encoded,
            |b, encoded| b.iter(|| coder.decode(black_box(encoded), &options).unwrap()),
        );
    }

    group.finish();
}

fn bench_scaled_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scaled Decode 1024x1024");
    let coder = JxlCoder::new();
    let encoded = coder
        .encode(&create_test_image(1024, 1024), &EncodeSettings::new())
        .unwrap();

    for &bound in &[1024u32, 512, 128, 100] {
        let options = DecodeOptions::new().bounds(bound, bound);
        group.bench_with_input(BenchmarkId::from_parameter(bound), &options, |b, options| {
            b.iter(|| coder.decode(black_box(&encoded), options).unwrap())
        });
    }

    group.finish();
}

fn bench_decode_formats(c: &mut Criterion) {
    let mut group = c.benchmark_group("Decode by Output Format");
    let coder = JxlCoder::new();
    let encoded = coder
        .encode(&create_test_image(256, 256), &EncodeSettings::new())
        .unwrap();

    for format in PixelFormat::ALL {
        let options = DecodeOptions::new().format(format);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", format)),
            &options,
            |b, options| b.iter(|| coder.decode(black_box(&encoded), options).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_by_size,
    bench_encode_by_effort,
    bench_decode_by_size,
    bench_scaled_decode,
    bench_decode_formats
);
criterion_main!(benches);
