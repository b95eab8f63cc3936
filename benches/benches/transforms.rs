//! Benchmarks for the squeeze transform, predictor search and tone mapping
//!
//! Run with: cargo bench --bench transforms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jxlcoder_color::tone_map_rgba;
use jxlcoder_core::ToneMapper;
use jxlcoder_transform::{
    estimate_plane_cost, forward_squeeze, level_count, MATreeNode, Plane, Predictor,
};

fn test_plane(size: usize) -> Plane {
    let data = (0..size * size)
        .map(|i| {
            let (x, y) = (i % size, i / size);
            ((x * 3 + y * 5) % 256) as i32
        })
        .collect();
    Plane::from_data(size, size, data).unwrap()
}

fn bench_squeeze(c: &mut Criterion) {
    let mut group = c.benchmark_group("Squeeze");

    for &size in &[64usize, 256, 1024] {
        let plane = test_plane(size);
        let levels = level_count(size, size);

        group.bench_with_input(BenchmarkId::new("forward", size), &plane, |b, plane| {
            b.iter(|| forward_squeeze(black_box(plane.clone()), levels).unwrap())
        });

        let pyramid = forward_squeeze(plane, levels).unwrap();
        group.bench_with_input(BenchmarkId::new("reconstruct", size), &pyramid, |b, pyramid| {
            b.iter(|| pyramid.reconstruct(black_box(0)).unwrap())
        });
    }

    group.finish();
}

fn bench_predictor_cost(c: &mut Criterion) {
    let mut group = c.benchmark_group("Predictor Cost 256x256");
    let plane = test_plane(256);
    let tree = MATreeNode::build_for_bit_depth(8);

    for predictor in Predictor::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", predictor)),
            &predictor,
            |b, &predictor| {
                b.iter(|| estimate_plane_cost(black_box(&plane.data), 256, 256, predictor, &tree))
            },
        );
    }

    group.finish();
}

fn bench_tone_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tone Mapping 512x512");
    let pixels: Vec<f32> = (0..512 * 512 * 4).map(|i| (i % 1000) as f32 / 250.0).collect();

    for mapper in [ToneMapper::Logarithmic, ToneMapper::Rec2408, ToneMapper::Filmic] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", mapper)),
            &mapper,
            |b, &mapper| {
                b.iter(|| {
                    let mut work = pixels.clone();
                    tone_map_rgba(black_box(&mut work), mapper, 4.0);
                    work
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_squeeze, bench_predictor_cost, bench_tone_mapping);
criterion_main!(benches);
