//! Benchmarks for the renderer crate - frame rendering and PNG encoding.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use renderer::{
    png, render_quiver, AnimationConfig, CanvasConfig, MapCanvas, QuiverConfig, WindAnimation,
};
use wind_field::{BoundingBox, EvenlySpacedStreamlines, Grid, StreamlineExtractor, VectorField};

fn wind_map_setup(size: usize) -> (BoundingBox, Grid, VectorField) {
    let bbox = BoundingBox::default();
    let grid = Grid::meshgrid(&bbox, size, size).expect("grid");
    let field = VectorField::synthetic(&grid, &bbox);
    (bbox, grid, field)
}

fn build_animation(size: usize) -> WindAnimation {
    let (bbox, grid, field) = wind_map_setup(size);
    let lines = EvenlySpacedStreamlines::default()
        .extract(&grid, &field)
        .expect("streamlines");
    let canvas = MapCanvas::lambert(&bbox, CanvasConfig::default()).expect("canvas");
    let mut animation = WindAnimation::new(canvas, &AnimationConfig::default());
    animation.add_streamlines(&lines, &mut ChaCha8Rng::seed_from_u64(0));
    animation
}

// =============================================================================
// STREAMLINE EXTRACTION BENCHMARKS
// =============================================================================

fn bench_extract_streamlines(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_streamlines");

    for size in [25, 50, 100] {
        let (_, grid, field) = wind_map_setup(size);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("synthetic", size), &size, |b, _| {
            b.iter(|| {
                EvenlySpacedStreamlines::default()
                    .extract(black_box(&grid), black_box(&field))
                    .expect("streamlines")
            });
        });
    }

    group.finish();
}

// =============================================================================
// FRAME RENDERING BENCHMARKS
// =============================================================================

fn bench_render_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    group.sample_size(20);

    for size in [25, 50, 100] {
        let mut animation = build_animation(size);
        group.throughput(Throughput::Elements(animation.segment_count() as u64));
        group.bench_function(BenchmarkId::new("update_render", size), |b| {
            let mut frame_no = 0;
            b.iter(|| {
                animation.update(frame_no);
                frame_no += 1;
                black_box(animation.render().expect("frame"))
            });
        });
    }

    group.finish();
}

fn bench_quiver(c: &mut Criterion) {
    let (_, _, field) = wind_map_setup(100);
    let config = QuiverConfig::default();
    c.bench_function("render_quiver_100", |b| {
        b.iter(|| render_quiver(black_box(&field), &config).expect("quiver"));
    });
}

// =============================================================================
// PNG ENCODING BENCHMARKS
// =============================================================================

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");
    group.sample_size(20);

    let frame = build_animation(50).render().expect("frame");
    let (width, height) = (frame.width as usize, frame.height as usize);
    group.throughput(Throughput::Bytes(frame.pixels.len() as u64));

    group.bench_with_input(BenchmarkId::new("auto", "wind_frame"), &frame, |b, frame| {
        b.iter(|| png::create_png_auto(black_box(&frame.pixels), width, height).expect("png"));
    });
    group.bench_with_input(BenchmarkId::new("rgba", "wind_frame"), &frame, |b, frame| {
        b.iter(|| png::create_png(black_box(&frame.pixels), width, height).expect("png"));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_extract_streamlines,
    bench_render_frame,
    bench_quiver,
    bench_png_encoding
);
criterion_main!(benches);
