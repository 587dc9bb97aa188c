//! Benchmark for field construction and packing.
//!
//! TARGET: 128x256x128 (4.2M cells) built and packed in under 1 second
//!
//! Run with: cargo bench --package bitfields_procedural --bench field_benchmark

use bitfields_procedural::{
    PatternComposer, VolumeTexturePacker, VoxelFieldBuilder, WorldSeed,
};
use bitfields_shared::{GateMode, GridDimensions, Palette};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn palette() -> Palette {
    Palette::from_hex(
        "bench",
        &["#264653", "#2a9d8f", "#e9c46a", "#f4a261", "#e76f51", "#ffffff"],
    )
    .expect("static palette")
}

fn benchmark_compose(c: &mut Criterion) {
    let composer = PatternComposer::new(GridDimensions::new(128, 256, 128), GateMode::Mixed);

    c.bench_function("compose_pattern", |b| {
        let mut rng = WorldSeed::new(42).rng();
        b.iter(|| black_box(composer.compose(&mut rng, 12)));
    });
}

fn benchmark_build_field(c: &mut Criterion) {
    let dims = GridDimensions::new(64, 64, 64);
    let pattern = PatternComposer::new(dims, GateMode::Mixed)
        .compose(&mut WorldSeed::new(42).rng(), 12)
        .expect("valid composition");
    let palette = palette();

    let mut group = c.benchmark_group("field_build");
    group.throughput(Throughput::Elements(dims.cell_count()));
    group.sample_size(10);

    group.bench_function("64^3_cells", |b| {
        b.iter(|| black_box(VoxelFieldBuilder::new(dims, 6).build(&pattern, &palette)));
    });

    group.finish();
}

fn benchmark_default_grid(c: &mut Criterion) {
    let dims = GridDimensions::new(128, 256, 128);
    let pattern = PatternComposer::new(dims, GateMode::Mixed)
        .compose(&mut WorldSeed::new(7).rng(), 12)
        .expect("valid composition");
    let palette = palette();

    let mut group = c.benchmark_group("default_grid");
    group.throughput(Throughput::Elements(dims.cell_count()));
    group.sample_size(10);

    group.bench_function("build_and_pack_128x256x128", |b| {
        b.iter(|| {
            let field = VoxelFieldBuilder::new(dims, 6)
                .build(&pattern, &palette)
                .expect("non-empty palette");
            black_box(VolumeTexturePacker::pack(&field))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compose,
    benchmark_build_field,
    benchmark_default_grid,
);

criterion_main!(benches);
