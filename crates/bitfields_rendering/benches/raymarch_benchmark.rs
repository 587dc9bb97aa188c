//! Benchmark for the CPU reference ray marcher.
//!
//! TARGET: 256x256 frame of a 64^3 field in under 50ms
//!
//! Run with: cargo bench --package bitfields_rendering --bench raymarch_benchmark

use bitfields_procedural::{FnPattern, VolumeTexturePacker, VoxelFieldBuilder};
use bitfields_rendering::{CameraState, CpuRayMarcher, InstanceBuilder, RayMarchUniforms, VolumeBounds};
use bitfields_shared::{GridDimensions, Palette, RayMarchSettings};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use glam::Vec3;

fn benchmark_cpu_frame(c: &mut Criterion) {
    let dims = GridDimensions::new(64, 64, 64);
    let palette = Palette::from_hex("bench", &["#336699", "#99cc33", "#cc3366"]).unwrap();
    let pattern = FnPattern::new(6, |x, y, z| i64::from((x ^ y ^ z) % 6)).unwrap();
    let field = VoxelFieldBuilder::new(dims, 3).build(&pattern, &palette).unwrap();
    let volume = VolumeTexturePacker::pack(&field);
    let bounds = VolumeBounds::centered(dims, 1.0);

    let mut uniforms = RayMarchUniforms::new(&bounds, dims, &RayMarchSettings::default());
    uniforms.set_camera(&CameraState::look_at(
        Vec3::new(80.0, 60.0, 80.0),
        Vec3::ZERO,
        50f32.to_radians(),
        1.0,
    ));
    let mut marcher = CpuRayMarcher::new(&volume, &palette, uniforms);

    let mut group = c.benchmark_group("cpu_raymarch");
    group.throughput(Throughput::Elements(256 * 256));
    group.sample_size(10);
    group.bench_function("frame_256x256", |b| {
        b.iter(|| black_box(marcher.render(256, 256)));
    });
    group.finish();

    c.bench_function("instance_build_64_cubed", |b| {
        let builder = InstanceBuilder::new(bounds, true);
        b.iter(|| black_box(builder.build(field.voxels(), &volume)));
    });
}

criterion_group!(benches, benchmark_cpu_frame);
criterion_main!(benches);
