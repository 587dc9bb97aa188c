//! Benchmark for gate evaluation throughput.
//!
//! TARGET: 100,000,000 lane-parallel evaluations per second
//!
//! Run with: cargo bench --package bitfields_procedural --bench gate_benchmark

use bitfields_procedural::gates::{evaluate_gate, NamedGate};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn benchmark_truth_table(c: &mut Criterion) {
    c.bench_function("truth_table_single", |b| {
        let mut a = 0x1234_5678u32;
        b.iter(|| {
            a = a.wrapping_mul(0x9E37_79B9).wrapping_add(1);
            black_box(evaluate_gate(black_box(0b0110_1001), a, a.rotate_left(7), a ^ 0xFFFF))
        });
    });
}

fn benchmark_all_masks(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_masks");
    group.throughput(Throughput::Elements(256));

    group.bench_function("256_truth_tables", |b| {
        b.iter(|| {
            for mask in 0..=u8::MAX {
                black_box(evaluate_gate(mask, 0xDEAD_BEEF, 0x0BAD_F00D, 0xFEED_FACE));
            }
        });
    });

    group.finish();
}

fn benchmark_named_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("named_catalog");
    group.throughput(Throughput::Elements(NamedGate::ALL.len() as u64));

    group.bench_function("every_named_gate", |b| {
        b.iter(|| {
            for gate in NamedGate::ALL {
                black_box(gate.apply(0xDEAD_BEEF, 0x0BAD_F00D, 0xFEED_FACE));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_truth_table,
    benchmark_all_masks,
    benchmark_named_catalog,
);

criterion_main!(benches);
