//! Benchmark for idle pose generation.
//!
//! TARGET: one pose + packet in well under a microsecond
//!
//! Run with: cargo bench --package simulacra_procedural --bench idle_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use simulacra_procedural::{BlinkController, IdleMotion, MotionSeed};
use simulacra_shared::Packet;

fn benchmark_idle_tick(c: &mut Criterion) {
    let mut idle = IdleMotion::new(MotionSeed::new(42));
    let mut packet = Packet::with_capacity(8);

    c.bench_function("idle_pose_to_packet", |b| {
        b.iter(|| {
            idle.update(black_box(1.0 / 60.0)).write_packet(&mut packet);
            black_box(&packet);
        });
    });
}

fn benchmark_one_minute(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_minute_at_60hz");
    group.throughput(Throughput::Elements(3_600));

    group.bench_function("blink_controller", |b| {
        b.iter(|| {
            let mut blink = BlinkController::new(MotionSeed::new(42).rng(MotionSeed::BLINK));
            for _ in 0..3_600 {
                black_box(blink.update(1.0 / 60.0));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_idle_tick, benchmark_one_minute);
criterion_main!(benches);
