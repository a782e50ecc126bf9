//! Benchmark for the per-tick encode path.
//!
//! TARGET: full-body text record < 20μs, binary frame < 5μs
//!
//! Run with: cargo bench --package simulacra_streaming --bench encoder_benchmark

use std::net::Ipv4Addr;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use simulacra_shared::{BoneId, Packet, Quaternion, Vec3};
use simulacra_streaming::{BinaryEncoder, DeviceSection, FrameStamp, TextEncoder};

fn full_body() -> Packet {
    let mut packet = Packet::with_capacity(simulacra_shared::BONE_COUNT);
    packet.root_position = Some(Vec3::new(0.02, 0.98, -0.1));
    for (i, id) in BoneId::all().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let angle = i as f32 * 0.05;
        packet.push(id, Quaternion::from_rotation_y(angle));
    }
    packet
}

fn benchmark_text(c: &mut Criterion) {
    let packet = full_body();
    let mut encoder = TextEncoder::new(&DeviceSection::default());

    let mut group = c.benchmark_group("text_record");
    group.throughput(Throughput::Elements(packet.bones.len() as u64));
    group.bench_function("full_body", |b| {
        b.iter(|| {
            let line = encoder.encode(black_box(&packet)).unwrap();
            black_box(line.len());
        });
    });
    group.finish();
}

fn benchmark_binary(c: &mut Criterion) {
    let packet = full_body();
    let mut encoder = BinaryEncoder::new(Ipv4Addr::LOCALHOST, 12351);

    let mut group = c.benchmark_group("binary_datagram");
    group.throughput(Throughput::Elements(packet.bones.len() as u64));

    let mut tick = 0u64;
    group.bench_function("frame", |b| {
        b.iter(|| {
            tick += 1;
            let stamp = FrameStamp::wrapping(tick, u128::from(tick) * 16_667);
            black_box(encoder.encode_frame(black_box(&packet), stamp).len());
        });
    });

    group.bench_function("skeleton", |b| {
        b.iter(|| black_box(encoder.encode_skeleton().len()));
    });

    group.finish();
}

criterion_group!(benches, benchmark_text, benchmark_binary);
criterion_main!(benches);
