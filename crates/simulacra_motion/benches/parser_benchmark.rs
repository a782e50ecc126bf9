//! Benchmark for capture parsing and per-frame retargeting.
//!
//! TARGET: retarget a 55-joint frame well under one 60 Hz tick
//!
//! Run with: cargo bench --package simulacra_motion --bench parser_benchmark

use std::fmt::Write;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use simulacra_motion::{BoneMap, MotionClip, Retargeter};
use simulacra_shared::Packet;

const JOINTS: &[&str] = &[
    "Hips", "Spine", "Spine1", "Spine2", "Neck", "Head", "LeftShoulder", "LeftArm",
    "LeftForeArm", "LeftHand", "RightShoulder", "RightArm", "RightForeArm", "RightHand",
    "LeftUpLeg", "LeftLeg", "LeftFoot", "LeftToe", "RightUpLeg", "RightLeg", "RightFoot",
    "RightToe",
];

/// A chain of joints with `frames` rows of varying angles.
fn synthetic_clip(frames: usize) -> String {
    let mut text = String::from("HIERARCHY\nROOT Hips\n{\n  OFFSET 0 0 0\n");
    text.push_str("  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\n");
    for name in &JOINTS[1..] {
        let _ = writeln!(text, "  JOINT {name}\n  {{\n    OFFSET 0 5 0");
        text.push_str("    CHANNELS 3 Zrotation Xrotation Yrotation\n");
    }
    for _ in &JOINTS[1..] {
        text.push_str("  }\n");
    }
    text.push_str("}\nMOTION\n");
    let _ = writeln!(text, "Frames: {frames}\nFrame Time: 0.0333333");

    let channels = 6 + 3 * (JOINTS.len() - 1);
    for f in 0..frames {
        let row: Vec<String> = (0..channels)
            .map(|c| format!("{:.4}", ((f * 7 + c * 13) % 360) as f32 - 180.0))
            .collect();
        text.push_str(&row.join(" "));
        text.push('\n');
    }
    text
}

fn benchmark_parse(c: &mut Criterion) {
    let text = synthetic_clip(1_000);

    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.sample_size(20);

    group.bench_function("parse_1000_frames", |b| {
        b.iter(|| black_box(MotionClip::parse(black_box(&text))));
    });

    group.finish();
}

fn benchmark_retarget_frame(c: &mut Criterion) {
    let clip = MotionClip::parse(&synthetic_clip(120)).unwrap();
    let retarget = Retargeter::new(&clip, &BoneMap::humanoid());
    let mut packet = Packet::with_capacity(retarget.len());

    c.bench_function("retarget_single_frame", |b| {
        let mut frame = 0usize;
        b.iter(|| {
            frame = (frame + 1) % clip.frame_count();
            black_box(retarget.fill(&clip, black_box(frame), &mut packet));
        });
    });
}

criterion_group!(benches, benchmark_parse, benchmark_retarget_frame);
criterion_main!(benches);
