//! # Idle Session Integration Test
//!
//! Runs idle motion for a few simulated minutes at streaming rates.

use simulacra_procedural::{BlinkState, IdleMotion, MotionSeed};
use simulacra_shared::{BoneId, Packet};

/// Test: ten minutes at 60 Hz keeps blinking and never emits a bad rotation.
#[test]
fn test_ten_minutes_at_60hz() {
    let mut idle = IdleMotion::new(MotionSeed::new(2024));
    let mut packet = Packet::with_capacity(8);
    let mut closed_ticks = 0u32;

    for _ in 0..(60 * 60 * 10) {
        idle.update(1.0 / 60.0).write_packet(&mut packet);
        assert_eq!(packet.bones.len(), 5);
        for bone in &packet.bones {
            let q = bone.rotation;
            assert!(q.x.is_finite() && q.y.is_finite() && q.z.is_finite() && q.w.is_finite());
            assert!((q.norm() - 1.0).abs() < 1e-5);
        }
        if idle.blink().state() == BlinkState::Closed {
            closed_ticks += 1;
        }
    }

    let blinks = idle.blink().blink_count();
    println!("\n=== Idle Session: {blinks} blinks in 10 minutes ===");
    // Mean gap is under 4s; 600s of idle must blink far more than 60 times
    assert!(blinks > 60, "only {blinks} blinks");
    assert!(closed_ticks > 0);
}

/// Test: the same seed replays the same motion; another seed does not.
#[test]
fn test_seed_replay_is_exact() {
    let run = |seed| {
        let mut idle = IdleMotion::new(MotionSeed::new(seed));
        let mut packet = Packet::default();
        for _ in 0..900 {
            idle.update(1.0 / 30.0).write_packet(&mut packet);
        }
        packet.rotation_of(BoneId::HEAD)
    };
    assert_eq!(run(5), run(5));
    assert_ne!(run(5), run(6));
}
