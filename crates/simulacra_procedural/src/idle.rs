//! # Idle Motion
//!
//! Procedural "standing there" motion: slow breathing, body sway, a head
//! that drifts around, and blinks.
//!
//! ## Signals
//!
//! | Signal | Source | Range |
//! |--------|--------|-------|
//! | breath | `sin(t) · 3°` | ±3° |
//! | sway | `sin(0.5t) · 1.5°` + noise walk | about ±2.5° |
//! | head yaw | `sin(0.8t) · 15°` + noise walk | about ±25° |
//! | head pitch | `cos(0.3t) · 2°` + noise walk | about ±5° |
//! | blink | [`BlinkController`] | 0..1 |
//!
//! Poses are authored directly in engine space; no handedness correction
//! is applied when they become a packet.

use simulacra_shared::{BoneId, Packet, Quaternion};

use crate::blink::BlinkController;
use crate::noise_walk::NoiseWalk;
use crate::seed::MotionSeed;

/// Breathing amplitude, degrees of spine pitch.
pub const BREATH_AMPLITUDE: f32 = 3.0;
/// Sine sway amplitude, degrees.
pub const SWAY_AMPLITUDE: f32 = 1.5;
/// Sine head yaw amplitude, degrees.
pub const HEAD_YAW_AMPLITUDE: f32 = 15.0;
/// Sine head pitch amplitude, degrees.
pub const HEAD_PITCH_AMPLITUDE: f32 = 2.0;
/// Eye pitch at a full blink, degrees. Lowers the gaze as the lids close.
pub const BLINK_GAZE_PITCH: f32 = 10.0;

/// One sampled idle pose, degrees per bone axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IdlePose {
    /// Hips rotation about Y.
    pub hips_yaw: f32,
    /// Spine rotation about X.
    pub spine_pitch: f32,
    /// Spine rotation about Z.
    pub spine_roll: f32,
    /// Head rotation about Y.
    pub head_yaw: f32,
    /// Head rotation about X.
    pub head_pitch: f32,
    /// Eyelid closure, 0 open to 1 closed.
    pub blink: f32,
}

impl IdlePose {
    /// Bones written by [`IdlePose::write_packet`], in order.
    pub const BONES: [BoneId; 5] = [
        BoneId::HIPS,
        BoneId::SPINE,
        BoneId::HEAD,
        BoneId::LEFT_EYE,
        BoneId::RIGHT_EYE,
    ];

    /// Replaces `packet`'s contents with this pose.
    ///
    /// The packet carries no root position.
    pub fn write_packet(&self, packet: &mut Packet) {
        packet.clear();

        let hips = Quaternion::from_rotation_y(self.hips_yaw.to_radians());
        let spine = Quaternion::from_rotation_x(self.spine_pitch.to_radians())
            * Quaternion::from_rotation_z(self.spine_roll.to_radians());
        let head = Quaternion::from_rotation_y(self.head_yaw.to_radians())
            * Quaternion::from_rotation_x(self.head_pitch.to_radians());
        let eyes = Quaternion::from_rotation_x((self.blink * BLINK_GAZE_PITCH).to_radians());

        packet.push(BoneId::HIPS, hips.normalize());
        packet.push(BoneId::SPINE, spine.normalize());
        packet.push(BoneId::HEAD, head.normalize());
        packet.push(BoneId::LEFT_EYE, eyes);
        packet.push(BoneId::RIGHT_EYE, eyes);
    }
}

/// Narrows a sine sample, already in `-1..=1`.
#[allow(clippy::cast_possible_truncation)]
fn wave(sample: f64) -> f32 {
    sample as f32
}

/// Idle motion generator.
#[derive(Clone, Debug)]
pub struct IdleMotion {
    clock: f64,
    blink: BlinkController,
    head_yaw: NoiseWalk,
    head_pitch: NoiseWalk,
    sway: NoiseWalk,
}

impl IdleMotion {
    /// Creates a generator with every stream derived from `seed`.
    #[must_use]
    pub fn new(seed: MotionSeed) -> Self {
        tracing::debug!(seed = seed.value(), "Idle motion seeded");
        Self {
            clock: 0.0,
            blink: BlinkController::new(seed.rng(MotionSeed::BLINK)),
            head_yaw: NoiseWalk::new(9.0, -10.0, 10.0, seed.rng(MotionSeed::HEAD_YAW)),
            head_pitch: NoiseWalk::new(2.0, -3.0, 3.0, seed.rng(MotionSeed::HEAD_PITCH)),
            sway: NoiseWalk::new(0.6, -1.0, 1.0, seed.rng(MotionSeed::BODY_SWAY)),
        }
    }

    /// Advances by `dt` seconds and returns the pose.
    pub fn update(&mut self, dt: f32) -> IdlePose {
        self.clock += f64::from(dt);
        let t = self.clock;

        let breath = wave(t.sin()) * BREATH_AMPLITUDE;
        let sway = wave((t * 0.5).sin()) * SWAY_AMPLITUDE + self.sway.update(dt);
        let head_yaw = wave((t * 0.8).sin()) * HEAD_YAW_AMPLITUDE + self.head_yaw.update(dt);
        let head_pitch = wave((t * 0.3).cos()) * HEAD_PITCH_AMPLITUDE + self.head_pitch.update(dt);

        IdlePose {
            hips_yaw: sway * 0.5,
            spine_pitch: breath,
            spine_roll: sway * 0.5,
            head_yaw,
            head_pitch,
            blink: self.blink.update(dt),
        }
    }

    /// Seconds generated so far.
    #[inline]
    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    /// The blink state machine.
    #[inline]
    #[must_use]
    pub const fn blink(&self) -> &BlinkController {
        &self.blink
    }
}

impl Default for IdleMotion {
    fn default() -> Self {
        Self::new(MotionSeed::default())
    }
}
