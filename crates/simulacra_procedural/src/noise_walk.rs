//! # Noise Walk
//!
//! A value that drifts toward a random target at a fixed speed, rests
//! there for a moment, then picks a new target.
//!
//! ```text
//!  max ┤        ╭──────╮
//!      │       ╱        ╲            ╭───
//!      │ ─────╯          ╲      ╭───╯
//!  min ┤                  ╰────╯
//!        hold   walk   hold  walk hold
//! ```
//!
//! Holds last `U[0.5, 2.0]` seconds.

use std::ops::RangeInclusive;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Hold duration range after reaching a target, seconds.
pub const HOLD_RANGE: RangeInclusive<f32> = 0.5..=2.0;

/// Bounded random walk with holds.
#[derive(Clone, Debug)]
pub struct NoiseWalk {
    value: f32,
    target: f32,
    /// Units per second.
    speed: f32,
    min: f32,
    max: f32,
    hold_timer: f32,
    rng: ChaCha8Rng,
}

impl NoiseWalk {
    /// Creates a walk in `[min, max]` moving `speed` units per second.
    ///
    /// Start value and first target are drawn from the range. Bounds given
    /// in the wrong order are swapped.
    #[must_use]
    pub fn new(speed: f32, min: f32, max: f32, mut rng: ChaCha8Rng) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let value = rng.gen_range(min..=max);
        let target = rng.gen_range(min..=max);
        Self {
            value,
            target,
            speed: speed.abs(),
            min,
            max,
            hold_timer: 0.0,
            rng,
        }
    }

    /// Advances by `dt` seconds and returns the new value.
    pub fn update(&mut self, dt: f32) -> f32 {
        if self.hold_timer > 0.0 {
            self.hold_timer -= dt;
            return self.value;
        }

        let diff = self.target - self.value;
        let step = self.speed * dt;
        if diff.abs() < step {
            self.value = self.target;
            self.target = self.rng.gen_range(self.min..=self.max);
            self.hold_timer = self.rng.gen_range(HOLD_RANGE);
        } else {
            self.value += step.copysign(diff);
        }
        self.value
    }

    /// Current value.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Value being walked toward.
    #[inline]
    #[must_use]
    pub const fn target(&self) -> f32 {
        self.target
    }

    /// Returns true while resting at a reached target.
    #[inline]
    #[must_use]
    pub fn is_holding(&self) -> bool {
        self.hold_timer > 0.0
    }
}
