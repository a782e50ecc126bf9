//! # Motion Seed
//!
//! Every random draw in this crate comes from a `ChaCha8Rng` seeded from
//! one [`MotionSeed`]. Each generator gets its own derived stream, so adding
//! a generator never shifts the draws of another.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Root seed for one run of idle motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MotionSeed(u64);

impl MotionSeed {
    /// Stream for the blink controller.
    pub const BLINK: u64 = 1;
    /// Stream for head yaw drift.
    pub const HEAD_YAW: u64 = 2;
    /// Stream for head pitch drift.
    pub const HEAD_PITCH: u64 = 3;
    /// Stream for body sway drift.
    pub const BODY_SWAY: u64 = 4;

    /// Creates a seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for `purpose`.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }

    /// Random stream for `purpose`.
    #[must_use]
    pub fn rng(self, purpose: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.derive(purpose).0)
    }
}

impl Default for MotionSeed {
    fn default() -> Self {
        Self(0x5EED_0F_1D1E)
    }
}
