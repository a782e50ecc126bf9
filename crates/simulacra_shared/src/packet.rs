//! # Motion Packet
//!
//! The transport-independent snapshot produced once per tick, whatever the
//! frame source, and handed to whichever encoder is active.

use crate::bones::BoneId;
use crate::math::{Quaternion, Vec3};

/// Rotation of one target bone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BonePose {
    /// Target bone.
    pub id: BoneId,
    /// Local rotation in engine space. Unit norm.
    pub rotation: Quaternion,
}

/// One tick's worth of motion.
///
/// Reused across ticks: call [`Packet::clear`] instead of allocating a new
/// one so the bone buffer keeps its capacity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Packet {
    /// Root position in engine units (metres). Present only when the source
    /// mapped a hips bone this tick.
    pub root_position: Option<Vec3>,
    /// Bone rotations in source order.
    pub bones: Vec<BonePose>,
}

impl Packet {
    /// Creates an empty packet with room for `capacity` bones.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            root_position: None,
            bones: Vec::with_capacity(capacity),
        }
    }

    /// Empties the packet, keeping its allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.root_position = None;
        self.bones.clear();
    }

    /// Appends a bone rotation.
    #[inline]
    pub fn push(&mut self, id: BoneId, rotation: Quaternion) {
        self.bones.push(BonePose { id, rotation });
    }

    /// Rotation of `id`, if the packet carries it.
    #[must_use]
    pub fn rotation_of(&self, id: BoneId) -> Option<Quaternion> {
        self.bones.iter().find(|b| b.id == id).map(|b| b.rotation)
    }

    /// Returns true if no bone and no root position is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root_position.is_none() && self.bones.is_empty()
    }
}
