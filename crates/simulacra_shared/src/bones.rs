//! # Target Bone Table
//!
//! The fixed bone-id space shared by both wire protocols and the bone
//! mapper. Ids follow the humanoid ordering the avatar engine uses:
//! `0` is the hips (root), `54` the upper chest.

use serde::{Deserialize, Serialize};

/// Number of bones in the target table.
pub const BONE_COUNT: usize = 55;

/// Identifier of a bone in the target table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoneId(pub u16);

/// `(name, parent)` for every id, indexed by id.
///
/// Hips is listed as its own parent; that is what the binary protocol
/// sends for the root.
const TABLE: [(&str, u16); BONE_COUNT] = [
    ("Hips", 0),
    ("LeftUpperLeg", 0),
    ("RightUpperLeg", 0),
    ("LeftLowerLeg", 1),
    ("RightLowerLeg", 2),
    ("LeftFoot", 3),
    ("RightFoot", 4),
    ("Spine", 0),
    ("Chest", 7),
    ("Neck", 54),
    ("Head", 9),
    ("LeftShoulder", 54),
    ("RightShoulder", 54),
    ("LeftUpperArm", 11),
    ("RightUpperArm", 12),
    ("LeftLowerArm", 13),
    ("RightLowerArm", 14),
    ("LeftHand", 15),
    ("RightHand", 16),
    ("LeftToes", 5),
    ("RightToes", 6),
    ("LeftEye", 10),
    ("RightEye", 10),
    ("Jaw", 10),
    ("LeftThumbProximal", 17),
    ("LeftThumbIntermediate", 24),
    ("LeftThumbDistal", 25),
    ("LeftIndexProximal", 17),
    ("LeftIndexIntermediate", 27),
    ("LeftIndexDistal", 28),
    ("LeftMiddleProximal", 17),
    ("LeftMiddleIntermediate", 30),
    ("LeftMiddleDistal", 31),
    ("LeftRingProximal", 17),
    ("LeftRingIntermediate", 33),
    ("LeftRingDistal", 34),
    ("LeftLittleProximal", 17),
    ("LeftLittleIntermediate", 36),
    ("LeftLittleDistal", 37),
    ("RightThumbProximal", 18),
    ("RightThumbIntermediate", 39),
    ("RightThumbDistal", 40),
    ("RightIndexProximal", 18),
    ("RightIndexIntermediate", 42),
    ("RightIndexDistal", 43),
    ("RightMiddleProximal", 18),
    ("RightMiddleIntermediate", 45),
    ("RightMiddleDistal", 46),
    ("RightRingProximal", 18),
    ("RightRingIntermediate", 48),
    ("RightRingDistal", 49),
    ("RightLittleProximal", 18),
    ("RightLittleIntermediate", 51),
    ("RightLittleDistal", 52),
    ("UpperChest", 8),
];

impl BoneId {
    /// Root of the hierarchy. The only bone whose position is streamed.
    pub const HIPS: Self = Self(0);
    /// Lower spine.
    pub const SPINE: Self = Self(7);
    /// Chest.
    pub const CHEST: Self = Self(8);
    /// Neck.
    pub const NECK: Self = Self(9);
    /// Head.
    pub const HEAD: Self = Self(10);
    /// Left eye.
    pub const LEFT_EYE: Self = Self(21);
    /// Right eye.
    pub const RIGHT_EYE: Self = Self(22);
    /// Upper chest.
    pub const UPPER_CHEST: Self = Self(54);

    /// Returns the id if it lies inside the table.
    #[must_use]
    pub const fn new(raw: u16) -> Option<Self> {
        if (raw as usize) < BONE_COUNT {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Raw id value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Returns true for the hips.
    #[inline]
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == Self::HIPS.0
    }

    /// Canonical name, or `None` outside the table.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        TABLE.get(self.0 as usize).map(|(name, _)| *name)
    }

    /// Parent id. Hips returns itself.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        TABLE.get(self.0 as usize).map(|(_, parent)| Self(*parent))
    }

    /// Every id in table order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..BONE_COUNT as u16).map(Self)
    }
}

impl std::fmt::Display for BoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}({})", self.0),
            None => write!(f, "#{}", self.0),
        }
    }
}
