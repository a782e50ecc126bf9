//! # Bone Mapper
//!
//! Source joint names to target bone ids. Many names may map to one id;
//! names that map to nothing are dropped by the retargeter.
//!
//! Lookup is an exact match, then one retry with any namespace prefix
//! (`mixamorig:Hips` → `Hips`) stripped. Nothing fuzzier.

use std::collections::HashMap;

use simulacra_shared::BoneId;

/// Separator between an exporter namespace and the joint name.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Aliases every map starts with, grouped by target bone.
const HUMANOID_ALIASES: &[(u16, &[&str])] = &[
    (0, &["Hips", "hip"]),
    (7, &["Spine", "Spine1", "abdomen"]),
    (8, &["Chest", "Spine2", "chest"]),
    (54, &["UpperChest", "Spine3"]),
    (9, &["Neck", "neck"]),
    (10, &["Head", "head"]),
    (1, &["LeftUpLeg", "LeftThigh", "lThigh"]),
    (2, &["RightUpLeg", "RightThigh", "rThigh"]),
    (3, &["LeftLeg", "LeftShin", "lShin"]),
    (4, &["RightLeg", "RightShin", "rShin"]),
    (5, &["LeftFoot", "lFoot"]),
    (6, &["RightFoot", "rFoot"]),
    (19, &["LeftToe", "LeftToes"]),
    (20, &["RightToe", "RightToes"]),
    (11, &["LeftShoulder", "LeftCollar", "lCollar"]),
    (12, &["RightShoulder", "RightCollar", "rCollar"]),
    (13, &["LeftArm", "LeftUpArm", "LeftUpperArm", "lShldr"]),
    (14, &["RightArm", "RightUpArm", "RightUpperArm", "rShldr"]),
    (15, &["LeftForeArm", "LeftLowerArm", "lForeArm"]),
    (16, &["RightForeArm", "RightLowerArm", "rForeArm"]),
    (17, &["LeftHand", "lHand"]),
    (18, &["RightHand", "rHand"]),
    (24, &["LeftHandThumb1", "LeftThumbProximal", "lThumb1"]),
    (27, &["LeftHandIndex1", "LeftIndexProximal", "lIndex1"]),
    (30, &["LeftHandMiddle1", "LeftMiddleProximal", "lMid1"]),
    (33, &["LeftHandRing1", "LeftRingProximal", "lRing1"]),
    (36, &["LeftHandPinky1", "LeftLittleProximal", "lPinky1"]),
    (39, &["RightHandThumb1", "RightThumbProximal", "rThumb1"]),
    (42, &["RightHandIndex1", "RightIndexProximal", "rIndex1"]),
    (45, &["RightHandMiddle1", "RightMiddleProximal", "rMid1"]),
    (48, &["RightHandRing1", "RightRingProximal", "rRing1"]),
    (51, &["RightHandPinky1", "RightLittleProximal", "rPinky1"]),
    (21, &["LeftEye", "leftEye"]),
    (22, &["RightEye", "rightEye"]),
    (23, &["Jaw"]),
];

/// Name → bone id table.
#[derive(Clone, Debug, Default)]
pub struct BoneMap {
    aliases: HashMap<String, BoneId>,
}

impl BoneMap {
    /// Creates an empty map. Every lookup misses until aliases are added.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates the built-in humanoid map.
    #[must_use]
    pub fn humanoid() -> Self {
        let mut map = Self::empty();
        for &(raw, names) in HUMANOID_ALIASES {
            for name in names {
                map.aliases.insert((*name).to_owned(), BoneId(raw));
            }
        }
        map
    }

    /// Adds or replaces one alias, builder style.
    #[must_use]
    pub fn with_alias(mut self, name: impl Into<String>, id: BoneId) -> Self {
        self.insert(name, id);
        self
    }

    /// Adds or replaces one alias. Returns the id it displaced, if any.
    pub fn insert(&mut self, name: impl Into<String>, id: BoneId) -> Option<BoneId> {
        self.aliases.insert(name.into(), id)
    }

    /// Resolves a source joint name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<BoneId> {
        if let Some(&id) = self.aliases.get(name) {
            return Some(id);
        }
        let (_, bare) = name.rsplit_once(NAMESPACE_SEPARATOR)?;
        self.aliases.get(bare).copied()
    }

    /// Number of aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns true if no alias is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
