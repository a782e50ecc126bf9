//! # Retargeting
//!
//! Turns one frame of a [`MotionClip`] into a [`Packet`] of target bones.
//!
//! Name resolution is done once per clip, when the [`Retargeter`] is built.
//! Per frame it is a walk over a short list of `(joint, bone id)` pairs:
//!
//! ```text
//! joint channels → Euler degrees → quaternion (joint order) → engine handedness
//! ```
//!
//! Joints with no id are skipped. A joint mapped to the hips also sets the
//! packet's root position, scaled to metres with X mirrored.

use simulacra_shared::{BoneId, Packet, Vec3};

use crate::clip::MotionClip;
use crate::mapper::BoneMap;
use crate::rotation::{euler_to_quaternion, to_engine_handedness};
use crate::scale::ScaleFactor;

/// One mapped joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetargetEntry {
    /// Index into the clip's skeleton.
    pub joint: usize,
    /// Target bone.
    pub target: BoneId,
}

/// Precomputed joint → bone plan for one clip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Retargeter {
    plan: Vec<RetargetEntry>,
}

impl Retargeter {
    /// Resolves every joint of `clip` through `map`.
    ///
    /// Two joints resolving to the same id both stay in the plan, in joint
    /// order; the receiver sees the later one last.
    #[must_use]
    pub fn new(clip: &MotionClip, map: &BoneMap) -> Self {
        let plan: Vec<RetargetEntry> = clip
            .skeleton()
            .bones()
            .iter()
            .enumerate()
            .filter_map(|(joint, bone)| match map.resolve(&bone.name) {
                Some(target) => Some(RetargetEntry { joint, target }),
                None => {
                    tracing::trace!(joint = %bone.name, "Unmapped joint dropped");
                    None
                }
            })
            .collect();

        tracing::debug!(
            mapped = plan.len(),
            joints = clip.skeleton().len(),
            "Built retarget plan"
        );
        Self { plan }
    }

    /// Mapped joints in skeleton order.
    #[must_use]
    pub fn plan(&self) -> &[RetargetEntry] {
        &self.plan
    }

    /// Number of bones each packet will carry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plan.len()
    }

    /// Returns true if no joint mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    /// Writes frame `frame_index` of `clip` into `packet`.
    ///
    /// The packet is cleared first. Returns `false`, leaving the packet
    /// empty, if the frame does not exist.
    pub fn fill(&self, clip: &MotionClip, frame_index: usize, packet: &mut Packet) -> bool {
        packet.clear();
        let Some(frame) = clip.frames().frame(frame_index) else {
            return false;
        };
        let bones = clip.skeleton().bones();

        for entry in &self.plan {
            let Some(bone) = bones.get(entry.joint) else {
                continue;
            };
            let Some(sample) = bone.sample(frame) else {
                continue;
            };
            let rotation = to_engine_handedness(euler_to_quaternion(sample.rotation, bone.rotation_order));
            packet.push(entry.target, rotation);

            if entry.target.is_root() {
                packet.root_position = Some(root_position(sample.position, clip.scale()));
            }
        }
        true
    }
}

/// File-space root position to engine space.
#[must_use]
pub fn root_position(position: Vec3, scale: ScaleFactor) -> Vec3 {
    let scaled = scale.apply(position);
    Vec3::new(-scaled.x, scaled.y, scaled.z)
}
