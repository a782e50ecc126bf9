//! # Skeleton and Frame Data
//!
//! In-memory result of parsing a capture file.
//!
//! ## Layout
//!
//! Joints are stored in order of first appearance in the hierarchy. That
//! order fixes the layout of every frame: joint 0's channels first, then
//! joint 1's, and so on. Each joint remembers where its channels start
//! (`channel_offset`) so a frame never has to be re-walked.

use std::fmt;
use std::str::FromStr;

use simulacra_shared::Vec3;

use crate::rotation::{Axis, RotationOrder};

/// One recorded degree of freedom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Translation along X.
    Xposition,
    /// Translation along Y.
    Yposition,
    /// Translation along Z.
    Zposition,
    /// Rotation about X, degrees.
    Xrotation,
    /// Rotation about Y, degrees.
    Yrotation,
    /// Rotation about Z, degrees.
    Zrotation,
}

impl Channel {
    /// Axis this channel acts on.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Xposition | Self::Xrotation => Axis::X,
            Self::Yposition | Self::Yrotation => Axis::Y,
            Self::Zposition | Self::Zrotation => Axis::Z,
        }
    }

    /// Returns true for the three rotation channels.
    #[must_use]
    pub const fn is_rotation(self) -> bool {
        matches!(self, Self::Xrotation | Self::Yrotation | Self::Zrotation)
    }
}

impl FromStr for Channel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const NAMES: [(&str, Channel); 6] = [
            ("xposition", Channel::Xposition),
            ("yposition", Channel::Yposition),
            ("zposition", Channel::Zposition),
            ("xrotation", Channel::Xrotation),
            ("yrotation", Channel::Yrotation),
            ("zrotation", Channel::Zrotation),
        ];
        NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, channel)| *channel)
            .ok_or(())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Xposition => "Xposition",
            Self::Yposition => "Yposition",
            Self::Zposition => "Zposition",
            Self::Xrotation => "Xrotation",
            Self::Yrotation => "Yrotation",
            Self::Zrotation => "Zrotation",
        };
        f.write_str(name)
    }
}

/// A joint that carries channels.
#[derive(Clone, Debug, PartialEq)]
pub struct BoneDef {
    /// Joint name as written in the file.
    pub name: String,
    /// Declared channels, in file order.
    pub channels: Vec<Channel>,
    /// Composition order from the joint's rotation channels.
    pub rotation_order: RotationOrder,
    /// Index of the parent joint, `None` for a root.
    pub parent: Option<usize>,
    /// Index of this joint's first value within a frame.
    pub channel_offset: usize,
}

/// Position and rotation read out of one frame for one joint.
///
/// Channels a joint does not declare read as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoneSample {
    /// Translation, file units.
    pub position: Vec3,
    /// Euler angles per axis, degrees.
    pub rotation: Vec3,
}

impl BoneDef {
    /// Reads this joint's channels out of a flat frame.
    ///
    /// Returns `None` if the frame is too short, which cannot happen for
    /// frames of the [`FrameSet`] parsed together with this joint.
    #[must_use]
    pub fn sample(&self, frame: &[f32]) -> Option<BoneSample> {
        let values = frame.get(self.channel_offset..self.channel_offset + self.channels.len())?;
        let mut sample = BoneSample::default();
        for (channel, &value) in self.channels.iter().zip(values) {
            let target = if channel.is_rotation() {
                &mut sample.rotation
            } else {
                &mut sample.position
            };
            match channel.axis() {
                Axis::X => target.x = value,
                Axis::Y => target.y = value,
                Axis::Z => target.z = value,
            }
        }
        Some(sample)
    }

    /// Returns true if the joint records any translation.
    #[must_use]
    pub fn has_position(&self) -> bool {
        self.channels.iter().any(|c| !c.is_rotation())
    }
}

/// Parsed joint hierarchy. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Skeleton {
    bones: Vec<BoneDef>,
    channel_count: usize,
}

impl Skeleton {
    /// Builds a skeleton, assigning channel offsets in joint order.
    #[must_use]
    pub fn new(mut bones: Vec<BoneDef>) -> Self {
        let mut offset = 0;
        for bone in &mut bones {
            bone.channel_offset = offset;
            offset += bone.channels.len();
        }
        Self {
            bones,
            channel_count: offset,
        }
    }

    /// Joints in file order.
    #[must_use]
    pub fn bones(&self) -> &[BoneDef] {
        &self.bones
    }

    /// Number of joints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Returns true if there are no joints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Values per frame: the sum of every joint's channel count.
    #[must_use]
    pub const fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Looks a joint up by name.
    #[must_use]
    pub fn bone(&self, name: &str) -> Option<&BoneDef> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Name of a joint's parent; `None` for roots and unknown names.
    #[must_use]
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        let parent = self.bone(name)?.parent?;
        self.bones.get(parent).map(|b| b.name.as_str())
    }
}

/// Time-ordered frames, stored flat.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSet {
    frame_time: f32,
    channel_count: usize,
    values: Vec<f32>,
}

impl FrameSet {
    /// Creates an empty frame set for `channel_count` values per frame.
    #[must_use]
    pub fn new(frame_time: f32, channel_count: usize) -> Self {
        Self {
            frame_time,
            channel_count,
            values: Vec::new(),
        }
    }

    /// Wraps already validated rows laid end to end.
    pub(crate) fn from_values(frame_time: f32, channel_count: usize, values: Vec<f32>) -> Self {
        debug_assert!(channel_count == 0 || values.len() % channel_count == 0);
        Self {
            frame_time,
            channel_count,
            values,
        }
    }

    /// Appends a frame. The caller guarantees its length.
    #[cfg(test)]
    pub(crate) fn push(&mut self, frame: &[f32]) {
        debug_assert_eq!(frame.len(), self.channel_count);
        self.values.extend_from_slice(frame);
    }

    /// Seconds per frame.
    #[must_use]
    pub const fn frame_time(&self) -> f32 {
        self.frame_time
    }

    /// Values per frame.
    #[must_use]
    pub const fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.channel_count == 0 {
            0
        } else {
            self.values.len() / self.channel_count
        }
    }

    /// Returns true if no frame was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Playback length in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.len() as f32 * self.frame_time
    }

    /// Values of frame `index`.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.channel_count)?;
        self.values.get(start..start + self.channel_count)
    }

    /// Iterates frames in order.
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.channel_count.max(1))
    }
}
