//! # SIMULACRA Motion
//!
//! Capture file ingestion and retargeting onto the target bone table.
//!
//! ## Pipeline
//!
//! 1. **Parse**: BVH text → [`Skeleton`] + [`FrameSet`] ([`parser`])
//! 2. **Scale**: detect centimetre vs metre sources ([`scale`])
//! 3. **Map**: source joint names → [`simulacra_shared::BoneId`] ([`mapper`])
//! 4. **Rotate**: Euler channels → engine-space quaternions ([`rotation`])
//!
//! Steps 1 and 2 happen once in [`MotionClip::load`]. Steps 3 and 4 are
//! driven per frame by a [`Retargeter`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use simulacra_motion::{BoneMap, MotionClip, Retargeter};
//! use simulacra_shared::Packet;
//!
//! let clip = MotionClip::load("dance.bvh")?;
//! let retarget = Retargeter::new(&clip, &BoneMap::humanoid());
//!
//! let mut packet = Packet::default();
//! retarget.fill(&clip, 0, &mut packet);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clip;
pub mod error;
pub mod mapper;
pub mod parser;
pub mod retarget;
pub mod rotation;
pub mod scale;
pub mod skeleton;

pub use clip::MotionClip;
pub use error::{FormatError, MotionError, MotionResult, Section};
pub use mapper::BoneMap;
pub use parser::parse;
pub use retarget::{RetargetEntry, Retargeter};
pub use rotation::{euler_to_quaternion, to_engine_handedness, Axis, RotationOrder};
pub use scale::{detect_scale, DistanceUnit, ScaleFactor};
pub use skeleton::{BoneDef, BoneSample, Channel, FrameSet, Skeleton};
