//! # SIMULACRA Shared
//!
//! Common types used by the motion parser, the idle generators and the
//! wire encoders.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER do I/O. No sockets, no files, no logging.
//! If you need a side effect, put it in `simulacra_streaming`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod bones;
pub mod constants;
pub mod math;
pub mod packet;

pub use bones::{BoneId, BONE_COUNT};
pub use constants::{
    BINARY_DEFAULT_DESTINATION, DEFAULT_SKELETON_INTERVAL, DEFAULT_TICK_RATE, TEXT_BIND,
};
pub use math::{Quaternion, Transform, Vec3};
pub use packet::{BonePose, Packet};
