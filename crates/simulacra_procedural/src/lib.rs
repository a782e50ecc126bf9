//! # SIMULACRA Procedural
//!
//! Idle motion for when no capture file is playing.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same [`MotionSeed`] always produces the same motion
//! 2. **Clock-free**: everything advances by an explicit `dt`
//! 3. **Engine space**: poses need no handedness correction
//!
//! ## Core Components
//!
//! - [`NoiseWalk`]: bounded random walk with holds
//! - [`BlinkController`]: eyelid state machine
//! - [`IdleMotion`]: breathing, sway, head drift and blinks as an [`IdlePose`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use simulacra_procedural::{IdleMotion, MotionSeed};
//! use simulacra_shared::Packet;
//!
//! let mut idle = IdleMotion::new(MotionSeed::new(12345));
//! let mut packet = Packet::default();
//!
//! // One 60 Hz tick
//! idle.update(1.0 / 60.0).write_packet(&mut packet);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod blink;
pub mod idle;
pub mod noise_walk;
pub mod seed;

pub use blink::{BlinkController, BlinkState};
pub use idle::{IdleMotion, IdlePose};
pub use noise_walk::NoiseWalk;
pub use seed::MotionSeed;
