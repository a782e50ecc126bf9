//! # Network Constants
//!
//! Defaults for the two wire protocols. Every value here can be overridden
//! from the TOML config; these are what an unconfigured server uses.

// =============================================================================
// TEXT PROTOCOL (TCP, newline-delimited JSON)
// =============================================================================

/// Address the text protocol listens on. The avatar engine connects here.
pub const TEXT_BIND: &str = "127.0.0.1:3910";

/// Protocol version written into every text record.
pub const TEXT_PROTOCOL_VERSION: i32 = 2;

/// Device id written into every text record.
pub const TEXT_DEVICE_ID: i32 = 9;

/// Device type written into every text record.
pub const TEXT_DEVICE_TYPE: i32 = 2;

/// Tracker slot written into every text record.
pub const TEXT_SLOT: i32 = 0;

/// Command number meaning "no command".
pub const TEXT_NO_COMMAND: i32 = -1;

// =============================================================================
// BINARY PROTOCOL (UDP, tagged blocks)
// =============================================================================

/// Where binary datagrams are sent when no destination is configured.
pub const BINARY_DEFAULT_DESTINATION: &str = "127.0.0.1:12351";

/// Local address the binary sender binds to (ephemeral port).
pub const BINARY_DEFAULT_BIND: &str = "0.0.0.0:0";

/// Skeleton definition is resent every this many ticks (1s at 50Hz).
pub const DEFAULT_SKELETON_INTERVAL: u32 = 50;

// =============================================================================
// TIMING
// =============================================================================

/// Tick rate used for procedural idle streaming (updates per second).
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Fastest tick rate the session will run at, from config or from a clip.
pub const MAX_TICK_RATE: u32 = 1_000;

/// Frame time assumed when a motion file does not declare one (30 fps).
pub const DEFAULT_FRAME_TIME: f32 = 1.0 / 30.0;
