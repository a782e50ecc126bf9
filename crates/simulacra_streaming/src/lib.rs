//! # SIMULACRA Streaming
//!
//! Streams avatar motion to an engine, one packet per tick.
//!
//! ## Design Principles
//!
//! 1. **One timeline**: a fixed-rate tick loop drives accept, build,
//!    encode and write, in that order
//! 2. **Never block**: sockets are polled; back-pressure drops data
//! 3. **Never die after startup**: a lost peer means listening again
//!
//! ## Protocols
//!
//! - **Text**: one JSON object per line over TCP, one peer at a time
//! - **Binary**: tagged TLV blocks in UDP datagrams to a fixed destination
//!
//! ## Example
//!
//! ```rust,ignore
//! use simulacra_streaming::{SimulacraConfig, StreamingSession};
//!
//! let config = SimulacraConfig::load("simulacra.toml")?;
//! let (mut session, handle) = StreamingSession::new(&config)?;
//!
//! // Steer from elsewhere with `handle.play(clip, false)`.
//! session.run(None);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod source;
pub mod transport;

pub use config::{
    DeviceSection, IdleSection, MappingSection, PlaybackSection, Protocol, SimulacraConfig, StreamSection,
};
pub use error::{StreamError, StreamResult};
pub use protocol::{BinaryEncoder, BlockReader, FrameStamp, TextEncoder, TextRecord};
pub use session::{PeerState, SessionCommand, SessionHandle, SessionStats, StreamingSession};
pub use source::{FrameSource, Playback, SourceStatus};
pub use transport::{SendOutcome, UdpTransport};
