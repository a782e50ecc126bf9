//! # Wire Protocols
//!
//! Two encodings of the same [`simulacra_shared::Packet`]:
//!
//! - [`text`]: one JSON record per line over TCP
//! - [`binary`]: tagged length-prefixed blocks over UDP
//!
//! Encoders own their output buffer and are reused every tick.

pub mod binary;
pub mod text;

pub use binary::{BinaryEncoder, Block, BlockError, BlockReader, BlockWriter, FrameStamp, Tag};
pub use text::{decode_record, encode_line, DecodeError, TextEncoder, TextRecord};
