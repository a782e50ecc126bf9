//! # Binary Protocol
//!
//! Length-prefixed tagged blocks over UDP. Every block is
//!
//! ```text
//! ┌────────────────┬──────────┬───────────────────────┐
//! │ length: u32 LE │ tag: 4 B │ payload: length bytes │
//! └────────────────┴──────────┴───────────────────────┘
//! ```
//!
//! and a payload may itself be a run of blocks. Two datagram shapes:
//!
//! ```text
//! skeleton: head{ftyp vrsn} sndf{ipad rcvp} skdf{bons{bndt{bnid pbid tran}…}}
//! frame:    head{ftyp vrsn} sndf{ipad rcvp} fram{fnum time btrs{btdt{bnid tran}…}}
//! ```
//!
//! `tran` is seven `f32` LE: rotation `x y z w`, then position `x y z`.
//! It sits inside `bndt`/`btdt` after the id blocks.

use std::net::Ipv4Addr;

use thiserror::Error;

use simulacra_shared::{BoneId, Packet, Transform, Vec3};

/// A four-byte block tag.
pub type Tag = [u8; 4];

/// Size of the length + tag header.
pub const BLOCK_HEADER_SIZE: usize = 8;

/// Block tags.
pub mod tags {
    use super::Tag;

    /// Stream header.
    pub const HEAD: Tag = *b"head";
    /// Format name, inside `head`.
    pub const FTYP: Tag = *b"ftyp";
    /// Format version, inside `head`.
    pub const VRSN: Tag = *b"vrsn";
    /// Sender info.
    pub const SNDF: Tag = *b"sndf";
    /// Sender IPv4 address, padded to 8 bytes.
    pub const IPAD: Tag = *b"ipad";
    /// Receive port.
    pub const RCVP: Tag = *b"rcvp";
    /// Skeleton definition.
    pub const SKDF: Tag = *b"skdf";
    /// Bone list.
    pub const BONS: Tag = *b"bons";
    /// One bone definition.
    pub const BNDT: Tag = *b"bndt";
    /// Bone id.
    pub const BNID: Tag = *b"bnid";
    /// Parent bone id.
    pub const PBID: Tag = *b"pbid";
    /// Transform.
    pub const TRAN: Tag = *b"tran";
    /// Frame.
    pub const FRAM: Tag = *b"fram";
    /// Frame number.
    pub const FNUM: Tag = *b"fnum";
    /// Timestamp, microseconds.
    pub const TIME: Tag = *b"time";
    /// Bone transform list.
    pub const BTRS: Tag = *b"btrs";
    /// One bone transform.
    pub const BTDT: Tag = *b"btdt";
}

/// Format name carried in `ftyp`.
pub const FORMAT_NAME: &[u8] = b"mocopi";
/// Format version carried in `vrsn`.
pub const FORMAT_VERSION: u8 = 0x01;

/// Writes nested blocks into a growable buffer.
///
/// Reused across datagrams: [`BlockWriter::reset`] keeps the allocation.
#[derive(Clone, Debug, Default)]
pub struct BlockWriter {
    buffer: Vec<u8>,
    /// Payload start of every block still open.
    open: Vec<usize>,
}

impl BlockWriter {
    /// Creates a writer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            open: Vec::with_capacity(4),
        }
    }

    /// Resets the writer for reuse.
    #[inline]
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.open.clear();
    }

    /// Returns the number of bytes written.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no bytes have been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the written data.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Opens a block whose payload is the blocks written until
    /// [`BlockWriter::end`].
    pub fn begin(&mut self, tag: Tag) {
        self.buffer.extend_from_slice(&0u32.to_le_bytes());
        self.buffer.extend_from_slice(&tag);
        self.open.push(self.buffer.len());
    }

    /// Closes the innermost open block, patching its length.
    pub fn end(&mut self) {
        let Some(start) = self.open.pop() else {
            debug_assert!(false, "end() without begin()");
            return;
        };
        let length = (self.buffer.len() - start) as u32;
        let at = start - BLOCK_HEADER_SIZE;
        self.buffer[at..at + 4].copy_from_slice(&length.to_le_bytes());
    }

    /// Writes a complete leaf block.
    #[inline]
    pub fn write_block(&mut self, tag: Tag, payload: &[u8]) {
        self.buffer.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.buffer.extend_from_slice(&tag);
        self.buffer.extend_from_slice(payload);
    }

    /// Writes a leaf holding a u16 in little-endian format.
    #[inline]
    pub fn write_u16(&mut self, tag: Tag, value: u16) {
        self.write_block(tag, &value.to_le_bytes());
    }

    /// Writes a leaf holding a u32 in little-endian format.
    #[inline]
    pub fn write_u32(&mut self, tag: Tag, value: u32) {
        self.write_block(tag, &value.to_le_bytes());
    }

    /// Writes a `tran` leaf.
    #[inline]
    pub fn write_transform(&mut self, transform: Transform) {
        let floats: [f32; 7] = bytemuck::cast(transform);
        let mut payload = [0u8; Transform::SIZE];
        for (chunk, value) in payload.chunks_exact_mut(4).zip(floats) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        self.write_block(tags::TRAN, &payload);
    }
}

/// Frame number and timestamp of one frame datagram.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStamp {
    /// Frame counter, wrapping.
    pub number: u32,
    /// Microseconds since the stream started, wrapping.
    pub time_us: u32,
}

impl FrameStamp {
    /// Builds a stamp from a tick index and elapsed microseconds; both wrap
    /// at `u32`.
    #[must_use]
    pub const fn wrapping(tick: u64, elapsed_us: u128) -> Self {
        Self {
            number: (tick & 0xFFFF_FFFF) as u32,
            time_us: (elapsed_us & 0xFFFF_FFFF) as u32,
        }
    }
}

/// Reusable encoder for binary datagrams.
///
/// Every datagram, skeleton or frame, starts with its own `head` and
/// `sndf` blocks. This is deliberate: it matches the research script the
/// receivers were built against, and a receiver that joins late or loses
/// packets can read any single datagram on its own.
#[derive(Clone, Debug)]
pub struct BinaryEncoder {
    writer: BlockWriter,
    sender: Ipv4Addr,
    receive_port: u16,
}

impl BinaryEncoder {
    /// Creates an encoder announcing `sender` and `receive_port` in every
    /// handshake.
    #[must_use]
    pub fn new(sender: Ipv4Addr, receive_port: u16) -> Self {
        Self {
            writer: BlockWriter::with_capacity(4096),
            sender,
            receive_port,
        }
    }

    fn write_handshake(&mut self) {
        let w = &mut self.writer;
        w.begin(tags::HEAD);
        w.write_block(tags::FTYP, FORMAT_NAME);
        w.write_block(tags::VRSN, &[FORMAT_VERSION]);
        w.end();

        let mut ipad = [0u8; 8];
        ipad[..4].copy_from_slice(&self.sender.octets());
        w.begin(tags::SNDF);
        w.write_block(tags::IPAD, &ipad);
        w.write_u16(tags::RCVP, self.receive_port);
        w.end();
    }

    /// Encodes the skeleton definition datagram: every bone of the table
    /// with its parent and an identity transform.
    pub fn encode_skeleton(&mut self) -> &[u8] {
        self.writer.reset();
        self.write_handshake();

        let w = &mut self.writer;
        w.begin(tags::SKDF);
        w.begin(tags::BONS);
        for id in BoneId::all() {
            w.begin(tags::BNDT);
            w.write_u16(tags::BNID, id.value());
            w.write_u16(tags::PBID, id.parent().unwrap_or(BoneId::HIPS).value());
            w.write_transform(Transform::IDENTITY);
            w.end();
        }
        w.end();
        w.end();
        self.writer.as_slice()
    }

    /// Encodes one frame datagram. The root bone carries the packet's root
    /// position; every other position is zero.
    pub fn encode_frame(&mut self, packet: &Packet, stamp: FrameStamp) -> &[u8] {
        self.writer.reset();
        self.write_handshake();

        let w = &mut self.writer;
        w.begin(tags::FRAM);
        w.write_u32(tags::FNUM, stamp.number);
        w.write_u32(tags::TIME, stamp.time_us);
        w.begin(tags::BTRS);
        for bone in &packet.bones {
            let position = if bone.id.is_root() {
                packet.root_position.unwrap_or(Vec3::ZERO)
            } else {
                Vec3::ZERO
            };
            w.begin(tags::BTDT);
            w.write_u16(tags::BNID, bone.id.value());
            w.write_transform(Transform::new(bone.rotation, position));
            w.end();
        }
        w.end();
        w.end();
        self.writer.as_slice()
    }
}

/// A block that runs past the end of its container.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("block at offset {offset} needs {needed} bytes, {available} available")]
pub struct BlockError {
    /// Offset of the block header within the container.
    pub offset: usize,
    /// Bytes the header claims (including itself).
    pub needed: usize,
    /// Bytes left in the container.
    pub available: usize,
}

/// One parsed block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block<'a> {
    /// Tag.
    pub tag: Tag,
    /// Payload.
    pub payload: &'a [u8],
}

impl<'a> Block<'a> {
    /// Reader over the payload's child blocks.
    #[must_use]
    pub const fn children(&self) -> BlockReader<'a> {
        BlockReader::new(self.payload)
    }

    /// Payload as a u16, if it is exactly two bytes.
    #[must_use]
    pub fn as_u16(&self) -> Option<u16> {
        self.payload.try_into().ok().map(u16::from_le_bytes)
    }

    /// Payload as a u32, if it is exactly four bytes.
    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        self.payload.try_into().ok().map(u32::from_le_bytes)
    }

    /// Payload as a transform, if it is exactly 28 bytes.
    #[must_use]
    pub fn as_transform(&self) -> Option<Transform> {
        if self.payload.len() != Transform::SIZE {
            return None;
        }
        let mut floats = [0f32; 7];
        for (value, chunk) in floats.iter_mut().zip(self.payload.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Some(bytemuck::cast(floats))
    }
}

/// Walks a run of sibling blocks.
#[derive(Clone, Debug)]
pub struct BlockReader<'a> {
    data: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> BlockReader<'a> {
    /// Reads blocks from `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            failed: false,
        }
    }

    /// First sibling with `tag`, skipping malformed tails.
    #[must_use]
    pub fn find_tag(self, tag: Tag) -> Option<Block<'a>> {
        self.filter_map(Result::ok).find(|b| b.tag == tag)
    }
}

impl<'a> Iterator for BlockReader<'a> {
    type Item = Result<Block<'a>, BlockError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }
        let data = self.data;
        let rest = &data[self.offset..];
        let truncated = |needed| BlockError {
            offset: self.offset,
            needed,
            available: rest.len(),
        };
        if rest.len() < BLOCK_HEADER_SIZE {
            self.failed = true;
            return Some(Err(truncated(BLOCK_HEADER_SIZE)));
        }
        let length = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let end = BLOCK_HEADER_SIZE + length;
        if rest.len() < end {
            self.failed = true;
            return Some(Err(truncated(end)));
        }
        let tag = [rest[4], rest[5], rest[6], rest[7]];
        self.offset += end;
        Some(Ok(Block {
            tag,
            payload: &rest[BLOCK_HEADER_SIZE..end],
        }))
    }
}
