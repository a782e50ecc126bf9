//! # Text Protocol
//!
//! One JSON object per tick, terminated by `\n`:
//!
//! ```text
//! {"Version":2,"DeviceID":9,"DeviceType":2,"Slot":0,
//!  "Position":{"x":-0.01,"y":1.2,"z":0.0},
//!  "Bones":[{"type":0,"qt_x":0.0,"qt_y":0.0,"qt_z":0.0,"qt_w":1.0},...],
//!  "Command":{"Number":-1}}
//! ```
//!
//! (wrapped here; on the wire it is a single line). Compact JSON never
//! contains a raw newline, so `\n` is an unambiguous record separator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use simulacra_shared::constants::TEXT_NO_COMMAND;
use simulacra_shared::{BoneId, Packet, Quaternion, Vec3};

use crate::config::DeviceSection;

/// Record separator.
pub const RECORD_TERMINATOR: u8 = b'\n';

/// Root position on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WirePosition {
    /// X, metres.
    pub x: f32,
    /// Y, metres.
    pub y: f32,
    /// Z, metres.
    pub z: f32,
}

/// One bone rotation on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireBone {
    /// Target bone id.
    #[serde(rename = "type")]
    pub id: u16,
    /// Quaternion X.
    pub qt_x: f32,
    /// Quaternion Y.
    pub qt_y: f32,
    /// Quaternion Z.
    pub qt_z: f32,
    /// Quaternion W.
    pub qt_w: f32,
}

/// Command slot; always "no command" from this server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCommand {
    /// Command number.
    #[serde(rename = "Number")]
    pub number: i32,
}

/// A full text record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Protocol version.
    #[serde(rename = "Version")]
    pub version: i32,
    /// Device id.
    #[serde(rename = "DeviceID")]
    pub device_id: i32,
    /// Device type.
    #[serde(rename = "DeviceType")]
    pub device_type: i32,
    /// Tracker slot.
    #[serde(rename = "Slot")]
    pub slot: i32,
    /// Root position. Zero when the packet has none.
    #[serde(rename = "Position")]
    pub position: WirePosition,
    /// Bone rotations in packet order.
    #[serde(rename = "Bones")]
    pub bones: Vec<WireBone>,
    /// Command slot.
    #[serde(rename = "Command")]
    pub command: WireCommand,
}

impl TextRecord {
    /// Creates an empty record with the given header.
    #[must_use]
    pub fn new(device: &DeviceSection) -> Self {
        Self {
            version: device.version,
            device_id: device.device_id,
            device_type: device.device_type,
            slot: device.slot,
            position: WirePosition::default(),
            bones: Vec::new(),
            command: WireCommand {
                number: TEXT_NO_COMMAND,
            },
        }
    }

    /// Replaces the body with `packet`, keeping the header.
    pub fn set_packet(&mut self, packet: &Packet) {
        let root = packet.root_position.unwrap_or(Vec3::ZERO);
        self.position = WirePosition {
            x: root.x,
            y: root.y,
            z: root.z,
        };
        self.bones.clear();
        self.bones.extend(packet.bones.iter().map(|b| WireBone {
            id: b.id.value(),
            qt_x: b.rotation.x,
            qt_y: b.rotation.y,
            qt_z: b.rotation.z,
            qt_w: b.rotation.w,
        }));
    }

    /// Root position as a vector.
    #[must_use]
    pub const fn root_position(&self) -> Vec3 {
        Vec3::new(self.position.x, self.position.y, self.position.z)
    }

    /// Bone ids and rotations.
    pub fn rotations(&self) -> impl Iterator<Item = (BoneId, Quaternion)> + '_ {
        self.bones
            .iter()
            .map(|b| (BoneId(b.id), Quaternion::new(b.qt_x, b.qt_y, b.qt_z, b.qt_w)))
    }
}

/// A line that is not a text record.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The line has no terminator or more than one record.
    #[error("expected exactly one newline-terminated record")]
    Framing,
    /// The JSON does not match the record schema.
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reusable encoder for text records.
#[derive(Clone, Debug)]
pub struct TextEncoder {
    record: TextRecord,
    buffer: Vec<u8>,
}

impl TextEncoder {
    /// Creates an encoder writing the given header.
    #[must_use]
    pub fn new(device: &DeviceSection) -> Self {
        Self {
            record: TextRecord::new(device),
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Encodes `packet` as one terminated line.
    ///
    /// The returned slice is valid until the next call.
    ///
    /// # Errors
    ///
    /// Only fails if serialization itself fails, which a well-formed
    /// packet never causes.
    pub fn encode(&mut self, packet: &Packet) -> Result<&[u8], serde_json::Error> {
        self.record.set_packet(packet);
        self.buffer.clear();
        serde_json::to_writer(&mut self.buffer, &self.record)?;
        self.buffer.push(RECORD_TERMINATOR);
        Ok(&self.buffer)
    }
}

/// Encodes `packet` as one terminated line into a new buffer.
///
/// # Errors
///
/// See [`TextEncoder::encode`].
pub fn encode_line(device: &DeviceSection, packet: &Packet) -> Result<Vec<u8>, serde_json::Error> {
    let mut encoder = TextEncoder::new(device);
    encoder.encode(packet).map(<[u8]>::to_vec)
}

/// Parses one record. A single trailing `\n` (or `\r\n`) is allowed.
///
/// # Errors
///
/// Returns [`DecodeError::Framing`] if the line holds an embedded newline
/// and [`DecodeError::Json`] if it is not a valid record.
pub fn decode_record(line: &str) -> Result<TextRecord, DecodeError> {
    let body = line.strip_suffix('\n').unwrap_or(line);
    let body = body.strip_suffix('\r').unwrap_or(body);
    if body.contains('\n') {
        return Err(DecodeError::Framing);
    }
    Ok(serde_json::from_str(body)?)
}
