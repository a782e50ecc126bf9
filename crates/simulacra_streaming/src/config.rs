//! # Configuration
//!
//! TOML config for the streaming server. Every section and every field is
//! optional:
//!
//! ```toml
//! [stream]
//! protocol = "text"            # or "binary"
//! bind = "127.0.0.1:3910"
//! destination = "127.0.0.1:12351"
//! tick_rate = 60
//! skeleton_interval = 50
//!
//! [device]
//! version = 2
//! device_id = 9
//! device_type = 2
//! slot = 0
//!
//! [playback]
//! file = "clips/wave.bvh"
//! looping = true
//!
//! [idle]
//! seed = 12345
//!
//! [mapping.aliases]
//! "Tail_01" = 54
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use simulacra_motion::BoneMap;
use simulacra_procedural::MotionSeed;
use simulacra_shared::constants::{
    BINARY_DEFAULT_BIND, MAX_TICK_RATE, TEXT_DEVICE_ID, TEXT_DEVICE_TYPE, TEXT_PROTOCOL_VERSION, TEXT_SLOT,
};
use simulacra_shared::{
    BoneId, BINARY_DEFAULT_DESTINATION, DEFAULT_SKELETON_INTERVAL, DEFAULT_TICK_RATE, TEXT_BIND,
};

use crate::error::{StreamError, StreamResult};

/// Wire protocol to stream with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Newline-delimited JSON over TCP.
    #[default]
    Text,
    /// Tagged binary blocks over UDP.
    Binary,
}

/// `[stream]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamSection {
    /// Wire protocol.
    pub protocol: Protocol,
    /// Text: listen address. Binary: local send address.
    pub bind: Option<String>,
    /// Binary destination. Ignored by the text protocol.
    pub destination: String,
    /// Procedural tick rate, Hz.
    pub tick_rate: u32,
    /// Binary skeleton resend interval, ticks.
    pub skeleton_interval: u32,
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            protocol: Protocol::Text,
            bind: None,
            destination: BINARY_DEFAULT_DESTINATION.to_owned(),
            tick_rate: DEFAULT_TICK_RATE,
            skeleton_interval: DEFAULT_SKELETON_INTERVAL,
        }
    }
}

/// `[device]` section: header fields of every text record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceSection {
    /// Protocol version.
    pub version: i32,
    /// Device id.
    pub device_id: i32,
    /// Device type.
    pub device_type: i32,
    /// Tracker slot.
    pub slot: i32,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            version: TEXT_PROTOCOL_VERSION,
            device_id: TEXT_DEVICE_ID,
            device_type: TEXT_DEVICE_TYPE,
            slot: TEXT_SLOT,
        }
    }
}

/// `[playback]` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaybackSection {
    /// Capture file to play at startup. Idle motion if absent.
    pub file: Option<PathBuf>,
    /// Restart the clip when it ends instead of falling back to idle.
    pub looping: bool,
}

/// `[idle]` section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdleSection {
    /// Seed for idle motion. A fixed default is used if absent.
    pub seed: Option<u64>,
}

/// `[mapping]` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingSection {
    /// Extra joint name → bone id aliases, layered over the built-in table.
    pub aliases: BTreeMap<String, u16>,
}

/// Full server configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulacraConfig {
    /// Transport settings.
    pub stream: StreamSection,
    /// Text record header.
    pub device: DeviceSection,
    /// Startup clip.
    pub playback: PlaybackSection,
    /// Idle motion.
    pub idle: IdleSection,
    /// Bone name aliases.
    pub mapping: MappingSection,
}

impl SimulacraConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::ConfigParse`] for malformed TOML or unknown
    /// keys and [`StreamError::Config`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> StreamResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// As [`SimulacraConfig::from_toml_str`], plus
    /// [`StreamError::ConfigRead`] if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> StreamResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| StreamError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Checks every value that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Config`] naming the first bad field.
    pub fn validate(&self) -> StreamResult<()> {
        if self.stream.tick_rate == 0 {
            return Err(StreamError::config("stream.tick_rate", "must be at least 1"));
        }
        if self.stream.tick_rate > MAX_TICK_RATE {
            return Err(StreamError::config(
                "stream.tick_rate",
                format!("must be at most {MAX_TICK_RATE}"),
            ));
        }
        if self.stream.skeleton_interval == 0 {
            return Err(StreamError::config("stream.skeleton_interval", "must be at least 1"));
        }
        self.bind_addr()?;
        self.destination_addr()?;
        self.bone_map()?;
        Ok(())
    }

    /// Address to bind: the listen address for text, the local send address
    /// for binary.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Config`] if it is not a socket address.
    pub fn bind_addr(&self) -> StreamResult<SocketAddr> {
        let default = match self.stream.protocol {
            Protocol::Text => TEXT_BIND,
            Protocol::Binary => BINARY_DEFAULT_BIND,
        };
        let raw = self.stream.bind.as_deref().unwrap_or(default);
        raw.parse()
            .map_err(|e| StreamError::config("stream.bind", format!("{raw:?}: {e}")))
    }

    /// Binary protocol destination.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Config`] if it is not a socket address.
    pub fn destination_addr(&self) -> StreamResult<SocketAddr> {
        let raw = &self.stream.destination;
        raw.parse()
            .map_err(|e| StreamError::config("stream.destination", format!("{raw:?}: {e}")))
    }

    /// Built-in humanoid map plus configured aliases.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Config`] for an alias pointing outside the
    /// bone table.
    pub fn bone_map(&self) -> StreamResult<BoneMap> {
        let mut map = BoneMap::humanoid();
        for (name, &raw) in &self.mapping.aliases {
            let id = BoneId::new(raw).ok_or_else(|| {
                StreamError::config("mapping.aliases", format!("{name:?} → {raw} is not a bone id"))
            })?;
            map.insert(name.clone(), id);
        }
        Ok(map)
    }

    /// Seed for idle motion.
    #[must_use]
    pub fn motion_seed(&self) -> MotionSeed {
        self.idle.seed.map(MotionSeed::new).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_defaults() {
        let config = SimulacraConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimulacraConfig::default());
        assert_eq!(config.stream.protocol, Protocol::Text);
        assert_eq!(config.bind_addr().unwrap(), "127.0.0.1:3910".parse().unwrap());
        assert_eq!(config.destination_addr().unwrap(), "127.0.0.1:12351".parse().unwrap());
        assert_eq!(config.device.device_id, 9);
        assert_eq!(config.stream.tick_rate, 60);
        assert_eq!(config.stream.skeleton_interval, 50);
    }

    #[test]
    fn test_full_config() {
        let config = SimulacraConfig::from_toml_str(
            r#"
            [stream]
            protocol = "binary"
            destination = "10.0.0.5:9000"
            tick_rate = 50

            [device]
            slot = 3

            [playback]
            file = "clips/wave.bvh"
            looping = true

            [idle]
            seed = 99

            [mapping.aliases]
            "Tail_01" = 54
            "#,
        )
        .unwrap();

        assert_eq!(config.stream.protocol, Protocol::Binary);
        assert_eq!(config.bind_addr().unwrap(), "0.0.0.0:0".parse().unwrap());
        assert_eq!(config.stream.tick_rate, 50);
        assert_eq!(config.device.slot, 3);
        assert_eq!(config.device.version, 2);
        assert!(config.playback.looping);
        assert_eq!(config.motion_seed(), MotionSeed::new(99));
        assert_eq!(config.bone_map().unwrap().resolve("Tail_01"), Some(BoneId::UPPER_CHEST));
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let err = SimulacraConfig::from_toml_str("[stream]\ntick_rate = 0\n").unwrap_err();
        assert!(matches!(err, StreamError::Config { field: "stream.tick_rate", .. }));
    }

    #[test]
    fn test_excessive_tick_rate_rejected() {
        let err = SimulacraConfig::from_toml_str("[stream]\ntick_rate = 100000\n").unwrap_err();
        assert!(matches!(err, StreamError::Config { field: "stream.tick_rate", .. }));
        assert!(SimulacraConfig::from_toml_str("[stream]\ntick_rate = 1000\n").is_ok());
    }

    #[test]
    fn test_unknown_bone_rejected() {
        let err = SimulacraConfig::from_toml_str("[mapping.aliases]\nTail = 55\n").unwrap_err();
        assert!(matches!(err, StreamError::Config { field: "mapping.aliases", .. }));
    }

    #[test]
    fn test_bad_address_rejected() {
        let err = SimulacraConfig::from_toml_str("[stream]\nbind = \"localhost\"\n").unwrap_err();
        assert!(matches!(err, StreamError::Config { field: "stream.bind", .. }));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = SimulacraConfig::from_toml_str("[stream]\nfps = 60\n").unwrap_err();
        assert!(matches!(err, StreamError::ConfigParse(_)));
    }
}
