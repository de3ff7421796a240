//! Engine configuration
//!
//! Sizes the unit pool and channel table and selects a couple of policy
//! knobs. Loadable from JSON; every field is optional.
//!
//! ```
//! use plsynth::EngineConfig;
//!
//! let cfg = EngineConfig::from_json_str(r#"{ "unit_count": 8, "drum_channel": null }"#).unwrap();
//! assert_eq!(cfg.unit_count, 8);
//! assert_eq!(cfg.channel_count, 16);
//! assert_eq!(cfg.drum_channel, None);
//! ```

use crate::constants::{
    DEFAULT_CHANNEL_COUNT, DEFAULT_DRUM_CHANNEL, DEFAULT_UNIT_COUNT, MAX_CHANNELS, MAX_UNITS,
};
use crate::{PlSynthError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Voice engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of hardware voice units (1-32)
    pub unit_count: usize,
    /// Number of logical channels (1-16)
    pub channel_count: usize,
    /// Channel whose note events are ignored (percussion), if any
    pub drum_channel: Option<u8>,
    /// Mirror the software busy mask into the common block after each
    /// allocation change
    pub publish_busy_mask: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            unit_count: DEFAULT_UNIT_COUNT,
            channel_count: DEFAULT_CHANNEL_COUNT,
            drum_channel: Some(DEFAULT_DRUM_CHANNEL),
            publish_busy_mask: true,
        }
    }
}

impl EngineConfig {
    /// Configuration with explicit pool and channel sizes, other fields default
    pub fn with_sizes(unit_count: usize, channel_count: usize) -> Self {
        EngineConfig {
            unit_count,
            channel_count,
            ..Default::default()
        }
    }

    /// Parse a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check sizes and the drum channel against the hardware limits
    pub fn validate(&self) -> Result<()> {
        if self.unit_count == 0 || self.unit_count > MAX_UNITS {
            return Err(PlSynthError::ConfigError(format!(
                "unit_count {} outside 1..={MAX_UNITS}",
                self.unit_count
            )));
        }
        if self.channel_count == 0 || self.channel_count > MAX_CHANNELS {
            return Err(PlSynthError::ConfigError(format!(
                "channel_count {} outside 1..={MAX_CHANNELS}",
                self.channel_count
            )));
        }
        if let Some(drum) = self.drum_channel {
            if drum as usize >= self.channel_count {
                return Err(PlSynthError::ConfigError(format!(
                    "drum_channel {drum} outside 0..{}",
                    self.channel_count
                )));
            }
        }
        Ok(())
    }
}
