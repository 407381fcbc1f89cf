//! Core configuration for player-track-core.

use serde::{Deserialize, Serialize};

use crate::error::{PlayerTrackError, Result};
use crate::pose::NOTE_LINES_DISTANCE;

/// Which composition path a compositor uses for its whole lifetime.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataVersion {
    /// Older level data: an external transform controller drives the object.
    Legacy,
    /// The per-frame compositor drives the object.
    #[default]
    Current,
}

impl DataVersion {
    /// Map the host's "is legacy data" signal onto a version.
    #[inline]
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            DataVersion::Legacy
        } else {
            DataVersion::Current
        }
    }

    #[inline]
    pub fn is_legacy(self) -> bool {
        self == DataVersion::Legacy
    }
}

/// Session-wide settings captured by each compositor at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Mirror horizontal components of every property read from a track.
    #[serde(default)]
    pub left_handed: bool,
    /// World units per grid cell; offset positions are expressed in cells.
    #[serde(default = "default_note_lines_distance")]
    pub note_lines_distance: f32,
    #[serde(default)]
    pub data_version: DataVersion,
}

fn default_note_lines_distance() -> f32 {
    NOTE_LINES_DISTANCE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            left_handed: false,
            note_lines_distance: NOTE_LINES_DISTANCE,
            data_version: DataVersion::Current,
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.note_lines_distance.is_finite() || self.note_lines_distance <= 0.0 {
            return Err(PlayerTrackError::InvalidConfig {
                reason: format!(
                    "note_lines_distance must be positive and finite, got {}",
                    self.note_lines_distance
                ),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
