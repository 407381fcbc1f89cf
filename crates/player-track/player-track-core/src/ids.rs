//! Identifiers for player objects and tracks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlayerTrackError;

/// Which tracked player entity a compositor governs.
///
/// Ordering is significant: `Root` sorts first so it composes before the
/// objects parented under it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerObject {
    #[serde(alias = "Root")]
    Root,
    #[serde(alias = "Head")]
    Head,
    #[serde(alias = "LeftHand")]
    LeftHand,
    #[serde(alias = "RightHand")]
    RightHand,
}

impl PlayerObject {
    pub const ALL: [PlayerObject; 4] = [
        PlayerObject::Root,
        PlayerObject::Head,
        PlayerObject::LeftHand,
        PlayerObject::RightHand,
    ];

    #[inline]
    pub fn is_root(self) -> bool {
        self == PlayerObject::Root
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerObject::Root => "root",
            PlayerObject::Head => "head",
            PlayerObject::LeftHand => "leftHand",
            PlayerObject::RightHand => "rightHand",
        }
    }
}

impl fmt::Display for PlayerObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerObject {
    type Err = PlayerTrackError;

    /// Accepts both the camelCase and PascalCase spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" | "Root" => Ok(PlayerObject::Root),
            "head" | "Head" => Ok(PlayerObject::Head),
            "leftHand" | "LeftHand" => Ok(PlayerObject::LeftHand),
            "rightHand" | "RightHand" => Ok(PlayerObject::RightHand),
            other => Err(PlayerTrackError::UnknownPlayerObject {
                name: other.to_string(),
            }),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TrackId(pub u32);

/// Monotonic allocator for TrackId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_track: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_track(&mut self) -> TrackId {
        let id = TrackId(self.next_track);
        self.next_track = self.next_track.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
