//! Output contracts from the dispatcher.
//!
//! Outputs carry only the local poses to write this tick, keyed by player
//! object. Adapters (Bevy, tests) apply them to the host's transforms.

use serde::{Deserialize, Serialize};

use crate::ids::PlayerObject;
use crate::pose::Pose;

/// One local pose to write to a player object.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseWrite {
    pub target: PlayerObject,
    pub local: Pose,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub writes: Vec<PoseWrite>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.writes.clear();
    }

    #[inline]
    pub fn push(&mut self, target: PlayerObject, local: Pose) {
        self.writes.push(PoseWrite { target, local });
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn get(&self, target: PlayerObject) -> Option<Pose> {
        self.writes
            .iter()
            .find(|w| w.target == target)
            .map(|w| w.local)
    }

    /// The root's pose, when the root compositor ran this tick.
    #[inline]
    pub fn root(&self) -> Option<Pose> {
        self.get(PlayerObject::Root)
    }
}
