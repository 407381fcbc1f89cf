//! Propagation of the root pose to multiplayer avatars and the outro anchor.
//!
//! Runs after the root compositor wrote its pose for the frame. Remote avatars
//! are placed through a positioner parented to the root: its local position is
//! the remote player's world position, so the avatar ends up where that player
//! stands relative to the moved root.

use glam::Vec3;

use crate::compositor::Collaborators;
use crate::pose::Pose;

/// Stable identity of a connected player.
pub type UserId = String;

/// Read/write view of the multiplayer session for one mirroring pass.
pub trait MultiplayerSession {
    /// Players that were active when the level started.
    fn active_players(&self) -> Vec<UserId>;

    /// World position of a connected player's facade, if that player is
    /// still connected.
    fn connected_player_position(&self, user: &str) -> Option<Vec3>;

    /// Move the player's avatar visual to `world`. Returns false when the
    /// avatar proxy cannot be resolved.
    fn set_avatar_world_pose(&mut self, user: &str, world: Pose) -> bool;
}

/// The object the outro sequence animates from.
pub trait OutroAnchor {
    fn set_world_pose(&mut self, world: Pose);
}

/// What one mirroring pass did.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct MirrorReport {
    pub avatars_mirrored: usize,
    pub avatars_skipped: usize,
    pub outro_updated: bool,
}

/// Child of the root used to re-express a remote position in root space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Positioner {
    local: Pose,
}

impl Positioner {
    #[inline]
    pub fn place(&mut self, local_position: Vec3) {
        self.local.position = local_position;
    }

    #[inline]
    pub fn world(&self, parent_world: &Pose) -> Pose {
        parent_world.mul_pose(&self.local)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiplayerPoseMirror {
    /// Only created when a session existed when the root was built.
    positioner: Option<Positioner>,
    outro: bool,
}

impl MultiplayerPoseMirror {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            positioner: collaborators
                .multiplayer_session
                .then(Positioner::default),
            outro: collaborators.outro_anchor,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.positioner.is_some() || self.outro
    }

    #[inline]
    pub fn has_positioner(&self) -> bool {
        self.positioner.is_some()
    }

    #[inline]
    pub fn has_outro(&self) -> bool {
        self.outro
    }

    /// Copy the root's world pose outward.
    pub fn mirror(
        &mut self,
        root_world: Pose,
        session: Option<&mut dyn MultiplayerSession>,
        outro: Option<&mut dyn OutroAnchor>,
    ) -> MirrorReport {
        let mut report = MirrorReport::default();

        if let (Some(positioner), Some(session)) = (self.positioner.as_mut(), session) {
            for user in session.active_players() {
                let Some(remote) = session.connected_player_position(&user) else {
                    report.avatars_skipped += 1;
                    continue;
                };
                positioner.place(remote);
                let world = positioner.world(&root_world);
                if session.set_avatar_world_pose(&user, world) {
                    report.avatars_mirrored += 1;
                } else {
                    report.avatars_skipped += 1;
                }
            }
        }

        if self.outro {
            if let Some(anchor) = outro {
                anchor.set_world_pose(root_world);
                report.outro_updated = true;
            }
        }

        report
    }
}
