use bevy::prelude::*;
use player_track_core::PlayerObject;

/// Marks the scene entity a player object's compositor drives.
/// The index system maps each PlayerObject to the entity carrying it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerTrackTarget(pub PlayerObject);

/// A remote player's facade; its world position anchors the avatar.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ConnectedPlayer {
    pub user_id: String,
}

/// The avatar visual, a direct child of a [`ConnectedPlayer`].
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct MultiplayerAvatar;

/// Object the outro sequence animates from; follows the root's world pose.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct OutroSequenceAnchor;

/// Menus that must move with the player; reparented under the root when the
/// root compositor is built.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PauseMenuAnchor;

/// Named child whose local pose copies its parent's local pose, for camera
/// tools that look objects up by name and read their local pose.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct CameraTrackingProxy;
