//! Bevy adapter for `player-track-core`.
//!
//! Scene entities opt in with [`PlayerTrackTarget`]. Assignment events arrive
//! as [`CustomEvent`]s; the plugin builds compositors on demand and each
//! frame writes the composed poses into the targets' `Transform`s.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;

pub use components::{
    CameraTrackingProxy, ConnectedPlayer, MultiplayerAvatar, OutroSequenceAnchor,
    PauseMenuAnchor, PlayerTrackTarget,
};
pub use events::{CustomEvent, PauseSignal, SessionTeardown};
pub use resources::{
    ActivePlayers, LegacyControllerFactory, PauseController, PendingPoses, PlayerTargets,
    PlayerTrackDispatcher, PlayerTrackSettings, StagedEvents, Tracks,
};
pub use systems::{HEAD_PROXY_NAME, ROOT_PROXY_NAME};

use player_track_core::Config;

/// Everything the plugin runs in `Update`. Track animation should run before it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerTrackSystems;

#[derive(Debug, Clone, Default)]
pub struct PlayerTrackPlugin {
    pub config: Config,
}

impl Plugin for PlayerTrackPlugin {
    fn build(&self, app: &mut App) {
        let mut config = self.config.clone();
        if let Err(err) = config.validate() {
            warn!("player track: {err}; using the default grid unit");
            config.note_lines_distance = Config::default().note_lines_distance;
        }

        app.insert_resource(PlayerTrackSettings(config))
            .init_resource::<Tracks>()
            .init_resource::<PlayerTrackDispatcher>()
            .init_resource::<PlayerTargets>()
            .init_resource::<PendingPoses>()
            .init_resource::<StagedEvents>()
            .add_event::<CustomEvent>()
            .add_event::<PauseSignal>()
            .add_event::<SessionTeardown>()
            .add_systems(
                Update,
                (
                    systems::collect_player_track_events_system,
                    systems::index_player_targets_system,
                    systems::dispatch_track_assignments_system,
                    systems::pause_signals_system,
                    systems::compose_poses_system,
                    systems::apply_poses_system,
                    systems::mirror_root_pose_system,
                    systems::sync_camera_proxies_system,
                    systems::teardown_system,
                )
                    .chain()
                    .in_set(PlayerTrackSystems),
            );
    }
}
