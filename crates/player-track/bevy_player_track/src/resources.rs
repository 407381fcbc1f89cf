use bevy::prelude::*;
use std::collections::HashMap;

use player_track_core::{
    Config, CustomEventData, Dispatcher, LegacyTransformController, Outputs, PlayerObject,
    SessionSignal, TrackId, TrackStore, UserId,
};

/// Session settings every compositor captures at construction.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerTrackSettings(pub Config);

/// All tracks of the session. The animation driver writes current property
/// values here before [`crate::PlayerTrackSystems`] runs.
#[derive(Resource, Debug, Default)]
pub struct Tracks(pub TrackStore);

/// The core dispatcher and the compositors it owns.
#[derive(Resource, Debug, Default)]
pub struct PlayerTrackDispatcher(pub Dispatcher);

/// Index from player object to the entity carrying its [`crate::PlayerTrackTarget`].
#[derive(Resource, Debug, Default)]
pub struct PlayerTargets {
    pub map: HashMap<PlayerObject, Entity>,
}

/// Poses computed this frame, staged for the apply and mirror systems
/// (keeps ordering explicit: Compose -> Apply -> Mirror).
#[derive(Resource, Debug, Default)]
pub struct PendingPoses {
    pub outputs: Outputs,
}

/// Events read this frame, waiting for the exclusive systems that act on them.
#[derive(Resource, Debug, Default)]
pub struct StagedEvents {
    pub assignments: Vec<CustomEventData>,
    pub signals: Vec<SessionSignal>,
    pub teardown: bool,
}

/// Present when the session can be paused.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct PauseController;

/// Present during a multiplayer session: players active when the level started.
#[derive(Resource, Debug, Default, Clone)]
pub struct ActivePlayers(pub Vec<UserId>);

pub type LegacyControllerFn =
    dyn Fn(PlayerObject, TrackId) -> Box<dyn LegacyTransformController> + Send + Sync + 'static;

/// Builds legacy transform controllers for compositors on the legacy path.
#[derive(Resource)]
pub struct LegacyControllerFactory(pub Box<LegacyControllerFn>);

impl LegacyControllerFactory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(PlayerObject, TrackId) -> Box<dyn LegacyTransformController> + Send + Sync + 'static,
    {
        Self(Box::new(f))
    }
}
