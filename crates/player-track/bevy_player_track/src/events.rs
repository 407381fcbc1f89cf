use bevy::prelude::*;
use player_track_core::{CustomEventData, SessionSignal};

/// One entry from the level's custom-event channel. Only
/// `AssignPlayerToTrack` is handled; other kinds are dropped.
#[derive(Event, Debug, Clone)]
pub struct CustomEvent(pub CustomEventData);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseSignal(pub SessionSignal);

/// End of the play session: every compositor is destroyed.
#[derive(Event, Debug, Default, Clone, Copy)]
pub struct SessionTeardown;
