//! Routing of "assign player to track" events to compositors.
//!
//! The dispatcher owns one [`PoseCompositor`] per [`PlayerObject`]. Compositors
//! are built lazily by an [`ObjectFactory`] the first time their object is
//! assigned a track; later assignments reuse the same instance. Events of
//! other kinds share the same channel, so anything that does not resolve to a
//! (track, player object) pair is dropped without touching any pose.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::compositor::{LegacyTransformController, PoseCompositor, SessionSignal};
use crate::error::{PlayerTrackError, Result};
use crate::ids::{PlayerObject, TrackId};
use crate::multiplayer::{MirrorReport, MultiplayerSession, OutroAnchor};
use crate::outputs::Outputs;
use crate::pose::Pose;
use crate::track::TrackStore;

/// Event kind handled by the dispatcher.
pub const ASSIGN_PLAYER_TO_TRACK: &str = "AssignPlayerToTrack";

/// A custom event as delivered by the level's event channel. Accepts both the
/// short (`b`/`t`/`d`) and underscored (`_time`/`_type`/`_data`) key styles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomEventData {
    #[serde(default, alias = "b", alias = "_time")]
    pub time: f32,
    #[serde(rename = "type", alias = "t", alias = "_type")]
    pub kind: String,
    #[serde(default, alias = "d", alias = "_data")]
    pub data: serde_json::Value,
}

impl CustomEventData {
    pub fn new(kind: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            time: 0.0,
            kind: kind.into(),
            data,
        }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[derive(Deserialize)]
struct RawPlayerTrackData {
    #[serde(default, alias = "_track")]
    track: Option<serde_json::Value>,
    #[serde(default, rename = "playerTrackObject", alias = "_playerTrackObject")]
    player_track_object: Option<String>,
}

/// Resolved payload of an assignment event.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PlayerTrackEventData {
    pub track: TrackId,
    pub target: PlayerObject,
}

impl PlayerTrackEventData {
    /// Resolve an event against the track store. The player object defaults
    /// to the root when the payload does not name one.
    pub fn resolve(event: &CustomEventData, tracks: &TrackStore) -> Result<Self> {
        if event.kind != ASSIGN_PLAYER_TO_TRACK {
            return Err(PlayerTrackError::UnsupportedEvent {
                kind: event.kind.clone(),
            });
        }

        let raw: RawPlayerTrackData = serde_json::from_value(event.data.clone())?;
        let track_name = match raw.track {
            Some(serde_json::Value::String(name)) => name,
            Some(other) => {
                return Err(PlayerTrackError::InvalidPayload {
                    reason: format!("track must be a single name, got {other}"),
                })
            }
            None => {
                return Err(PlayerTrackError::InvalidPayload {
                    reason: "missing track".to_string(),
                })
            }
        };

        let target = match raw.player_track_object.as_deref() {
            Some(name) => name.parse::<PlayerObject>()?,
            None => PlayerObject::Root,
        };

        Ok(Self {
            track: tracks.resolve(&track_name)?,
            target,
        })
    }
}

/// Object-construction collaborator.
pub trait ObjectFactory {
    /// Build the compositor for `target`, capturing its current local pose.
    /// `None` when the object does not exist in the scene.
    fn instantiate(&mut self, target: PlayerObject) -> Option<PoseCompositor>;

    /// Build the legacy controller bound to `track`.
    fn legacy_controller(
        &mut self,
        _target: PlayerObject,
        _track: TrackId,
    ) -> Option<Box<dyn LegacyTransformController>> {
        None
    }
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    compositors: BTreeMap<PlayerObject, PoseCompositor>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one event from the shared channel. Returns whether a track was
    /// assigned; unresolvable events are logged at debug level and dropped.
    pub fn handle_event(
        &mut self,
        event: &CustomEventData,
        tracks: &mut TrackStore,
        factory: &mut dyn ObjectFactory,
    ) -> bool {
        match PlayerTrackEventData::resolve(event, tracks) {
            Ok(data) => self.assign(data.target, data.track, tracks, factory),
            Err(err) => {
                debug!("dropping custom event '{}': {err}", event.kind);
                false
            }
        }
    }

    /// Assign `track` to `target`, creating its compositor if needed.
    pub fn assign(
        &mut self,
        target: PlayerObject,
        track: TrackId,
        tracks: &mut TrackStore,
        factory: &mut dyn ObjectFactory,
    ) -> bool {
        let Some(compositor) = self.get_or_create(target, factory) else {
            debug!("no scene object for {target}; assignment dropped");
            return false;
        };
        compositor.assign_track(track, tracks, |t, id| {
            let controller = factory.legacy_controller(t, id);
            if controller.is_none() {
                warn!("{t}: legacy data but no transform controller available");
            }
            controller
        });
        true
    }

    /// The only way a compositor enters the registry.
    pub fn get_or_create(
        &mut self,
        target: PlayerObject,
        factory: &mut dyn ObjectFactory,
    ) -> Option<&mut PoseCompositor> {
        if !self.compositors.contains_key(&target) {
            let compositor = factory.instantiate(target)?;
            if compositor.target() != target {
                warn!(
                    "factory built a compositor for {} when asked for {target}",
                    compositor.target()
                );
                return None;
            }
            debug!("created compositor for {target}");
            self.compositors.insert(target, compositor);
        }
        self.compositors.get_mut(&target)
    }

    pub fn compositor(&self, target: PlayerObject) -> Option<&PoseCompositor> {
        self.compositors.get(&target)
    }

    pub fn compositor_mut(&mut self, target: PlayerObject) -> Option<&mut PoseCompositor> {
        self.compositors.get_mut(&target)
    }

    /// Compositor external camera tooling should follow: the head when it is
    /// tracked, otherwise the root.
    pub fn camera_anchor(&self) -> Option<&PoseCompositor> {
        self.compositor(PlayerObject::Head)
            .or_else(|| self.compositor(PlayerObject::Root))
    }

    pub fn len(&self) -> usize {
        self.compositors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compositors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoseCompositor> {
        self.compositors.values()
    }

    /// Compose every enabled compositor. Root comes first.
    pub fn update(&self, tracks: &TrackStore) -> Outputs {
        let mut outputs = Outputs::default();
        for (target, compositor) in &self.compositors {
            if let Some(local) = compositor.compose(tracks) {
                outputs.push(*target, local);
            }
        }
        outputs
    }

    /// Forward a pause/resume signal to every subscribed compositor and
    /// collect the poses that must be written right away.
    pub fn signal(&mut self, signal: SessionSignal) -> Outputs {
        let mut outputs = Outputs::default();
        for (target, compositor) in self.compositors.iter_mut() {
            if let Some(local) = compositor.on_signal(signal) {
                outputs.push(*target, local);
            }
        }
        outputs
    }

    /// Run the root's multiplayer mirror with the root's world pose for this
    /// frame. `None` when there is no root compositor.
    pub fn mirror_root(
        &mut self,
        root_world: Pose,
        session: Option<&mut dyn MultiplayerSession>,
        outro: Option<&mut dyn OutroAnchor>,
    ) -> Option<MirrorReport> {
        let mirror = self
            .compositors
            .get_mut(&PlayerObject::Root)?
            .multiplayer_mirror_mut()?;
        Some(mirror.mirror(root_world, session, outro))
    }

    /// Destroy every compositor.
    pub fn teardown(&mut self, tracks: &mut TrackStore) {
        for compositor in self.compositors.values_mut() {
            compositor.teardown(tracks);
        }
        self.compositors.clear();
    }
}
