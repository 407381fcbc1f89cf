//! Per-object pose compositor.
//!
//! One [`PoseCompositor`] exists per [`PlayerObject`]. It captures the object's
//! local pose once, follows whichever track is currently assigned, and each
//! frame produces the object's new local pose. The composition path is picked
//! once from the data version:
//!
//! - `Direct`: [`PoseCompositor::compose`] runs every frame.
//! - `Legacy`: `compose` never runs; an external controller bound to the
//!   track drives the object instead and is recreated on every assignment.

use std::fmt;

use log::debug;

use crate::config::{Config, DataVersion};
use crate::ids::{PlayerObject, TrackId};
use crate::multiplayer::MultiplayerPoseMirror;
use crate::pose::{compose_pose, Pose, ReferencePose};
use crate::track::TrackStore;

/// Opaque controller that animates an object from legacy track data.
pub trait LegacyTransformController: fmt::Debug + Send + Sync {
    fn set_enabled(&mut self, enabled: bool);

    /// Called once when the compositor drops this controller.
    fn release(&mut self) {}
}

/// Session-control signals a compositor reacts to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionSignal {
    Paused,
    Resumed,
}

/// Optional collaborators, resolved once when a compositor is built.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Collaborators {
    pub pause_controller: bool,
    pub multiplayer_session: bool,
    pub outro_anchor: bool,
}

/// Composition strategy chosen at construction.
#[derive(Debug)]
pub enum CompositionPath {
    Direct,
    Legacy {
        controller: Option<Box<dyn LegacyTransformController>>,
    },
}

impl CompositionPath {
    fn for_version(version: DataVersion) -> Self {
        match version {
            DataVersion::Current => CompositionPath::Direct,
            DataVersion::Legacy => CompositionPath::Legacy { controller: None },
        }
    }

    fn set_controller_enabled(&mut self, enabled: bool) {
        if let CompositionPath::Legacy {
            controller: Some(c),
        } = self
        {
            c.set_enabled(enabled);
        }
    }

    fn release_controller(&mut self) {
        if let CompositionPath::Legacy { controller } = self {
            if let Some(mut c) = controller.take() {
                c.release();
            }
        }
    }
}

#[derive(Debug)]
pub struct PoseCompositor {
    target: PlayerObject,
    reference: ReferencePose,
    left_handed: bool,
    note_lines_distance: f32,
    path: CompositionPath,
    track: Option<TrackId>,
    /// Administrative switch for the per-frame pass. Always false on the
    /// legacy path.
    enabled: bool,
    paused: bool,
    pause_subscribed: bool,
    /// Present only on the root compositor.
    mirror: Option<MultiplayerPoseMirror>,
}

impl PoseCompositor {
    /// Build a compositor for `target`, capturing `local` as its reference pose.
    pub fn new(
        target: PlayerObject,
        local: Pose,
        config: &Config,
        collaborators: Collaborators,
    ) -> Self {
        let path = CompositionPath::for_version(config.data_version);
        let enabled = matches!(path, CompositionPath::Direct);
        let mirror = target
            .is_root()
            .then(|| MultiplayerPoseMirror::new(collaborators));
        Self {
            target,
            reference: ReferencePose::capture(local),
            left_handed: config.left_handed,
            note_lines_distance: config.note_lines_distance,
            path,
            track: None,
            enabled,
            paused: false,
            pause_subscribed: collaborators.pause_controller,
            mirror,
        }
    }

    #[inline]
    pub fn target(&self) -> PlayerObject {
        self.target
    }

    #[inline]
    pub fn reference(&self) -> &ReferencePose {
        &self.reference
    }

    #[inline]
    pub fn track(&self) -> Option<TrackId> {
        self.track
    }

    #[inline]
    pub fn path(&self) -> &CompositionPath {
        &self.path
    }

    #[inline]
    pub fn is_legacy(&self) -> bool {
        matches!(self.path, CompositionPath::Legacy { .. })
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn is_pause_subscribed(&self) -> bool {
        self.pause_subscribed
    }

    pub fn has_legacy_controller(&self) -> bool {
        matches!(
            self.path,
            CompositionPath::Legacy {
                controller: Some(_)
            }
        )
    }

    pub fn multiplayer_mirror(&self) -> Option<&MultiplayerPoseMirror> {
        self.mirror.as_ref()
    }

    pub fn multiplayer_mirror_mut(&mut self) -> Option<&mut MultiplayerPoseMirror> {
        self.mirror.as_mut()
    }

    /// Follow `track` from now on. The previous track (if any) is detached
    /// first. On the legacy path, `make_controller` builds the controller
    /// bound to the new track; the old controller is released.
    pub fn assign_track(
        &mut self,
        track: TrackId,
        tracks: &mut TrackStore,
        make_controller: impl FnOnce(PlayerObject, TrackId) -> Option<Box<dyn LegacyTransformController>>,
    ) {
        if let Some(previous) = self.track.take() {
            tracks.detach(previous, self.target);
        }

        self.track = Some(track);
        if !tracks.attach(track, self.target) && tracks.get(track).is_none() {
            debug!("{}: assigned track {:?} is not in the store", self.target, track);
        }

        if let CompositionPath::Legacy { .. } = self.path {
            self.path.release_controller();
            let mut controller = make_controller(self.target, track);
            if let Some(c) = controller.as_mut() {
                c.set_enabled(!self.paused);
            }
            self.path = CompositionPath::Legacy { controller };
        }
    }

    /// This frame's local pose, or `None` when composition is skipped
    /// (no track, track gone, legacy path, paused).
    pub fn compose(&self, tracks: &TrackStore) -> Option<Pose> {
        if !self.enabled {
            return None;
        }
        let track = tracks.get(self.track?)?;
        Some(compose_pose(
            &self.reference,
            track,
            self.left_handed,
            self.note_lines_distance,
        ))
    }

    /// Apply a pause/resume signal. Returns the pose to write immediately,
    /// which is only ever the reference pose of a non-root object on pause.
    pub fn on_signal(&mut self, signal: SessionSignal) -> Option<Pose> {
        if !self.pause_subscribed {
            return None;
        }
        match signal {
            SessionSignal::Paused => self.on_pause(),
            SessionSignal::Resumed => {
                self.on_resume();
                None
            }
        }
    }

    fn on_pause(&mut self) -> Option<Pose> {
        self.paused = true;
        if matches!(self.path, CompositionPath::Direct) {
            self.enabled = false;
        }
        self.path.set_controller_enabled(false);

        (!self.target.is_root()).then(|| self.reference.pose())
    }

    fn on_resume(&mut self) {
        self.paused = false;
        if matches!(self.path, CompositionPath::Direct) {
            self.enabled = true;
        }
        self.path.set_controller_enabled(true);
    }

    /// Session teardown: detach from the track, release the legacy
    /// controller and stop listening for pause signals.
    pub fn teardown(&mut self, tracks: &mut TrackStore) {
        if let Some(track) = self.track.take() {
            tracks.detach(track, self.target);
        }
        self.path.release_controller();
        self.pause_subscribed = false;
        self.enabled = false;
    }
}
