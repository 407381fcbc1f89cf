//! Player Track Core (engine-agnostic)
//!
//! Composes the local pose of tracked player objects (root, head, hands) from a
//! captured reference pose and the current values of an animated track.
//! Adapters (Bevy, tests) own the scene graph; this crate only decides which
//! pose each object should have this frame and hands it back as [`Outputs`].

pub mod compositor;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod mirror;
pub mod multiplayer;
pub mod outputs;
pub mod pose;
pub mod track;
pub mod value;

// Re-exports for consumers (adapters)
pub use compositor::{
    Collaborators, CompositionPath, LegacyTransformController, PoseCompositor, SessionSignal,
};
pub use config::{Config, DataVersion};
pub use dispatcher::{
    CustomEventData, Dispatcher, ObjectFactory, PlayerTrackEventData, ASSIGN_PLAYER_TO_TRACK,
};
pub use error::{PlayerTrackError, Result};
pub use ids::{IdAllocator, PlayerObject, TrackId};
pub use mirror::Mirror;
pub use multiplayer::{MirrorReport, MultiplayerPoseMirror, MultiplayerSession, OutroAnchor, UserId};
pub use outputs::{Outputs, PoseWrite};
pub use pose::{compose_pose, Pose, ReferencePose, NOTE_LINES_DISTANCE};
pub use track::{PropertySource, Track, TrackStore};
pub use value::{properties, PropertyValue};

pub use glam::{Quat, Vec3};
