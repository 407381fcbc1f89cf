//! Poses and the per-frame composition function.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::mirror::Mirror;
use crate::track::PropertySource;
use crate::value::properties::{LOCAL_ROTATION, OFFSET_POSITION, OFFSET_ROTATION};

/// World units per grid cell.
pub const NOTE_LINES_DISTANCE: f32 = 0.6;

/// Position + rotation, local or world depending on context. Scale is never
/// animated by a player track and is left to the host.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    #[inline]
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    #[inline]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// `self` is the parent; returns the child's pose in the parent's space.
    #[inline]
    pub fn mul_pose(&self, child: &Pose) -> Pose {
        Pose {
            position: self.transform_point(child.position),
            rotation: self.rotation * child.rotation,
        }
    }

    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }

    #[inline]
    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            position: rotation * -self.position,
            rotation,
        }
    }

    pub fn abs_diff_eq(&self, other: &Pose, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}

/// Local pose captured from the entity when its compositor is built.
/// Never changes afterwards.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferencePose(Pose);

impl ReferencePose {
    #[inline]
    pub fn capture(local: Pose) -> Self {
        Self(local)
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.0.position
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.0.rotation
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.0
    }
}

/// Compose one frame's local pose.
///
/// Rotation order is offset, then reference, then local rotation. The offset
/// rotation also carries the (scaled) offset position and the reference
/// position around the parent origin.
pub fn compose_pose(
    reference: &ReferencePose,
    source: &dyn PropertySource,
    left_handed: bool,
    note_lines_distance: f32,
) -> Pose {
    let offset_rotation = source
        .quat(OFFSET_ROTATION)
        .map(|q| q.mirror(left_handed));
    let offset_position = source
        .vec3(OFFSET_POSITION)
        .map(|v| v.mirror(left_handed));

    let mut rotation = Quat::IDENTITY;
    let mut position = reference.position();
    if offset_rotation.is_some() || offset_position.is_some() {
        rotation *= offset_rotation.unwrap_or(Quat::IDENTITY);
        let offset = offset_position.unwrap_or(Vec3::ZERO);
        position = rotation * (offset * note_lines_distance + reference.position());
    }

    rotation *= reference.rotation();

    if let Some(local) = source.quat(LOCAL_ROTATION) {
        rotation *= local.mirror(left_handed);
    }

    Pose { position, rotation }
}
