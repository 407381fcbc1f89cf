//! Typed property values carried by a track.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Property names read by the compositor.
pub mod properties {
    /// Offset applied around the player's parent space, in grid cells.
    pub const OFFSET_POSITION: &str = "offsetPosition";
    /// Rotation applied in parent space before the reference rotation.
    pub const OFFSET_ROTATION: &str = "offsetWorldRotation";
    /// Rotation applied innermost, after the reference rotation.
    pub const LOCAL_ROTATION: &str = "localRotation";
}

/// Current value of one animated property.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum PropertyValue {
    Vec3([f32; 3]),
    /// Quaternion (x, y, z, w)
    Quat([f32; 4]),
}

impl PropertyValue {
    #[inline]
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            PropertyValue::Vec3(v) => Some(Vec3::from_array(*v)),
            PropertyValue::Quat(_) => None,
        }
    }

    #[inline]
    pub fn as_quat(&self) -> Option<Quat> {
        match self {
            PropertyValue::Quat(q) => Some(Quat::from_array(*q)),
            PropertyValue::Vec3(_) => None,
        }
    }
}

impl From<Vec3> for PropertyValue {
    fn from(v: Vec3) -> Self {
        PropertyValue::Vec3(v.to_array())
    }
}

impl From<Quat> for PropertyValue {
    fn from(q: Quat) -> Self {
        PropertyValue::Quat(q.to_array())
    }
}
