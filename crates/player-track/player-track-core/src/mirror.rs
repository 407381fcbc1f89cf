//! Handedness flip for values read from tracks.

use glam::{Quat, Vec3};

/// Left-handed play mirrors the scene across the YZ plane.
pub trait Mirror: Sized {
    /// Unconditionally mirrored copy.
    fn mirrored(self) -> Self;

    #[inline]
    fn mirror(self, left_handed: bool) -> Self {
        if left_handed {
            self.mirrored()
        } else {
            self
        }
    }
}

impl Mirror for Vec3 {
    #[inline]
    fn mirrored(self) -> Self {
        Vec3::new(-self.x, self.y, self.z)
    }
}

impl Mirror for Quat {
    #[inline]
    fn mirrored(self) -> Self {
        Quat::from_xyzw(self.x, -self.y, -self.z, self.w)
    }
}
