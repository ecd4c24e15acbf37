//! Vectors come straight from [glam](https://docs.rs/glam), re-exported so
//! callers share one version. [`Transform`] is the component that places an
//! entity, and with it any voxel indicator, in world space.

pub use glam::{Mat4, Quat, UVec3, Vec3, Vec4};

use serde::{Deserialize, Serialize};

use crate::ecs::Component;

/// Translation, rotation and scale of an entity, applied scale first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// At the origin, unrotated, unit scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Unrotated, unit scale, placed at `(x, y, z)`.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    /// Same transform, scaled by `scale` on every axis.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Return a copy rotated about the Y axis by `radians`.
    pub fn with_rotation_y(mut self, radians: f32) -> Self {
        self.rotation = Quat::from_rotation_y(radians);
        self
    }

    /// Local-to-world matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Map a point from local space into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.matrix().transform_point3(local)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Component for Transform {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_point_applies_scale_then_translation() {
        let t = Transform::from_xyz(1.0, 2.0, 3.0).with_scale(2.0);
        let p = t.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(3.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn rotation_about_y() {
        let t = Transform::IDENTITY.with_rotation_y(std::f32::consts::FRAC_PI_2);
        let p = t.transform_point(Vec3::X);
        assert!((p - Vec3::NEG_Z).length() < 1e-5);
    }
}
