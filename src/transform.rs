//! World transforms for scene objects.
//!
//! A [`Transform`] stores the parameters an object was last positioned with
//! (Euler rotation and per-axis scale) together with the derived world matrix.
//!
//! # Composition Order
//!
//! The world matrix applies, to a local-space point:
//!
//! 1. rotation about Z
//! 2. rotation about X
//! 3. rotation about Y
//! 4. scale
//! 5. translation
//!
//! In glam's column-vector convention that is `T * S * Ry * Rx * Rz`. Scale is
//! applied *after* rotation, so a non-uniform scale stretches along the world
//! axes rather than the object's own axes. Callers that need a different order
//! build the matrix themselves.
//!
//! # Example
//!
//! ```
//! use telliverse::{Transform, Vec3};
//!
//! let mut transform = Transform::new();
//! transform.set_scale(Vec3::new(0.05, 0.05, 1.0));
//! // Uses the stored per-axis scale
//! transform.set_position(Vec3::ZERO, Vec3::new(-2.0, 0.0, -10.0));
//! assert_eq!(transform.translation(), Vec3::new(-2.0, 0.0, -10.0));
//! ```

use glam::{Mat4, Vec3};

/// Per-axis scale a freshly created object starts with.
pub const DEFAULT_SCALE: f32 = 0.05;

/// Rotation, scale and the resulting world matrix of one object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    rotation: Vec3,
    scale: Vec3,
    world: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            rotation: Vec3::ZERO,
            scale: Vec3::splat(DEFAULT_SCALE),
            world: Mat4::IDENTITY,
        }
    }
}

impl Transform {
    /// Identity world matrix with the default stored scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a per-axis scale for later [`set_position`](Self::set_position) calls.
    ///
    /// The world matrix is not touched. Zero or negative values are accepted and
    /// will collapse or mirror the geometry.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Rebuild the world matrix using a uniform `scale` for this call only.
    ///
    /// The stored per-axis scale is left unchanged.
    pub fn set_position_scaled(&mut self, rotation: Vec3, scale: f32, translation: Vec3) {
        self.rotation = rotation;
        self.world = Self::compose(rotation, Vec3::splat(scale), translation);
    }

    /// Rebuild the world matrix using the stored per-axis scale.
    pub fn set_position(&mut self, rotation: Vec3, translation: Vec3) {
        self.rotation = rotation;
        self.world = Self::compose(rotation, self.scale, translation);
    }

    /// Compose a world matrix from Euler angles (radians), scale and translation.
    pub fn compose(rotation: Vec3, scale: Vec3, translation: Vec3) -> Mat4 {
        Mat4::from_translation(translation)
            * Mat4::from_scale(scale)
            * Mat4::from_rotation_y(rotation.y)
            * Mat4::from_rotation_x(rotation.x)
            * Mat4::from_rotation_z(rotation.z)
    }

    /// The current world matrix.
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// Translation column of the world matrix.
    pub fn translation(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }

    /// Euler angles passed to the last `set_position*` call.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Stored per-axis scale.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Replace only the translation column, keeping rotation and scale.
    pub(crate) fn overwrite_translation(&mut self, translation: Vec3) {
        self.world.w_axis = translation.extend(1.0);
    }

    /// Append a translation after everything else in the world matrix.
    pub(crate) fn translate(&mut self, delta: Vec3) {
        self.world = Mat4::from_translation(delta) * self.world;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn reference(rotation: Vec3, scale: Vec3, translation: Vec3) -> Mat4 {
        // Apply each step to the point explicitly, in order.
        let rz = Mat4::from_rotation_z(rotation.z);
        let rx = Mat4::from_rotation_x(rotation.x);
        let ry = Mat4::from_rotation_y(rotation.y);
        let s = Mat4::from_scale(scale);
        let t = Mat4::from_translation(translation);
        t * (s * (ry * (rx * rz)))
    }

    #[test]
    fn new_transform_is_identity() {
        let transform = Transform::new();
        assert_eq!(transform.world_matrix(), Mat4::IDENTITY);
        assert_eq!(transform.scale(), Vec3::splat(DEFAULT_SCALE));
    }

    #[test]
    fn zero_rotation_unit_scale_is_pure_translation() {
        let mut transform = Transform::new();
        transform.set_position_scaled(Vec3::ZERO, 1.0, Vec3::new(3.0, -1.0, 7.5));
        assert!(
            transform
                .world_matrix()
                .abs_diff_eq(Mat4::from_translation(Vec3::new(3.0, -1.0, 7.5)), 1e-6)
        );
    }

    #[test]
    fn uniform_overload_matches_reference_composition() {
        let cases = [
            (Vec3::new(FRAC_PI_2, 0.0, 0.0), 2.0, Vec3::new(1.0, 2.0, 3.0)),
            (Vec3::new(0.0, 180.0, 0.0), 0.8, Vec3::new(0.0, -6.0, -10.0)),
            (Vec3::new(0.3, 1.1, -0.7), 0.01, Vec3::new(-2.0, 5.0, -10.0)),
        ];

        for (rotation, scale, translation) in cases {
            let mut transform = Transform::new();
            transform.set_position_scaled(rotation, scale, translation);
            let expected = reference(rotation, Vec3::splat(scale), translation);
            assert!(transform.world_matrix().abs_diff_eq(expected, 1e-5));
        }
    }

    #[test]
    fn stored_scale_overload_matches_reference_composition() {
        let rotation = Vec3::new(-1.57, FRAC_PI_4, 0.2);
        let scale = Vec3::new(0.05, 0.05, 1.0);
        let translation = Vec3::new(-2.0, 0.0, -10.0);

        let mut transform = Transform::new();
        transform.set_scale(scale);
        transform.set_position(rotation, translation);

        assert!(
            transform
                .world_matrix()
                .abs_diff_eq(reference(rotation, scale, translation), 1e-5)
        );
    }

    #[test]
    fn rotation_applies_z_then_x_then_y() {
        // Z then X sends +X to +Y then to +Z; X then Z would leave it on +Y.
        let mut transform = Transform::new();
        transform.set_position_scaled(Vec3::new(FRAC_PI_2, 0.0, FRAC_PI_2), 1.0, Vec3::ZERO);
        let moved = transform.world_matrix().transform_point3(Vec3::X);
        assert!(moved.abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn uniform_overload_leaves_stored_scale_alone() {
        let mut transform = Transform::new();
        transform.set_scale(Vec3::new(1.0, 2.0, 3.0));
        transform.set_position_scaled(Vec3::ZERO, 10.0, Vec3::ZERO);
        assert_eq!(transform.scale(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn set_position_overwrites_instead_of_accumulating() {
        let mut transform = Transform::new();
        transform.set_position_scaled(Vec3::ZERO, 1.0, Vec3::new(5.0, 0.0, 0.0));
        transform.set_position_scaled(Vec3::ZERO, 1.0, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(transform.translation(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn translate_appends_after_scale() {
        let mut transform = Transform::new();
        transform.set_position_scaled(Vec3::ZERO, 0.5, Vec3::new(1.0, 0.0, 0.0));
        transform.translate(Vec3::new(2.0, 0.0, 0.0));
        assert!(transform.translation().abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-6));
    }
}
