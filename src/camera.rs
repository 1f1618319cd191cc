//! Perspective camera and the [`CameraRig`] seam.
//!
//! A rig owns a [`Camera`] and moves it each frame from input and an optional
//! tracked position.

use glam::{Mat3, Mat4, Vec3};

use crate::component::FrameContext;

/// Default vertical field of view, in radians.
pub const DEFAULT_FOV: f32 = std::f32::consts::FRAC_PI_4;
/// Default near clipping plane.
pub const DEFAULT_NEAR: f32 = 0.01;
/// Default far clipping plane.
pub const DEFAULT_FAR: f32 = 1000.0;

/// A perspective camera with an explicit orthonormal basis.
///
/// The view matrix is only rebuilt by [`update_view_matrix`](Self::update_view_matrix),
/// so several changes can be made before paying for it once.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    position: Vec3,
    direction: Vec3,
    up: Vec3,
    right: Vec3,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view: Mat4,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DEFAULT_FOV, 4.0 / 3.0, DEFAULT_NEAR, DEFAULT_FAR)
    }
}

impl Camera {
    /// Create a camera at the origin looking down -Z.
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            fov,
            aspect,
            near,
            far,
            view: Mat4::IDENTITY,
            projection: Mat4::perspective_rh(fov, aspect, near, far),
        };
        camera.update_view_matrix();
        camera
    }

    /// Back to the origin, looking down -Z with +Y up.
    pub fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.direction = Vec3::NEG_Z;
        self.up = Vec3::Y;
        self.right = Vec3::X;
        self.update_view_matrix();
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Change the aspect ratio and rebuild the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
    }

    /// Rotate the orientation basis by `rotation` and re-orthogonalize it.
    pub fn apply_rotation(&mut self, rotation: Mat3) {
        let direction = rotation * self.direction;
        let up = rotation * self.up;

        let right = direction.cross(up).normalize_or_zero();
        let up = right.cross(direction).normalize_or_zero();

        self.direction = direction.normalize_or_zero();
        self.right = right;
        self.up = up;
    }

    pub fn update_view_matrix(&mut self) {
        self.view = Mat4::look_to_rh(self.position, self.direction, self.up);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// `projection * view`, ready to be multiplied by a world matrix.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Something that owns a [`Camera`] and moves it once per frame.
pub trait CameraRig {
    /// Position the rig should place the camera at on the next update.
    fn track(&mut self, position: Vec3);

    /// Advance one frame. Always ends with a fresh view matrix.
    fn update(&mut self, frame: &FrameContext<'_>);

    fn camera(&self) -> &Camera;

    fn camera_mut(&mut self) -> &mut Camera;
}

/// A camera that only moves when told to.
impl CameraRig for Camera {
    fn track(&mut self, position: Vec3) {
        self.position = position;
    }

    fn update(&mut self, _frame: &FrameContext<'_>) {
        self.update_view_matrix();
    }

    fn camera(&self) -> &Camera {
        self
    }

    fn camera_mut(&mut self) -> &mut Camera {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_camera_uses_default_basis() {
        let camera = Camera::new(DEFAULT_FOV, 16.0 / 9.0, DEFAULT_NEAR, DEFAULT_FAR);
        assert_eq!(camera.position(), Vec3::ZERO);
        assert_eq!(camera.direction(), Vec3::NEG_Z);
        assert_eq!(camera.up(), Vec3::Y);
        assert_eq!(camera.right(), Vec3::X);
        assert!(camera.view_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let mut camera = Camera::default();
        camera.set_position(Vec3::new(0.0, 0.0, 10.0));
        camera.update_view_matrix();
        let eye_space = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(eye_space.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
    }

    #[test]
    fn set_position_waits_for_view_update() {
        let mut camera = Camera::default();
        camera.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(camera.view_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
        camera.update_view_matrix();
        assert!(!camera.view_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn yaw_rotation_keeps_basis_orthonormal() {
        let mut camera = Camera::default();
        camera.apply_rotation(Mat3::from_rotation_y(std::f32::consts::FRAC_PI_2));

        assert!(camera.direction().abs_diff_eq(Vec3::NEG_X, 1e-5));
        assert!(camera.right().abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!(camera.up().abs_diff_eq(Vec3::Y, 1e-5));
        assert!(camera.direction().dot(camera.up()).abs() < 1e-5);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut camera = Camera::default();
        camera.set_position(Vec3::splat(4.0));
        camera.apply_rotation(Mat3::from_rotation_x(0.4));
        camera.reset();
        assert_eq!(camera.position(), Vec3::ZERO);
        assert_eq!(camera.direction(), Vec3::NEG_Z);
        assert_eq!(camera.up(), Vec3::Y);
    }

    #[test]
    fn set_aspect_rebuilds_projection() {
        let mut camera = Camera::default();
        let before = camera.projection_matrix();
        camera.set_aspect(2.0);
        assert_eq!(camera.aspect(), 2.0);
        assert_ne!(camera.projection_matrix(), before);
    }
}
