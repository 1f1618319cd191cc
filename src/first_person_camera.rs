//! A first-person camera that rides along with a tracked object.
//!
//! [`FirstPersonCamera`] wraps a [`Camera`] and, every frame, snaps it to the
//! position last passed to [`track`](CameraRig::track). Mouse look is available
//! but switched off by default; the demo level is played with a fixed heading.
//!
//! # Example
//!
//! ```
//! use telliverse::{Camera, CameraRig, FirstPersonCamera, Vec3};
//!
//! let mut rig = FirstPersonCamera::new(Camera::default())
//!     .mouse_look(true)
//!     .sensitivity(50.0);
//!
//! rig.track(Vec3::new(0.0, 0.0, 10.0));
//! ```

use glam::{Mat3, Vec2, Vec3};

use crate::camera::{Camera, CameraRig};
use crate::component::FrameContext;
use crate::input::MouseButton;

/// Default mouse sensitivity multiplier.
pub const DEFAULT_MOUSE_SENSITIVITY: f32 = 100.0;
/// One degree, in radians.
pub const DEFAULT_ROTATION_RATE: f32 = std::f32::consts::PI / 180.0;

#[derive(Clone, Debug)]
pub struct FirstPersonCamera {
    camera: Camera,
    tracked_position: Option<Vec3>,
    /// Multiplier applied to raw mouse motion.
    pub sensitivity: f32,
    /// Radians of rotation per unit of scaled mouse motion per second.
    pub rotation_rate: f32,
    /// Whether dragging with the left button turns the camera.
    pub mouse_look: bool,
}

impl FirstPersonCamera {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            tracked_position: None,
            sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            rotation_rate: DEFAULT_ROTATION_RATE,
            mouse_look: false,
        }
    }

    /// Set mouse sensitivity.
    pub fn sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Set the rotation rate in radians.
    pub fn rotation_rate(mut self, rate: f32) -> Self {
        self.rotation_rate = rate;
        self
    }

    /// Enable or disable mouse look.
    pub fn mouse_look(mut self, enabled: bool) -> Self {
        self.mouse_look = enabled;
        self
    }

    /// Position the camera is pinned to, if one has been tracked.
    pub fn tracked_position(&self) -> Option<Vec3> {
        self.tracked_position
    }

    /// Forget the tracked position. The camera stays where it is.
    pub fn clear_tracking(&mut self) {
        self.tracked_position = None;
    }

    fn rotation_amount(&self, frame: &FrameContext<'_>) -> Vec2 {
        if frame.input.mouse_down(MouseButton::Left) {
            -frame.input.mouse_delta() * self.sensitivity
        } else {
            Vec2::ZERO
        }
    }
}

impl CameraRig for FirstPersonCamera {
    fn track(&mut self, position: Vec3) {
        self.tracked_position = Some(position);
    }

    fn update(&mut self, frame: &FrameContext<'_>) {
        let rotation_amount = self.rotation_amount(frame);

        if self.mouse_look && rotation_amount != Vec2::ZERO {
            let rotation = rotation_amount * self.rotation_rate * frame.time.elapsed;
            let pitch = Mat3::from_axis_angle(self.camera.right(), rotation.y);
            let yaw = Mat3::from_rotation_y(rotation.x);
            // Pitch first, then yaw.
            self.camera.apply_rotation(yaw * pitch);
        }

        if let Some(position) = self.tracked_position {
            self.camera.set_position(position);
        }

        self.camera.update_view_matrix();
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}
