//! Window and gameplay configuration.
//!
//! Both configs are plain builders:
//!
//! ```
//! use telliverse::{AppConfig, GameConfig, MovementModel};
//!
//! let app = AppConfig::new().title("Kitchen").size(1280, 720);
//! let game = GameConfig::new()
//!     .movement_model(MovementModel::Accumulate)
//!     .mouse_look(true);
//! ```

use crate::camera::{Camera, DEFAULT_FAR, DEFAULT_FOV, DEFAULT_NEAR};
use crate::first_person_camera::{
    DEFAULT_MOUSE_SENSITIVITY, DEFAULT_ROTATION_RATE, FirstPersonCamera,
};
use crate::input::KeyCode;
use crate::scene::DEFAULT_QUIT_KEY;
use crate::scene_object::{BoundsSpace, MovementModel, PlayerControls};

/// Configuration for the app window.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Background color, linear RGBA.
    pub clear_color: wgpu::Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Hero of the Telliverse".to_string(),
            width: 1024,
            height: 768,
            clear_color: wgpu::Color {
                r: 0.392,
                g: 0.584,
                b: 0.929,
                a: 1.0,
            },
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn clear_color(mut self, r: f64, g: f64, b: f64) -> Self {
        self.clear_color = wgpu::Color { r, g, b, a: 1.0 };
        self
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Gameplay settings shared by the scene, its camera and its player.
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub player: PlayerControls,
    /// Space used for collision boxes of objects built from this config.
    pub bounds_space: BoundsSpace,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub mouse_look: bool,
    pub mouse_sensitivity: f32,
    pub rotation_rate: f32,
    pub quit_key: KeyCode,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player: PlayerControls::default(),
            bounds_space: BoundsSpace::Local,
            fov: DEFAULT_FOV,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            mouse_look: false,
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            rotation_rate: DEFAULT_ROTATION_RATE,
            quit_key: DEFAULT_QUIT_KEY,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(mut self, controls: PlayerControls) -> Self {
        self.player = controls;
        self
    }

    pub fn movement_model(mut self, model: MovementModel) -> Self {
        self.player.movement_model = model;
        self
    }

    pub fn bounds_space(mut self, space: BoundsSpace) -> Self {
        self.bounds_space = space;
        self
    }

    pub fn mouse_look(mut self, enabled: bool) -> Self {
        self.mouse_look = enabled;
        self
    }

    pub fn mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    /// Set the field of view in degrees.
    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    /// Set near and far clipping planes.
    pub fn clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn quit_key(mut self, key: KeyCode) -> Self {
        self.quit_key = key;
        self
    }

    /// Build the first-person camera rig described by this config.
    pub fn camera(&self, aspect: f32) -> FirstPersonCamera {
        FirstPersonCamera::new(Camera::new(self.fov, aspect, self.near, self.far))
            .sensitivity(self.mouse_sensitivity)
            .rotation_rate(self.rotation_rate)
            .mouse_look(self.mouse_look)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraRig;

    #[test]
    fn defaults_match_the_game() {
        let config = GameConfig::default();
        assert_eq!(config.player.movement_rate, 5.0);
        assert_eq!(config.player.movement_model, MovementModel::FrameRelative);
        assert_eq!(config.bounds_space, BoundsSpace::Local);
        assert_eq!(config.quit_key, KeyCode::Escape);
        assert!(!config.mouse_look);
    }

    #[test]
    fn camera_uses_configured_settings() {
        let rig = GameConfig::new()
            .mouse_look(true)
            .mouse_sensitivity(20.0)
            .fov(60.0)
            .camera(2.0);
        assert!(rig.mouse_look);
        assert_eq!(rig.sensitivity, 20.0);
        assert!((rig.camera().fov() - 60.0_f32.to_radians()).abs() < 1e-6);
        assert_eq!(rig.camera().aspect(), 2.0);
    }
}
