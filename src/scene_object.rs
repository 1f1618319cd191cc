//! Textured models placed in the scene, optionally driven by the keyboard.
//!
//! A [`SceneObject`] starts uninitialized with only resource keys. Calling
//! [`initialize`](SceneComponent::initialize) loads the effect, mesh and
//! texture through a [`ResourceLoader`] and builds the bounding box; after that
//! it updates and draws every frame.
//!
//! # Player movement
//!
//! An object with [`PlayerControls`] moves along X while its left or right key
//! is held. With the default [`MovementModel::FrameRelative`] the translation
//! is *replaced* by this frame's displacement, so the object springs back to
//! the origin as soon as the keys are let go. [`MovementModel::Accumulate`]
//! adds the displacement instead.
//!
//! # Example
//!
//! ```
//! use telliverse::{PlayerControls, SceneObject, Vec3, paths};
//!
//! let mut player = SceneObject::described(paths::MODEL_PLAYER, "Hero", 0)
//!     .with_texture(paths::TEXTURE_PLAYER)
//!     .with_player(PlayerControls::default());
//! player.set_scale(Vec3::new(0.05, 0.05, 1.0));
//! player.set_position(Vec3::new(-1.57, 0.0, 0.0), Vec3::new(0.0, -6.0, -10.0));
//! ```

use glam::{Mat4, Vec3};
use tracing::{debug, info};

use crate::bounds::BoundingBox;
use crate::camera::Camera;
use crate::component::{ComponentState, Draw, FrameContext, SceneComponent, Update};
use crate::draw_queue::{DrawCall, DrawQueue};
use crate::effect::BUILTIN_TEXTURE_MAPPING;
use crate::error::{ResourceError, SetupError};
use crate::input::KeyCode;
use crate::resources::{EffectHandle, MeshHandle, ResourceLoader, TextureHandle};
use crate::texture::BUILTIN_MISSING;
use crate::transform::Transform;

/// Player movement speed in units per second.
pub const DEFAULT_MOVEMENT_RATE: f32 = 5.0;
/// Offset from the player's translation to the position the camera follows.
pub const DEFAULT_TRACKING_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 10.0);

/// How a player's per-frame displacement is applied to its world matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MovementModel {
    /// Replace the translation with this frame's displacement only.
    #[default]
    FrameRelative,
    /// Add this frame's displacement on top of the current world matrix.
    Accumulate,
}

/// Which box an object reports for collision checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundsSpace {
    /// The box built from local-space vertices, used as-is.
    #[default]
    Local,
    /// The local box carried through the current world matrix.
    World,
}

/// Keyboard movement for a player-controlled object.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerControls {
    /// Key moving toward -X.
    pub left: KeyCode,
    /// Key moving toward +X. Wins when both are held.
    pub right: KeyCode,
    /// Units per second.
    pub movement_rate: f32,
    pub movement_model: MovementModel,
    /// The tracked position is refreshed on every frame where any of these
    /// keys is up.
    pub snapshot_keys: Vec<KeyCode>,
    /// Added to the translation to get the tracked position.
    pub tracking_offset: Vec3,
}

impl Default for PlayerControls {
    fn default() -> Self {
        Self {
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            movement_rate: DEFAULT_MOVEMENT_RATE,
            movement_model: MovementModel::FrameRelative,
            snapshot_keys: vec![KeyCode::KeyH, KeyCode::KeyK],
            tracking_offset: DEFAULT_TRACKING_OFFSET,
        }
    }
}

impl PlayerControls {
    pub fn movement_rate(mut self, rate: f32) -> Self {
        self.movement_rate = rate;
        self
    }

    pub fn movement_model(mut self, model: MovementModel) -> Self {
        self.movement_model = model;
        self
    }

    /// Set the left and right movement keys.
    pub fn keys(mut self, left: KeyCode, right: KeyCode) -> Self {
        self.left = left;
        self.right = right;
        self
    }

    pub fn tracking_offset(mut self, offset: Vec3) -> Self {
        self.tracking_offset = offset;
        self
    }

    /// Signed X direction for this frame.
    fn direction(&self, frame: &FrameContext<'_>) -> f32 {
        let mut direction = 0.0;
        if frame.input.key_down(self.left) {
            direction = -1.0;
        }
        if frame.input.key_down(self.right) {
            direction = 1.0;
        }
        direction
    }
}

/// Handles acquired by a successful initialization.
#[derive(Clone, Copy, Debug)]
struct Loaded {
    effect: EffectHandle,
    mesh: MeshHandle,
    texture: TextureHandle,
    bounds: BoundingBox,
}

/// A textured model loaded from a resource key.
#[derive(Debug)]
pub struct SceneObject {
    description: String,
    model_value: i32,
    model_path: String,
    texture_path: String,
    effect_path: String,
    transform: Transform,
    bounds_space: BoundsSpace,
    player: Option<PlayerControls>,
    tracked_position: Option<Vec3>,
    loaded: Option<Loaded>,
}

impl SceneObject {
    /// A static object with no description.
    pub fn new(model_path: impl Into<String>) -> Self {
        Self::described(model_path, "", 0)
    }

    /// A static object with a description and a numeric value tag.
    pub fn described(
        model_path: impl Into<String>,
        description: impl Into<String>,
        model_value: i32,
    ) -> Self {
        Self {
            description: description.into(),
            model_value,
            model_path: model_path.into(),
            texture_path: BUILTIN_MISSING.to_string(),
            effect_path: BUILTIN_TEXTURE_MAPPING.to_string(),
            transform: Transform::new(),
            bounds_space: BoundsSpace::Local,
            player: None,
            tracked_position: None,
            loaded: None,
        }
    }

    pub fn with_texture(mut self, texture_path: impl Into<String>) -> Self {
        self.texture_path = texture_path.into();
        self
    }

    pub fn with_effect(mut self, effect_path: impl Into<String>) -> Self {
        self.effect_path = effect_path.into();
        self
    }

    /// Make this object keyboard controlled.
    pub fn with_player(mut self, controls: PlayerControls) -> Self {
        self.player = Some(controls);
        self
    }

    pub fn with_bounds_space(mut self, space: BoundsSpace) -> Self {
        self.bounds_space = space;
        self
    }

    /// Use `texture_path` from the next initialization on.
    pub fn set_texture(&mut self, texture_path: impl Into<String>) {
        self.texture_path = texture_path.into();
    }

    /// Go back to the missing-texture placeholder.
    pub fn clear_texture(&mut self) {
        self.texture_path = BUILTIN_MISSING.to_string();
    }

    /// Store a per-axis scale for [`set_position`](Self::set_position).
    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.set_scale(scale);
    }

    /// Place the object with a uniform scale.
    pub fn set_position_scaled(&mut self, rotation: Vec3, scale: f32, translation: Vec3) {
        self.transform
            .set_position_scaled(rotation, scale, translation);
    }

    /// Place the object with the stored per-axis scale.
    pub fn set_position(&mut self, rotation: Vec3, translation: Vec3) {
        self.transform.set_position(rotation, translation);
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn model_value(&self) -> i32 {
        self.model_value
    }

    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    pub fn texture_path(&self) -> &str {
        &self.texture_path
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Translation of the world matrix.
    pub fn position(&self) -> Vec3 {
        self.transform.translation()
    }

    pub fn player(&self) -> Option<&PlayerControls> {
        self.player.as_ref()
    }

    /// Local-space bounding box, available once initialized.
    pub fn local_bounds(&self) -> Option<BoundingBox> {
        self.loaded.map(|l| l.bounds)
    }

    fn acquire(&self, resources: &mut dyn ResourceLoader) -> Result<Loaded, SetupError> {
        let effect = resources.load_effect(&self.effect_path)?;
        let mesh_data = resources.load_mesh(&self.model_path)?;
        let bounds = mesh_data
            .bounds()
            .ok_or_else(|| ResourceError::EmptyMesh(self.model_path.clone()))?;
        // Everything fallible runs before the mesh reaches the loader.
        let texture = resources.load_texture(&self.texture_path)?;
        let mesh = resources.upload_mesh(&mesh_data);

        Ok(Loaded {
            effect,
            mesh,
            texture,
            bounds,
        })
    }
}

impl Update for SceneObject {
    fn update(&mut self, frame: &FrameContext<'_>) {
        let Some(player) = &self.player else {
            return;
        };

        let direction = player.direction(frame);
        let displacement = Vec3::X * direction * player.movement_rate * frame.time.elapsed;

        match player.movement_model {
            MovementModel::FrameRelative => self.transform.overwrite_translation(displacement),
            MovementModel::Accumulate => self.transform.translate(displacement),
        }

        if player.snapshot_keys.iter().any(|&key| frame.input.key_up(key)) {
            self.tracked_position = Some(self.transform.translation() + player.tracking_offset);
        }
    }
}

impl Draw for SceneObject {
    fn draw(&self, camera: &Camera, queue: &mut DrawQueue) {
        let Some(loaded) = &self.loaded else {
            return;
        };

        queue.submit(DrawCall {
            mesh: loaded.mesh,
            texture: loaded.texture,
            effect: loaded.effect,
            world_view_projection: camera.view_projection() * self.transform.world_matrix(),
        });
    }
}

impl SceneComponent for SceneObject {
    fn name(&self) -> &str {
        if self.description.is_empty() {
            &self.model_path
        } else {
            &self.description
        }
    }

    fn initialize(&mut self, resources: &mut dyn ResourceLoader) -> Result<(), SetupError> {
        let loaded = self.acquire(resources)?;
        debug!(
            object = self.name(),
            center = ?loaded.bounds.center,
            extents = ?loaded.bounds.extents,
            "bounding box built"
        );
        self.loaded = Some(loaded);
        info!(object = self.name(), model = %self.model_path, texture = %self.texture_path, "scene object initialized");
        Ok(())
    }

    fn state(&self) -> ComponentState {
        if self.loaded.is_some() {
            ComponentState::Initialized
        } else {
            ComponentState::Uninitialized
        }
    }

    fn collision_bounds(&self) -> Option<BoundingBox> {
        let bounds = self.loaded?.bounds;
        Some(match self.bounds_space {
            BoundsSpace::Local => bounds,
            BoundsSpace::World => bounds.transformed(&self.transform.world_matrix()),
        })
    }

    fn world_matrix(&self) -> Mat4 {
        self.transform.world_matrix()
    }

    fn tracked_position(&self) -> Option<Vec3> {
        self.tracked_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MeshData;
    use crate::input::{InputSnapshot, InputState};
    use crate::time::GameTime;

    fn frame_input(keys: &[KeyCode]) -> InputState {
        let snapshot = keys
            .iter()
            .fold(InputSnapshot::new(), |s, &k| s.with_key(k));
        let mut input = InputState::new();
        input.refresh(snapshot);
        input
    }

    fn step(object: &mut SceneObject, keys: &[KeyCode], elapsed: f32) {
        let input = frame_input(keys);
        object.update(&FrameContext::new(&input, GameTime::from_elapsed(elapsed)));
    }

    fn player() -> SceneObject {
        let mut object = SceneObject::new("player.obj").with_player(PlayerControls::default());
        object.set_position_scaled(Vec3::ZERO, 1.0, Vec3::new(4.0, -6.0, -10.0));
        object
    }

    /// Loader whose every call succeeds with fixed handles.
    struct Fixed;

    impl ResourceLoader for Fixed {
        fn load_effect(&mut self, _: &str) -> Result<EffectHandle, crate::error::ShaderError> {
            Ok(EffectHandle::from_index(0))
        }
        fn load_mesh(&mut self, _: &str) -> Result<MeshData, ResourceError> {
            Ok(MeshData::cube())
        }
        fn upload_mesh(&mut self, _: &MeshData) -> MeshHandle {
            MeshHandle::from_index(1)
        }
        fn load_texture(&mut self, _: &str) -> Result<TextureHandle, ResourceError> {
            Ok(TextureHandle::from_index(2))
        }
    }

    #[test]
    fn new_object_defaults() {
        let object = SceneObject::new("Content\\Models\\bench.3ds");
        assert_eq!(object.texture_path(), BUILTIN_MISSING);
        assert_eq!(object.transform().scale(), Vec3::splat(0.05));
        assert_eq!(object.state(), ComponentState::Uninitialized);
        assert_eq!(object.collision_bounds(), None);
        assert_eq!(object.name(), "Content\\Models\\bench.3ds");
    }

    #[test]
    fn clear_texture_restores_placeholder() {
        let mut object = SceneObject::described("table.obj", "Table", 3);
        object.set_texture("Content/Textures/wood.jpg");
        assert_eq!(object.texture_path(), "Content/Textures/wood.jpg");
        object.clear_texture();
        assert_eq!(object.texture_path(), BUILTIN_MISSING);
        assert_eq!(object.name(), "Table");
        assert_eq!(object.model_value(), 3);
    }

    #[test]
    fn idle_player_translation_resets_to_zero() {
        let mut object = player();
        step(&mut object, &[], 0.016);
        assert_eq!(object.position(), Vec3::ZERO);
    }

    #[test]
    fn frame_relative_keeps_rotation_and_scale() {
        let mut object = SceneObject::new("p.obj").with_player(PlayerControls::default());
        object.set_position_scaled(Vec3::new(0.0, 0.0, 0.5), 2.0, Vec3::new(1.0, 1.0, 1.0));
        let before = object.world_matrix();
        step(&mut object, &[KeyCode::KeyD], 0.1);

        let after = object.world_matrix();
        assert_eq!(after.x_axis, before.x_axis);
        assert_eq!(after.y_axis, before.y_axis);
        assert_eq!(after.z_axis, before.z_axis);
        assert!(object.position().abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn movement_keys_displace_along_x() {
        let mut object = player();
        step(&mut object, &[KeyCode::KeyA], 0.2);
        assert!(object.position().abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), 1e-6));

        // Not accumulated: the next frame starts from zero again.
        step(&mut object, &[KeyCode::KeyA], 0.2);
        assert!(object.position().abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn right_key_wins_when_both_held() {
        let mut object = player();
        step(&mut object, &[KeyCode::KeyA, KeyCode::KeyD], 0.2);
        assert!(object.position().abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn accumulate_model_adds_displacement() {
        let mut object = SceneObject::new("p.obj").with_player(
            PlayerControls::default().movement_model(MovementModel::Accumulate),
        );
        object.set_position_scaled(Vec3::ZERO, 1.0, Vec3::new(4.0, 0.0, 0.0));

        step(&mut object, &[KeyCode::KeyD], 0.2);
        step(&mut object, &[KeyCode::KeyD], 0.2);
        assert!(object.position().abs_diff_eq(Vec3::new(6.0, 0.0, 0.0), 1e-5));

        step(&mut object, &[], 0.2);
        assert!(object.position().abs_diff_eq(Vec3::new(6.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn tracked_position_follows_while_snapshot_key_is_up() {
        let mut object = player();
        assert_eq!(object.tracked_position(), None);

        step(&mut object, &[KeyCode::KeyD], 0.2);
        assert!(
            object
                .tracked_position()
                .unwrap()
                .abs_diff_eq(Vec3::new(1.0, 0.0, 10.0), 1e-6)
        );
    }

    #[test]
    fn tracked_position_freezes_while_all_snapshot_keys_are_down() {
        let mut object = player();
        step(&mut object, &[KeyCode::KeyD], 0.2);
        let frozen = object.tracked_position();

        step(&mut object, &[KeyCode::KeyA, KeyCode::KeyH, KeyCode::KeyK], 0.2);
        assert_eq!(object.tracked_position(), frozen);

        // Releasing one of them resumes tracking.
        step(&mut object, &[KeyCode::KeyA, KeyCode::KeyH], 0.2);
        assert!(
            object
                .tracked_position()
                .unwrap()
                .abs_diff_eq(Vec3::new(-1.0, 0.0, 10.0), 1e-6)
        );
    }

    #[test]
    fn static_object_ignores_input() {
        let mut object = SceneObject::new("table.obj");
        object.set_position_scaled(Vec3::ZERO, 1.0, Vec3::new(4.0, 0.0, 0.0));
        step(&mut object, &[KeyCode::KeyD], 0.2);
        assert_eq!(object.position(), Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(object.tracked_position(), None);
    }

    #[test]
    fn uninitialized_object_draws_nothing() {
        let object = SceneObject::new("table.obj");
        let mut queue = DrawQueue::new();
        object.draw(&Camera::default(), &mut queue);
        assert!(queue.is_empty());
    }

    #[test]
    fn draw_submits_world_view_projection() {
        let mut object = SceneObject::new("table.obj");
        object.initialize(&mut Fixed).unwrap();
        object.set_position_scaled(Vec3::ZERO, 1.0, Vec3::new(0.0, 0.0, -5.0));
        let before = object.world_matrix();

        let camera = Camera::default();
        let mut queue = DrawQueue::new();
        object.draw(&camera, &mut queue);

        assert_eq!(queue.len(), 1);
        let call = queue.calls()[0];
        assert_eq!(call.mesh, MeshHandle::from_index(1));
        assert_eq!(call.texture, TextureHandle::from_index(2));
        assert_eq!(call.effect, EffectHandle::from_index(0));
        let expected = camera.projection_matrix() * camera.view_matrix() * before;
        assert!(call.world_view_projection.abs_diff_eq(expected, 1e-6));
        assert_eq!(object.world_matrix(), before);
    }

    #[test]
    fn world_bounds_follow_transform() {
        let mut object = SceneObject::new("cube").with_bounds_space(BoundsSpace::World);
        object.initialize(&mut Fixed).unwrap();
        object.set_position_scaled(Vec3::ZERO, 1.0, Vec3::new(0.0, 0.0, 15.0));

        let bounds = object.collision_bounds().unwrap();
        assert!(bounds.center.abs_diff_eq(Vec3::new(0.0, 0.0, 15.0), 1e-5));
        assert_eq!(object.local_bounds().unwrap().center, Vec3::ZERO);
    }
}
