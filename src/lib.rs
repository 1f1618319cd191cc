//! # Telliverse
//!
//! **A small first-person game core on wgpu.**
//!
//! Scene objects load a mesh, a texture and an effect once, then update and
//! draw every frame. A first-person camera follows the player, watched pairs
//! are checked for bounding box overlap, and the quit key ends the game.
//!
//! ## Quick Start
//!
//! ```no_run
//! use telliverse::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     logging::init();
//!
//!     run(AppConfig::new().title("Kitchen"), |gpu| {
//!         let game = GameConfig::new();
//!         let mut scene = Scene::new(game.camera(gpu.aspect()));
//!
//!         let mut floor = SceneObject::described(paths::MODEL_CUBE, "Floor", 0)
//!             .with_texture(paths::TEXTURE_TILES);
//!         floor.set_position_scaled(Vec3::ZERO, 10.0, Vec3::new(0.0, -1.0, 0.0));
//!         let floor = scene.add(floor);
//!
//!         let player = scene.add(
//!             SceneObject::described(paths::MODEL_PLAYER, "Player", 0)
//!                 .with_player(game.player.clone()),
//!         );
//!         scene.follow(player);
//!         scene.watch_collision(player, floor);
//!         scene
//!     })?;
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without a GPU
//!
//! [`Scene`] never touches the device. Feed it [`InputSnapshot`]s, initialize
//! it with any [`ResourceLoader`] and inspect the [`DrawQueue`] it fills.

mod app;
mod bounds;
mod camera;
mod component;
mod config;
mod draw_queue;
mod effect;
mod error;
mod first_person_camera;
mod geometry;
mod gpu;
mod input;
pub mod logging;
pub mod paths;
mod renderer;
mod resources;
mod scene;
mod scene_object;
mod texture;
mod time;
mod transform;

pub use app::run;
pub use bounds::{BoundingBox, PRACTICAL_INFINITY};
pub use camera::{Camera, CameraRig, DEFAULT_FAR, DEFAULT_FOV, DEFAULT_NEAR};
pub use component::{ComponentState, Draw, FrameContext, SceneComponent, Update};
pub use config::{AppConfig, GameConfig};
pub use draw_queue::{DrawCall, DrawQueue};
pub use effect::{BUILTIN_TEXTURE_MAPPING, Effect, EffectLayouts};
pub use error::{ResourceError, SceneError, SetupError, ShaderError};
pub use first_person_camera::FirstPersonCamera;
pub use geometry::{BUILTIN_CUBE, BUILTIN_PLANE, MeshData, TexturedVertex};
pub use gpu::GpuContext;
pub use input::{InputCollector, InputSnapshot, InputState};
pub use renderer::Renderer;
pub use resources::{EffectHandle, GpuMesh, GpuResources, MeshHandle, ResourceLoader, TextureHandle};
pub use scene::{CollisionEvent, DEFAULT_QUIT_KEY, FrameOutcome, ObjectId, Scene};
pub use scene_object::{BoundsSpace, MovementModel, PlayerControls, SceneObject};
pub use texture::{BUILTIN_MISSING, BUILTIN_TILES, BUILTIN_WHITE, Texture, TextureData};
pub use time::{FpsCounter, FrameClock, GameTime};
pub use transform::Transform;

// Re-export glam math types for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3};

// Re-export commonly used winit types for convenience
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
