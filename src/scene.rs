//! The scene and its per-frame loop.
//!
//! A [`Scene`] owns the components, the camera rig and the input state. Each
//! call to [`tick`](Scene::tick) runs one frame in a fixed order:
//!
//! 1. refresh the input state from the new snapshot
//! 2. update every component in insertion order
//! 3. hand the followed component's tracked position to the camera and update it
//! 4. check every watched pair for collisions and report the results
//! 5. draw every component in insertion order
//!
//! The scene never touches the GPU. Draws land in a [`DrawQueue`] that the
//! caller executes, which keeps the whole loop testable without a device.
//!
//! # Example
//!
//! ```
//! use telliverse::{Camera, FirstPersonCamera, Scene, SceneObject};
//!
//! let mut scene = Scene::new(FirstPersonCamera::new(Camera::default()));
//! let floor = scene.add(SceneObject::new("builtin:plane"));
//! let player = scene.add(SceneObject::new("builtin:cube"));
//! scene.follow(player);
//! scene.watch_collision(player, floor);
//! scene.on_collision(|event| println!("colliding: {}", event.colliding));
//! ```

use tracing::{debug, info};

use crate::camera::{Camera, CameraRig};
use crate::component::{FrameContext, SceneComponent};
use crate::draw_queue::DrawQueue;
use crate::error::SceneError;
use crate::input::{InputSnapshot, InputState, KeyCode};
use crate::resources::ResourceLoader;
use crate::time::GameTime;

/// Key that ends the game unless configured otherwise.
pub const DEFAULT_QUIT_KEY: KeyCode = KeyCode::Escape;

/// Index of a component in its scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Result of checking one watched pair in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    pub first: ObjectId,
    pub second: ObjectId,
    pub colliding: bool,
    /// True when `colliding` differs from the previous frame, or on the first check.
    pub changed: bool,
}

/// What happened during one [`Scene::tick`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// One event per watched pair whose components are both initialized.
    pub collisions: Vec<CollisionEvent>,
    /// The quit key went down this frame.
    pub exit_requested: bool,
}

struct WatchedPair {
    first: ObjectId,
    second: ObjectId,
    last: Option<bool>,
}

type CollisionCallback = Box<dyn FnMut(&CollisionEvent)>;

pub struct Scene {
    objects: Vec<Box<dyn SceneComponent>>,
    camera: Box<dyn CameraRig>,
    input: InputState,
    target: Option<ObjectId>,
    watched: Vec<WatchedPair>,
    subscribers: Vec<CollisionCallback>,
    quit_key: KeyCode,
}

impl Scene {
    pub fn new(camera: impl CameraRig + 'static) -> Self {
        Self {
            objects: Vec::new(),
            camera: Box::new(camera),
            input: InputState::new(),
            target: None,
            watched: Vec::new(),
            subscribers: Vec::new(),
            quit_key: DEFAULT_QUIT_KEY,
        }
    }

    /// Add a component. Components update and draw in the order they were added.
    pub fn add(&mut self, component: impl SceneComponent + 'static) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(Box::new(component));
        id
    }

    pub fn object(&self, id: ObjectId) -> Option<&dyn SceneComponent> {
        self.objects.get(id.0).map(|o| o.as_ref())
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut (dyn SceneComponent + 'static)> {
        self.objects.get_mut(id.0).map(|o| o.as_mut())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Make the camera follow `id`'s tracked position.
    pub fn follow(&mut self, id: ObjectId) {
        self.target = Some(id);
    }

    /// Check `first` against `second` every frame.
    pub fn watch_collision(&mut self, first: ObjectId, second: ObjectId) {
        self.watched.push(WatchedPair {
            first,
            second,
            last: None,
        });
    }

    /// Call `callback` with every collision result, every frame.
    pub fn on_collision(&mut self, callback: impl FnMut(&CollisionEvent) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    pub fn set_quit_key(&mut self, key: KeyCode) {
        self.quit_key = key;
    }

    pub fn quit_key(&self) -> KeyCode {
        self.quit_key
    }

    pub fn camera(&self) -> &Camera {
        self.camera.camera()
    }

    pub fn camera_rig_mut(&mut self) -> &mut dyn CameraRig {
        self.camera.as_mut()
    }

    /// Input state as of the last tick.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Initialize every component in insertion order.
    ///
    /// Stops at the first failure; components after it are left uninitialized.
    pub fn initialize(&mut self, resources: &mut dyn ResourceLoader) -> Result<(), SceneError> {
        for object in &mut self.objects {
            object
                .initialize(resources)
                .map_err(|source| SceneError::ObjectSetup {
                    name: object.name().to_string(),
                    source,
                })?;
        }
        info!(objects = self.objects.len(), "scene initialized");
        Ok(())
    }

    /// Run one frame.
    pub fn tick(
        &mut self,
        snapshot: InputSnapshot,
        time: GameTime,
        queue: &mut DrawQueue,
    ) -> FrameOutcome {
        self.input.refresh(snapshot);
        let frame = FrameContext::new(&self.input, time);

        for object in &mut self.objects {
            object.update(&frame);
        }

        if let Some(position) = self
            .target
            .and_then(|id| self.objects.get(id.0))
            .and_then(|o| o.tracked_position())
        {
            self.camera.track(position);
        }
        self.camera.update(&frame);

        let collisions = self.check_collisions();

        let camera = self.camera.camera();
        for object in &self.objects {
            object.draw(camera, queue);
        }

        let exit_requested = self.input.key_pressed(self.quit_key);
        if exit_requested {
            info!(key = ?self.quit_key, "quit requested");
        }

        FrameOutcome {
            collisions,
            exit_requested,
        }
    }

    fn check_collisions(&mut self) -> Vec<CollisionEvent> {
        let mut events = Vec::with_capacity(self.watched.len());

        for pair in &mut self.watched {
            let (Some(a), Some(b)) = (
                self.objects.get(pair.first.0),
                self.objects.get(pair.second.0),
            ) else {
                continue;
            };
            let (Some(a_bounds), Some(b_bounds)) = (a.collision_bounds(), b.collision_bounds())
            else {
                continue;
            };

            let colliding = a_bounds.intersects(&b_bounds);
            let changed = pair.last != Some(colliding);
            pair.last = Some(colliding);

            let status = if colliding { "colliding" } else { "not colliding" };
            debug!(first = a.name(), second = b.name(), "{status}");
            if changed {
                info!(first = a.name(), second = b.name(), "{status}");
            }

            events.push(CollisionEvent {
                first: pair.first,
                second: pair.second,
                colliding,
                changed,
            });
        }

        for event in &events {
            for subscriber in &mut self.subscribers {
                subscriber(event);
            }
        }

        events
    }
}
