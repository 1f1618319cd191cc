//! Capability traits for things that live in a [`Scene`](crate::Scene).
//!
//! A scene component is anything that can be initialized once, updated every
//! frame with the current input and time, and drawn into a [`DrawQueue`].

use glam::{Mat4, Vec3};

use crate::bounds::BoundingBox;
use crate::camera::Camera;
use crate::draw_queue::DrawQueue;
use crate::error::SetupError;
use crate::input::InputState;
use crate::resources::ResourceLoader;
use crate::time::GameTime;

/// Everything an update step may read.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    pub input: &'a InputState,
    pub time: GameTime,
}

impl<'a> FrameContext<'a> {
    pub fn new(input: &'a InputState, time: GameTime) -> Self {
        Self { input, time }
    }
}

/// Lifecycle of a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentState {
    /// Resources have not been acquired; draws are skipped.
    Uninitialized,
    Initialized,
}

pub trait Update {
    /// Advance one frame.
    fn update(&mut self, frame: &FrameContext<'_>);
}

pub trait Draw {
    /// Submit draw calls for the current state. Must not change that state.
    fn draw(&self, camera: &Camera, queue: &mut DrawQueue);
}

/// An object the scene owns, updates, draws and checks for collisions.
pub trait SceneComponent: Update + Draw {
    /// Name used in logs and setup errors.
    fn name(&self) -> &str;

    /// Acquire resources. On error the component stays uninitialized.
    fn initialize(&mut self, resources: &mut dyn ResourceLoader) -> Result<(), SetupError>;

    fn state(&self) -> ComponentState;

    /// Box used for collision checks, `None` until initialized.
    fn collision_bounds(&self) -> Option<BoundingBox>;

    fn world_matrix(&self) -> Mat4;

    /// Position a following camera should sit at, if this component provides one.
    fn tracked_position(&self) -> Option<Vec3> {
        None
    }
}
