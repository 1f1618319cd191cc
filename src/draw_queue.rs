use glam::Mat4;

use crate::resources::{EffectHandle, MeshHandle, TextureHandle};

/// One indexed draw of a mesh with an effect and texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshHandle,
    pub texture: TextureHandle,
    pub effect: EffectHandle,
    /// `projection * view * world` for this draw.
    pub world_view_projection: Mat4,
}

/// Draw calls collected during a frame, in submission order.
#[derive(Debug, Default)]
pub struct DrawQueue {
    calls: Vec<DrawCall>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, call: DrawCall) {
        self.calls.push(call);
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Drop every queued call, keeping the allocation for the next frame.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}
