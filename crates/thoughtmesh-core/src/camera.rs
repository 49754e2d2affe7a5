//! Camera module for the canvas pan transform.

use crate::geometry::Vector2;
use kurbo::{Affine, Vec2};
use serde::{Deserialize, Serialize};

/// Camera holds the ambient scroll of the canvas.
///
/// World coordinates are screen coordinates plus the scroll. Dragging the
/// background by `delta` moves the content with the pointer, so the scroll
/// moves by `-delta`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World position of the screen origin.
    pub scroll: Vector2,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(-Vec2::from(self.scroll))
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Vector2) -> Vector2 {
        screen_point + self.scroll
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Vector2) -> Vector2 {
        world_point - self.scroll
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vector2) {
        self.scroll -= delta;
    }
}
