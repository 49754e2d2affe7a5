//! Per-pointer interaction state.

use crate::geometry::Vector2;
use crate::gesture::GestureState;
use crate::graph::NodeId;
use crate::shapes::ShapeId;

/// What a press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    /// The jot controlling this node.
    Jot(NodeId),
    Line(ShapeId),
    Background,
}

/// One pointer's interaction, from its first press until the recognizer
/// has nothing left to resolve.
#[derive(Debug, Clone)]
pub(crate) struct Interaction {
    pub target: Target,
    pub gesture: GestureState,
    /// Tap marker spawned under a background press, until it starts fading.
    pub marker: Option<ShapeId>,
    /// Camera scroll when the press began, for panning by the drag delta.
    pub scroll_at_press: Vector2,
    /// World position of the previous cut sample.
    pub last_world: Vector2,
}

impl Interaction {
    pub fn new(target: Target, gesture: GestureState, scroll: Vector2, world: Vector2) -> Self {
        Self {
            target,
            gesture,
            marker: None,
            scroll_at_press: scroll,
            last_world: world,
        }
    }

    pub fn is_background(&self) -> bool {
        self.target == Target::Background
    }
}
