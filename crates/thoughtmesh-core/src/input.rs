//! Raw pointer events fed into the gesture recognizer.

use crate::geometry::Vector2;
use serde::{Deserialize, Serialize};

/// Identifier of one pointer (mouse, pen or a single touch contact).
pub type PointerId = u32;

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    /// Left mouse button, pen contact or touch.
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Kind of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

/// A raw pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    #[serde(rename = "type")]
    pub kind: PointerEventKind,
    #[serde(flatten)]
    pub position: Vector2,
    #[serde(default)]
    pub pointer_id: PointerId,
    #[serde(default)]
    pub button: PointerButton,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, position: Vector2, pointer_id: PointerId) -> Self {
        Self {
            kind,
            position,
            pointer_id,
            button: PointerButton::Primary,
        }
    }

    /// Primary-button press.
    pub fn down(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down, Vector2::new(x, y), 0)
    }

    /// Pointer motion.
    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, Vector2::new(x, y), 0)
    }

    /// Primary-button release.
    pub fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, Vector2::new(x, y), 0)
    }

    pub fn with_pointer(mut self, pointer_id: PointerId) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Whether this event may start or finish a gesture.
    ///
    /// Moves carry no meaningful button, so they always qualify.
    pub fn is_primary(&self) -> bool {
        self.kind == PointerEventKind::Move || self.button == PointerButton::Primary
    }
}
