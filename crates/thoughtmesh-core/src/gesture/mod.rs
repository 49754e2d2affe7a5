//! Gesture recognition: turns raw pointer events into semantic gestures.
//!
//! Each pointer interaction owns one [`GestureState`], configured per target
//! by a [`GestureConfig`]. The recognizer classifies a down/move/up stream
//! into exactly one outcome:
//!
//! - **Tap**: `singleDown`, `singleUp`, `tap`
//! - **Double tap**: `doubleDown`, `doubleUp`, `taptap`
//! - **Long press**: `longDown`, `longUp`
//! - **Drag**: `dragStart`, `dragMove`..., `dragEnd`
//!
//! Motion that stays within the drift threshold of the initial press emits
//! `dragDrift` and never starts a drag.

mod config;
mod recognizer;

pub use config::{
    DEFAULT_DOUBLE_PRESS_MS, DEFAULT_LONG_PRESS_MS, DEFAULT_MAX_DRIFT, DEFAULT_SHORT_PRESS_MS,
    GestureConfig,
};
pub use recognizer::{GestureEvent, GestureKind, GesturePhase, GestureState};
