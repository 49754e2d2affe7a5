//! Thoughtmesh Core Library
//!
//! Platform-agnostic interaction engine for the thoughtmesh mind-mapping
//! canvas: geometry, gesture recognition, the node/shape dependency graph,
//! gesture-driven mutations and frame-driven effects.

pub mod animation;
pub mod camera;
pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod gesture;
pub mod graph;
pub mod input;
pub mod mutation;
pub mod shapes;

pub use animation::{Effect, EffectId, EffectStatus, Frame, Scheduler};
pub use camera::Camera;
pub use canvas::{Canvas, Scene};
pub use color::position_color;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use events::{CutMode, EngineEvent};
pub use geometry::{Box2, Vector2};
pub use gesture::{GestureConfig, GestureEvent, GestureKind, GesturePhase, GestureState};
pub use graph::{Graph, Node, NodeId, NodeInit};
pub use input::{PointerButton, PointerEvent, PointerEventKind, PointerId};
pub use shapes::{
    Jot, JotKind, Line, LineType, Pop, SerializableColor, Shape, ShapeId, ShapeKind, ShapeTrait,
    Tap, TapState,
};
