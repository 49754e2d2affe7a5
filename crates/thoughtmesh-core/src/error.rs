//! Engine error types.

use crate::graph::NodeId;
use crate::shapes::{ShapeId, ShapeKind};
use thiserror::Error;

/// Errors raised by graph operations, kind parsing and configuration.
///
/// Graph operations check every id before touching any state, so an `Err`
/// always means the graph is exactly as it was before the call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("Node already exists: {0}")]
    DuplicateNode(NodeId),
    #[error("Shape already exists: {0}")]
    DuplicateShape(ShapeId),
    #[error("Cannot connect node {0} to itself")]
    SelfConnection(NodeId),
    #[error("Link between node {node} and shape {shape} is not reciprocal")]
    BrokenLink { node: NodeId, shape: ShapeId },
    #[error("Shape {0} is not a line")]
    NotALine(ShapeId),
    #[error("Unknown shape kind: {0}")]
    UnknownShapeKind(String),
    #[error("{0:?} shapes are bound to nodes and cannot be spawned on their own")]
    NotTransient(ShapeKind),
    #[error("Unknown jot kind: {0}")]
    UnknownJotKind(String),
    #[error("Unknown line type: {0}")]
    UnknownLineType(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
