//! Semantic events published by the canvas and accepted back as commands.

use crate::graph::NodeId;
use crate::shapes::{LineType, ShapeId};
use serde::{Deserialize, Serialize};

/// What a press on the empty canvas does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutMode {
    /// Tap creates nodes, drag pans.
    #[default]
    Create,
    /// Drag cuts through lines.
    Cut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EngineEvent {
    NodeMoved { node_id: NodeId, x: f64, y: f64 },
    CreateNode { node_id: NodeId },
    DestroyNode { node_id: NodeId },
    SelectLine { shape_id: ShapeId },
    Bump { shape_id: ShapeId, line_type: LineType },
    DeleteLine { shape_id: ShapeId },
    SetCutMode { mode: CutMode },
}
