//! Line shape: the connection between two nodes.

use super::{SerializableColor, ShapeId, ShapeTrait, write_number};
use crate::error::{EngineError, EngineResult};
use crate::geometry::{Box2, Vector2, distance_to_segment};
use crate::graph::{AttrValue, NodeId, ShapeAttr};
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Strength of a connection.
///
/// A bump promotes straight to `strong` and a cut demotes straight to
/// `deleted`. `disabled` is only entered or left by an explicit toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Short,
    Strong,
    Deleted,
    Disabled,
}

impl LineType {
    /// `deleted` and `short` become `strong`; anything else is unchanged.
    pub fn promote(self) -> LineType {
        match self {
            LineType::Deleted | LineType::Short => LineType::Strong,
            other => other,
        }
    }

    /// `strong` and `short` become `deleted`; anything else is unchanged.
    pub fn demote(self) -> LineType {
        match self {
            LineType::Strong | LineType::Short => LineType::Deleted,
            other => other,
        }
    }

    /// Whether a bump may promote this line.
    pub fn is_bumpable(self) -> bool {
        matches!(self, LineType::Short | LineType::Deleted)
    }

    /// Drawn and hit-testable.
    pub fn is_visible(self) -> bool {
        !matches!(self, LineType::Deleted)
    }
}

impl FromStr for LineType {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s {
            "short" => Ok(LineType::Short),
            "strong" => Ok(LineType::Strong),
            "deleted" => Ok(LineType::Deleted),
            "disabled" => Ok(LineType::Disabled),
            other => Err(EngineError::UnknownLineType(other.to_string())),
        }
    }
}

/// A connection drawn between two nodes. Endpoint 1 follows node 1 and
/// endpoint 2 follows node 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ShapeId,
    pub connected_node_id1: NodeId,
    pub connected_node_id2: NodeId,
    #[serde(default)]
    pub line_type: LineType,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default)]
    pub selected: bool,
    /// Bump hysteresis latch: cleared by a bump, re-armed once the nodes
    /// separate past the outer threshold.
    #[serde(default = "default_can_bump")]
    pub can_bump: bool,
    /// Last computed break rate in `[0, 1]` while a cut passes nearby.
    #[serde(default)]
    pub break_rate: f64,
    /// Progress of the breaking animation in `[0, 1]`, `None` when intact.
    #[serde(default)]
    pub breaking: Option<f64>,
}

fn default_can_bump() -> bool {
    true
}

impl Line {
    /// Create a short line between two nodes at their current positions.
    pub fn new(node1: NodeId, start: Vector2, node2: NodeId, end: Vector2) -> Self {
        Self {
            id: Uuid::new_v4(),
            connected_node_id1: node1,
            connected_node_id2: node2,
            line_type: LineType::Short,
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            selected: false,
            can_bump: true,
            break_rate: 0.0,
            breaking: None,
        }
    }

    pub fn start(&self) -> Vector2 {
        Vector2::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Vector2 {
        Vector2::new(self.x2, self.y2)
    }

    pub fn connects(&self, node: NodeId) -> bool {
        self.connected_node_id1 == node || self.connected_node_id2 == node
    }

    /// The node at the opposite end from `node`, `None` if `node` is not an
    /// endpoint.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if self.connected_node_id1 == node {
            Some(self.connected_node_id2)
        } else if self.connected_node_id2 == node {
            Some(self.connected_node_id1)
        } else {
            None
        }
    }

    pub fn distance_to(&self, point: Vector2) -> f64 {
        distance_to_segment(point, self.start(), self.end())
    }

    /// Renderer hint: the line's color.
    pub fn color(&self) -> SerializableColor {
        match self.line_type {
            LineType::Strong => SerializableColor::black(),
            LineType::Short => SerializableColor::new(0x80, 0x80, 0x80, 0xff),
            LineType::Disabled => SerializableColor::new(0xc0, 0xc0, 0xc0, 0x80),
            LineType::Deleted => SerializableColor::new(0, 0, 0, 0),
        }
    }
}

impl ShapeTrait for Line {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Box2 {
        Box2::from_points([self.start(), self.end()])
    }

    fn hit_test(&self, point: Vector2, tolerance: f64) -> bool {
        self.line_type.is_visible() && self.distance_to(point) <= tolerance
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        if !self.line_type.is_visible() || self.start() == self.end() {
            return path;
        }
        match self.breaking {
            // A breaking line is drawn as two stubs receding from a gap in
            // the middle.
            Some(progress) if progress > 0.0 => {
                let half = (1.0 - progress.clamp(0.0, 1.0)) * 0.5;
                path.move_to(Point::from(self.start()));
                path.line_to(Point::from(self.start().lerp(self.end(), half)));
                path.move_to(Point::from(self.end().lerp(self.start(), half)));
                path.line_to(Point::from(self.end()));
            }
            _ => {
                path.move_to(Point::new(self.x1, self.y1));
                path.line_to(Point::new(self.x2, self.y2));
            }
        }
        path
    }

    fn attr(&self, attr: ShapeAttr) -> Option<AttrValue> {
        match attr {
            ShapeAttr::X1 => Some(AttrValue::Number(self.x1)),
            ShapeAttr::Y1 => Some(AttrValue::Number(self.y1)),
            ShapeAttr::X2 => Some(AttrValue::Number(self.x2)),
            ShapeAttr::Y2 => Some(AttrValue::Number(self.y2)),
            ShapeAttr::Color => Some(AttrValue::Color(self.color())),
            _ => None,
        }
    }

    /// Color is derived from the line type and cannot be written.
    fn set_attr(&mut self, attr: ShapeAttr, value: &AttrValue) -> bool {
        match attr {
            ShapeAttr::X1 => write_number(&mut self.x1, value),
            ShapeAttr::Y1 => write_number(&mut self.y1, value),
            ShapeAttr::X2 => write_number(&mut self.x2, value),
            ShapeAttr::Y2 => write_number(&mut self.y2, value),
            _ => false,
        }
    }
}
