//! Nodes: the authoritative source of every derived shape attribute.

use super::attributes::{AttrValue, AttributeMap, NodeAttr};
use crate::geometry::Vector2;
use crate::shapes::{SerializableColor, ShapeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for nodes.
pub type NodeId = Uuid;

/// One user thought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    pub position: Vector2,
    pub color: SerializableColor,
    #[serde(default)]
    pub text: String,
    /// Next position on the placement spiral around this node.
    #[serde(default)]
    pub spiral_step: u32,
    /// Shapes whose attributes this node drives.
    #[serde(default)]
    pub dependents: HashMap<ShapeId, AttributeMap>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Current value of a node attribute.
    pub fn attr(&self, attr: NodeAttr) -> AttrValue {
        match attr {
            NodeAttr::X => AttrValue::Number(self.position.x),
            NodeAttr::Y => AttrValue::Number(self.position.y),
            NodeAttr::Color => AttrValue::Color(self.color),
            NodeAttr::Text => AttrValue::Text(self.text.clone()),
        }
    }

    pub fn has_dependent(&self, shape: ShapeId) -> bool {
        self.dependents.contains_key(&shape)
    }
}

/// Initial values for [`Graph::create_node`](super::Graph::create_node).
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInit {
    /// Use this id instead of allocating a fresh one.
    pub id: Option<NodeId>,
    pub position: Vector2,
    pub color: SerializableColor,
    pub text: String,
    pub spiral_step: u32,
    pub dependents: HashMap<ShapeId, AttributeMap>,
}

impl NodeInit {
    pub fn new(position: Vector2, color: SerializableColor) -> Self {
        Self {
            id: None,
            position,
            color,
            text: String::new(),
            spiral_step: 0,
            dependents: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_spiral_step(mut self, step: u32) -> Self {
        self.spiral_step = step;
        self
    }

    pub fn with_dependent(mut self, shape: ShapeId, map: AttributeMap) -> Self {
        self.dependents.insert(shape, map);
        self
    }

    pub(crate) fn into_node(self, id: NodeId) -> Node {
        Node {
            id,
            position: self.position,
            color: self.color,
            text: self.text,
            spiral_step: self.spiral_step,
            dependents: self.dependents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_attrs() {
        let node = NodeInit::new(Vector2::new(3.0, 4.0), SerializableColor::white())
            .with_text("idea")
            .into_node(Uuid::new_v4());
        assert_eq!(node.attr(NodeAttr::X), AttrValue::Number(3.0));
        assert_eq!(node.attr(NodeAttr::Y), AttrValue::Number(4.0));
        assert_eq!(
            node.attr(NodeAttr::Color),
            AttrValue::Color(SerializableColor::white())
        );
        assert_eq!(node.attr(NodeAttr::Text), AttrValue::Text("idea".into()));
        assert!(node.dependents.is_empty());
    }
}
