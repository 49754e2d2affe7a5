//! Node/shape dependency graph.
//!
//! Nodes own their dependents: each node maps shape ids to the shape
//! attributes it drives. [`Graph::apply_all`] copies node attributes into
//! those shapes in a single pass. Shapes never point back at nodes through
//! the dependency maps, so there are no cycles and no fixed-point iteration.
//!
//! A line is the one edge record between two nodes. Both endpoint nodes hold
//! a dependent entry for the same line id, and the line names both nodes.

mod attributes;
mod node;

pub use attributes::{
    AttrValue, AttributeMap, NodeAttr, ShapeAttr, controller_map, line_end_map, line_start_map,
    parse_attribute_map,
};
pub use node::{Node, NodeId, NodeInit};

use crate::error::{EngineError, EngineResult};
use crate::geometry::{Box2, Vector2};
use crate::shapes::{Jot, Line, Shape, ShapeId};
use std::collections::HashMap;
use uuid::Uuid;

/// All nodes and shapes of one canvas.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    /// Insertion order of nodes.
    node_order: Vec<NodeId>,
    shapes: HashMap<ShapeId, Shape>,
    /// Insertion order of shapes (back to front).
    z_order: Vec<ShapeId>,
    /// Creation sequence of each live shape, for ordering per-node lookups
    /// without scanning `z_order`.
    seq: HashMap<ShapeId, u64>,
    next_seq: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new node. Every dependent in `init` must reference a live
    /// shape.
    pub fn create_node(&mut self, init: NodeInit) -> EngineResult<NodeId> {
        let id = init.id.unwrap_or_else(Uuid::new_v4);
        if self.nodes.contains_key(&id) {
            return Err(EngineError::DuplicateNode(id));
        }
        if let Some(missing) = init.dependents.keys().find(|s| !self.shapes.contains_key(*s)) {
            return Err(EngineError::ShapeNotFound(*missing));
        }
        self.nodes.insert(id, init.into_node(id));
        self.node_order.push(id);
        log::trace!("Created node {id}");
        Ok(id)
    }

    /// Store a new shape on top of the z-order.
    pub fn create_shape(&mut self, shape: Shape) -> EngineResult<ShapeId> {
        let id = shape.id();
        if self.shapes.contains_key(&id) {
            return Err(EngineError::DuplicateShape(id));
        }
        self.shapes.insert(id, shape);
        self.z_order.push(id);
        self.seq.insert(id, self.next_seq);
        self.next_seq += 1;
        Ok(id)
    }

    /// Make `node` drive the attributes of `shape` named in `map`. Replaces
    /// any existing map for the same pair.
    pub fn link_dependent(
        &mut self,
        node: NodeId,
        shape: ShapeId,
        map: AttributeMap,
    ) -> EngineResult<()> {
        if !self.shapes.contains_key(&shape) {
            return Err(EngineError::ShapeNotFound(shape));
        }
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or(EngineError::NodeNotFound(node))?;
        entry.dependents.insert(shape, map);
        Ok(())
    }

    /// Drop the link from `node` to `shape`. Returns whether a link existed.
    pub fn unlink_dependent(&mut self, node: NodeId, shape: ShapeId) -> EngineResult<bool> {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or(EngineError::NodeNotFound(node))?;
        Ok(entry.dependents.remove(&shape).is_some())
    }

    /// Copy every node attribute into the shapes that depend on it.
    ///
    /// Dependents whose shape is already gone are skipped. Returns the number
    /// of attribute writes performed.
    pub fn apply_all(&mut self) -> usize {
        let mut writes = 0;
        for id in &self.node_order {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            for (shape_id, map) in &node.dependents {
                let Some(shape) = self.shapes.get_mut(shape_id) else {
                    log::trace!("Skipping dangling dependent {shape_id} of node {id}");
                    continue;
                };
                for (&from, &to) in map {
                    if shape.set_attr(to, &node.attr(from)) {
                        writes += 1;
                    }
                }
            }
        }
        writes
    }

    /// Delete a node with every shape it drives. Lines also lose their
    /// reciprocal entry on the node at the other end. Returns whether the
    /// node existed.
    pub fn remove_node_cascade(&mut self, id: NodeId) -> bool {
        self.take_node_cascade(id).is_some()
    }

    /// Like [`remove_node_cascade`](Self::remove_node_cascade), returning the
    /// removed node.
    pub fn take_node_cascade(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.node_order.retain(|&n| n != id);
        for shape_id in node.dependents.keys() {
            self.seq.remove(shape_id);
            let Some(shape) = self.shapes.remove(shape_id) else {
                continue;
            };
            let other = shape.as_line().and_then(|line| line.other_end(id));
            if let Some(other_node) = other.and_then(|n| self.nodes.get_mut(&n)) {
                other_node.dependents.remove(shape_id);
            }
        }
        // One pass over the z-order for the whole cascade.
        self.z_order.retain(|s| !node.dependents.contains_key(s));
        log::debug!(
            "Removed node {id} with {} dependents",
            node.dependents.len()
        );
        Some(node)
    }

    /// Delete a shape only. Dependent links pointing at it are left alone.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let shape = self.shapes.remove(&id)?;
        self.seq.remove(&id);
        self.z_order.retain(|&s| s != id);
        Some(shape)
    }

    /// Create a short line from `a` to `b` and link both endpoints to it.
    pub fn connect_nodes_with_line(&mut self, a: NodeId, b: NodeId) -> EngineResult<ShapeId> {
        if a == b {
            return Err(EngineError::SelfConnection(a));
        }
        let start = self.node(a).ok_or(EngineError::NodeNotFound(a))?.position;
        let end = self.node(b).ok_or(EngineError::NodeNotFound(b))?.position;
        let line = self.create_shape(Shape::Line(Line::new(a, start, b, end)))?;
        self.link_dependent(a, line, line_start_map())?;
        self.link_dependent(b, line, line_end_map())?;
        Ok(line)
    }

    /// First node, in insertion order, within `radius` of `point`.
    pub fn find_node_near(&self, point: Vector2, radius: f64) -> Option<NodeId> {
        self.nodes_ordered()
            .find(|n| n.position.distance_to(point) <= radius)
            .map(|n| n.id)
    }

    pub fn set_node_position(&mut self, id: NodeId, position: Vector2) -> EngineResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(EngineError::NodeNotFound(id))?;
        node.position = position;
        Ok(())
    }

    /// Replace a node's text. The controlling jot picks up the new text and
    /// outline immediately.
    pub fn set_node_text(&mut self, id: NodeId, text: &str) -> EngineResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(EngineError::NodeNotFound(id))?;
        node.text = text.to_string();
        if let Some(jot) = self.controller_of(id).and_then(|j| self.jot_mut(j)) {
            jot.set_text(text);
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    pub fn line(&self, id: ShapeId) -> Option<&Line> {
        self.shapes.get(&id).and_then(Shape::as_line)
    }

    pub fn line_mut(&mut self, id: ShapeId) -> Option<&mut Line> {
        self.shapes.get_mut(&id).and_then(Shape::as_line_mut)
    }

    pub fn jot(&self, id: ShapeId) -> Option<&Jot> {
        self.shapes.get(&id).and_then(Shape::as_jot)
    }

    pub fn jot_mut(&mut self, id: ShapeId) -> Option<&mut Jot> {
        self.shapes.get_mut(&id).and_then(Shape::as_jot_mut)
    }

    /// Lines touching `node`, back to front.
    pub fn lines_of(&self, node: NodeId) -> Vec<ShapeId> {
        let Some(entry) = self.nodes.get(&node) else {
            return Vec::new();
        };
        let mut lines: Vec<ShapeId> = entry
            .dependents
            .keys()
            .copied()
            .filter(|id| self.line(*id).is_some_and(|l| l.connects(node)))
            .collect();
        lines.sort_by_key(|id| self.seq.get(id).copied().unwrap_or(u64::MAX));
        lines
    }

    /// The line joining `a` and `b`, if any.
    pub fn line_between(&self, a: NodeId, b: NodeId) -> Option<ShapeId> {
        self.lines_of(a)
            .into_iter()
            .find(|id| self.line(*id).is_some_and(|l| l.other_end(a) == Some(b)))
    }

    /// The jot controlling `node`.
    pub fn controller_of(&self, node: NodeId) -> Option<ShapeId> {
        let entry = self.nodes.get(&node)?;
        entry
            .dependents
            .keys()
            .copied()
            .filter(|id| self.jot(*id).is_some_and(|j| j.controls_node_id == node))
            .min_by_key(|id| self.seq.get(id).copied().unwrap_or(u64::MAX))
    }

    /// The node at the far end of `line` from `node`.
    pub fn other_end(&self, line: ShapeId, node: NodeId) -> Option<NodeId> {
        self.line(line)?.other_end(node)
    }

    /// Nodes in insertion order.
    pub fn nodes_ordered(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Shapes hit at a point, front to back.
    pub fn shapes_at_point(&self, point: Vector2, tolerance: f64) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .filter(|id| {
                self.shapes
                    .get(id)
                    .is_some_and(|s| s.hit_test(point, tolerance))
            })
            .collect()
    }

    /// Union of all shape bounds.
    pub fn bounds(&self) -> Box2 {
        self.shapes_ordered()
            .fold(Box2::EMPTY, |acc, s| acc.union(&s.bounds()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn line_count(&self) -> usize {
        self.shapes.values().filter(|s| s.is_line()).count()
    }

    pub fn jot_count(&self) -> usize {
        self.shapes
            .values()
            .filter(|s| s.as_jot().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.shapes.is_empty()
    }

    /// Check the link invariants: every dependent references a live shape,
    /// and every line's endpoint nodes exist and link back to it.
    pub fn validate(&self) -> EngineResult<()> {
        for node in self.nodes_ordered() {
            if let Some(missing) = node.dependents.keys().find(|s| !self.shapes.contains_key(*s)) {
                return Err(EngineError::BrokenLink {
                    node: node.id,
                    shape: *missing,
                });
            }
        }
        for shape in self.shapes_ordered() {
            let Some(line) = shape.as_line() else {
                continue;
            };
            for end in [line.connected_node_id1, line.connected_node_id2] {
                let node = self.node(end).ok_or(EngineError::NodeNotFound(end))?;
                if !node.has_dependent(line.id) {
                    return Err(EngineError::BrokenLink {
                        node: end,
                        shape: line.id,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{JotKind, LineType, Pop, SerializableColor};

    fn add_node(graph: &mut Graph, x: f64, y: f64) -> NodeId {
        let id = graph
            .create_node(NodeInit::new(Vector2::new(x, y), SerializableColor::black()))
            .unwrap();
        let jot = graph
            .create_shape(Shape::Jot(Jot::new(
                id,
                Vector2::new(x, y),
                40.0,
                SerializableColor::black(),
            )))
            .unwrap();
        graph.link_dependent(id, jot, controller_map()).unwrap();
        let others: Vec<NodeId> = graph
            .nodes_ordered()
            .map(|n| n.id)
            .filter(|&n| n != id)
            .collect();
        for other in others {
            graph.connect_nodes_with_line(other, id).unwrap();
        }
        id
    }

    #[test]
    fn test_full_connectivity() {
        let mut graph = Graph::new();
        for i in 0..5 {
            add_node(&mut graph, i as f64 * 100.0, 0.0);
        }
        assert_eq!(graph.line_count(), 10);
        assert_eq!(graph.jot_count(), 5);
        graph.validate().unwrap();
    }

    #[test]
    fn test_remove_node_cascade() {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = (0..4)
            .map(|i| add_node(&mut graph, i as f64 * 50.0, 0.0))
            .collect();
        assert!(graph.remove_node_cascade(ids[1]));
        assert_eq!(graph.line_count(), 3);
        assert_eq!(graph.jot_count(), 3);
        for id in [ids[0], ids[2], ids[3]] {
            assert_eq!(graph.node(id).unwrap().dependents.len(), 3);
        }
        graph.validate().unwrap();
        assert!(!graph.remove_node_cascade(ids[1]));
    }

    #[test]
    fn test_cascade_keeps_z_order_and_line_order() {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = (0..12)
            .map(|i| add_node(&mut graph, i as f64 * 40.0, 0.0))
            .collect();
        for id in [ids[3], ids[7], ids[0]] {
            assert!(graph.remove_node_cascade(id));
        }
        assert_eq!(graph.shapes_ordered().count(), graph.shape_count());
        assert_eq!(graph.line_count(), 36);
        graph.validate().unwrap();

        let survivor = ids[5];
        let lines = graph.lines_of(survivor);
        assert_eq!(lines.len(), 8);
        let z: Vec<ShapeId> = graph
            .shapes_ordered()
            .map(|s| s.id())
            .filter(|s| lines.contains(s))
            .collect();
        assert_eq!(lines, z);
        let ends: Vec<NodeId> = lines
            .iter()
            .filter_map(|l| graph.other_end(*l, survivor))
            .collect();
        assert_eq!(
            ends,
            vec![ids[1], ids[2], ids[4], ids[6], ids[8], ids[9], ids[10], ids[11]]
        );
        let jot = graph.controller_of(survivor).unwrap();
        assert_eq!(graph.jot(jot).unwrap().controls_node_id, survivor);
    }

    #[test]
    fn test_apply_all_propagates_positions() {
        let mut graph = Graph::new();
        let a = add_node(&mut graph, 0.0, 0.0);
        let b = add_node(&mut graph, 100.0, 0.0);
        let line = graph.line_between(a, b).unwrap();
        graph.set_node_position(b, Vector2::new(10.0, 20.0)).unwrap();
        let writes = graph.apply_all();
        assert!(writes > 0);
        let l = graph.line(line).unwrap();
        assert_eq!(l.connected_node_id2, b);
        assert!((l.x2 - 10.0).abs() < f64::EPSILON);
        assert!((l.y2 - 20.0).abs() < f64::EPSILON);
        let jot = graph.jot(graph.controller_of(b).unwrap()).unwrap();
        assert!((jot.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_all_idempotent() {
        let mut graph = Graph::new();
        add_node(&mut graph, 0.0, 0.0);
        add_node(&mut graph, 30.0, 40.0);
        graph.apply_all();
        let first: Vec<Shape> = graph.shapes_ordered().cloned().collect();
        graph.apply_all();
        let second: Vec<Shape> = graph.shapes_ordered().cloned().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_apply_all_skips_dangling() {
        let mut graph = Graph::new();
        let a = add_node(&mut graph, 0.0, 0.0);
        let jot = graph.controller_of(a).unwrap();
        graph.remove_shape(jot);
        assert!(graph.node(a).unwrap().has_dependent(jot));
        graph.apply_all();
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_missing_ids_leave_graph_untouched() {
        let mut graph = Graph::new();
        let a = add_node(&mut graph, 0.0, 0.0);
        let ghost = Uuid::new_v4();
        assert!(matches!(
            graph.connect_nodes_with_line(a, ghost),
            Err(EngineError::NodeNotFound(id)) if id == ghost
        ));
        assert!(matches!(
            graph.link_dependent(ghost, graph.controller_of(a).unwrap(), controller_map()),
            Err(EngineError::NodeNotFound(_))
        ));
        assert!(matches!(
            graph.link_dependent(a, ghost, controller_map()),
            Err(EngineError::ShapeNotFound(_))
        ));
        assert!(matches!(
            graph.connect_nodes_with_line(a, a),
            Err(EngineError::SelfConnection(_))
        ));
        assert_eq!(graph.shape_count(), 1);
        assert_eq!(graph.node(a).unwrap().dependents.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut graph = Graph::new();
        let a = add_node(&mut graph, 0.0, 0.0);
        let init = NodeInit::new(Vector2::ZERO, SerializableColor::black()).with_id(a);
        assert!(matches!(
            graph.create_node(init),
            Err(EngineError::DuplicateNode(_))
        ));
        let pop = Pop::new(Vector2::ZERO, SerializableColor::black());
        graph.create_shape(Shape::Pop(pop.clone())).unwrap();
        assert!(matches!(
            graph.create_shape(Shape::Pop(pop)),
            Err(EngineError::DuplicateShape(_))
        ));
    }

    #[test]
    fn test_find_node_near_uses_insertion_order() {
        let mut graph = Graph::new();
        let a = add_node(&mut graph, 0.0, 0.0);
        let b = add_node(&mut graph, 5.0, 0.0);
        assert_eq!(graph.find_node_near(Vector2::new(4.0, 0.0), 10.0), Some(a));
        assert_eq!(graph.find_node_near(Vector2::new(14.0, 0.0), 10.0), Some(b));
        assert_eq!(graph.find_node_near(Vector2::new(100.0, 0.0), 10.0), None);
    }

    #[test]
    fn test_set_node_text_updates_controller() {
        let mut graph = Graph::new();
        let a = add_node(&mut graph, 0.0, 0.0);
        graph.set_node_text(a, "buy milk").unwrap();
        let jot = graph.jot(graph.controller_of(a).unwrap()).unwrap();
        assert_eq!(jot.kind, JotKind::Pill);
        assert_eq!(jot.text, "buy milk");
    }

    #[test]
    fn test_lines_of_and_other_end() {
        let mut graph = Graph::new();
        let a = add_node(&mut graph, 0.0, 0.0);
        let b = add_node(&mut graph, 10.0, 0.0);
        let c = add_node(&mut graph, 20.0, 0.0);
        let lines = graph.lines_of(b);
        assert_eq!(lines.len(), 2);
        let ends: Vec<NodeId> = lines
            .iter()
            .filter_map(|l| graph.other_end(*l, b))
            .collect();
        assert_eq!(ends, vec![a, c]);
        assert_eq!(graph.line(lines[0]).unwrap().line_type, LineType::Short);
    }

    #[test]
    fn test_shapes_at_point_front_to_back() {
        let mut graph = Graph::new();
        let a = add_node(&mut graph, 0.0, 0.0);
        let b = add_node(&mut graph, 100.0, 0.0);
        let hits = graph.shapes_at_point(Vector2::new(0.0, 0.0), 1.0);
        // The line from a to b was created last, so it is on top.
        assert_eq!(hits[0], graph.line_between(a, b).unwrap());
        assert_eq!(hits[1], graph.controller_of(a).unwrap());
    }
}
