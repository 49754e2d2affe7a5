//! Gesture-driven graph mutations.
//!
//! Each operation validates the ids it needs before writing, so a failed
//! call leaves the graph as it was.

use crate::color::position_color;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::geometry::{Vector2, distance_to_segment, segments_intersect};
use crate::graph::{Graph, NodeId, NodeInit, controller_map};
use crate::shapes::{Jot, Line, LineType, SerializableColor, Shape, ShapeId};

/// What is left of a destroyed node, for spawning its burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestroyedNode {
    pub id: NodeId,
    pub position: Vector2,
    pub color: SerializableColor,
}

/// Result of evaluating bumps for a dragged node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BumpOutcome {
    /// Lines promoted to strong.
    pub bumped: Vec<ShapeId>,
    /// Other short lines of the dragged node demoted to deleted.
    pub demoted: Vec<ShapeId>,
    /// Jots flagged to shake.
    pub shaken: Vec<ShapeId>,
}

impl BumpOutcome {
    pub fn is_empty(&self) -> bool {
        self.bumped.is_empty()
    }
}

/// Create a node at `point` with its controlling jot and a line to every
/// existing node.
///
/// Color resolution: `color` if given, else the color of an existing node
/// within the snap radius, else the color of the position itself.
pub fn create_node_at(
    graph: &mut Graph,
    config: &EngineConfig,
    point: Vector2,
    color: Option<SerializableColor>,
) -> EngineResult<NodeId> {
    let color = color
        .or_else(|| {
            graph
                .find_node_near(point, config.color_snap_radius)
                .and_then(|id| graph.node(id))
                .map(|n| n.color)
        })
        .unwrap_or_else(|| position_color(point));
    insert_node(graph, config, point, color, config.spiral_initial)
}

fn insert_node(
    graph: &mut Graph,
    config: &EngineConfig,
    point: Vector2,
    color: SerializableColor,
    spiral_step: u32,
) -> EngineResult<NodeId> {
    let existing: Vec<NodeId> = graph.nodes_ordered().map(|n| n.id()).collect();
    let id = graph.create_node(NodeInit::new(point, color).with_spiral_step(spiral_step))?;
    let jot = graph.create_shape(Shape::Jot(Jot::new(id, point, config.orb_size, color)))?;
    graph.link_dependent(id, jot, controller_map())?;
    for other in existing {
        graph.connect_nodes_with_line(other, id)?;
    }
    log::debug!("Created node {id} at ({:.1}, {:.1})", point.x, point.y);
    Ok(id)
}

/// Point `step` on the placement spiral around `center`.
pub fn spiral_point(center: Vector2, step: u32, radius: f64) -> Vector2 {
    let r = std::f64::consts::SQRT_2 * f64::from(step).sqrt();
    Vector2::new(center.x + r.cos() * radius, center.y + r.sin() * radius)
}

/// Create a node on the spiral around `origin`, sharing its color.
///
/// The new node's step is the origin's plus the addend; the origin advances
/// further so repeated placements fan outward.
pub fn create_node_around(
    graph: &mut Graph,
    config: &EngineConfig,
    origin: NodeId,
) -> EngineResult<NodeId> {
    let node = graph.node(origin).ok_or(EngineError::NodeNotFound(origin))?;
    let step = node.spiral_step;
    let point = spiral_point(node.position, step, config.spiral_radius);
    let color = node.color;
    let id = insert_node(graph, config, point, color, step + config.spiral_addend)?;
    if let Some(origin_node) = graph.node_mut(origin) {
        origin_node.spiral_step = step + config.spiral_addend + config.spiral_origin_bump;
    }
    Ok(id)
}

/// Remove a node and everything it drives. `None` if it did not exist.
pub fn destroy_node(graph: &mut Graph, id: NodeId) -> Option<DestroyedNode> {
    let node = graph.take_node_cascade(id)?;
    Some(DestroyedNode {
        id,
        position: node.position,
        color: node.color,
    })
}

/// Move a node. Dependents follow on the next [`Graph::apply_all`].
pub fn move_node(graph: &mut Graph, id: NodeId, position: Vector2) -> EngineResult<()> {
    graph.set_node_position(id, position)
}

/// Promote a line, returning its new type.
pub fn promote_line(graph: &mut Graph, id: ShapeId) -> EngineResult<LineType> {
    let line = line_mut(graph, id)?;
    line.line_type = line.line_type.promote();
    if line.line_type == LineType::Strong {
        line.breaking = None;
        line.break_rate = 0.0;
    }
    Ok(line.line_type)
}

/// Demote a line, returning its new type.
pub fn demote_line(graph: &mut Graph, id: ShapeId) -> EngineResult<LineType> {
    let line = line_mut(graph, id)?;
    line.line_type = line.line_type.demote();
    Ok(line.line_type)
}

/// Force a line to `line_type`. Forcing `strong` also disarms the bump latch
/// and stops any break in progress.
pub fn set_line_type(graph: &mut Graph, id: ShapeId, line_type: LineType) -> EngineResult<()> {
    let line = line_mut(graph, id)?;
    line.line_type = line_type;
    if line_type == LineType::Strong {
        line.can_bump = false;
        line.breaking = None;
        line.break_rate = 0.0;
    }
    Ok(())
}

/// Evaluate bumps on every line of `initiator` against the hysteresis band.
///
/// A line bumps when its nodes are closer than the inner threshold, it is
/// short or deleted, and its latch is armed. Bumping clears the latch; it is
/// re-armed only once the nodes are farther apart than the outer threshold.
pub fn update_bumps(
    graph: &mut Graph,
    config: &EngineConfig,
    initiator: NodeId,
) -> EngineResult<BumpOutcome> {
    let origin = graph
        .node(initiator)
        .ok_or(EngineError::NodeNotFound(initiator))?
        .position;
    let (inner, outer) = (config.bump_inner(), config.bump_outer());
    let mut outcome = BumpOutcome::default();

    for line_id in graph.lines_of(initiator) {
        let Some(other) = graph
            .other_end(line_id, initiator)
            .and_then(|n| graph.node(n))
            .map(|n| n.position)
        else {
            continue;
        };
        let distance = origin.distance_to(other);
        let Some(line) = graph.line_mut(line_id) else {
            continue;
        };
        if line.can_bump && distance < inner && line.line_type.is_bumpable() {
            line.line_type = line.line_type.promote();
            line.can_bump = false;
            // A bump rescues a line that a cut had started to break.
            line.breaking = None;
            line.break_rate = 0.0;
            outcome.bumped.push(line_id);
        } else if !line.can_bump && distance > outer {
            line.can_bump = true;
            log::trace!("Re-armed bump on line {line_id}");
        }
    }

    if outcome.is_empty() {
        return Ok(outcome);
    }

    for line_id in graph.lines_of(initiator) {
        if outcome.bumped.contains(&line_id) {
            continue;
        }
        if let Some(line) = graph.line_mut(line_id) {
            if line.line_type == LineType::Short {
                line.line_type = line.line_type.demote();
                outcome.demoted.push(line_id);
            }
        }
    }

    let mut shaking_nodes = vec![initiator];
    for line_id in graph.lines_of(initiator) {
        let strong = graph
            .line(line_id)
            .is_some_and(|l| l.line_type == LineType::Strong);
        if let Some(other) = graph.other_end(line_id, initiator).filter(|_| strong) {
            shaking_nodes.push(other);
        }
    }
    for node in shaking_nodes {
        if let Some(jot_id) = graph.controller_of(node) {
            if let Some(jot) = graph.jot_mut(jot_id) {
                jot.shaking = true;
                outcome.shaken.push(jot_id);
            }
        }
    }

    log::debug!(
        "Bump from node {initiator}: {} promoted, {} demoted",
        outcome.bumped.len(),
        outcome.demoted.len()
    );
    Ok(outcome)
}

/// Break rate for a cut passing `distance` from a line: 0 at the cut radius,
/// 1 at the core, eased with a smoothstep in between.
pub fn break_rate(config: &EngineConfig, distance: f64) -> f64 {
    let closeness =
        ((config.cut_radius - distance) / (config.cut_radius - config.cut_core)).clamp(0.0, 1.0);
    closeness * closeness * (3.0 - 2.0 * closeness)
}

/// Apply a cut stroke from `from` to `to` to every intact line.
///
/// A stroke that crosses a line counts as distance 0. Returns the lines whose
/// break rate reached 1 during this stroke; they are marked as breaking.
pub fn cut_lines(
    graph: &mut Graph,
    config: &EngineConfig,
    from: Vector2,
    to: Vector2,
) -> Vec<ShapeId> {
    let candidates: Vec<ShapeId> = graph
        .shapes_ordered()
        .filter_map(Shape::as_line)
        .filter(|l| l.line_type.is_visible() && l.breaking.is_none())
        .map(|l| l.id)
        .collect();

    let mut broken = Vec::new();
    for id in candidates {
        let Some(line) = graph.line_mut(id) else {
            continue;
        };
        let distance = if segments_intersect(from, to, line.start(), line.end()) {
            0.0
        } else {
            distance_to_segment(to, line.start(), line.end())
        };
        line.break_rate = break_rate(config, distance);
        if line.break_rate >= 1.0 {
            line.breaking = Some(0.0);
            broken.push(id);
        }
    }
    broken
}

/// Turn a line into a deleted one. Returns whether anything changed.
pub fn delete_line(graph: &mut Graph, id: ShapeId) -> EngineResult<bool> {
    let line = line_mut(graph, id)?;
    let changed = line.line_type != LineType::Deleted;
    line.line_type = LineType::Deleted;
    line.selected = false;
    line.breaking = None;
    line.break_rate = 0.0;
    Ok(changed)
}

/// Select exactly one line.
pub fn select_line(graph: &mut Graph, id: ShapeId) -> EngineResult<()> {
    line_mut(graph, id)?;
    let lines: Vec<ShapeId> = graph
        .shapes_ordered()
        .filter_map(Shape::as_line)
        .map(|l| l.id)
        .collect();
    for line_id in lines {
        if let Some(line) = graph.line_mut(line_id) {
            line.selected = line_id == id;
        }
    }
    Ok(())
}

/// Flip a line between disabled and short, returning its new type.
pub fn toggle_line_disabled(graph: &mut Graph, id: ShapeId) -> EngineResult<LineType> {
    let line = line_mut(graph, id)?;
    line.line_type = match line.line_type {
        LineType::Disabled => LineType::Short,
        _ => LineType::Disabled,
    };
    Ok(line.line_type)
}

fn line_mut(graph: &mut Graph, id: ShapeId) -> EngineResult<&mut Line> {
    if graph.shape(id).is_none() {
        return Err(EngineError::ShapeNotFound(id));
    }
    graph.line_mut(id).ok_or(EngineError::NotALine(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_create_node_connects_to_all() {
        let mut graph = Graph::new();
        let cfg = config();
        for i in 0..4 {
            create_node_at(&mut graph, &cfg, Vector2::new(i as f64 * 200.0, 0.0), None).unwrap();
        }
        assert_eq!(graph.line_count(), 6);
        assert_eq!(graph.jot_count(), 4);
        graph.validate().unwrap();
    }

    #[test]
    fn test_color_resolution_order() {
        let mut graph = Graph::new();
        let cfg = config();
        let red = SerializableColor::new(255, 0, 0, 255);
        let a = create_node_at(&mut graph, &cfg, Vector2::new(0.0, 0.0), Some(red)).unwrap();
        assert_eq!(graph.node(a).unwrap().color, red);

        // Within the snap radius of `a`: inherits its color.
        let b = create_node_at(&mut graph, &cfg, Vector2::new(10.0, 0.0), None).unwrap();
        assert_eq!(graph.node(b).unwrap().color, red);

        // Far away: color from the position.
        let far = Vector2::new(900.0, 900.0);
        let c = create_node_at(&mut graph, &cfg, far, None).unwrap();
        assert_eq!(graph.node(c).unwrap().color, position_color(far));
    }

    #[test]
    fn test_spiral_placement_scenario() {
        let mut graph = Graph::new();
        let cfg = config();
        let a = create_node_at(&mut graph, &cfg, Vector2::ZERO, None).unwrap();
        assert_eq!(graph.node(a).unwrap().spiral_step, 2);
        let b = create_node_around(&mut graph, &cfg, a).unwrap();

        let r = 2f64.sqrt() * 2f64.sqrt();
        let pos = graph.node(b).unwrap().position;
        assert!((pos.x - r.cos() * 150.0).abs() < 1e-9);
        assert!((pos.y - r.sin() * 150.0).abs() < 1e-9);
        assert_eq!(graph.node(a).unwrap().spiral_step, 10);
        assert_eq!(graph.node(b).unwrap().spiral_step, 5);
        assert!(graph.line_between(a, b).is_some());
    }

    #[test]
    fn test_spiral_fans_out() {
        let mut graph = Graph::new();
        let cfg = config();
        let a = create_node_at(&mut graph, &cfg, Vector2::ZERO, None).unwrap();
        let b = create_node_around(&mut graph, &cfg, a).unwrap();
        let c = create_node_around(&mut graph, &cfg, a).unwrap();
        let pb = graph.node(b).unwrap().position;
        let pc = graph.node(c).unwrap().position;
        assert!(pb.distance_to(pc) > 1.0);
        assert!(create_node_around(&mut graph, &cfg, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_destroy_node() {
        let mut graph = Graph::new();
        let cfg = config();
        let a = create_node_at(&mut graph, &cfg, Vector2::new(5.0, 6.0), None).unwrap();
        create_node_at(&mut graph, &cfg, Vector2::new(500.0, 0.0), None).unwrap();
        let gone = destroy_node(&mut graph, a).unwrap();
        assert_eq!(gone.position, Vector2::new(5.0, 6.0));
        assert_eq!(graph.line_count(), 0);
        assert_eq!(graph.jot_count(), 1);
        assert!(destroy_node(&mut graph, a).is_none());
    }

    #[test]
    fn test_bump_hysteresis() {
        let mut graph = Graph::new();
        let cfg = config();
        let a = create_node_at(&mut graph, &cfg, Vector2::ZERO, None).unwrap();
        let b = create_node_at(&mut graph, &cfg, Vector2::new(200.0, 0.0), None).unwrap();
        let line = graph.line_between(a, b).unwrap();
        let inner = cfg.bump_inner();
        let outer = cfg.bump_outer();

        move_node(&mut graph, b, Vector2::new(inner - 1.0, 0.0)).unwrap();
        let first = update_bumps(&mut graph, &cfg, b).unwrap();
        assert_eq!(first.bumped, vec![line]);
        assert_eq!(graph.line(line).unwrap().line_type, LineType::Strong);

        // Cut back to deleted while still close: no re-bump inside the band.
        delete_line(&mut graph, line).unwrap();
        for x in [inner - 2.0, (inner + outer) / 2.0, outer - 0.5, inner - 1.0] {
            move_node(&mut graph, b, Vector2::new(x, 0.0)).unwrap();
            assert!(update_bumps(&mut graph, &cfg, b).unwrap().is_empty());
        }

        // Past the outer threshold re-arms, then coming back bumps again.
        move_node(&mut graph, b, Vector2::new(outer + 1.0, 0.0)).unwrap();
        assert!(update_bumps(&mut graph, &cfg, b).unwrap().is_empty());
        move_node(&mut graph, b, Vector2::new(inner - 1.0, 0.0)).unwrap();
        assert_eq!(update_bumps(&mut graph, &cfg, b).unwrap().bumped, vec![line]);
    }

    #[test]
    fn test_bump_side_effects() {
        let mut graph = Graph::new();
        let cfg = config();
        let a = create_node_at(&mut graph, &cfg, Vector2::ZERO, None).unwrap();
        let b = create_node_at(&mut graph, &cfg, Vector2::new(300.0, 0.0), None).unwrap();
        let c = create_node_at(&mut graph, &cfg, Vector2::new(0.0, 300.0), None).unwrap();
        let ab = graph.line_between(a, b).unwrap();
        let bc = graph.line_between(b, c).unwrap();
        let ac = graph.line_between(a, c).unwrap();

        move_node(&mut graph, b, Vector2::new(10.0, 0.0)).unwrap();
        let outcome = update_bumps(&mut graph, &cfg, b).unwrap();
        assert_eq!(outcome.bumped, vec![ab]);
        assert_eq!(outcome.demoted, vec![bc]);
        assert_eq!(graph.line(bc).unwrap().line_type, LineType::Deleted);
        // Lines not touching the dragged node are left alone.
        assert_eq!(graph.line(ac).unwrap().line_type, LineType::Short);

        let jot_a = graph.controller_of(a).unwrap();
        let jot_b = graph.controller_of(b).unwrap();
        assert!(outcome.shaken.contains(&jot_a) && outcome.shaken.contains(&jot_b));
        assert!(graph.jot(jot_b).unwrap().shaking);
        assert!(!graph.jot(graph.controller_of(c).unwrap()).unwrap().shaking);
    }

    #[test]
    fn test_break_rate_saturates_smoothly() {
        let cfg = config();
        assert_eq!(break_rate(&cfg, cfg.cut_radius + 1.0), 0.0);
        assert_eq!(break_rate(&cfg, cfg.cut_core), 1.0);
        assert_eq!(break_rate(&cfg, 0.0), 1.0);
        let mid = (cfg.cut_radius + cfg.cut_core) / 2.0;
        assert!((break_rate(&cfg, mid) - 0.5).abs() < 1e-9);
        // Eased: flatter than linear near the edge.
        let near_edge = cfg.cut_radius - (cfg.cut_radius - cfg.cut_core) * 0.1;
        assert!(break_rate(&cfg, near_edge) < 0.1);
    }

    #[test]
    fn test_cut_crossing_line_breaks_it() {
        let mut graph = Graph::new();
        let cfg = config();
        let a = create_node_at(&mut graph, &cfg, Vector2::ZERO, None).unwrap();
        let b = create_node_at(&mut graph, &cfg, Vector2::new(200.0, 0.0), None).unwrap();
        let line = graph.line_between(a, b).unwrap();

        let far = cut_lines(&mut graph, &cfg, Vector2::new(100.0, 200.0), Vector2::new(100.0, 100.0));
        assert!(far.is_empty());
        assert_eq!(graph.line(line).unwrap().break_rate, 0.0);

        let near = cut_lines(&mut graph, &cfg, Vector2::new(100.0, 100.0), Vector2::new(100.0, 20.0));
        assert!(near.is_empty());
        assert!(graph.line(line).unwrap().break_rate > 0.0);

        let crossing = cut_lines(&mut graph, &cfg, Vector2::new(100.0, 20.0), Vector2::new(100.0, -20.0));
        assert_eq!(crossing, vec![line]);
        assert_eq!(graph.line(line).unwrap().breaking, Some(0.0));
        // Already breaking: not reported twice.
        let again = cut_lines(&mut graph, &cfg, Vector2::new(100.0, -20.0), Vector2::new(100.0, 20.0));
        assert!(again.is_empty());
    }

    #[test]
    fn test_line_commands() {
        let mut graph = Graph::new();
        let cfg = config();
        let a = create_node_at(&mut graph, &cfg, Vector2::ZERO, None).unwrap();
        let b = create_node_at(&mut graph, &cfg, Vector2::new(200.0, 0.0), None).unwrap();
        let c = create_node_at(&mut graph, &cfg, Vector2::new(0.0, 200.0), None).unwrap();
        let ab = graph.line_between(a, b).unwrap();
        let ac = graph.line_between(a, c).unwrap();

        select_line(&mut graph, ab).unwrap();
        select_line(&mut graph, ac).unwrap();
        assert!(!graph.line(ab).unwrap().selected);
        assert!(graph.line(ac).unwrap().selected);

        assert_eq!(toggle_line_disabled(&mut graph, ab).unwrap(), LineType::Disabled);
        assert_eq!(toggle_line_disabled(&mut graph, ab).unwrap(), LineType::Short);

        assert!(delete_line(&mut graph, ab).unwrap());
        assert!(!delete_line(&mut graph, ab).unwrap());
        assert_eq!(promote_line(&mut graph, ab).unwrap(), LineType::Strong);
        assert_eq!(demote_line(&mut graph, ab).unwrap(), LineType::Deleted);

        let jot = graph.controller_of(a).unwrap();
        assert!(matches!(delete_line(&mut graph, jot), Err(EngineError::NotALine(_))));
        assert!(matches!(
            select_line(&mut graph, Uuid::new_v4()),
            Err(EngineError::ShapeNotFound(_))
        ));
    }

    #[test]
    fn test_bump_stops_breaking() {
        let mut graph = Graph::new();
        let cfg = config();
        let a = create_node_at(&mut graph, &cfg, Vector2::ZERO, None).unwrap();
        let b = create_node_at(&mut graph, &cfg, Vector2::new(200.0, 0.0), None).unwrap();
        let line = graph.line_between(a, b).unwrap();
        cut_lines(&mut graph, &cfg, Vector2::new(100.0, 20.0), Vector2::new(100.0, -20.0));
        assert!(graph.line(line).unwrap().breaking.is_some());

        move_node(&mut graph, b, Vector2::new(30.0, 0.0)).unwrap();
        let outcome = update_bumps(&mut graph, &cfg, b).unwrap();
        assert_eq!(outcome.bumped, vec![line]);
        let bumped = graph.line(line).unwrap();
        assert_eq!(bumped.line_type, LineType::Strong);
        assert_eq!(bumped.breaking, None);
        assert_eq!(bumped.break_rate, 0.0);

        // Forcing strong through a command does the same.
        demote_line(&mut graph, line).unwrap();
        graph.line_mut(line).unwrap().breaking = Some(0.5);
        set_line_type(&mut graph, line, LineType::Strong).unwrap();
        assert_eq!(graph.line(line).unwrap().breaking, None);
    }
}
