//! Property-based invariant tests for the dependency graph and mutations.
//!
//! 1. N nodes are fully connected by N(N-1)/2 lines, one jot each
//! 2. Cascade delete leaves (N-1)(N-2)/2 lines and a valid graph
//! 3. `apply_all` is idempotent
//! 4. Jots and line endpoints follow their nodes after `apply_all`

use proptest::prelude::*;
use thoughtmesh_core::mutation;
use thoughtmesh_core::{EngineConfig, Graph, NodeId, Shape, Vector2};

fn point() -> impl Strategy<Value = Vector2> {
    (-2_000.0f64..2_000.0, -2_000.0f64..2_000.0).prop_map(|(x, y)| Vector2::new(x, y))
}

fn build(points: &[Vector2]) -> (Graph, Vec<NodeId>) {
    let config = EngineConfig::default();
    let mut graph = Graph::new();
    let ids = points
        .iter()
        .map(|p| mutation::create_node_at(&mut graph, &config, *p, None).unwrap())
        .collect();
    graph.apply_all();
    (graph, ids)
}

fn snapshot(graph: &Graph) -> Vec<Shape> {
    graph.shapes_ordered().cloned().collect()
}

proptest! {
    #[test]
    fn nodes_are_fully_connected(points in prop::collection::vec(point(), 0..12)) {
        let n = points.len();
        let (graph, ids) = build(&points);
        prop_assert_eq!(graph.node_count(), n);
        prop_assert_eq!(graph.jot_count(), n);
        prop_assert_eq!(graph.line_count(), n * n.saturating_sub(1) / 2);
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                prop_assert!(graph.line_between(*a, *b).is_some());
            }
        }
        prop_assert!(graph.validate().is_ok());
    }

    #[test]
    fn cascade_delete_removes_incident_lines(
        points in prop::collection::vec(point(), 1..12),
        victim in any::<prop::sample::Index>(),
    ) {
        let n = points.len();
        let (mut graph, ids) = build(&points);
        let gone = ids[victim.index(n)];
        prop_assert!(mutation::destroy_node(&mut graph, gone).is_some());
        prop_assert!(mutation::destroy_node(&mut graph, gone).is_none());

        prop_assert_eq!(graph.node_count(), n - 1);
        prop_assert_eq!(graph.jot_count(), n - 1);
        prop_assert_eq!(graph.line_count(), (n - 1) * n.saturating_sub(2) / 2);
        prop_assert!(graph.controller_of(gone).is_none());
        prop_assert!(graph.validate().is_ok());
    }

    #[test]
    fn apply_all_is_idempotent(
        points in prop::collection::vec(point(), 1..8),
        moves in prop::collection::vec((any::<prop::sample::Index>(), point()), 0..16),
    ) {
        let config = EngineConfig::default();
        let (mut graph, ids) = build(&points);
        for (which, to) in &moves {
            let id = ids[which.index(ids.len())];
            mutation::move_node(&mut graph, id, *to).unwrap();
            mutation::update_bumps(&mut graph, &config, id).unwrap();
        }
        graph.apply_all();
        let first = snapshot(&graph);
        graph.apply_all();
        prop_assert_eq!(first, snapshot(&graph));

        for id in &ids {
            let position = graph.node(*id).unwrap().position;
            let jot = graph.controller_of(*id).and_then(|j| graph.jot(j)).unwrap();
            prop_assert_eq!(jot.center(), position);
            for line_id in graph.lines_of(*id) {
                let line = graph.line(line_id).unwrap();
                let end = if line.connected_node_id1 == *id { line.start() } else { line.end() };
                prop_assert_eq!(end, position);
            }
        }
    }
}
