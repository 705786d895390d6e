// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node drag sessions.
//!
//! A session is created when the pointer goes down on a node, receives
//! absolute pointer positions while it moves, and is dropped on release.
//! Every move is written to the store immediately; there is no rollback.

use crate::graph::GraphStore;
use crate::node::{NodeId, NodeUpdate};
use egui::{Pos2, Vec2};

/// Pointer travel (per axis) below which a drag counts as a click
pub const DEFAULT_DRAG_THRESHOLD: f32 = 1.0;

/// Moves a group of nodes together
#[derive(Debug, Clone)]
pub struct NodeDrag {
    /// Pointer position when the drag started
    anchor: Pos2,
    /// Starting positions of nodes being dragged (node ID, position)
    start_positions: Vec<(NodeId, [f32; 2])>,
    threshold: f32,
    moved: bool,
}

impl NodeDrag {
    /// Capture the current positions of `nodes` (missing ids are skipped)
    pub fn begin(
        graph: &GraphStore,
        nodes: impl IntoIterator<Item = NodeId>,
        anchor: Pos2,
        threshold: f32,
    ) -> Self {
        let start_positions = nodes
            .into_iter()
            .filter_map(|id| graph.node(id).map(|n| (id, n.position)))
            .collect();
        Self {
            anchor,
            start_positions,
            threshold,
            moved: false,
        }
    }

    /// Move every dragged node by the pointer's offset from the anchor
    pub fn update(&mut self, graph: &mut GraphStore, pointer: Pos2) -> Vec2 {
        let delta = pointer - self.anchor;
        if delta.x.abs() > self.threshold || delta.y.abs() > self.threshold {
            self.moved = true;
        }
        for (id, [x, y]) in &self.start_positions {
            graph.update_node(*id, NodeUpdate::position(x + delta.x, y + delta.y));
        }
        delta
    }

    /// Whether the pointer ever travelled past the threshold
    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Nodes being dragged
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.start_positions.iter().map(|(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use egui::pos2;

    #[test]
    fn test_group_moves_by_delta() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::start("a").with_position(0.0, 0.0));
        let b = graph.add_node(Node::start("b").with_position(100.0, 50.0));

        let mut drag = NodeDrag::begin(&graph, [a, b, NodeId::new()], pos2(10.0, 10.0), DEFAULT_DRAG_THRESHOLD);
        assert_eq!(drag.nodes().count(), 2);

        drag.update(&mut graph, pos2(15.0, 30.0));
        assert_eq!(graph.node(a).unwrap().position, [5.0, 20.0]);
        assert_eq!(graph.node(b).unwrap().position, [105.0, 70.0]);

        // deltas are relative to the anchor, not cumulative
        drag.update(&mut graph, pos2(10.0, 10.0));
        assert_eq!(graph.node(a).unwrap().position, [0.0, 0.0]);
        assert!(drag.moved());
    }

    #[test]
    fn test_small_jitter_is_not_a_move() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::start("a"));
        let mut drag = NodeDrag::begin(&graph, [a], pos2(0.0, 0.0), DEFAULT_DRAG_THRESHOLD);
        drag.update(&mut graph, pos2(0.5, -1.0));
        assert!(!drag.moved());
    }

    #[test]
    fn test_node_deleted_mid_drag() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::start("a"));
        let mut drag = NodeDrag::begin(&graph, [a], pos2(0.0, 0.0), DEFAULT_DRAG_THRESHOLD);
        graph.remove_node(a);
        drag.update(&mut graph, pos2(30.0, 30.0));
        assert_eq!(graph.node_count(), 0);
    }
}
