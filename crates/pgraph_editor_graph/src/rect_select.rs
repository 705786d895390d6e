// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rectangle (marquee) selection.
//!
//! Selection uses full containment: an entity is picked only if all of it
//! lies inside the rectangle. Edges are tested by their cached endpoint
//! coordinates. Nodes use the precise bounds from a [`NodeBounds`] lookup
//! when one is supplied and it knows the node. Otherwise they fall back to
//! `position`, `width` and a fixed height, which is only an approximation
//! and can disagree with what is actually rendered.

use crate::edge::Edge;
use crate::graph::GraphStore;
use crate::node::{Node, NodeId};
use crate::selection::SelectionManager;
use egui::{pos2, vec2, Pos2, Rect};

/// Node height assumed when no measured bounds are available
pub const FALLBACK_NODE_HEIGHT: f32 = 60.0;

/// Measured bounding boxes of rendered nodes, in graph coordinates
pub trait NodeBounds {
    /// Bounds of a node, or `None` if it is not measured
    fn node_bounds(&self, node_id: NodeId) -> Option<Rect>;
}

impl<F> NodeBounds for F
where
    F: Fn(NodeId) -> Option<Rect>,
{
    fn node_bounds(&self, node_id: NodeId) -> Option<Rect> {
        self(node_id)
    }
}

/// Marquee state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum RectSelectState {
    /// No marquee in progress
    #[default]
    Idle,
    /// Dragging a marquee
    Selecting {
        /// Where the drag started
        anchor: Pos2,
        /// Current pointer position
        corner: Pos2,
    },
}

/// Turns a pointer drag into a selection rectangle
#[derive(Debug, Clone)]
pub struct RectSelector {
    state: RectSelectState,
    fallback_height: f32,
}

impl RectSelector {
    /// Create an idle selector
    pub fn new() -> Self {
        Self::with_fallback_height(FALLBACK_NODE_HEIGHT)
    }

    /// Create an idle selector with a custom approximate node height
    pub fn with_fallback_height(fallback_height: f32) -> Self {
        Self {
            state: RectSelectState::Idle,
            fallback_height,
        }
    }

    /// Current state
    pub fn state(&self) -> RectSelectState {
        self.state
    }

    /// Whether a marquee is in progress
    pub fn is_selecting(&self) -> bool {
        matches!(self.state, RectSelectState::Selecting { .. })
    }

    /// The normalized rectangle, while selecting
    pub fn rect(&self) -> Option<Rect> {
        match self.state {
            RectSelectState::Idle => None,
            RectSelectState::Selecting { anchor, corner } => Some(Rect::from_two_pos(anchor, corner)),
        }
    }

    /// Begin a marquee at `pos`
    pub fn start(&mut self, pos: Pos2) {
        self.state = RectSelectState::Selecting {
            anchor: pos,
            corner: pos,
        };
    }

    /// Move the live corner; ignored when idle
    pub fn update(&mut self, pos: Pos2) {
        if let RectSelectState::Selecting { corner, .. } = &mut self.state {
            *corner = pos;
        }
    }

    /// Abort without touching the selection
    pub fn cancel(&mut self) {
        self.state = RectSelectState::Idle;
    }

    /// Select everything fully inside the rectangle and return to idle.
    ///
    /// Replaces the selection unless `multi`. Returns false (and changes
    /// nothing) when no marquee was in progress.
    pub fn finish(
        &mut self,
        multi: bool,
        graph: &GraphStore,
        selection: &mut SelectionManager,
        bounds: Option<&dyn NodeBounds>,
    ) -> bool {
        let Some(rect) = self.rect() else {
            return false;
        };
        self.state = RectSelectState::Idle;

        let nodes: Vec<NodeId> = graph
            .nodes()
            .filter(|n| self.node_in_rect(n, rect, bounds))
            .map(|n| n.id)
            .collect();
        let edges: Vec<_> = graph
            .edges()
            .filter(|e| edge_in_rect(e, rect))
            .map(|e| e.id)
            .collect();

        tracing::trace!(nodes = nodes.len(), edges = edges.len(), "marquee finished");
        selection.batch(|s| {
            s.select_nodes(nodes, multi);
            s.select_edges(edges, true);
        });
        true
    }

    /// Whether a node lies entirely inside `rect`
    pub fn node_in_rect(&self, node: &Node, rect: Rect, bounds: Option<&dyn NodeBounds>) -> bool {
        let node_rect = bounds
            .and_then(|b| b.node_bounds(node.id))
            .unwrap_or_else(|| approximate_node_rect(node, self.fallback_height));
        rect.contains_rect(node_rect)
    }
}

impl Default for RectSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Approximate node bounds from stored width and an assumed height
pub fn approximate_node_rect(node: &Node, height: f32) -> Rect {
    Rect::from_min_size(pos2(node.position[0], node.position[1]), vec2(node.width, height))
}

/// Whether both cached endpoints of an edge lie inside `rect`
pub fn edge_in_rect(edge: &Edge, rect: Rect) -> bool {
    rect.contains(pos2(edge.x1, edge.y1)) && rect.contains(pos2(edge.x2, edge.y2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::Layer;
    use crate::EdgeId;

    fn node_at(graph: &mut GraphStore, name: &str, x: f32, y: f32) -> NodeId {
        graph.add_node(Node::start(name).with_position(x, y).with_width(100.0))
    }

    #[test]
    fn test_rect_is_normalized() {
        let mut selector = RectSelector::new();
        assert!(selector.rect().is_none());
        selector.start(pos2(200.0, 150.0));
        selector.update(pos2(10.0, 20.0));
        let rect = selector.rect().unwrap();
        assert_eq!(rect.min, pos2(10.0, 20.0));
        assert_eq!(rect.max, pos2(200.0, 150.0));
    }

    #[test]
    fn test_update_when_idle_is_noop() {
        let mut selector = RectSelector::new();
        selector.update(pos2(5.0, 5.0));
        assert_eq!(selector.state(), RectSelectState::Idle);
    }

    #[test]
    fn test_full_containment_only() {
        let mut graph = GraphStore::new();
        let inside = node_at(&mut graph, "inside", 10.0, 10.0);
        let partial = node_at(&mut graph, "partial", 150.0, 10.0);
        let mut selection = SelectionManager::new();

        let mut selector = RectSelector::new();
        selector.start(pos2(0.0, 0.0));
        selector.update(pos2(200.0, 100.0));
        assert!(selector.finish(false, &graph, &mut selection, None));

        assert!(selection.is_node_selected(inside));
        assert!(!selection.is_node_selected(partial));
        assert!(!selector.is_selecting());
    }

    #[test]
    fn test_shrinking_touching_side_deselects() {
        let mut graph = GraphStore::new();
        // approximate bounds: (10,10) .. (110,70)
        let id = node_at(&mut graph, "n", 10.0, 10.0);
        let selector = RectSelector::new();
        let node = graph.node(id).unwrap();

        let exact = Rect::from_min_max(pos2(10.0, 10.0), pos2(110.0, 70.0));
        assert!(selector.node_in_rect(node, exact, None));

        let shrunk = [
            Rect::from_min_max(pos2(11.0, 10.0), pos2(110.0, 70.0)),
            Rect::from_min_max(pos2(10.0, 11.0), pos2(110.0, 70.0)),
            Rect::from_min_max(pos2(10.0, 10.0), pos2(109.0, 70.0)),
            Rect::from_min_max(pos2(10.0, 10.0), pos2(110.0, 69.0)),
        ];
        for rect in shrunk {
            assert!(!selector.node_in_rect(node, rect, None));
        }
    }

    #[test]
    fn test_measured_bounds_win() {
        let mut graph = GraphStore::new();
        let id = node_at(&mut graph, "n", 10.0, 10.0);
        let selector = RectSelector::new();
        let node = graph.node(id).unwrap();
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(120.0, 80.0));

        let tall = move |n: NodeId| (n == id).then(|| Rect::from_min_max(pos2(10.0, 10.0), pos2(110.0, 200.0)));
        assert!(selector.node_in_rect(node, rect, None));
        assert!(!selector.node_in_rect(node, rect, Some(&tall)));

        let unknown = |_: NodeId| -> Option<Rect> { None };
        assert!(selector.node_in_rect(node, rect, Some(&unknown)));
    }

    #[test]
    fn test_edges_need_both_endpoints() {
        let mut graph = GraphStore::new();
        let a = node_at(&mut graph, "a", 1000.0, 1000.0);
        let b = node_at(&mut graph, "b", 1000.0, 1000.0);
        let pa = graph.node(a).unwrap().ports.control_output.id;
        let pb = graph.node(b).unwrap().ports.control_input.id;

        let mut inside = crate::Edge::new(Layer::Control, a, pa, b, pb);
        inside.set_endpoints([10.0, 10.0], [50.0, 50.0]);
        let mut half = crate::Edge::new(Layer::Control, a, pa, b, pb);
        half.set_endpoints([10.0, 10.0], [500.0, 50.0]);
        let inside: EdgeId = graph.add_edge(inside);
        let half = graph.add_edge(half);

        let mut selection = SelectionManager::new();
        let mut selector = RectSelector::new();
        selector.start(pos2(100.0, 100.0));
        selector.update(pos2(0.0, 0.0));
        selector.finish(false, &graph, &mut selection, None);

        assert!(selection.is_edge_selected(inside));
        assert!(!selection.is_edge_selected(half));
        assert!(selection.selected_nodes().is_empty());
    }

    #[test]
    fn test_multi_keeps_previous_selection() {
        let mut graph = GraphStore::new();
        let far = node_at(&mut graph, "far", 500.0, 500.0);
        let near = node_at(&mut graph, "near", 0.0, 0.0);
        let mut selection = SelectionManager::new();
        selection.select_node(far, false);

        let mut selector = RectSelector::new();
        selector.start(pos2(-1.0, -1.0));
        selector.update(pos2(200.0, 200.0));
        selector.finish(true, &graph, &mut selection, None);
        assert!(selection.is_node_selected(far));
        assert!(selection.is_node_selected(near));

        selector.start(pos2(-1.0, -1.0));
        selector.update(pos2(200.0, 200.0));
        selector.finish(false, &graph, &mut selection, None);
        assert!(!selection.is_node_selected(far));
    }

    #[test]
    fn test_cancel_and_finish_when_idle() {
        let graph = GraphStore::new();
        let mut selection = SelectionManager::new();
        selection.select_node(NodeId::new(), false);

        let mut selector = RectSelector::new();
        selector.start(pos2(0.0, 0.0));
        selector.cancel();
        assert!(!selector.finish(false, &graph, &mut selection, None));
        assert!(selection.has_selection());
    }
}
