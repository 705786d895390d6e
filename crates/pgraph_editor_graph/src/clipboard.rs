// SPDX-License-Identifier: MIT OR Apache-2.0
//! Copy, cut and paste of subgraphs.
//!
//! The clipboard holds a detached deep copy of the copied nodes and edges.
//! Paste preserves port topology but never identity: every pasted node and
//! port gets a fresh id, and edges are rewired by each port's position in
//! the canonical port ordering of its node.

use crate::edge::{Edge, EdgeId};
use crate::graph::{GraphSnapshot, GraphStore, Removal};
use crate::naming::NamingPolicy;
use crate::node::{Node, NodeId};
use crate::selection::{self, SelectionManager};
use egui::{vec2, Vec2};
use std::collections::HashMap;

/// Offset applied to pasted nodes so they do not cover their source
pub const DEFAULT_PASTE_OFFSET: Vec2 = vec2(20.0, 20.0);

/// What a paste produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteOutcome {
    /// New node ids, in clipboard order
    pub nodes: Vec<NodeId>,
    /// New edge ids, in clipboard order
    pub edges: Vec<EdgeId>,
    /// Clipboard edges that could not be rewired
    pub dropped_edges: usize,
}

/// Snapshot-based clipboard
#[derive(Debug, Clone)]
pub struct Clipboard {
    contents: GraphSnapshot,
    offset: Vec2,
}

impl Clipboard {
    /// Create an empty clipboard pasting at [`DEFAULT_PASTE_OFFSET`]
    pub fn new() -> Self {
        Self::with_offset(DEFAULT_PASTE_OFFSET)
    }

    /// Create an empty clipboard with a custom paste offset
    pub fn with_offset(offset: Vec2) -> Self {
        Self {
            contents: GraphSnapshot::default(),
            offset,
        }
    }

    /// Current contents
    pub fn contents(&self) -> &GraphSnapshot {
        &self.contents
    }

    /// Whether there is nothing to paste
    pub fn is_empty(&self) -> bool {
        self.contents.nodes.is_empty()
    }

    /// Offset applied on paste
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Copy the selection.
    ///
    /// Takes every selected node, plus every edge that is either selected
    /// itself or has both endpoints among the selected nodes. Returns the
    /// number of nodes copied.
    pub fn copy(&mut self, graph: &GraphStore, selection: &SelectionManager) -> usize {
        let nodes = selection.selected_nodes();
        let edges = selection.selected_edges();

        self.contents = GraphSnapshot {
            nodes: graph
                .nodes()
                .filter(|n| nodes.contains(&n.id))
                .cloned()
                .collect(),
            edges: graph
                .edges()
                .filter(|e| {
                    edges.contains(&e.id)
                        || (nodes.contains(&e.source_node) && nodes.contains(&e.target_node))
                })
                .cloned()
                .collect(),
        };
        tracing::debug!(
            nodes = self.contents.nodes.len(),
            edges = self.contents.edges.len(),
            "copied selection"
        );
        self.contents.nodes.len()
    }

    /// Copy, then delete the selection
    pub fn cut(&mut self, graph: &mut GraphStore, selection: &mut SelectionManager) -> Removal {
        self.copy(graph, selection);
        selection::delete_selection(graph, selection)
    }

    /// Paste at the configured offset
    pub fn paste(
        &self,
        graph: &mut GraphStore,
        selection: &mut SelectionManager,
        naming: &dyn NamingPolicy,
    ) -> PasteOutcome {
        self.paste_with_offset(graph, selection, naming, self.offset)
    }

    /// Paste the clipboard into `graph` and select exactly what was pasted.
    ///
    /// Edges whose endpoints were not both copied are dropped. Names are
    /// resolved against the live graph at paste time. Selection observers
    /// are notified once. An empty clipboard is a no-op.
    pub fn paste_with_offset(
        &self,
        graph: &mut GraphStore,
        selection: &mut SelectionManager,
        naming: &dyn NamingPolicy,
        offset: Vec2,
    ) -> PasteOutcome {
        let mut outcome = PasteOutcome::default();
        if self.is_empty() {
            return outcome;
        }

        let originals: HashMap<NodeId, &Node> =
            self.contents.nodes.iter().map(|n| (n.id, n)).collect();
        let mut id_map: HashMap<NodeId, NodeId> = HashMap::with_capacity(originals.len());

        for original in &self.contents.nodes {
            let mut node = original.clone();
            node.id = NodeId::new();
            node.position = [node.position[0] + offset.x, node.position[1] + offset.y];
            node.name = naming.unique_name(&original.name, graph);
            node.ports.regenerate_ids();

            id_map.insert(original.id, node.id);
            outcome.nodes.push(graph.add_node(node));
        }

        for edge in &self.contents.edges {
            match remap_edge(edge, &originals, &id_map, graph, offset) {
                Some(new_edge) => outcome.edges.push(graph.add_edge(new_edge)),
                None => {
                    outcome.dropped_edges += 1;
                    tracing::trace!(edge = ?edge.id, "dropped edge leaving the copied set");
                }
            }
        }

        selection.batch(|s| {
            s.select_nodes(outcome.nodes.iter().copied(), false);
            s.select_edges(outcome.edges.iter().copied(), true);
        });

        tracing::debug!(
            nodes = outcome.nodes.len(),
            edges = outcome.edges.len(),
            dropped = outcome.dropped_edges,
            "pasted clipboard"
        );
        outcome
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewire a clipboard edge onto the pasted copies of its endpoints.
///
/// Ports are matched by canonical index in the original clipboard node,
/// since pasted ports have new ids.
fn remap_edge(
    edge: &Edge,
    originals: &HashMap<NodeId, &Node>,
    id_map: &HashMap<NodeId, NodeId>,
    graph: &GraphStore,
    offset: Vec2,
) -> Option<Edge> {
    let source = *id_map.get(&edge.source_node)?;
    let target = *id_map.get(&edge.target_node)?;

    let source_index = originals
        .get(&edge.source_node)?
        .ports
        .canonical_index(edge.source_port)?;
    let target_index = originals
        .get(&edge.target_node)?
        .ports
        .canonical_index(edge.target_port)?;

    let source_port = graph.node(source)?.ports.at_canonical_index(source_index)?.id;
    let target_port = graph.node(target)?.ports.at_canonical_index(target_index)?.id;

    let [x1, y1] = edge.start();
    let [x2, y2] = edge.end();
    Some(
        Edge::new(edge.layer, source, source_port, target, target_port)
            .with_endpoints([x1 + offset.x, y1 + offset.y], [x2 + offset.x, y2 + offset.y]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::SuffixNaming;
    use crate::node::FunctionConfig;
    use crate::port::{DataType, Layer, PortId};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn function(name: &str) -> Node {
        let config = FunctionConfig::new(name)
            .with_input("x", DataType::Int32)
            .with_input("y", DataType::Int32)
            .with_output("out", DataType::Int32);
        Node::function(&config, name)
    }

    /// a -> b -> c on control, a.out -> b.y on data
    fn chain() -> (GraphStore, [NodeId; 3], [EdgeId; 3]) {
        let mut graph = GraphStore::new();
        let a = graph.add_node(function("a"));
        let b = graph.add_node(function("b").with_position(200.0, 0.0));
        let c = graph.add_node(function("c").with_position(400.0, 0.0));
        let pa = graph.node(a).unwrap().ports.clone();
        let pb = graph.node(b).unwrap().ports.clone();
        let pc = graph.node(c).unwrap().ports.clone();
        let ab = graph.connect(a, pa.control_output.id, b, pb.control_input.id).unwrap();
        let bc = graph.connect(b, pb.control_output.id, c, pc.control_input.id).unwrap();
        let data = graph
            .connect(a, pa.data_outputs[0].id, b, pb.data_inputs[1].id)
            .unwrap();
        (graph, [a, b, c], [ab, bc, data])
    }

    fn all_ids(graph: &GraphStore) -> (HashSet<NodeId>, HashSet<PortId>, HashSet<EdgeId>) {
        let nodes = graph.node_ids().collect();
        let ports = graph.nodes().flat_map(|n| n.ports().map(|p| p.id)).collect();
        let edges = graph.edge_ids().collect();
        (nodes, ports, edges)
    }

    #[test]
    fn test_copy_includes_internal_edges() {
        let (graph, [a, b, _], [ab, bc, data]) = chain();
        let mut selection = SelectionManager::new();
        selection.select_nodes([a, b], false);
        selection.select_edge(bc, true);

        let mut clipboard = Clipboard::new();
        assert_eq!(clipboard.copy(&graph, &selection), 2);

        let edges: HashSet<EdgeId> = clipboard.contents().edges.iter().map(|e| e.id).collect();
        assert_eq!(edges, HashSet::from([ab, bc, data]));
    }

    #[test]
    fn test_paste_rewires_by_canonical_index() {
        let (mut graph, [a, b, _], _) = chain();
        let mut selection = SelectionManager::new();
        selection.select_nodes([a, b], false);
        let mut clipboard = Clipboard::new();
        clipboard.copy(&graph, &selection);

        let before = all_ids(&graph);
        let outcome = clipboard.paste(&mut graph, &mut selection, &SuffixNaming);

        assert_eq!(outcome.nodes.len(), 2);
        assert_eq!(outcome.edges.len(), 2);
        assert_eq!(outcome.dropped_edges, 0);

        let (new_a, new_b) = (outcome.nodes[0], outcome.nodes[1]);
        let na = graph.node(new_a).unwrap();
        let nb = graph.node(new_b).unwrap();
        assert_eq!(na.name, "a-1");
        assert_eq!(nb.name, "b-1");
        assert_eq!(nb.position, [220.0, 20.0]);

        let control = graph.edge(outcome.edges[0]).unwrap();
        assert_eq!(control.layer, Layer::Control);
        assert_eq!((control.source_node, control.target_node), (new_a, new_b));
        assert_eq!(control.source_port, na.ports.control_output.id);
        assert_eq!(control.target_port, nb.ports.control_input.id);

        let data = graph.edge(outcome.edges[1]).unwrap();
        assert_eq!(data.layer, Layer::Data);
        assert_eq!(data.source_port, na.ports.data_outputs[0].id);
        assert_eq!(data.target_port, nb.ports.data_inputs[1].id);

        let (nodes, ports, edges) = before;
        assert!(outcome.nodes.iter().all(|id| !nodes.contains(id)));
        assert!(na.ports().chain(nb.ports()).all(|p| !ports.contains(&p.id)));
        assert!(outcome.edges.iter().all(|id| !edges.contains(id)));

        let expected: HashSet<NodeId> = outcome.nodes.iter().copied().collect();
        assert_eq!(selection.selected_nodes(), &expected);
        assert_eq!(selection.selected_edges().len(), 2);
    }

    #[test]
    fn test_paste_drops_edges_leaving_copied_set() {
        let (mut graph, [_, b, _], [ab, bc, _]) = chain();
        let mut selection = SelectionManager::new();
        selection.select_node(b, false);
        selection.select_edges([ab, bc], true);
        let mut clipboard = Clipboard::new();
        clipboard.copy(&graph, &selection);
        assert_eq!(clipboard.contents().edges.len(), 2);

        let edges_before = graph.edge_count();
        let outcome = clipboard.paste(&mut graph, &mut selection, &SuffixNaming);
        assert_eq!(outcome.nodes.len(), 1);
        assert!(outcome.edges.is_empty());
        assert_eq!(outcome.dropped_edges, 2);
        assert_eq!(graph.edge_count(), edges_before);
    }

    #[test]
    fn test_repeated_paste_never_collides() {
        let (mut graph, [a, b, c], _) = chain();
        let mut selection = SelectionManager::new();
        selection.select_nodes([a, b, c], false);
        let mut clipboard = Clipboard::new();
        clipboard.copy(&graph, &selection);

        let first = clipboard.paste(&mut graph, &mut selection, &SuffixNaming);
        let seen = all_ids(&graph);
        let second = clipboard.paste(&mut graph, &mut selection, &SuffixNaming);

        assert_eq!(graph.node_count(), 9);
        assert!(second.nodes.iter().all(|id| !seen.0.contains(id)));
        assert!(second.edges.iter().all(|id| !seen.2.contains(id)));
        let names: HashSet<_> = graph.nodes().map(|n| n.name.clone()).collect();
        assert_eq!(names.len(), 9);
        assert!(names.contains("a-2"));
        assert_eq!(first.edges.len(), second.edges.len());
    }

    #[test]
    fn test_clipboard_is_detached_from_live_graph() {
        let (mut graph, [a, ..], _) = chain();
        let mut selection = SelectionManager::new();
        selection.select_node(a, false);
        let mut clipboard = Clipboard::new();
        clipboard.copy(&graph, &selection);

        graph.update_node(a, crate::NodeUpdate::name("renamed"));
        graph.remove_node(a);
        assert_eq!(clipboard.contents().nodes[0].name, "a");
    }

    #[test]
    fn test_cut_removes_and_keeps_copy() {
        let (mut graph, [a, b, c], _) = chain();
        let mut selection = SelectionManager::new();
        selection.select_nodes([a, b], false);
        let mut clipboard = Clipboard::new();

        let removal = clipboard.cut(&mut graph, &mut selection);
        assert_eq!(removal.nodes.len(), 2);
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec![c]);
        assert_eq!(graph.edge_count(), 0);
        assert!(!selection.has_selection());

        let outcome = clipboard.paste(&mut graph, &mut selection, &SuffixNaming);
        assert_eq!(outcome.edges.len(), 2);
        // originals are gone, so the names are free again
        assert_eq!(graph.node(outcome.nodes[0]).unwrap().name, "a");
    }

    #[test]
    fn test_empty_paste_is_noop() {
        let mut graph = GraphStore::new();
        let mut selection = SelectionManager::new();
        let kept = NodeId::new();
        selection.select_node(kept, false);

        let outcome = Clipboard::new().paste(&mut graph, &mut selection, &SuffixNaming);
        assert_eq!(outcome, PasteOutcome::default());
        assert!(selection.is_node_selected(kept));
    }

    #[test]
    fn test_paste_notifies_once() {
        let (mut graph, [a, b, _], _) = chain();
        let mut selection = SelectionManager::new();
        selection.select_nodes([a, b], false);
        let mut clipboard = Clipboard::new();
        clipboard.copy(&graph, &selection);

        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let seen = std::rc::Rc::clone(&count);
        selection.subscribe(move |_| seen.set(seen.get() + 1));
        clipboard.paste(&mut graph, &mut selection, &SuffixNaming);
        assert_eq!(count.get(), 1);
    }

    proptest! {
        #[test]
        fn prop_paste_adds_k_fresh_nodes(
            picks in proptest::collection::vec(any::<bool>(), 3),
            pastes in 1usize..4,
        ) {
            let (mut graph, ids, _) = chain();
            let chosen: Vec<NodeId> = ids
                .iter()
                .zip(&picks)
                .filter(|(_, pick)| **pick)
                .map(|(id, _)| *id)
                .collect();
            let mut selection = SelectionManager::new();
            selection.select_nodes(chosen.iter().copied(), false);
            let mut clipboard = Clipboard::new();
            let k = clipboard.copy(&graph, &selection);
            prop_assert_eq!(k, chosen.len());

            for _ in 0..pastes {
                let (nodes, ports, _) = all_ids(&graph);
                let count = graph.node_count();
                let outcome = clipboard.paste(&mut graph, &mut selection, &SuffixNaming);
                prop_assert_eq!(graph.node_count(), count + k);
                for id in &outcome.nodes {
                    prop_assert!(!nodes.contains(id));
                    let node = graph.node(*id).unwrap();
                    prop_assert!(node.ports().all(|p| !ports.contains(&p.id)));
                }
                for id in &outcome.edges {
                    let edge = graph.edge(*id).unwrap();
                    prop_assert!(outcome.nodes.contains(&edge.source_node));
                    prop_assert!(outcome.nodes.contains(&edge.target_node));
                }
            }
        }
    }
}
