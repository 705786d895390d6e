// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection state with change notification.
//!
//! Every mutating call notifies registered observers exactly once after the
//! mutation. Callers that need several mutations to appear as one (paste,
//! delete) wrap them in [`SelectionManager::batch`].

use crate::edge::EdgeId;
use crate::graph::{GraphStore, Removal};
use crate::node::NodeId;
use std::collections::HashSet;

/// Read-only view of the current selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// Selected node ids
    pub nodes: HashSet<NodeId>,
    /// Selected edge ids
    pub edges: HashSet<EdgeId>,
}

impl SelectionSnapshot {
    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Callback fired after each selection change
pub type SelectionObserver = Box<dyn FnMut(&SelectionSnapshot)>;

/// Tracks selected node and edge ids
#[derive(Default)]
pub struct SelectionManager {
    current: SelectionSnapshot,
    observers: Vec<SelectionObserver>,
    batch_depth: usize,
    pending: bool,
}

impl SelectionManager {
    /// Create an empty selection with no observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn subscribe(&mut self, observer: impl FnMut(&SelectionSnapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Current selection
    pub fn snapshot(&self) -> &SelectionSnapshot {
        &self.current
    }

    /// Selected node ids
    pub fn selected_nodes(&self) -> &HashSet<NodeId> {
        &self.current.nodes
    }

    /// Selected edge ids
    pub fn selected_edges(&self) -> &HashSet<EdgeId> {
        &self.current.edges
    }

    /// Whether a node is selected
    pub fn is_node_selected(&self, id: NodeId) -> bool {
        self.current.nodes.contains(&id)
    }

    /// Whether an edge is selected
    pub fn is_edge_selected(&self, id: EdgeId) -> bool {
        self.current.edges.contains(&id)
    }

    /// Whether anything is selected
    pub fn has_selection(&self) -> bool {
        !self.current.is_empty()
    }

    /// Run several mutations and notify once at the end (if anything ran)
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 && self.pending {
            self.pending = false;
            self.fire();
        }
        result
    }

    /// Select a node, replacing the selection unless `multi`
    pub fn select_node(&mut self, id: NodeId, multi: bool) {
        if !multi {
            self.reset();
        }
        self.current.nodes.insert(id);
        self.notify();
    }

    /// Select an edge, replacing the selection unless `multi`
    pub fn select_edge(&mut self, id: EdgeId, multi: bool) {
        if !multi {
            self.reset();
        }
        self.current.edges.insert(id);
        self.notify();
    }

    /// Remove a node from the selection
    pub fn deselect_node(&mut self, id: NodeId) {
        self.current.nodes.remove(&id);
        self.notify();
    }

    /// Remove an edge from the selection
    pub fn deselect_edge(&mut self, id: EdgeId) {
        self.current.edges.remove(&id);
        self.notify();
    }

    /// Toggle node selection
    pub fn toggle_node_selection(&mut self, id: NodeId) {
        if !self.current.nodes.remove(&id) {
            self.current.nodes.insert(id);
        }
        self.notify();
    }

    /// Toggle edge selection
    pub fn toggle_edge_selection(&mut self, id: EdgeId) {
        if !self.current.edges.remove(&id) {
            self.current.edges.insert(id);
        }
        self.notify();
    }

    /// Add every node and edge in the graph
    pub fn select_all(&mut self, graph: &GraphStore) {
        self.current.nodes.extend(graph.node_ids());
        self.current.edges.extend(graph.edge_ids());
        self.notify();
    }

    /// Select several nodes, replacing the selection unless `multi`
    pub fn select_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>, multi: bool) {
        if !multi {
            self.reset();
        }
        self.current.nodes.extend(ids);
        self.notify();
    }

    /// Select several edges, replacing the selection unless `multi`
    pub fn select_edges(&mut self, ids: impl IntoIterator<Item = EdgeId>, multi: bool) {
        if !multi {
            self.reset();
        }
        self.current.edges.extend(ids);
        self.notify();
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) {
        self.reset();
        self.notify();
    }

    /// Drop removed ids from the selection
    pub fn purge(&mut self, removal: &Removal) {
        for id in &removal.nodes {
            self.current.nodes.remove(id);
        }
        for id in &removal.edges {
            self.current.edges.remove(id);
        }
        self.notify();
    }

    /// Drop ids that no longer exist in `graph`
    pub fn retain_existing(&mut self, graph: &GraphStore) {
        self.current.nodes.retain(|id| graph.contains_node(*id));
        self.current.edges.retain(|id| graph.contains_edge(*id));
        self.notify();
    }

    fn reset(&mut self) {
        self.current.nodes.clear();
        self.current.edges.clear();
    }

    fn notify(&mut self) {
        if self.batch_depth > 0 {
            self.pending = true;
        } else {
            self.fire();
        }
    }

    fn fire(&mut self) {
        for observer in &mut self.observers {
            observer(&self.current);
        }
    }
}

impl std::fmt::Debug for SelectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionManager")
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Delete the selected nodes and edges, cascading to edges touching the
/// deleted nodes, and purge everything removed from the selection.
///
/// Observers see a single notification.
pub fn delete_selection(graph: &mut GraphStore, selection: &mut SelectionManager) -> Removal {
    let nodes = selection.selected_nodes().clone();
    let edges = selection.selected_edges().clone();

    let mut removal = graph.remove_nodes(&nodes);
    let explicit: HashSet<EdgeId> = edges
        .into_iter()
        .filter(|id| !removal.edges.contains(id))
        .collect();
    removal.edges.extend(graph.remove_edges(&explicit));

    selection.batch(|s| {
        s.purge(&removal);
        s.clear_selection();
    });
    tracing::debug!(
        nodes = removal.nodes.len(),
        edges = removal.edges.len(),
        "deleted selection"
    );
    removal
}
