// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph store owning the live node and edge collections.

use crate::edge::{Edge, EdgeId, EdgeUpdate};
use crate::node::{Node, NodeId, NodeUpdate};
use crate::port::PortId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Plain-data copy of a graph, detached from any live store.
///
/// This is the shape exchanged with persistence and the clipboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Nodes in insertion order
    pub nodes: Vec<Node>,
    /// Edges in insertion order
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Whether the snapshot holds no nodes and no edges
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Ids removed by a single removal call, including cascaded edges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removal {
    /// Removed node ids
    pub nodes: Vec<NodeId>,
    /// Removed edge ids, explicit and cascaded
    pub edges: Vec<EdgeId>,
}

impl Removal {
    /// Whether nothing was removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Merge another removal into this one
    pub fn extend(&mut self, other: Removal) {
        self.nodes.extend(other.nodes);
        self.edges.extend(other.edges);
    }
}

/// Owner of the canonical node and edge collections.
///
/// Removing a node removes every edge touching it in the same call, so a
/// dangling edge is never observable. Updates addressed to ids that no
/// longer exist are silently ignored.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Edges between nodes
    edges: IndexMap<EdgeId, Edge>,
}

impl GraphStore {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from a snapshot
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut store = Self::new();
        store.set_graph(snapshot.nodes, snapshot.edges);
        store
    }

    // ---- nodes ----

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, node_id: NodeId) -> Removal {
        let mut ids = HashSet::with_capacity(1);
        ids.insert(node_id);
        self.remove_nodes(&ids)
    }

    /// Remove a set of nodes and every edge touching any of them
    pub fn remove_nodes(&mut self, node_ids: &HashSet<NodeId>) -> Removal {
        let mut removal = Removal::default();
        if node_ids.is_empty() {
            return removal;
        }

        self.nodes.retain(|id, _| {
            let keep = !node_ids.contains(id);
            if !keep {
                removal.nodes.push(*id);
            }
            keep
        });
        if removal.nodes.is_empty() {
            return removal;
        }

        self.edges.retain(|id, e| {
            let keep = !node_ids.contains(&e.source_node) && !node_ids.contains(&e.target_node);
            if !keep {
                removal.edges.push(*id);
            }
            keep
        });

        tracing::trace!(
            nodes = removal.nodes.len(),
            edges = removal.edges.len(),
            "removed nodes with cascade"
        );
        removal
    }

    /// Apply a partial update; returns false if the node does not exist
    pub fn update_node(&mut self, node_id: NodeId, update: NodeUpdate) -> bool {
        match self.nodes.get_mut(&node_id) {
            Some(node) => {
                update.apply(node);
                true
            }
            None => false,
        }
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a node by display name
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.name == name)
    }

    /// Whether any node uses this display name
    pub fn contains_name(&self, name: &str) -> bool {
        self.node_by_name(name).is_some()
    }

    /// Whether the node exists
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ---- edges ----

    /// Add an edge as-is
    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        let id = edge.id;
        self.edges.insert(id, edge);
        id
    }

    /// Create an edge after checking both endpoints
    pub fn connect(
        &mut self,
        source_node: NodeId,
        source_port: PortId,
        target_node: NodeId,
        target_port: PortId,
    ) -> Result<EdgeId, EdgeError> {
        let source = self
            .nodes
            .get(&source_node)
            .ok_or(EdgeError::NodeNotFound(source_node))?;
        let target = self
            .nodes
            .get(&target_node)
            .ok_or(EdgeError::NodeNotFound(target_node))?;

        let from = source
            .port(source_port)
            .ok_or(EdgeError::PortNotFound(source_port))?;
        let to = target
            .port(target_port)
            .ok_or(EdgeError::PortNotFound(target_port))?;

        if !from.can_connect(to) {
            return Err(if from.layer == to.layer {
                EdgeError::WrongDirection
            } else {
                EdgeError::LayerMismatch
            });
        }
        if source_node == target_node {
            return Err(EdgeError::SelfLoop);
        }

        let layer = from.layer;
        tracing::debug!(?layer, "connecting {} -> {}", source.name, target.name);
        Ok(self.add_edge(Edge::new(layer, source_node, source_port, target_node, target_port)))
    }

    /// Remove an edge
    pub fn remove_edge(&mut self, edge_id: EdgeId) -> Option<Edge> {
        self.edges.shift_remove(&edge_id)
    }

    /// Remove a set of edges, returning the ids actually removed
    pub fn remove_edges(&mut self, edge_ids: &HashSet<EdgeId>) -> Vec<EdgeId> {
        let mut removed = Vec::new();
        self.edges.retain(|id, _| {
            let keep = !edge_ids.contains(id);
            if !keep {
                removed.push(*id);
            }
            keep
        });
        removed
    }

    /// Apply a partial update; returns false if the edge does not exist
    pub fn update_edge(&mut self, edge_id: EdgeId, update: EdgeUpdate) -> bool {
        match self.edges.get_mut(&edge_id) {
            Some(edge) => {
                update.apply(edge);
                true
            }
            None => false,
        }
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// Whether the edge exists
    pub fn contains_edge(&self, edge_id: EdgeId) -> bool {
        self.edges.contains_key(&edge_id)
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get all edge IDs
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys().copied()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges with either endpoint on a node
    pub fn edges_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.involves_node(node_id))
    }

    /// Nodes one edge away from `node_id`, in either direction, deduplicated
    pub fn connected_nodes(&self, node_id: NodeId) -> Vec<&Node> {
        let neighbours: HashSet<NodeId> = self
            .edges_for_node(node_id)
            .filter_map(|e| e.opposite(node_id))
            .collect();
        self.nodes
            .values()
            .filter(|n| neighbours.contains(&n.id))
            .collect()
    }

    // ---- whole graph ----

    /// Remove everything
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Replace the whole graph.
    ///
    /// Edges that [`Self::connect`] would have rejected are dropped: missing
    /// endpoints, ports that cannot connect, a layer tag that disagrees with
    /// the ports, or a self-loop.
    pub fn set_graph(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes.into_iter().map(|n| (n.id, n)).collect();
        let total = edges.len();
        self.edges = edges
            .into_iter()
            .filter(|e| self.is_consistent(e))
            .map(|e| (e.id, e))
            .collect();
        if self.edges.len() != total {
            tracing::warn!(
                dropped = total - self.edges.len(),
                "dropped inconsistent edges while loading graph"
            );
        }
    }

    /// Structurally independent deep copy of the live graph
    pub fn clone_graph(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
        }
    }

    fn is_consistent(&self, edge: &Edge) -> bool {
        let port = |node: NodeId, port: PortId| self.nodes.get(&node).and_then(|n| n.port(port));
        match (
            port(edge.source_node, edge.source_port),
            port(edge.target_node, edge.target_port),
        ) {
            (Some(from), Some(to)) => {
                from.can_connect(to) && from.layer == edge.layer && edge.source_node != edge.target_node
            }
            _ => false,
        }
    }
}

/// Error when creating an edge through [`GraphStore::connect`]
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port not found
    #[error("Port not found: {0:?}")]
    PortNotFound(PortId),

    /// Edges run from an output to an input
    #[error("Edges must run from an output port to an input port")]
    WrongDirection,

    /// Endpoint ports on different layers
    #[error("Ports are on different layers")]
    LayerMismatch,

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,
}
