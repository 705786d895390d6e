// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions for the graph.

use crate::node::NodeId;
use crate::port::{Layer, PortId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    /// Create a new random edge ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A directed edge from an output port to an input port.
///
/// The layer always equals the layer of both endpoint ports. The cached
/// endpoint coordinates are a rendering hint written by the view layer and
/// are never authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique edge ID
    pub id: EdgeId,
    /// Layer of both endpoint ports
    pub layer: Layer,
    /// Source node ID
    pub source_node: NodeId,
    /// Source port ID
    pub source_port: PortId,
    /// Target node ID
    pub target_node: NodeId,
    /// Target port ID
    pub target_port: PortId,
    /// Cached source endpoint x
    #[serde(default)]
    pub x1: f32,
    /// Cached source endpoint y
    #[serde(default)]
    pub y1: f32,
    /// Cached target endpoint x
    #[serde(default)]
    pub x2: f32,
    /// Cached target endpoint y
    #[serde(default)]
    pub y2: f32,
}

impl Edge {
    /// Create a new edge with zeroed cached endpoints
    pub fn new(
        layer: Layer,
        source_node: NodeId,
        source_port: PortId,
        target_node: NodeId,
        target_port: PortId,
    ) -> Self {
        Self {
            id: EdgeId::new(),
            layer,
            source_node,
            source_port,
            target_node,
            target_port,
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
        }
    }

    /// Set the cached endpoint coordinates
    pub fn with_endpoints(mut self, start: [f32; 2], end: [f32; 2]) -> Self {
        self.set_endpoints(start, end);
        self
    }

    /// Overwrite the cached endpoint coordinates
    pub fn set_endpoints(&mut self, start: [f32; 2], end: [f32; 2]) {
        [self.x1, self.y1] = start;
        [self.x2, self.y2] = end;
    }

    /// Cached source endpoint
    pub fn start(&self) -> [f32; 2] {
        [self.x1, self.y1]
    }

    /// Cached target endpoint
    pub fn end(&self) -> [f32; 2] {
        [self.x2, self.y2]
    }

    /// Check if this edge involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.source_node == node_id || self.target_node == node_id
    }

    /// The endpoint on the other side from `node_id`, if this edge touches it
    pub fn opposite(&self, node_id: NodeId) -> Option<NodeId> {
        if self.source_node == node_id {
            Some(self.target_node)
        } else if self.target_node == node_id {
            Some(self.source_node)
        } else {
            None
        }
    }
}

/// Partial update applied by [`GraphStore::update_edge`](crate::GraphStore::update_edge)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeUpdate {
    /// New cached source endpoint
    pub start: Option<[f32; 2]>,
    /// New cached target endpoint
    pub end: Option<[f32; 2]>,
}

impl EdgeUpdate {
    /// Update both cached endpoints
    pub fn endpoints(start: [f32; 2], end: [f32; 2]) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Apply to an edge
    pub fn apply(self, edge: &mut Edge) {
        if let Some([x, y]) = self.start {
            edge.x1 = x;
            edge.y1 = y;
        }
        if let Some([x, y]) = self.end {
            edge.x2 = x;
            edge.y2 = y;
        }
    }
}
