// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serialization of a graph for the execution backend.
//!
//! The backend only needs node identity, kind, title and bindings plus the
//! port-level wiring; positions, widths and cached coordinates are dropped.

use crate::graph::GraphStore;
use crate::node::NodeId;
use crate::port::PortId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node as the backend sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionNode {
    /// Node id
    pub id: NodeId,
    /// Display name
    pub title: String,
    /// `start` or `function`
    #[serde(rename = "type")]
    pub kind: String,
    /// Binding per input name
    #[serde(rename = "inputVariables")]
    pub input_variables: IndexMap<String, String>,
    /// Backend function to call, for function nodes
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub function_name: Option<String>,
}

/// An edge as the backend sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEdge {
    /// Source node
    pub source: NodeId,
    /// Source port
    pub source_port: PortId,
    /// Target node
    pub target: NodeId,
    /// Target port
    pub target_port: PortId,
}

/// Payload posted to the backend to run a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionGraph {
    /// Nodes
    pub nodes: Vec<ExecutionNode>,
    /// Edges on both layers
    pub edges: Vec<ExecutionEdge>,
}

impl ExecutionGraph {
    /// Build the payload from the live graph
    pub fn from_store(graph: &GraphStore) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| ExecutionNode {
                id: node.id,
                title: node.name.clone(),
                kind: node.kind.tag().to_string(),
                input_variables: node.input_bindings.clone(),
                function_name: node.function_config().map(|c| c.function_name.clone()),
            })
            .collect();
        let edges = graph
            .edges()
            .map(|edge| ExecutionEdge {
                source: edge.source_node,
                source_port: edge.source_port,
                target: edge.target_node,
                target_port: edge.target_port,
            })
            .collect();
        Self { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{FunctionConfig, Node};
    use crate::port::DataType;

    #[test]
    fn test_payload_shape() {
        let mut graph = GraphStore::new();
        let s = graph.add_node(Node::start("Start"));
        let config = FunctionConfig::new("detect").with_input("frame", DataType::String);
        let f = graph.add_node(Node::function(&config, "detect").with_binding("frame", "'cam0'"));
        let out = graph.node(s).unwrap().ports.control_output.id;
        let inp = graph.node(f).unwrap().ports.control_input.id;
        graph.connect(s, out, f, inp).unwrap();

        let payload = ExecutionGraph::from_store(&graph);
        let json = serde_json::to_value(&payload).unwrap();

        let start = &json["nodes"][0];
        assert_eq!(start["type"], "start");
        assert_eq!(start["title"], "Start");
        assert!(start.get("function_name").is_none());

        let detect = &json["nodes"][1];
        assert_eq!(detect["type"], "function");
        assert_eq!(detect["function_name"], "detect");
        assert_eq!(detect["inputVariables"]["frame"], "'cam0'");

        let edge = &json["edges"][0];
        assert_eq!(edge["source"], serde_json::to_value(s).unwrap());
        assert_eq!(edge["target_port"], serde_json::to_value(inp).unwrap());
        assert!(edge.get("x1").is_none());
    }
}
