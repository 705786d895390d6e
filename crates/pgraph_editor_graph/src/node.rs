// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::port::{DataType, Port, PortId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::iter;
use uuid::Uuid;

/// Default width of a freshly created function node
pub const FUNCTION_NODE_WIDTH: f32 = 150.0;
/// Default width of a freshly created start node
pub const START_NODE_WIDTH: f32 = 100.0;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Signature of a backend function a node invokes.
///
/// Input and output maps keep declaration order, which becomes the order of
/// the node's data ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionConfig {
    /// Backend function name
    pub function_name: String,
    /// Input name to value kind
    pub inputs: IndexMap<String, DataType>,
    /// Output name to value kind
    pub outputs: IndexMap<String, DataType>,
}

impl FunctionConfig {
    /// Create a config with no inputs or outputs
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }

    /// Add an input
    pub fn with_input(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.inputs.insert(name.into(), data_type);
        self
    }

    /// Add an output
    pub fn with_output(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.outputs.insert(name.into(), data_type);
        self
    }
}

/// What a node does when executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Entry point of control flow
    Start,
    /// Invokes a backend function
    Function(FunctionConfig),
}

impl NodeKind {
    /// Short tag used at the execution boundary
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Function(_) => "function",
        }
    }
}

/// The fixed set of ports on a node.
///
/// The canonical ordering is `[control_input] ++ data_inputs ++
/// [control_output] ++ data_outputs`. Paste relies on it to match ports
/// between a node and its copy, since port ids are regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePorts {
    /// Control-flow input
    pub control_input: Port,
    /// Control-flow output
    pub control_output: Port,
    /// Data inputs, in declaration order
    pub data_inputs: Vec<Port>,
    /// Data outputs, in declaration order
    pub data_outputs: Vec<Port>,
}

impl NodePorts {
    /// Control ports only, no data ports
    pub fn control_only() -> Self {
        Self {
            control_input: Port::control_input(),
            control_output: Port::control_output(),
            data_inputs: Vec::new(),
            data_outputs: Vec::new(),
        }
    }

    /// Iterate all ports in canonical order
    pub fn canonical(&self) -> impl Iterator<Item = &Port> {
        iter::once(&self.control_input)
            .chain(self.data_inputs.iter())
            .chain(iter::once(&self.control_output))
            .chain(self.data_outputs.iter())
    }

    /// Position of a port in the canonical order
    pub fn canonical_index(&self, port_id: PortId) -> Option<usize> {
        self.canonical().position(|p| p.id == port_id)
    }

    /// Port at a canonical position
    pub fn at_canonical_index(&self, index: usize) -> Option<&Port> {
        self.canonical().nth(index)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.canonical().find(|p| p.id == port_id)
    }

    /// Give every port a fresh id, keeping order and everything else
    pub fn regenerate_ids(&mut self) {
        self.control_input.id = PortId::new();
        self.control_output.id = PortId::new();
        for port in self.data_inputs.iter_mut().chain(self.data_outputs.iter_mut()) {
            port.id = PortId::new();
        }
    }

    /// Number of ports
    pub fn len(&self) -> usize {
        2 + self.data_inputs.len() + self.data_outputs.len()
    }

    /// Always false, every node has its two control ports
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Display name, unique within the graph by convention
    pub name: String,
    /// Position of the top-left corner in graph space
    pub position: [f32; 2],
    /// Rendered width
    pub width: f32,
    /// Ports
    pub ports: NodePorts,
    /// Start or function
    pub kind: NodeKind,
    /// Binding expression per data-input port name
    #[serde(default)]
    pub input_bindings: IndexMap<String, String>,
}

impl Node {
    /// Create a function node from its signature
    pub fn function(config: &FunctionConfig, name: impl Into<String>) -> Self {
        let mut ports = NodePorts::control_only();
        ports.data_inputs = config
            .inputs
            .iter()
            .map(|(name, ty)| Port::data_input(name.clone(), *ty))
            .collect();
        ports.data_outputs = config
            .outputs
            .iter()
            .map(|(name, ty)| Port::data_output(name.clone(), *ty))
            .collect();

        Self {
            id: NodeId::new(),
            name: name.into(),
            position: [0.0, 0.0],
            width: FUNCTION_NODE_WIDTH,
            ports,
            kind: NodeKind::Function(config.clone()),
            input_bindings: IndexMap::new(),
        }
    }

    /// Create a start node
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            position: [50.0, 50.0],
            width: START_NODE_WIDTH,
            ports: NodePorts::control_only(),
            kind: NodeKind::Start,
            input_bindings: IndexMap::new(),
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Set the width
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Set a binding expression
    pub fn with_binding(mut self, input: impl Into<String>, expr: impl Into<String>) -> Self {
        self.input_bindings.insert(input.into(), expr.into());
        self
    }

    /// Whether this is a start node
    pub fn is_start(&self) -> bool {
        matches!(self.kind, NodeKind::Start)
    }

    /// Function signature, present iff this is a function node
    pub fn function_config(&self) -> Option<&FunctionConfig> {
        match &self.kind {
            NodeKind::Function(config) => Some(config),
            NodeKind::Start => None,
        }
    }

    /// Get a port by ID
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.ports.port(port_id)
    }

    /// Get all ports in canonical order
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.canonical()
    }

    /// Data input by name
    pub fn data_input(&self, name: &str) -> Option<&Port> {
        self.ports.data_inputs.iter().find(|p| p.name == name)
    }

    /// Data output by name
    pub fn data_output(&self, name: &str) -> Option<&Port> {
        self.ports.data_outputs.iter().find(|p| p.name == name)
    }

    /// Binding expression for a data input, if any
    pub fn binding(&self, input: &str) -> Option<&str> {
        self.input_bindings.get(input).map(String::as_str)
    }
}

/// Partial update applied by [`GraphStore::update_node`](crate::GraphStore::update_node).
///
/// Identity and ports are not updatable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    /// New display name
    pub name: Option<String>,
    /// New position
    pub position: Option<[f32; 2]>,
    /// New width
    pub width: Option<f32>,
    /// Bindings to set (merged into existing ones)
    pub bindings: Vec<(String, String)>,
}

impl NodeUpdate {
    /// Update only the position
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            position: Some([x, y]),
            ..Self::default()
        }
    }

    /// Update only the name
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Update a single binding
    pub fn binding(input: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            bindings: vec![(input.into(), expr.into())],
            ..Self::default()
        }
    }

    /// Apply to a node
    pub fn apply(self, node: &mut Node) {
        if let Some(name) = self.name {
            node.name = name;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(width) = self.width {
            node.width = width;
        }
        for (input, expr) in self.bindings {
            node.input_bindings.insert(input, expr);
        }
    }
}

/// Palette of backend functions nodes can be created from
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    /// Registered functions by name
    functions: IndexMap<String, FunctionConfig>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            functions: IndexMap::new(),
        }
    }

    /// Create a registry from a function listing, later entries win
    pub fn from_configs(configs: impl IntoIterator<Item = FunctionConfig>) -> Self {
        let mut registry = Self::new();
        for config in configs {
            registry.register(config);
        }
        registry
    }

    /// Register a function
    pub fn register(&mut self, config: FunctionConfig) {
        self.functions.insert(config.function_name.clone(), config);
    }

    /// Get a function by name
    pub fn get(&self, function_name: &str) -> Option<&FunctionConfig> {
        self.functions.get(function_name)
    }

    /// Get all registered functions
    pub fn functions(&self) -> impl Iterator<Item = &FunctionConfig> {
        self.functions.values()
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
