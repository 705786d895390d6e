// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural and type validation of input bindings.
//!
//! Validation is a pure function of the graph. Nodes that cannot be reached
//! from a start node over control edges are not checked at all. For every
//! reachable node, each data input's binding must be either a literal of the
//! input's type or a `node.output` reference to a reachable node's output of
//! the same type.

use crate::graph::GraphStore;
use crate::node::{Node, NodeId};
use crate::port::{DataType, Layer, Port};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::LazyLock;

static SIGNED_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("valid regex"));
static UNSIGNED_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));
static FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("valid regex"));
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*(\.[A-Za-z_][A-Za-z0-9_-]*)?$").expect("valid regex")
});

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks execution
    Error,
    /// Potential problem
    Warning,
    /// Informational
    Info,
}

/// Why a binding is invalid
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// Empty or whitespace-only binding
    #[error("Input \"{input}\" is not mapped to a variable")]
    Unbound {
        /// Input port name
        input: String,
    },

    /// Neither a literal of the right type nor a reference
    #[error("Invalid value for input \"{input}\": must be a {expected} literal or a valid variable reference")]
    MalformedReference {
        /// Input port name
        input: String,
        /// Input port type
        expected: DataType,
    },

    /// Reference names a node that does not exist
    #[error("Source node \"{source_node}\" not found for input \"{input}\"")]
    UnknownSourceNode {
        /// Input port name
        input: String,
        /// Referenced node name
        source_node: String,
    },

    /// Referenced node is not reachable from a start node
    #[error("Source node \"{source_node}\" is not connected to start node")]
    SourceNotReachable {
        /// Input port name
        input: String,
        /// Referenced node name
        source_node: String,
    },

    /// Referenced node has no such output
    #[error("Output \"{output}\" not found in node \"{source_node}\"")]
    UnknownOutputPort {
        /// Input port name
        input: String,
        /// Referenced node name
        source_node: String,
        /// Referenced output name
        output: String,
    },

    /// Output type differs from input type
    #[error("Type mismatch for input \"{input}\": expected {expected}, got {found}")]
    TypeMismatch {
        /// Input port name
        input: String,
        /// Input port type
        expected: DataType,
        /// Referenced output type
        found: DataType,
    },
}

impl BindingError {
    /// Name of the input the error is attached to
    pub fn input(&self) -> &str {
        match self {
            Self::Unbound { input }
            | Self::MalformedReference { input, .. }
            | Self::UnknownSourceNode { input, .. }
            | Self::SourceNotReachable { input, .. }
            | Self::UnknownOutputPort { input, .. }
            | Self::TypeMismatch { input, .. } => input,
        }
    }
}

/// A single problem on a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity
    pub severity: Severity,
    /// What is wrong
    pub error: BindingError,
}

impl ValidationIssue {
    /// An error-severity issue
    pub fn error(error: BindingError) -> Self {
        Self {
            severity: Severity::Error,
            error,
        }
    }

    /// Human readable message
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Issue counts per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    /// Error count
    pub errors: usize,
    /// Warning count
    pub warnings: usize,
    /// Info count
    pub info: usize,
}

/// Result of validating a graph.
///
/// Only nodes with at least one issue appear in the issue map; every other
/// node, reachable or not, reports an empty list.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    reachable: HashSet<NodeId>,
    issues: IndexMap<NodeId, Vec<ValidationIssue>>,
}

impl ValidationReport {
    /// Nodes reachable from a start node over control edges
    pub fn reachable(&self) -> &HashSet<NodeId> {
        &self.reachable
    }

    /// Whether a node was reachable
    pub fn is_reachable(&self, node_id: NodeId) -> bool {
        self.reachable.contains(&node_id)
    }

    /// Issues on a node, in input order
    pub fn issues(&self, node_id: NodeId) -> &[ValidationIssue] {
        self.issues.get(&node_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Issue counts on a node by severity
    pub fn counts(&self, node_id: NodeId) -> IssueCounts {
        self.issues(node_id)
            .iter()
            .fold(IssueCounts::default(), |mut counts, issue| {
                match issue.severity {
                    Severity::Error => counts.errors += 1,
                    Severity::Warning => counts.warnings += 1,
                    Severity::Info => counts.info += 1,
                }
                counts
            })
    }

    /// Every node with issues
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[ValidationIssue])> {
        self.issues.iter().map(|(id, issues)| (*id, issues.as_slice()))
    }

    /// Whether a node has any issue
    pub fn has_issues(&self, node_id: NodeId) -> bool {
        self.issues.contains_key(&node_id)
    }

    /// Number of nodes with issues
    pub fn node_count(&self) -> usize {
        self.issues.len()
    }

    /// Whether no node has an error
    pub fn is_valid(&self) -> bool {
        self.issues
            .values()
            .flatten()
            .all(|issue| issue.severity != Severity::Error)
    }
}

/// Validate every reachable node's bindings
pub fn validate(graph: &GraphStore) -> ValidationReport {
    let reachable = reachable_from_start(graph);
    let mut issues = IndexMap::new();

    for node in graph.nodes().filter(|n| reachable.contains(&n.id)) {
        let node_issues: Vec<_> = node
            .ports
            .data_inputs
            .iter()
            .filter_map(|input| check_binding(graph, &reachable, node, input).err())
            .map(ValidationIssue::error)
            .collect();
        if !node_issues.is_empty() {
            issues.insert(node.id, node_issues);
        }
    }

    tracing::trace!(
        reachable = reachable.len(),
        with_issues = issues.len(),
        "validated graph"
    );
    ValidationReport { reachable, issues }
}

/// Breadth-first walk over control edges from every start node
pub fn reachable_from_start(graph: &GraphStore) -> HashSet<NodeId> {
    let mut successors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for edge in graph.edges().filter(|e| e.layer == Layer::Control) {
        successors.entry(edge.source_node).or_default().push(edge.target_node);
    }

    let mut reached = HashSet::new();
    let mut queue = VecDeque::new();
    for start in graph.nodes().filter(|n| n.is_start()) {
        if reached.insert(start.id) {
            queue.push_back(start.id);
        }
    }

    while let Some(current) = queue.pop_front() {
        for next in successors.get(&current).into_iter().flatten() {
            if reached.insert(*next) {
                queue.push_back(*next);
            }
        }
    }
    reached
}

fn check_binding(
    graph: &GraphStore,
    reachable: &HashSet<NodeId>,
    node: &Node,
    input: &Port,
) -> Result<(), BindingError> {
    let expr = node.binding(&input.name).map(str::trim).unwrap_or_default();
    if expr.is_empty() {
        return Err(BindingError::Unbound {
            input: input.name.clone(),
        });
    }

    if is_valid_literal(expr, input.data_type) {
        return Ok(());
    }
    if !is_variable_reference(expr) {
        return Err(BindingError::MalformedReference {
            input: input.name.clone(),
            expected: input.data_type,
        });
    }

    let (source_name, output_name) = expr.split_once('.').unwrap_or((expr, ""));
    let source = graph
        .node_by_name(source_name)
        .ok_or_else(|| BindingError::UnknownSourceNode {
            input: input.name.clone(),
            source_node: source_name.to_string(),
        })?;
    if !reachable.contains(&source.id) {
        return Err(BindingError::SourceNotReachable {
            input: input.name.clone(),
            source_node: source_name.to_string(),
        });
    }
    let output = source
        .data_output(output_name)
        .ok_or_else(|| BindingError::UnknownOutputPort {
            input: input.name.clone(),
            source_node: source_name.to_string(),
            output: output_name.to_string(),
        })?;
    if output.data_type != input.data_type {
        return Err(BindingError::TypeMismatch {
            input: input.name.clone(),
            expected: input.data_type,
            found: output.data_type,
        });
    }
    Ok(())
}

/// Whether `text` is a literal of `data_type`.
///
/// Strings are quoted with matching single or double quotes; bools are
/// `true`/`false`; signed integers `-?\d+`; unsigned `\d+`; floats
/// `-?\d+(\.\d+)?`.
pub fn is_valid_literal(text: &str, data_type: DataType) -> bool {
    let text = text.trim();
    match data_type {
        DataType::String => {
            text.len() >= 2
                && ((text.starts_with('"') && text.ends_with('"'))
                    || (text.starts_with('\'') && text.ends_with('\'')))
        }
        DataType::Bool => text == "true" || text == "false",
        ty if ty.is_signed_integer() => SIGNED_INT.is_match(text),
        ty if ty.is_unsigned_integer() => UNSIGNED_INT.is_match(text),
        ty if ty.is_floating() => FLOAT.is_match(text),
        _ => false,
    }
}

/// Whether `text` has the shape `identifier(.identifier)?`
pub fn is_variable_reference(text: &str) -> bool {
    REFERENCE.is_match(text.trim())
}
