// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing engine for two-layer pipeline graphs.
//!
//! A pipeline graph holds `start` and `function` nodes. Every node carries
//! a control port pair; function nodes add typed data ports. Edges live on
//! one of two layers:
//! - **Control** edges decide execution order
//! - **Data** edges document value flow; actual values come from each
//!   node's input bindings
//!
//! ## Architecture
//!
//! - [`GraphStore`] owns nodes and edges and cascades deletes
//! - [`SelectionManager`] tracks selected ids and notifies observers once
//!   per logical change
//! - [`RectSelector`] and [`NodeDrag`] implement marquee and drag gestures
//! - [`Clipboard`] copies and pastes subgraphs with fresh ids
//! - [`validate`] checks input bindings of every reachable node
//! - [`GraphEditor`] ties the above to pointer and keyboard input

pub mod clipboard;
pub mod config;
pub mod drag;
pub mod edge;
pub mod editor;
pub mod execution;
pub mod graph;
pub mod naming;
pub mod node;
pub mod port;
pub mod rect_select;
pub mod selection;
pub mod validation;

pub use clipboard::{Clipboard, PasteOutcome};
pub use config::{ConfigError, EditorConfig};
pub use drag::NodeDrag;
pub use edge::{Edge, EdgeId, EdgeUpdate};
pub use editor::{EditorAction, GraphEditor};
pub use execution::{ExecutionEdge, ExecutionGraph, ExecutionNode};
pub use graph::{EdgeError, GraphSnapshot, GraphStore, Removal};
pub use naming::{unique_node_name, NamingPolicy, SuffixNaming};
pub use node::{FunctionConfig, FunctionRegistry, Node, NodeId, NodeKind, NodePorts, NodeUpdate};
pub use port::{DataType, Layer, Port, PortDirection, PortId};
pub use rect_select::{NodeBounds, RectSelectState, RectSelector};
pub use selection::{delete_selection, SelectionManager, SelectionSnapshot};
pub use validation::{
    is_valid_literal, is_variable_reference, reachable_from_start, validate, BindingError,
    IssueCounts, Severity, ValidationIssue, ValidationReport,
};

/// Geometry types used by the interaction API
pub use egui::{Key, Modifiers, PointerButton, Pos2, Rect, Vec2};
