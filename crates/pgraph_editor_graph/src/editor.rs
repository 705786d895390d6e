// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph editor orchestration.
//!
//! [`GraphEditor`] owns the live graph together with selection, marquee,
//! clipboard and drag state, and exposes the pointer and keyboard entry
//! points a view calls into. Pointer positions are already in graph space;
//! translating screen events is the view's job.
//!
//! While a modal is open every interaction entry point is a no-op, except
//! that a pointer release still ends the gesture in progress.

use crate::clipboard::{Clipboard, PasteOutcome};
use crate::config::EditorConfig;
use crate::drag::NodeDrag;
use crate::edge::{EdgeId, EdgeUpdate};
use crate::graph::{EdgeError, GraphSnapshot, GraphStore, Removal};
use crate::naming::{NamingPolicy, SuffixNaming};
use crate::node::{FunctionConfig, FunctionRegistry, Node, NodeId, NodeUpdate};
use crate::port::{Layer, PortId};
use crate::rect_select::{NodeBounds, RectSelector};
use crate::selection::{self, SelectionManager, SelectionSnapshot};
use crate::validation::{self, ValidationReport};
use egui::{vec2, Key, Modifiers, PointerButton, Pos2};

/// Keyboard commands the editor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Delete the selection
    Delete,
    /// Select every node and edge
    SelectAll,
    /// Copy the selection
    Copy,
    /// Cut the selection
    Cut,
    /// Paste the clipboard
    Paste,
    /// Cancel the marquee, or clear the selection
    Escape,
}

impl EditorAction {
    /// Map a key press to an action
    pub fn from_key(key: Key, modifiers: Modifiers) -> Option<Self> {
        let command = is_toggle_modifier(modifiers);
        match key {
            Key::Delete | Key::Backspace => Some(Self::Delete),
            Key::Escape => Some(Self::Escape),
            Key::A if command => Some(Self::SelectAll),
            Key::C if command => Some(Self::Copy),
            Key::X if command => Some(Self::Cut),
            Key::V if command => Some(Self::Paste),
            _ => None,
        }
    }
}

/// Ctrl on Windows/Linux, Cmd on macOS
fn is_toggle_modifier(modifiers: Modifiers) -> bool {
    modifiers.ctrl || modifiers.command || modifiers.mac_cmd
}

/// Editing session over one graph
pub struct GraphEditor {
    graph: GraphStore,
    selection: SelectionManager,
    rect_selector: RectSelector,
    clipboard: Clipboard,
    naming: Box<dyn NamingPolicy>,
    functions: FunctionRegistry,
    config: EditorConfig,
    view_layer: Layer,
    modal_open: bool,
    drag: Option<NodeDrag>,
}

impl GraphEditor {
    /// Create an editor over an empty graph
    pub fn new(config: EditorConfig) -> Self {
        let [dx, dy] = config.paste_offset;
        Self {
            graph: GraphStore::new(),
            selection: SelectionManager::new(),
            rect_selector: RectSelector::with_fallback_height(config.fallback_node_height),
            clipboard: Clipboard::with_offset(vec2(dx, dy)),
            naming: Box::new(SuffixNaming),
            functions: FunctionRegistry::new(),
            config,
            view_layer: Layer::Control,
            modal_open: false,
            drag: None,
        }
    }

    /// Replace the naming policy used by node creation and paste
    pub fn with_naming(mut self, naming: impl NamingPolicy + 'static) -> Self {
        self.naming = Box::new(naming);
        self
    }

    /// Use `functions` as the palette for [`Self::add_function_node_by_name`]
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    // ---- state access ----

    /// The live graph
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Current selection
    pub fn selection(&self) -> &SelectionSnapshot {
        self.selection.snapshot()
    }

    /// Selection manager, for direct selection calls
    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    /// Register a selection observer
    pub fn on_selection_change(&mut self, observer: impl FnMut(&SelectionSnapshot) + 'static) {
        self.selection.subscribe(observer);
    }

    /// Marquee state
    pub fn rect_selector(&self) -> &RectSelector {
        &self.rect_selector
    }

    /// Clipboard contents
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Functions available for node creation
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Active configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Whether a node drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Plain-data copy of the live graph
    pub fn snapshot(&self) -> GraphSnapshot {
        self.graph.clone_graph()
    }

    /// Replace the whole graph, dropping selection of ids that vanished
    pub fn load(&mut self, snapshot: GraphSnapshot) {
        self.drag = None;
        self.rect_selector.cancel();
        self.graph.set_graph(snapshot.nodes, snapshot.edges);
        self.selection.retain_existing(&self.graph);
        tracing::info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "Loaded graph"
        );
    }

    /// Remove every node and edge
    pub fn clear(&mut self) {
        self.load(GraphSnapshot::default());
    }

    // ---- modal gate and layers ----

    /// Block (or unblock) all interaction entry points
    pub fn set_modal_open(&mut self, open: bool) {
        self.modal_open = open;
    }

    /// Whether a modal currently has input priority
    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// Layer currently shown
    pub fn view_layer(&self) -> Layer {
        self.view_layer
    }

    /// Show a specific layer
    pub fn set_view_layer(&mut self, layer: Layer) {
        self.view_layer = layer;
    }

    /// Switch between control and data layer
    pub fn toggle_view_layer(&mut self) -> Layer {
        self.view_layer = self.view_layer.toggled();
        self.view_layer
    }

    // ---- structural edits ----

    /// Add a function node with a unique name derived from the function
    pub fn add_function_node(&mut self, config: &FunctionConfig, position: Pos2) -> NodeId {
        let name = self.naming.unique_name(&config.function_name, &self.graph);
        let node = Node::function(config, name)
            .with_position(position.x, position.y)
            .with_width(self.config.function_node_width);
        self.graph.add_node(node)
    }

    /// Add a node for a registered function; `None` if the name is unknown
    pub fn add_function_node_by_name(&mut self, function_name: &str, position: Pos2) -> Option<NodeId> {
        let Some(config) = self.functions.get(function_name).cloned() else {
            tracing::warn!("Unknown function {function_name:?}");
            return None;
        };
        Some(self.add_function_node(&config, position))
    }

    /// Add a start node with a unique name
    pub fn add_start_node(&mut self) -> NodeId {
        let name = self.naming.unique_name(&self.config.start_node_name, &self.graph);
        let [x, y] = self.config.start_node_position;
        let node = Node::start(name)
            .with_position(x, y)
            .with_width(self.config.start_node_width);
        self.graph.add_node(node)
    }

    /// Set a node's binding for one data input; false if the node is gone
    pub fn set_binding(&mut self, node: NodeId, input: &str, expr: impl Into<String>) -> bool {
        self.graph.update_node(node, NodeUpdate::binding(input, expr))
    }

    /// Rename a node; false if the node is gone
    pub fn rename_node(&mut self, node: NodeId, name: impl Into<String>) -> bool {
        self.graph.update_node(node, NodeUpdate::name(name))
    }

    /// Connect two ports
    pub fn connect(
        &mut self,
        source_node: NodeId,
        source_port: PortId,
        target_node: NodeId,
        target_port: PortId,
    ) -> Result<EdgeId, EdgeError> {
        self.graph
            .connect(source_node, source_port, target_node, target_port)
            .inspect_err(|e| tracing::debug!("Rejected connection: {e}"))
    }

    /// Store the view's rendered endpoints for an edge; false if the edge is gone
    pub fn set_edge_endpoints(&mut self, edge: EdgeId, start: Pos2, end: Pos2) -> bool {
        self.graph
            .update_edge(edge, EdgeUpdate::endpoints([start.x, start.y], [end.x, end.y]))
    }

    /// Delete one node (and its edges), purging them from the selection
    pub fn delete_node(&mut self, node: NodeId) -> Removal {
        let removal = self.graph.remove_node(node);
        self.selection.purge(&removal);
        removal
    }

    /// Delete one edge, purging it from the selection
    pub fn delete_edge(&mut self, edge: EdgeId) -> Removal {
        let removal = Removal {
            nodes: Vec::new(),
            edges: self.graph.remove_edge(edge).map(|e| e.id).into_iter().collect(),
        };
        self.selection.purge(&removal);
        removal
    }

    /// Delete everything selected
    pub fn delete_selection(&mut self) -> Removal {
        selection::delete_selection(&mut self.graph, &mut self.selection)
    }

    /// Copy the selection to the clipboard
    pub fn copy(&mut self) -> usize {
        self.clipboard.copy(&self.graph, &self.selection)
    }

    /// Copy, then delete the selection
    pub fn cut(&mut self) -> Removal {
        self.clipboard.cut(&mut self.graph, &mut self.selection)
    }

    /// Paste the clipboard and select the result
    pub fn paste(&mut self) -> PasteOutcome {
        self.clipboard
            .paste(&mut self.graph, &mut self.selection, self.naming.as_ref())
    }

    /// Validate the live graph
    pub fn validate(&self) -> ValidationReport {
        validation::validate(&self.graph)
    }

    // ---- pointer entry points ----

    /// Pointer pressed on a node.
    ///
    /// Ctrl/Cmd or Shift add the node to the selection; a plain press on
    /// an unselected node selects it alone. A press on an already selected
    /// node leaves the selection as it is, so the whole group can be
    /// dragged. Starts a drag of every selected node.
    pub fn node_pressed(&mut self, node: NodeId, pointer: Pos2, modifiers: Modifiers) {
        if self.modal_open || !self.graph.contains_node(node) {
            return;
        }

        let additive = is_toggle_modifier(modifiers) || modifiers.shift;
        if !self.selection.is_node_selected(node) {
            self.selection.select_node(node, additive);
        }

        self.drag = Some(NodeDrag::begin(
            &self.graph,
            self.selection.selected_nodes().iter().copied(),
            pointer,
            self.config.drag_threshold,
        ));
    }

    /// Edge clicked: Ctrl/Cmd toggles, Shift adds, otherwise select alone
    pub fn edge_clicked(&mut self, edge: EdgeId, modifiers: Modifiers) {
        if self.modal_open || !self.graph.contains_edge(edge) {
            return;
        }
        if is_toggle_modifier(modifiers) {
            self.selection.toggle_edge_selection(edge);
        } else {
            self.selection.select_edge(edge, modifiers.shift);
        }
    }

    /// Pointer pressed on empty canvas.
    ///
    /// The primary button starts a marquee. Any other button clears the
    /// selection unless Ctrl/Cmd is held.
    pub fn background_pressed(&mut self, pointer: Pos2, button: PointerButton, modifiers: Modifiers) {
        if self.modal_open {
            return;
        }
        if button == PointerButton::Primary {
            self.rect_selector.start(pointer);
        } else if !is_toggle_modifier(modifiers) {
            self.selection.clear_selection();
        }
    }

    /// Pointer moved: advances the active drag or marquee
    pub fn pointer_moved(&mut self, pointer: Pos2) {
        if self.modal_open {
            return;
        }
        if let Some(drag) = &mut self.drag {
            drag.update(&mut self.graph, pointer);
        } else {
            self.rect_selector.update(pointer);
        }
    }

    /// Pointer released: ends the drag, or finishes the marquee (additive
    /// with Ctrl/Cmd). Returns true if a dragged node actually moved.
    ///
    /// A release always ends the gesture. With a modal open the marquee
    /// is discarded without touching the selection.
    pub fn pointer_released(&mut self, modifiers: Modifiers, bounds: Option<&dyn NodeBounds>) -> bool {
        if let Some(drag) = self.drag.take() {
            return drag.moved();
        }
        if self.modal_open {
            self.rect_selector.cancel();
            return false;
        }
        self.rect_selector.finish(
            is_toggle_modifier(modifiers),
            &self.graph,
            &mut self.selection,
            bounds,
        );
        false
    }

    // ---- keyboard ----

    /// Handle a key press; returns true if it mapped to an action
    pub fn key_pressed(&mut self, key: Key, modifiers: Modifiers) -> bool {
        match EditorAction::from_key(key, modifiers) {
            Some(action) => self.perform(action),
            None => false,
        }
    }

    /// Run an action; returns false when blocked by a modal
    pub fn perform(&mut self, action: EditorAction) -> bool {
        if self.modal_open {
            return false;
        }
        match action {
            EditorAction::Delete => {
                self.delete_selection();
            }
            EditorAction::SelectAll => self.selection.select_all(&self.graph),
            EditorAction::Copy => {
                self.copy();
            }
            EditorAction::Cut => {
                self.cut();
            }
            EditorAction::Paste => {
                self.paste();
            }
            EditorAction::Escape => {
                if self.rect_selector.is_selecting() {
                    self.rect_selector.cancel();
                } else {
                    self.selection.clear_selection();
                }
            }
        }
        true
    }
}

impl Default for GraphEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
