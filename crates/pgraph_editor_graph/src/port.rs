// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs on both graph layers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a port.
///
/// Port ids are unique across the whole graph, not only within their node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Logical layer a port or edge lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Execution order between nodes
    #[default]
    Control,
    /// Value flow from outputs to inputs
    Data,
}

impl Layer {
    /// The other layer
    pub fn toggled(self) -> Self {
        match self {
            Self::Control => Self::Data,
            Self::Data => Self::Control,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control => f.write_str("control"),
            Self::Data => f.write_str("data"),
        }
    }
}

/// Primitive value kinds carried by data ports.
///
/// Control ports carry no value and use [`DataType::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// UTF-8 string
    String,
    /// Boolean
    Bool,
    /// Signed 32-bit integer
    #[serde(alias = "int")]
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 32-bit integer
    Uint32,
    /// Unsigned 64-bit integer
    Uint64,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// No value (control-flow ports)
    #[serde(rename = "None", alias = "none")]
    None,
}

impl DataType {
    /// Whether this is a signed integer kind
    pub fn is_signed_integer(self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }

    /// Whether this is an unsigned integer kind
    pub fn is_unsigned_integer(self) -> bool {
        matches!(self, Self::Uint32 | Self::Uint64)
    }

    /// Whether this is a floating point kind
    pub fn is_floating(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Lowercase tag as used in function signatures
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::None => "None",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name used for the control ports every node carries
pub const CONTROL_PORT_NAME: &str = "control";

/// A port on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Port name, unique among the node's data inputs (or outputs)
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Layer this port belongs to
    pub layer: Layer,
    /// Value kind
    pub data_type: DataType,
}

impl Port {
    /// Create a new port
    pub fn new(
        id: PortId,
        name: impl Into<String>,
        direction: PortDirection,
        layer: Layer,
        data_type: DataType,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            direction,
            layer,
            data_type,
        }
    }

    /// Create the control-flow input every node carries
    pub fn control_input() -> Self {
        Self::new(
            PortId::new(),
            CONTROL_PORT_NAME,
            PortDirection::Input,
            Layer::Control,
            DataType::None,
        )
    }

    /// Create the control-flow output every node carries
    pub fn control_output() -> Self {
        Self::new(
            PortId::new(),
            CONTROL_PORT_NAME,
            PortDirection::Output,
            Layer::Control,
            DataType::None,
        )
    }

    /// Create a new data input port
    pub fn data_input(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(PortId::new(), name, PortDirection::Input, Layer::Data, data_type)
    }

    /// Create a new data output port
    pub fn data_output(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(PortId::new(), name, PortDirection::Output, Layer::Data, data_type)
    }

    /// Check if an edge from this port to `target` is structurally valid
    pub fn can_connect(&self, target: &Port) -> bool {
        self.direction == PortDirection::Output
            && target.direction == PortDirection::Input
            && self.layer == target.layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_ports() {
        let input = Port::control_input();
        let output = Port::control_output();
        assert_eq!(input.layer, Layer::Control);
        assert_eq!(output.data_type, DataType::None);
        assert_ne!(input.id, output.id);
        assert!(output.can_connect(&input));
        assert!(!input.can_connect(&output));
    }

    #[test]
    fn test_layers_must_match() {
        let control = Port::control_output();
        let data = Port::data_input("x", DataType::Int32);
        assert!(!control.can_connect(&data));
    }

    #[test]
    fn test_data_type_tags() {
        let ty: DataType = serde_json::from_str("\"int\"").unwrap();
        assert_eq!(ty, DataType::Int32);
        let ty: DataType = serde_json::from_str("\"uint64\"").unwrap();
        assert_eq!(ty, DataType::Uint64);
        assert_eq!(serde_json::to_string(&DataType::None).unwrap(), "\"None\"");
        assert!(DataType::Double.is_floating());
        assert!(!DataType::Uint32.is_signed_integer());
    }
}
