// SPDX-License-Identifier: MIT OR Apache-2.0
//! Saved graph documents.
//!
//! A document is the graph snapshot plus the canvas transform. Files ending
//! in `.json` are JSON; anything else is RON.

use pgraph_editor_graph::{Edge, GraphSnapshot, Node};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading or saving a [`GraphDocument`]
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Offending file
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// JSON (de)serialization failed
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// RON parse failed
    #[error("Invalid RON document: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON serialization failed
    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),
}

/// On-disk encoding of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.json`
    Json,
    /// Everything else
    Ron,
}

impl DocumentFormat {
    /// Pick the encoding from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Ron,
        }
    }
}

/// Canvas zoom and pan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Zoom factor
    pub scale: f32,
    /// Horizontal pan
    #[serde(rename = "panX", default, skip_serializing_if = "Option::is_none")]
    pub pan_x: Option<f32>,
    /// Vertical pan
    #[serde(rename = "panY", default, skip_serializing_if = "Option::is_none")]
    pub pan_y: Option<f32>,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan_x: None,
            pan_y: None,
        }
    }
}

/// A graph as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Nodes in insertion order
    pub nodes: Vec<Node>,
    /// Edges on both layers
    pub edges: Vec<Edge>,
    /// Canvas transform
    #[serde(default)]
    pub transform: ViewTransform,
}

impl GraphDocument {
    /// Wrap a snapshot with a default transform
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        Self {
            nodes: snapshot.nodes,
            edges: snapshot.edges,
            transform: ViewTransform::default(),
        }
    }

    /// The graph part of the document
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Parse a document in the given format
    pub fn parse(content: &str, format: DocumentFormat) -> Result<Self, DocumentError> {
        Ok(match format {
            DocumentFormat::Json => serde_json::from_str(content)?,
            DocumentFormat::Ron => ron::from_str(content)?,
        })
    }

    /// Serialize the document in the given format
    pub fn encode(&self, format: DocumentFormat) -> Result<String, DocumentError> {
        Ok(match format {
            DocumentFormat::Json => serde_json::to_string_pretty(self)?,
            DocumentFormat::Ron => {
                let config = ron::ser::PrettyConfig::default()
                    .struct_names(false)
                    .enumerate_arrays(false);
                ron::ser::to_string_pretty(self, config)?
            }
        })
    }

    /// Load a document, picking the format from the extension
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let document = Self::parse(&content, DocumentFormat::from_path(path))?;
        tracing::debug!(
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            "Loaded document {:?}",
            path
        );
        Ok(document)
    }

    /// Save a document, picking the format from the extension
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let content = self.encode(DocumentFormat::from_path(path))?;
        std::fs::write(path, content).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("Saved document to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgraph_editor_graph::{DataType, FunctionConfig, GraphStore};

    fn sample() -> GraphDocument {
        let mut graph = GraphStore::new();
        let s = graph.add_node(Node::start("Start"));
        let config = FunctionConfig::new("scale")
            .with_input("factor", DataType::Float)
            .with_output("result", DataType::Float);
        let f = graph.add_node(
            Node::function(&config, "scale")
                .with_position(200.0, 80.0)
                .with_binding("factor", "2.5"),
        );
        let out = graph.node(s).unwrap().ports.control_output.id;
        let inp = graph.node(f).unwrap().ports.control_input.id;
        graph.connect(s, out, f, inp).unwrap();
        GraphDocument::from_snapshot(graph.clone_graph())
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a.JSON")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a.ron")), DocumentFormat::Ron);
        assert_eq!(DocumentFormat::from_path(Path::new("graph")), DocumentFormat::Ron);
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let document = sample();
        for name in ["graph.json", "graph.ron"] {
            let path = dir.path().join(name);
            document.save(&path).unwrap();
            assert_eq!(GraphDocument::load(&path).unwrap(), document);
        }
    }

    #[test]
    fn test_transform_keys() {
        let mut document = GraphDocument::default();
        document.transform.pan_x = Some(12.0);
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["transform"]["scale"], 1.0);
        assert_eq!(json["transform"]["panX"], 12.0);
        assert!(json["transform"].get("panY").is_none());
    }

    #[test]
    fn test_missing_transform_defaults() {
        let document =
            GraphDocument::parse(r#"{"nodes": [], "edges": []}"#, DocumentFormat::Json).unwrap();
        assert_eq!(document.transform, ViewTransform::default());
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = GraphDocument::load(&dir.path().join("missing.ron"));
        assert!(matches!(missing, Err(DocumentError::Io { .. })));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(GraphDocument::load(&path), Err(DocumentError::Json(_))));
    }
}
