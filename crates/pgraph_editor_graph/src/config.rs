// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor tunables, persisted as RON.

use crate::clipboard::DEFAULT_PASTE_OFFSET;
use crate::drag::DEFAULT_DRAG_THRESHOLD;
use crate::node::{FUNCTION_NODE_WIDTH, START_NODE_WIDTH};
use crate::rect_select::FALLBACK_NODE_HEIGHT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading or saving an [`EditorConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON for this config
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be serialized
    #[error("Config serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Tunables of the editing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Offset applied to pasted nodes
    pub paste_offset: [f32; 2],
    /// Node height assumed by marquee selection without measured bounds
    pub fallback_node_height: f32,
    /// Pointer travel below which a node drag counts as a click
    pub drag_threshold: f32,
    /// Base name for new start nodes
    pub start_node_name: String,
    /// Position of new start nodes
    pub start_node_position: [f32; 2],
    /// Width of new start nodes
    pub start_node_width: f32,
    /// Width of new function nodes
    pub function_node_width: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            paste_offset: [DEFAULT_PASTE_OFFSET.x, DEFAULT_PASTE_OFFSET.y],
            fallback_node_height: FALLBACK_NODE_HEIGHT,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            start_node_name: "Start".to_string(),
            start_node_position: [50.0, 50.0],
            start_node_width: START_NODE_WIDTH,
            function_node_width: FUNCTION_NODE_WIDTH,
        }
    }
}

impl EditorConfig {
    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = ron::from_str(&content)?;
        tracing::debug!("Loaded editor config from {:?}", path);
        Ok(config)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .depth_limit(3)
            .separate_tuple_members(true);
        let content = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
