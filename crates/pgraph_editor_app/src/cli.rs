// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Headless pipeline graph tool.
///
/// Documents ending in .json are JSON, anything else is RON.
#[derive(Debug, Parser)]
#[command(name = "pgraph_editor", version, about, long_about = None)]
pub struct Cli {
    /// Editor config file (RON)
    #[arg(long, short, global = true, value_name = "EDITOR_RON")]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// What to do
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Check input bindings, exit 2 on errors
    Validate {
        /// Graph document
        graph: PathBuf,
    },
    /// Write the execution payload as JSON, to stdout when no output is given
    Export {
        /// Source document
        graph: PathBuf,
        /// Destination file
        out: Option<PathBuf>,
    },
    /// Create a document holding one start node
    New {
        /// Document to create
        graph: PathBuf,
    },
    /// Re-validate whenever the document changes
    Watch {
        /// Graph document
        graph: PathBuf,
    },
}
