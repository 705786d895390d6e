// SPDX-License-Identifier: MIT OR Apache-2.0
//! P-Graph Editor - headless pipeline graph tool
//!
//! Loads saved pipeline graphs and runs them through the editing engine:
//! - Binding validation with a per-node report
//! - Export of the execution payload
//! - Creation of new documents
//! - Watch mode that re-validates on every save
//!
//! ## Architecture
//!
//! All graph semantics live in `pgraph_editor_graph`. This binary only
//! handles documents, configuration and console output.

mod cli;
mod document;
mod report;
mod watcher;

use clap::Parser;
use cli::{Cli, Command};
use document::{DocumentError, GraphDocument};
use pgraph_editor_graph::{ConfigError, EditorConfig, ExecutionGraph, GraphEditor};
use std::path::Path;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use watcher::{DocumentEvent, DocumentWatcher, DEFAULT_DEBOUNCE};

const DEFAULT_LOG_FILTER: &str = "pgraph_editor_app=info,pgraph_editor_graph=info";

/// Failures surfaced to the user
#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Failed to encode execution payload: {0}")]
    Export(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Refusing to overwrite existing file {0}")]
    AlreadyExists(String),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify_debouncer_full::notify::Error),
}

/// Outcome of a successful run
enum Outcome {
    Clean,
    InvalidGraph,
}

fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(std::env::args_os()) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::InvalidGraph) => ExitCode::from(2),
        Err(AppError::Cli(e)) => {
            if let Err(io) = e.print() {
                tracing::error!("Failed to print usage: {io}");
            }
            if e.use_stderr() {
                ExitCode::from(64)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run<I, T>(args: I) -> Result<Outcome, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Validate { graph } => validate(&graph, config),
        Command::Export { graph, out } => {
            export(&graph, out.as_deref(), config)?;
            Ok(Outcome::Clean)
        }
        Command::New { graph } => {
            create(&graph, config)?;
            Ok(Outcome::Clean)
        }
        Command::Watch { graph } => {
            watch(&graph, config)?;
            Ok(Outcome::Clean)
        }
    }
}

fn open(path: &Path, config: EditorConfig) -> Result<GraphEditor, AppError> {
    let document = GraphDocument::load(path)?;
    let mut editor = GraphEditor::new(config);
    editor.load(document.snapshot());
    Ok(editor)
}

fn validate(path: &Path, config: EditorConfig) -> Result<Outcome, AppError> {
    let editor = open(path, config)?;
    let report = editor.validate();
    print!("{}", report::render(editor.graph(), &report));
    Ok(if report.is_valid() {
        Outcome::Clean
    } else {
        Outcome::InvalidGraph
    })
}

fn export(path: &Path, out: Option<&Path>, config: EditorConfig) -> Result<(), AppError> {
    let editor = open(path, config)?;
    let payload = ExecutionGraph::from_store(editor.graph());
    let json = serde_json::to_string_pretty(&payload)?;

    match out {
        Some(out) => {
            std::fs::write(out, json).map_err(|source| AppError::Write {
                path: out.display().to_string(),
                source,
            })?;
            tracing::info!(
                nodes = payload.nodes.len(),
                edges = payload.edges.len(),
                "Exported execution payload to {:?}",
                out
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn create(path: &Path, config: EditorConfig) -> Result<(), AppError> {
    if path.exists() {
        return Err(AppError::AlreadyExists(path.display().to_string()));
    }
    let mut editor = GraphEditor::new(config);
    editor.add_start_node();
    GraphDocument::from_snapshot(editor.snapshot()).save(path)?;
    Ok(())
}

fn watch(path: &Path, config: EditorConfig) -> Result<(), AppError> {
    let watcher = DocumentWatcher::new(path, DEFAULT_DEBOUNCE)?;
    let path = watcher.path();
    revalidate(path, &config);

    while let Some(event) = watcher.next_event() {
        match event {
            DocumentEvent::Changed => revalidate(path, &config),
            DocumentEvent::Removed => {
                tracing::warn!("{:?} was removed, waiting for it to return", path);
            }
            DocumentEvent::Error(e) => tracing::warn!("Watch error: {e}"),
        }
    }
    Ok(())
}

/// Validate once for watch mode; load errors are logged, not fatal
fn revalidate(path: &Path, config: &EditorConfig) {
    match validate(path, config.clone()) {
        Ok(Outcome::Clean) => tracing::info!("{:?} is valid", path),
        Ok(Outcome::InvalidGraph) => tracing::info!("{:?} has binding errors", path),
        Err(e) => tracing::warn!("{e}"),
    }
}
