// SPDX-License-Identifier: MIT OR Apache-2.0
//! Debounced watching of a single graph document.
//!
//! The parent directory is watched non-recursively and events are filtered
//! down to the document path, so editors that save by rename still trigger
//! a reload.

use notify_debouncer_full::{
    new_debouncer,
    notify::{self, EventKind, RecommendedWatcher, RecursiveMode},
    DebounceEventResult, Debouncer, RecommendedCache,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

/// Default debounce window
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Events for the watched document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// Written or re-created
    Changed,
    /// Deleted or moved away
    Removed,
    /// Watcher reported an error
    Error(String),
}

/// Watches one document file
pub struct DocumentWatcher {
    _watcher: Debouncer<RecommendedWatcher, RecommendedCache>,
    event_rx: Receiver<DocumentEvent>,
    path: PathBuf,
}

impl DocumentWatcher {
    /// Start watching `path`
    pub fn new(path: &Path, debounce: Duration) -> Result<Self, notify::Error> {
        let path = std::path::absolute(path).map_err(notify::Error::io)?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let (event_tx, event_rx) = mpsc::channel();
        let target = path.clone();

        let mut watcher = new_debouncer(debounce, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    for event in events {
                        if !event.paths.iter().any(|p| p == &target) {
                            continue;
                        }
                        let mapped = match event.kind {
                            EventKind::Create(_) | EventKind::Modify(_) => DocumentEvent::Changed,
                            EventKind::Remove(_) => DocumentEvent::Removed,
                            EventKind::Any | EventKind::Access(_) | EventKind::Other => continue,
                        };
                        let _ = event_tx.send(mapped);
                    }
                }
                Err(errors) => {
                    for error in errors {
                        let _ = event_tx.send(DocumentEvent::Error(error.to_string()));
                    }
                }
            }
        })?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!("Watching {:?} for changes", path);

        Ok(Self {
            _watcher: watcher,
            event_rx,
            path,
        })
    }

    /// Absolute path being watched
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the next event, or `None` once the watcher is gone.
    ///
    /// Bursts of events are coalesced: after the first event, anything
    /// already queued is drained and the last one wins.
    pub fn next_event(&self) -> Option<DocumentEvent> {
        self.receive(None)
    }

    /// Wait for the next event, giving up after `timeout` when one is set
    fn receive(&self, timeout: Option<Duration>) -> Option<DocumentEvent> {
        let mut event = match timeout {
            Some(timeout) => self.event_rx.recv_timeout(timeout).ok()?,
            None => self.event_rx.recv().ok()?,
        };
        loop {
            match self.event_rx.recv_timeout(Duration::ZERO) {
                Ok(next) => event = next,
                Err(RecvTimeoutError::Timeout) => return Some(event),
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::warn!("Document watcher channel disconnected");
                    return Some(event);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone").join("graph.ron");
        assert!(DocumentWatcher::new(&path, DEFAULT_DEBOUNCE).is_err());
    }

    #[test]
    fn test_watch_reports_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.ron");
        std::fs::write(&path, "()").unwrap();
        let watcher = DocumentWatcher::new(&path, DEFAULT_DEBOUNCE).unwrap();
        assert!(watcher.path().is_absolute());
        assert!(watcher.path().ends_with("graph.ron"));
    }

    #[test]
    fn test_reports_changes_to_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.ron");
        let sibling = dir.path().join("other.ron");
        std::fs::write(&path, "()").unwrap();
        let watcher = DocumentWatcher::new(&path, Duration::from_millis(50)).unwrap();

        std::fs::write(&sibling, "()").unwrap();
        std::fs::write(&path, "(nodes: [])").unwrap();
        std::fs::write(&path, "(nodes: [], edges: [])").unwrap();

        let timeout = Some(Duration::from_secs(10));
        assert_eq!(watcher.receive(timeout), Some(DocumentEvent::Changed));

        std::fs::remove_file(&path).unwrap();
        let mut events = std::iter::from_fn(|| watcher.receive(timeout));
        assert!(events.any(|e| e == DocumentEvent::Removed));
    }
}
