// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node naming policies.

use crate::graph::GraphStore;

/// Resolves a desired display name against the nodes already in a graph.
///
/// Used by node creation and paste. Implemented for any
/// `Fn(&str, &GraphStore) -> String`.
pub trait NamingPolicy {
    /// Return a name not used by any node in `existing`
    fn unique_name(&self, desired: &str, existing: &GraphStore) -> String;
}

impl<F> NamingPolicy for F
where
    F: Fn(&str, &GraphStore) -> String,
{
    fn unique_name(&self, desired: &str, existing: &GraphStore) -> String {
        self(desired, existing)
    }
}

/// Picks `prefix`, then `prefix-1`, `prefix-2`, ... until unused.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixNaming;

impl NamingPolicy for SuffixNaming {
    fn unique_name(&self, desired: &str, existing: &GraphStore) -> String {
        unique_node_name(desired, existing)
    }
}

/// `prefix`, `prefix-1`, `prefix-2`, ... whichever is first unused
pub fn unique_node_name(prefix: &str, existing: &GraphStore) -> String {
    if !existing.contains_name(prefix) {
        return prefix.to_string();
    }
    (1..)
        .map(|i| format!("{prefix}-{i}"))
        .find(|name| !existing.contains_name(name))
        .unwrap_or_else(|| prefix.to_string())
}
