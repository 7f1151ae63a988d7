//! paths module provides the insertion-ordered mappings from dotted
//! path to tree node that back the known and pending field listings.

use std::collections::HashMap;

use crate::schema::tree::NodeId;

/// An insertion-ordered mapping from dotted path to node.
///
/// Keyed lookups go through a hash map; iteration follows the order in
/// which paths were first inserted. Re-setting an existing path keeps
/// its original position.
#[derive(Debug, Clone, Default)]
pub(crate) struct PathMap {
    order: Vec<String>,
    index: HashMap<String, NodeId>,
}

impl PathMap {
    /// Insert or update a path.
    pub(crate) fn set(&mut self, path: impl Into<String>, node: NodeId) {
        let path = path.into();
        if self.index.insert(path.clone(), node).is_none() {
            self.order.push(path);
        }
    }

    /// Remove a path if present.
    pub(crate) fn delete(&mut self, path: &str) {
        if self.index.remove(path).is_some() {
            self.order.retain(|p| p != path);
        }
    }

    /// Look up the node registered for a path.
    pub(crate) fn get(&self, path: &str) -> Option<NodeId> {
        self.index.get(path).copied()
    }

    /// Number of registered paths.
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Iterate paths and nodes in insertion order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.order.iter().map(|p| (p.as_str(), self.index[p]))
    }

    /// Paths sorted by depth, deepest first.
    ///
    /// Depth is the number of `.` separators in the dotted path; ties
    /// keep insertion order. This is the iteration contract of the
    /// diagnostic listings.
    pub(crate) fn keys_by_depth_desc(&self) -> Vec<&str> {
        let depth_of = |p: &str| p.matches('.').count();
        let max_depth = self.iter().map(|(p, _)| depth_of(p)).max().unwrap_or(0);

        let mut sorted = Vec::with_capacity(self.order.len());
        for depth in (0..=max_depth).rev() {
            for (path, _) in self.iter() {
                if depth_of(path) == depth {
                    sorted.push(path);
                }
            }
        }
        sorted
    }
}
