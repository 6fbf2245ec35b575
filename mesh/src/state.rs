//! Cluster state table and its merge rules
//!
//! A node's knowledge of the cluster is a two-level map:
//! node id -> attribute key -> [`VersionedValue`]. Replicas converge by
//! exchanging whole tables and folding in whatever is strictly newer.

use std::collections::{btree_map::Entry, BTreeMap};

use serde::{Deserialize, Serialize};

use super::versioned::VersionedValue;

/// Attribute under which every node publishes its own gossip address.
pub const ADDRESS_KEY: &str = "address";

/// Versioned attributes of a single node.
pub type NodeState = BTreeMap<String, VersionedValue>;

/// Everything one node knows about the cluster, keyed by node id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterState {
    nodes: BTreeMap<String, NodeState>,
}

impl ClusterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, node_id: &str) -> Option<&NodeState> {
        self.nodes.get(node_id)
    }

    /// Look up a single attribute of a node.
    pub fn attribute(&self, node_id: &str, key: &str) -> Option<&VersionedValue> {
        self.nodes.get(node_id).and_then(|node| node.get(key))
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Author an attribute on `node_id`.
    ///
    /// A missing key is created at version 0. An existing key only changes
    /// (and bumps its version) when the value differs. Returns whether the
    /// table changed.
    pub fn set(&mut self, node_id: &str, key: &str, value: &str) -> bool {
        let node = self.nodes.entry(node_id.to_string()).or_default();
        match node.get_mut(key) {
            Some(existing) => existing.set(value),
            None => {
                node.insert(key.to_string(), VersionedValue::new(value));
                true
            }
        }
    }

    /// Gossip addresses of every other node that has published one.
    ///
    /// Nothing is ever evicted, so an address learned once stays a candidate
    /// for as long as the process lives.
    pub fn live_peers(&self, self_id: &str) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|(node_id, _)| node_id.as_str() != self_id)
            .filter_map(|(_, node)| node.get(ADDRESS_KEY))
            .map(|addr| addr.value.clone())
            .collect()
    }

    // ========================================================================
    // Delta / merge
    // ========================================================================

    /// Entries of `from` that are strictly newer than what `to` holds.
    ///
    /// Unknown nodes are carried over whole (even when empty). For known nodes
    /// only keys that are missing from `to`, or present with a lower version,
    /// make it into the delta.
    pub fn delta(from: &ClusterState, to: &ClusterState) -> ClusterState {
        let mut diff = ClusterState::new();

        for (node_id, from_node) in &from.nodes {
            let Some(to_node) = to.nodes.get(node_id) else {
                diff.nodes.insert(node_id.clone(), from_node.clone());
                continue;
            };

            let newer = diff_node(from_node, to_node);
            if !newer.is_empty() {
                diff.nodes.insert(node_id.clone(), newer);
            }
        }

        diff
    }

    /// Fold `from` into `self`, returning the delta that was applied.
    ///
    /// This is a per-key max-version join, so repeating it with the same
    /// input changes nothing.
    pub fn merge(&mut self, from: &ClusterState) -> ClusterState {
        let diff = Self::delta(from, self);
        self.apply(&diff);
        diff
    }

    fn apply(&mut self, diff: &ClusterState) {
        for (node_id, diff_node) in &diff.nodes {
            match self.nodes.entry(node_id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(diff_node.clone());
                }
                Entry::Occupied(mut slot) => {
                    let node = slot.get_mut();
                    for (key, value) in diff_node {
                        node.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    }
}

fn diff_node(from: &NodeState, to: &NodeState) -> NodeState {
    from.iter()
        .filter(|(key, value)| match to.get(key.as_str()) {
            None => true,
            Some(current) => value.supersedes(current),
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl FromIterator<(String, NodeState)> for ClusterState {
    fn from_iter<I: IntoIterator<Item = (String, NodeState)>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
