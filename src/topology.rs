//! Current neighbor adjacency for the local node.

use parking_lot::RwLock;

use crate::message::{NodeId, Topology};

/// Holds the cluster adjacency mapping and answers neighbor queries for the
/// local node.
///
/// The mapping is replaced wholesale on every update. Reads and replacements
/// go through the same lock; a fan-out reading the neighbor list can never
/// observe a half-applied topology.
#[derive(Debug)]
pub struct TopologyTable {
    local_id: NodeId,
    inner: RwLock<Topology>,
}

impl TopologyTable {
    /// Create an empty table for `local_id`.
    pub fn new(local_id: NodeId) -> Self {
        Self {
            local_id,
            inner: RwLock::new(Topology::new()),
        }
    }

    /// The local node's id.
    pub fn local_id(&self) -> &NodeId {
        &self.local_id
    }

    /// Replace the full adjacency mapping. No history is retained.
    pub fn set(&self, topology: Topology) {
        *self.inner.write() = topology;
    }

    /// The local node's direct neighbors under the current topology.
    ///
    /// Empty until a topology has been set, or if the current topology has no
    /// entry for this node.
    pub fn neighbors_of_self(&self) -> Vec<NodeId> {
        self.inner
            .read()
            .get(&self.local_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology(entries: &[(&str, &[&str])]) -> Topology {
        entries
            .iter()
            .map(|(node, neighbors)| {
                (
                    NodeId::from(*node),
                    neighbors.iter().map(|n| NodeId::from(*n)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_before_set() {
        let table = TopologyTable::new(NodeId::from("n1"));
        assert!(table.neighbors_of_self().is_empty());
    }

    #[test]
    fn test_neighbors_of_self() {
        let table = TopologyTable::new(NodeId::from("n1"));
        table.set(topology(&[("n1", &["n2", "n3"]), ("n2", &["n1"])]));
        assert_eq!(
            table.neighbors_of_self(),
            vec![NodeId::from("n2"), NodeId::from("n3")]
        );
    }

    #[test]
    fn test_replacement_is_total() {
        let table = TopologyTable::new(NodeId::from("n1"));
        table.set(topology(&[("n1", &["n2", "n3"])]));
        table.set(topology(&[("n1", &["n4"])]));
        // No residue from the prior topology.
        assert_eq!(table.neighbors_of_self(), vec![NodeId::from("n4")]);
    }

    #[test]
    fn test_missing_self_entry() {
        let table = TopologyTable::new(NodeId::from("n1"));
        table.set(topology(&[("n2", &["n3"])]));
        assert!(table.neighbors_of_self().is_empty());
    }
}
