//! Per-neighbor tracking of gossip sends awaiting acknowledgment.

use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

use crate::message::{NodeId, Value};

/// Per-neighbor set of values sent but not yet acknowledged.
///
/// An entry is created pessimistically before each send attempt and removed
/// only when a matching acknowledgment arrives, never on timeout. If a
/// neighbor stays unreachable its entries persist indefinitely and are
/// re-sent every tick; there is no bound on that growth.
#[derive(Debug, Default)]
pub struct PendingAckTable {
    inner: Mutex<HashMap<NodeId, HashSet<Value>>>,
}

impl PendingAckTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` as awaiting acknowledgment from `neighbor`.
    ///
    /// Re-marking an already pending pair is a no-op; retries do not change
    /// the logical state.
    pub fn mark(&self, neighbor: &NodeId, value: Value) {
        self.inner
            .lock()
            .entry(neighbor.clone())
            .or_default()
            .insert(value);
    }

    /// Clear a pending entry after a matching acknowledgment.
    ///
    /// Returns `true` if the entry was present. Clearing an absent entry is a
    /// no-op; duplicate acknowledgments may legitimately arrive after a
    /// previous one already cleared the pair.
    pub fn acknowledge(&self, neighbor: &NodeId, value: Value) -> bool {
        let mut inner = self.inner.lock();
        let Some(values) = inner.get_mut(neighbor) else {
            return false;
        };
        let removed = values.remove(&value);
        if values.is_empty() {
            inner.remove(neighbor);
        }
        removed
    }

    /// Whether `value` is still awaiting acknowledgment from `neighbor`.
    pub fn contains(&self, neighbor: &NodeId, value: Value) -> bool {
        self.inner
            .lock()
            .get(neighbor)
            .is_some_and(|values| values.contains(&value))
    }

    /// Every (neighbor, value) pair currently pending.
    ///
    /// Copies under a short lock so the retry tick never holds it across a
    /// send.
    pub fn snapshot(&self) -> SmallVec<[(NodeId, Value); 16]> {
        let inner = self.inner.lock();
        let mut pairs = SmallVec::new();
        for (neighbor, values) in inner.iter() {
            for value in values {
                pairs.push((neighbor.clone(), *value));
            }
        }
        pairs
    }

    /// Total number of pending (neighbor, value) pairs.
    pub fn len(&self) -> usize {
        self.inner.lock().values().map(HashSet::len).sum()
    }

    /// Whether nothing is awaiting acknowledgment.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
