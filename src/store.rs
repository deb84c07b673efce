//! Seen-value tracking and the ordered log of accepted values.

use parking_lot::Mutex;
use std::collections::HashSet;

use crate::message::Value;

/// Tracks which values this node has seen and the ordered log of values it
/// has accepted.
///
/// The seen set and the log share one mutex so that the mark-then-append
/// sequence of a first admission cannot interleave with a concurrent
/// duplicate of the same value. Both grow monotonically for the process
/// lifetime; nothing is ever evicted.
#[derive(Debug, Default)]
pub struct MessageStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    seen: HashSet<Value>,
    log: Vec<Value>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically test whether `value` was already seen, marking it seen if
    /// not.
    ///
    /// Returns `true` if the value was already seen (a duplicate), `false` if
    /// this call newly admits it. This is the deduplication gate: only the
    /// caller that observed `false` may [`append`](Self::append) the value.
    pub fn has_seen_and_mark(&self, value: Value) -> bool {
        !self.inner.lock().seen.insert(value)
    }

    /// Append a newly admitted value to the log.
    ///
    /// Must only be called after [`has_seen_and_mark`](Self::has_seen_and_mark)
    /// returned `false` for `value`.
    pub fn append(&self, value: Value) {
        self.inner.lock().log.push(value);
    }

    /// A snapshot of the log in admission order.
    ///
    /// Clones under a short lock; concurrent appends are only delayed for the
    /// duration of the copy, never for the caller's use of the snapshot.
    pub fn snapshot(&self) -> Vec<Value> {
        self.inner.lock().log.clone()
    }

    /// Number of accepted values.
    pub fn len(&self) -> usize {
        self.inner.lock().log.len()
    }

    /// Whether no value has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_admission() {
        let store = MessageStore::new();
        assert!(!store.has_seen_and_mark(42));
        store.append(42);
        assert_eq!(store.snapshot(), vec![42]);
    }

    #[test]
    fn test_duplicate_detected() {
        let store = MessageStore::new();
        assert!(!store.has_seen_and_mark(7));
        assert!(store.has_seen_and_mark(7));
        assert!(store.has_seen_and_mark(7));
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let store = MessageStore::new();
        for v in [3, 1, 2] {
            assert!(!store.has_seen_and_mark(v));
            store.append(v);
        }
        assert_eq!(store.snapshot(), vec![3, 1, 2]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_concurrent_admission_is_exclusive() {
        use std::sync::Arc;

        let store = Arc::new(MessageStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                if !store.has_seen_and_mark(99) {
                    store.append(99);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        // Exactly one thread won the admission race.
        assert_eq!(store.snapshot(), vec![99]);
    }
}
