//! Configuration for the gossip broadcast engine.

use std::time::Duration;

/// Configuration options for [`GossipEngine`](crate::GossipEngine) and its
/// retry scheduler.
#[derive(Debug, Clone)]
pub struct GossipConfig {
    /// Fixed period of the retry scheduler.
    ///
    /// Every tick re-sends all (neighbor, value) pairs still awaiting an
    /// acknowledgment. This is the sole recovery mechanism for transport-level
    /// message loss.
    ///
    /// Default: 1s
    pub retry_interval: Duration,

    /// Capacity of the outgoing gossip channel between the engine and the
    /// transport layer.
    ///
    /// A full channel drops the send attempt; the pending entry stays in
    /// place and the next tick re-sends it, so the drop is lossless at the
    /// protocol level.
    ///
    /// Default: 1024
    pub outgoing_capacity: usize,
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_secs(1),
            outgoing_capacity: 1024,
        }
    }
}

impl GossipConfig {
    /// Set the retry interval.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Set the outgoing channel capacity.
    pub fn with_outgoing_capacity(mut self, capacity: usize) -> Self {
        self.outgoing_capacity = capacity;
        self
    }
}
