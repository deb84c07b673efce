//! Periodic resend of unacknowledged gossip.

use futures::FutureExt;
use futures_timer::Delay;
use std::time::Duration;

use crate::engine::GossipEngine;

/// Fixed-interval background loop that re-sends every still-pending
/// (neighbor, value) pair.
///
/// This is the sole mechanism recovering from transport-level message loss:
/// an entry that never gets acknowledged is re-sent on every tick, forever.
/// A tick only enumerates the table and queues sends; it never awaits the
/// transport, so a slow or hung send cannot stall subsequent ticks.
pub struct RetryScheduler {
    engine: GossipEngine,
    interval: Duration,
}

impl RetryScheduler {
    /// Create a scheduler for `engine`, using the configured retry interval.
    pub fn new(engine: &GossipEngine) -> Self {
        Self {
            engine: engine.clone(),
            interval: engine.config().retry_interval,
        }
    }

    /// The tick period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one tick: re-send every currently pending pair.
    ///
    /// Re-sending re-marks the pending entry, a no-op state-wise. Pairs
    /// acknowledged before the tick are not enumerated and not re-sent.
    pub fn tick(&self) {
        for (neighbor, value) in self.engine.pending().snapshot() {
            self.engine.gossip(&neighbor, value);
        }
    }

    /// Run the scheduler until the engine shuts down.
    ///
    /// This should be spawned as a background task.
    pub async fn run(&self) {
        let shutdown_rx = self.engine.shutdown_signal();
        let mut interval = Delay::new(self.interval);

        loop {
            // Wait for either the tick or the shutdown signal
            let shutdown_recv = shutdown_rx.recv().fuse();
            futures::pin_mut!(shutdown_recv);

            futures::select! {
                _ = (&mut interval).fuse() => {
                    interval.reset(self.interval);
                }
                _ = shutdown_recv => {
                    break;
                }
            }

            if self.engine.is_shutdown() {
                break;
            }

            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GossipConfig, GossipSend, NodeId};

    #[test]
    fn test_tick_resends_only_pending() {
        let (engine, handle) = GossipEngine::new(NodeId::from("n1"), GossipConfig::default());
        let n2 = NodeId::from("n2");
        let n3 = NodeId::from("n3");

        engine.gossip(&n2, 42);
        engine.gossip(&n3, 42);
        engine.handle_ack(&n2, 42, crate::message::BROADCAST_OK);

        // Drop the initial sends so only tick output remains.
        while handle.try_next_outgoing().is_some() {}

        RetryScheduler::new(&engine).tick();

        let resent = handle.try_next_outgoing();
        assert_eq!(resent, Some(GossipSend { target: n3.clone(), value: 42 }));
        assert!(handle.try_next_outgoing().is_none());
        assert!(engine.pending().contains(&n3, 42));
    }

    #[test]
    fn test_tick_with_empty_table_sends_nothing() {
        let (engine, handle) = GossipEngine::new(NodeId::from("n1"), GossipConfig::default());
        RetryScheduler::new(&engine).tick();
        assert!(handle.try_next_outgoing().is_none());
    }

    #[tokio::test]
    async fn test_run_exits_on_shutdown() {
        let (engine, _handle) = GossipEngine::new(
            NodeId::from("n1"),
            GossipConfig::default().with_retry_interval(Duration::from_millis(10)),
        );
        let scheduler = RetryScheduler::new(&engine);

        let task = tokio::spawn(async move { scheduler.run().await });
        engine.shutdown();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("scheduler did not stop after shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_resends_until_acknowledged() {
        let (engine, handle) = GossipEngine::new(
            NodeId::from("n1"),
            GossipConfig::default().with_retry_interval(Duration::from_millis(10)),
        );
        let n2 = NodeId::from("n2");
        engine.gossip(&n2, 7);

        let scheduler = RetryScheduler::new(&engine);
        let task = tokio::spawn(async move { scheduler.run().await });

        // The initial send plus at least one timer-driven resend.
        let mut sends = 0;
        while sends < 2 {
            if handle.next_outgoing().await.is_some() {
                sends += 1;
            }
        }

        engine.shutdown();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("scheduler did not stop after shutdown")
            .unwrap();
    }
}
