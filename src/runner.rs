//! Background task runner wiring the engine to a [`Transport`].
//!
//! The runner drains outgoing gossip requests from the [`GossipHandle`],
//! issues each as an independent RPC future, and routes eventual responses
//! back into [`GossipEngine::handle_ack`]. It also drives the retry
//! scheduler, so `run` is the only task a deployment needs to spawn.

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::sync::Arc;

use crate::{
    engine::{GossipEngine, GossipHandle, GossipSend},
    retry::RetryScheduler,
    transport::Transport,
};

/// Runs the broadcast background tasks over a [`Transport`].
pub struct GossipRunner<T> {
    engine: GossipEngine,
    handle: GossipHandle,
    transport: Arc<T>,
}

impl<T> GossipRunner<T>
where
    T: Transport,
{
    /// Create a new runner with the given transport.
    pub fn new(engine: GossipEngine, handle: GossipHandle, transport: T) -> Self {
        Self {
            engine,
            handle,
            transport: Arc::new(transport),
        }
    }

    /// Run all background tasks until the engine shuts down.
    ///
    /// This should be spawned as a background task.
    pub async fn run(self) {
        futures::future::join(self.run_retry_scheduler(), self.run_outgoing_processor()).await;
    }

    /// Run only the retry scheduler.
    pub async fn run_retry_scheduler(&self) {
        RetryScheduler::new(&self.engine).run().await;
    }

    /// Run the outgoing gossip processor.
    ///
    /// Each outbound request becomes its own in-flight future; a request
    /// whose response never arrives parks there without blocking anything
    /// else, and a failed RPC is only logged because the pending entry
    /// already guarantees a resend on the next tick.
    pub async fn run_outgoing_processor(&self) {
        let mut in_flight = FuturesUnordered::new();

        loop {
            futures::select! {
                outgoing = self.handle.next_outgoing().fuse() => {
                    let Some(GossipSend { target, value }) = outgoing else {
                        // Engine shut down and the queue drained.
                        break;
                    };
                    let transport = self.transport.clone();
                    in_flight.push(async move {
                        let outcome = transport.rpc(&target, value).await;
                        (target, value, outcome)
                    });
                }
                completed = in_flight.select_next_some() => {
                    let (target, value, outcome) = completed;
                    match outcome {
                        Ok(reply) => self.engine.handle_ack(&target, value, reply.kind()),
                        Err(e) => {
                            tracing::warn!(%target, value, error = %e, "gossip rpc failed, retrying on next tick");
                        }
                    }
                }
            }
        }
    }

    /// The engine driven by this runner.
    pub fn engine(&self) -> &GossipEngine {
        &self.engine
    }

    /// Shut down the engine and, with it, this runner.
    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AckTransport, GossipConfig, NodeId, SilentTransport};
    use std::collections::HashMap;
    use std::time::Duration;

    fn engine_with_neighbor(neighbor: &str) -> (GossipEngine, GossipHandle) {
        let (engine, handle) = GossipEngine::new(
            NodeId::from("n1"),
            GossipConfig::default().with_retry_interval(Duration::from_millis(10)),
        );
        let mut topology = HashMap::new();
        topology.insert(NodeId::from("n1"), vec![NodeId::from(neighbor)]);
        engine.handle_topology_update(topology);
        (engine, handle)
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_ack_transport_clears_pending() {
        let (engine, handle) = engine_with_neighbor("n2");
        let runner = GossipRunner::new(engine.clone(), handle, AckTransport);
        let task = tokio::spawn(runner.run());

        engine.handle_broadcast(&NodeId::from("c1"), 42);
        wait_until(|| engine.pending().is_empty()).await;

        engine.shutdown();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("runner did not stop after shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn test_silent_transport_keeps_pending() {
        let (engine, handle) = engine_with_neighbor("n2");
        let runner = GossipRunner::new(engine.clone(), handle, SilentTransport);
        let task = tokio::spawn(runner.run());

        engine.handle_broadcast(&NodeId::from("c1"), 42);

        // Give the retry loop a few ticks; nothing ever acknowledges.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(engine.pending().contains(&NodeId::from("n2"), 42));

        engine.shutdown();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("runner did not stop after shutdown")
            .unwrap();
    }
}
