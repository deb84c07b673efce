//! Core gossip dissemination engine.
//!
//! Deduplicates inbound broadcasts, fans new values out to neighbors, and
//! tracks each fan-out as pending until the matching acknowledgment arrives.

use async_channel::{Receiver, Sender, TrySendError};
use bytes::Bytes;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    config::GossipConfig,
    error::Result,
    message::{self, NodeId, Reply, Request, Topology, Value},
    pending::PendingAckTable,
    store::MessageStore,
    topology::TopologyTable,
};

/// Core broadcast dissemination engine.
///
/// Handlers run on the transport layer's tasks; outbound gossip is pushed
/// onto a bounded channel consumed through [`GossipHandle`], so no handler
/// ever waits on the network. Cheap to clone; clones share state.
///
/// # Lifecycle of a (neighbor, value) pair
///
/// `Absent -> Pending` on [`gossip`](Self::gossip), `Pending -> Absent` on a
/// matching [`handle_ack`](Self::handle_ack). Retries re-run `gossip` while
/// `Pending`, which re-sends without changing the logical state. No timeout
/// ever clears a pending pair; an acknowledgment is the only way out.
pub struct GossipEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    /// Seen set and accepted-value log.
    store: MessageStore,

    /// Neighbor adjacency for the local node.
    topology: TopologyTable,

    /// Fan-outs awaiting acknowledgment.
    pending: PendingAckTable,

    /// Configuration.
    config: GossipConfig,

    /// Shutdown flag.
    shutdown: AtomicBool,

    /// Shutdown notification channel - receivers can wait on this for shutdown signal.
    shutdown_rx: Receiver<()>,

    /// Shutdown sender - closing this notifies all receivers.
    shutdown_tx: Sender<()>,

    /// Channel for outgoing gossip requests.
    outgoing_tx: Sender<GossipSend>,
}

/// An outbound gossip request the transport layer must deliver.
///
/// The expected successful response kind is
/// [`BROADCAST_OK`](crate::message::BROADCAST_OK); whoever drives the RPC
/// routes the eventual response back through
/// [`GossipEngine::handle_ack`] bound to this same (target, value) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GossipSend {
    /// Neighbor to deliver to.
    pub target: NodeId,
    /// Value being gossiped.
    pub value: Value,
}

impl GossipEngine {
    /// Create a new engine for the node identified by `local_id`.
    ///
    /// Returns the engine and the [`GossipHandle`] the transport layer uses
    /// to drain outgoing gossip requests.
    pub fn new(local_id: NodeId, config: GossipConfig) -> (Self, GossipHandle) {
        let (outgoing_tx, outgoing_rx) = async_channel::bounded(config.outgoing_capacity);
        // Shutdown channel - closing the sender notifies all receivers
        let (shutdown_tx, shutdown_rx) = async_channel::bounded(1);

        let inner = Arc::new(EngineInner {
            store: MessageStore::new(),
            topology: TopologyTable::new(local_id),
            pending: PendingAckTable::new(),
            config,
            shutdown: AtomicBool::new(false),
            shutdown_rx,
            shutdown_tx,
            outgoing_tx,
        });

        (Self { inner }, GossipHandle { outgoing_rx })
    }

    /// The local node's id.
    pub fn local_id(&self) -> &NodeId {
        self.inner.topology.local_id()
    }

    /// The engine configuration.
    pub fn config(&self) -> &GossipConfig {
        &self.inner.config
    }

    /// Handle a raw inbound request body from `from`.
    ///
    /// Decodes, dispatches, and encodes the reply. A malformed body aborts
    /// with [`Error::Decode`](crate::Error::Decode) and produces no reply.
    pub fn handle_message(&self, from: &NodeId, body: &[u8]) -> Result<Bytes> {
        let request = message::decode_request(body)?;
        let reply = self.handle_request(from, request);
        message::encode_reply(&reply)
    }

    /// Dispatch a decoded request to the matching handler.
    pub fn handle_request(&self, from: &NodeId, request: Request) -> Reply {
        match request {
            Request::Broadcast { message } => self.handle_broadcast(from, message),
            Request::Read => self.handle_read(),
            Request::Topology { topology } => self.handle_topology_update(topology),
        }
    }

    /// Handle an inbound broadcast of `value` from `from`.
    ///
    /// A duplicate is acknowledged immediately with no further action. A new
    /// value is appended to the log and fanned out to every neighbor except
    /// `from`; the reply never waits for any fan-out to complete.
    pub fn handle_broadcast(&self, from: &NodeId, value: Value) -> Reply {
        if self.inner.store.has_seen_and_mark(value) {
            return Reply::BroadcastOk;
        }
        self.inner.store.append(value);

        for neighbor in self.inner.topology.neighbors_of_self() {
            if &neighbor == from {
                continue;
            }
            self.gossip(&neighbor, value);
        }

        Reply::BroadcastOk
    }

    /// Queue a gossip send of `value` to `neighbor`.
    ///
    /// The pending entry is recorded before the send is issued, so a failed
    /// or lost send still leaves the pair eligible for the next retry tick.
    /// Never blocks: a full outgoing channel drops this attempt and defers to
    /// the scheduler, which is why a slow transport cannot stall a handler or
    /// a tick.
    pub fn gossip(&self, neighbor: &NodeId, value: Value) {
        self.inner.pending.mark(neighbor, value);

        match self.inner.outgoing_tx.try_send(GossipSend {
            target: neighbor.clone(),
            value,
        }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::debug!(%neighbor, value, "outgoing channel full, deferring to next retry tick");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(%neighbor, value, "outgoing channel closed, gossip not sent");
            }
        }
    }

    /// Handle the response to an earlier gossip send.
    ///
    /// Any `response_type` other than `broadcast_ok` is ignored. Clearing an
    /// already absent pair is a no-op, so duplicate acknowledgments are safe.
    pub fn handle_ack(&self, neighbor: &NodeId, value: Value, response_type: &str) {
        if response_type != message::BROADCAST_OK {
            return;
        }
        self.inner.pending.acknowledge(neighbor, value);
    }

    /// Replace the cluster topology.
    pub fn handle_topology_update(&self, topology: Topology) -> Reply {
        self.inner.topology.set(topology);
        Reply::TopologyOk
    }

    /// Answer a read query with the current log snapshot.
    pub fn handle_read(&self) -> Reply {
        Reply::ReadOk {
            messages: self.inner.store.snapshot(),
        }
    }

    /// The pending-acknowledgment table, for the retry scheduler and tests.
    pub fn pending(&self) -> &PendingAckTable {
        &self.inner.pending
    }

    /// Shut down the engine.
    ///
    /// Closes the outgoing channel and wakes every background loop waiting on
    /// the shutdown signal.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        self.inner.shutdown_tx.close();
        self.inner.outgoing_tx.close();
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Receiver resolved when shutdown is requested.
    pub(crate) fn shutdown_signal(&self) -> Receiver<()> {
        self.inner.shutdown_rx.clone()
    }
}

impl Clone for GossipEngine {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Handle for draining outgoing gossip requests from the engine.
///
/// The transport layer pulls [`GossipSend`] items from this handle, issues
/// the RPCs, and routes eventual responses back via
/// [`GossipEngine::handle_ack`].
pub struct GossipHandle {
    outgoing_rx: Receiver<GossipSend>,
}

impl GossipHandle {
    /// Wait for the next outgoing gossip request.
    ///
    /// Returns `None` once the engine has shut down and the queue drained.
    pub async fn next_outgoing(&self) -> Option<GossipSend> {
        self.outgoing_rx.recv().await.ok()
    }

    /// Take the next outgoing request without waiting, if one is queued.
    pub fn try_next_outgoing(&self) -> Option<GossipSend> {
        self.outgoing_rx.try_recv().ok()
    }

    /// Whether the engine side has closed the channel.
    pub fn is_closed(&self) -> bool {
        self.outgoing_rx.is_closed()
    }
}
