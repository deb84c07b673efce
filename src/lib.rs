//! # gossip-broadcast
//!
//! Reliable broadcast dissemination across a fixed set of cooperating nodes
//! whose transport may silently lose point-to-point messages.
//!
//! Every broadcast value reaches every node exactly-once-in-effect: values
//! are deduplicated at the application layer, fanned out to neighbors on
//! first sight, and every fan-out is tracked as pending until the neighbor
//! acknowledges it. A fixed-interval background loop re-sends whatever is
//! still pending, which is the sole recovery path for lost messages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Transport layer                         │
//! │     (inbound handlers, RPC delivery, response routing)       │
//! └──────────────┬───────────────────────────────▲──────────────┘
//!                │ handle_message()              │ GossipHandle / Transport
//! ┌──────────────▼───────────────────────────────┴──────────────┐
//! │                        GossipEngine                          │
//! │   (dedup, fan-out, ack tracking - fire-and-forget sends)     │
//! ├──────────────┬──────────────┬──────────────┬────────────────┤
//! │ MessageStore │ TopologyTable│ PendingAck   │ RetryScheduler │
//! │ (seen + log) │ (neighbors)  │ Table        │ (1s resend)    │
//! └──────────────┴──────────────┴──────────────┴────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use gossip_broadcast::{GossipConfig, GossipEngine, GossipRunner, NodeId};
//!
//! let (engine, handle) = GossipEngine::new(NodeId::from("n1"), GossipConfig::default());
//!
//! // Wire outbound gossip to your transport and spawn the background tasks.
//! let runner = GossipRunner::new(engine.clone(), handle, my_transport);
//! tokio::spawn(runner.run());
//!
//! // Feed inbound requests from the transport layer.
//! let reply = engine.handle_message(&from, body)?;
//! ```

#![deny(missing_docs)]

mod config;
mod engine;
mod error;
pub mod message;
mod pending;
mod retry;
mod runner;
mod store;
mod topology;
mod transport;

// Re-export config types
pub use config::GossipConfig;

// Re-export error types
pub use error::{Error, Result};

// Re-export wire types
pub use message::{decode_request, encode_reply, NodeId, Reply, Request, Topology, Value};

// Re-export core engine types
pub use engine::{GossipEngine, GossipHandle, GossipSend};

// Re-export state containers
pub use pending::PendingAckTable;
pub use store::MessageStore;
pub use topology::TopologyTable;

// Re-export scheduler and runner types
pub use retry::RetryScheduler;
pub use runner::GossipRunner;

// Re-export transport types
pub use transport::{
    AckTransport, ChannelTransport, ChannelTransportError, RpcExchange, SilentTransport, Transport,
};
