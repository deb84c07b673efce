//! Transport abstraction for delivering gossip requests.
//!
//! The engine never talks to the network directly: a [`Transport`] issues the
//! actual `broadcast` RPC to a neighbor and resolves with whatever response
//! eventually comes back. On a lossy transport the returned future may stay
//! pending forever; the runner tolerates that, and recovery is the retry
//! scheduler's job.

use std::future::Future;

use crate::message::{NodeId, Reply, Value};

/// Issues point-to-point `broadcast` RPCs to neighbors.
#[auto_impl::auto_impl(Box, Arc)]
pub trait Transport: Send + Sync + 'static {
    /// Error type for transport operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue a `broadcast` RPC carrying `value` to `target`.
    ///
    /// Resolves with the neighbor's response when and if it arrives. An error
    /// models a synchronous send failure; the caller logs it and leaves
    /// recovery to the retry scheduler.
    fn rpc(
        &self,
        target: &NodeId,
        value: Value,
    ) -> impl Future<Output = Result<Reply, Self::Error>> + Send;
}

/// One RPC surfaced by [`ChannelTransport`].
///
/// Send the neighbor's response on `reply_tx`, or drop it to fail the RPC.
#[derive(Debug)]
pub struct RpcExchange {
    /// Neighbor the request is addressed to.
    pub target: NodeId,
    /// Value carried by the request.
    pub value: Value,
    /// Where to deliver the response.
    pub reply_tx: async_channel::Sender<Reply>,
}

/// A channel-based transport that surfaces each RPC as an [`RpcExchange`].
///
/// Useful for testing or when delivery is handled by an external process
/// loop: the consumer decides whether and how each request is answered.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: async_channel::Sender<RpcExchange>,
}

impl ChannelTransport {
    /// Create a channel transport with a new bounded channel.
    ///
    /// Returns the transport and the receiver of surfaced exchanges.
    pub fn bounded(capacity: usize) -> (Self, async_channel::Receiver<RpcExchange>) {
        let (tx, rx) = async_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

/// Error type for channel transport.
#[derive(Debug, Clone)]
pub struct ChannelTransportError(pub String);

impl std::fmt::Display for ChannelTransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "channel transport error: {}", self.0)
    }
}

impl std::error::Error for ChannelTransportError {}

impl Transport for ChannelTransport {
    type Error = ChannelTransportError;

    async fn rpc(&self, target: &NodeId, value: Value) -> Result<Reply, Self::Error> {
        let (reply_tx, reply_rx) = async_channel::bounded(1);
        self.tx
            .send(RpcExchange {
                target: target.clone(),
                value,
                reply_tx,
            })
            .await
            .map_err(|e| ChannelTransportError(e.to_string()))?;
        reply_rx
            .recv()
            .await
            .map_err(|e| ChannelTransportError(e.to_string()))
    }
}

/// A transport that acknowledges every RPC immediately.
///
/// Models a loss-free network in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AckTransport;

impl Transport for AckTransport {
    type Error = std::convert::Infallible;

    async fn rpc(&self, _target: &NodeId, _value: Value) -> Result<Reply, Self::Error> {
        Ok(Reply::BroadcastOk)
    }
}

/// A transport that loses every request: its RPC futures never resolve.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentTransport;

impl Transport for SilentTransport {
    type Error = std::convert::Infallible;

    async fn rpc(&self, _target: &NodeId, _value: Value) -> Result<Reply, Self::Error> {
        std::future::pending().await
    }
}
