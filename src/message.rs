//! Wire types for the broadcast protocol.
//!
//! Request and reply bodies are JSON objects tagged by a `type` field,
//! matching the transport layer's message contract:
//!
//! | Inbound kind | Body fields | Reply kind | Reply fields |
//! |---|---|---|---|
//! | `broadcast` | `message` | `broadcast_ok` | — |
//! | `read` | — | `read_ok` | `messages` |
//! | `topology` | `topology` | `topology_ok` | — |

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Identifier of one addressable node in the cluster.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One broadcast payload. Opaque beyond equality.
pub type Value = i64;

/// Adjacency mapping from node id to that node's direct neighbors.
///
/// Replaced wholesale on every topology update; never merged incrementally.
pub type Topology = HashMap<NodeId, Vec<NodeId>>;

/// Response kind that acknowledges a gossiped value.
pub const BROADCAST_OK: &str = "broadcast_ok";

/// Inbound request bodies understood by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// A value to disseminate to every node.
    Broadcast {
        /// The broadcast payload.
        message: Value,
    },
    /// Query for all values this node has accepted so far.
    Read,
    /// Replace the cluster adjacency mapping.
    Topology {
        /// The full adjacency mapping for every node.
        topology: Topology,
    },
}

/// Reply bodies produced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Acknowledges a `broadcast` request, duplicate or not.
    BroadcastOk,
    /// Answers a `read` request with the current log snapshot.
    ReadOk {
        /// Every value accepted so far, in admission order.
        messages: Vec<Value>,
    },
    /// Acknowledges a `topology` request.
    TopologyOk,
}

impl Reply {
    /// The wire kind string for this reply.
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::BroadcastOk => BROADCAST_OK,
            Reply::ReadOk { .. } => "read_ok",
            Reply::TopologyOk => "topology_ok",
        }
    }
}

/// Decode an inbound request body.
///
/// A malformed body aborts the enclosing request: the caller produces no
/// reply and surfaces the error to the transport layer.
pub fn decode_request(body: &[u8]) -> Result<Request> {
    serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))
}

/// Encode a reply body for the transport layer.
pub fn encode_reply(reply: &Reply) -> Result<Bytes> {
    serde_json::to_vec(reply)
        .map(Bytes::from)
        .map_err(|e| Error::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_broadcast() {
        let req = decode_request(br#"{"type":"broadcast","message":42}"#).unwrap();
        assert_eq!(req, Request::Broadcast { message: 42 });
    }

    #[test]
    fn test_decode_topology() {
        let req =
            decode_request(br#"{"type":"topology","topology":{"n1":["n2","n3"]}}"#).unwrap();
        match req {
            Request::Topology { topology } => {
                assert_eq!(
                    topology[&NodeId::from("n1")],
                    vec![NodeId::from("n2"), NodeId::from("n3")]
                );
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_decode_malformed_body() {
        assert!(decode_request(b"not json").is_err());
        assert!(decode_request(br#"{"type":"unknown"}"#).is_err());
        assert!(decode_request(br#"{"type":"broadcast"}"#).is_err());
    }

    #[test]
    fn test_encode_reply_wire_format() {
        let ok = encode_reply(&Reply::BroadcastOk).unwrap();
        assert_eq!(&ok[..], br#"{"type":"broadcast_ok"}"#);

        let read = encode_reply(&Reply::ReadOk {
            messages: vec![1, 2],
        })
        .unwrap();
        assert_eq!(&read[..], br#"{"type":"read_ok","messages":[1,2]}"#);
    }

    #[test]
    fn test_reply_kind() {
        assert_eq!(Reply::BroadcastOk.kind(), BROADCAST_OK);
        assert_eq!(Reply::ReadOk { messages: vec![] }.kind(), "read_ok");
        assert_eq!(Reply::TopologyOk.kind(), "topology_ok");
    }
}
