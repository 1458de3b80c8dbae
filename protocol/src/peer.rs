//! # Peer Directory
//!
//! The handshake needs to know who it is talking to, but not how peers are
//! discovered or persisted. [`PeerDirectory`] is the minimal seam: append a
//! peer, look one up by id. [`PeerStore`] is the in-memory implementation
//! the node binary and the tests use.
//!
//! ## Semantics
//!
//! - Append-only. Adding an id twice keeps both entries; lookups return the
//!   first one added.
//! - Entries are copies. Mutating a `Peer` after `add_peer` does not change
//!   what the store holds.
//! - Ids compare by length first, then byte-for-byte.
//!
//! `PeerStore` guards its list with a `parking_lot::RwLock`, so concurrent
//! handshakes can look peers up without contending with each other.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors returned by peer directory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerError {
    #[error("peer not found: {0}")]
    NotFound(PeerId),

    #[error("peer id must not be empty")]
    EmptyId,
}

/// Opaque binary peer identifier.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(Vec<u8>);

impl PeerId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length check first, then content.
    fn matches(&self, other: &[u8]) -> bool {
        self.0.len() == other.len() && self.0.as_slice() == other
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for PeerId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// A known remote peer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub id: PeerId,
    /// Dialable addresses, in the order they were learned.
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl Peer {
    pub fn new(id: impl Into<PeerId>) -> Self {
        Self {
            id: id.into(),
            addresses: Vec::new(),
        }
    }

    pub fn with_address(mut self, addr: impl Into<String>) -> Self {
        self.addresses.push(addr.into());
        self
    }
}

/// One slot in a [`PeerStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerEntry {
    pub peer: Peer,
}

/// Append/lookup interface the handshake consumes.
pub trait PeerDirectory: Send + Sync {
    /// Store a copy of `peer`.
    fn add_peer(&self, peer: &Peer) -> Result<(), PeerError>;

    /// First peer whose id equals `id`, or `NotFound`.
    fn find_peer_by_id(&self, id: &[u8]) -> Result<Peer, PeerError>;
}

/// In-memory, append-only [`PeerDirectory`].
#[derive(Debug, Default)]
pub struct PeerStore {
    entries: RwLock<Vec<PeerEntry>>,
}

impl PeerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a ready-made entry.
    pub fn add_entry(&self, entry: PeerEntry) -> Result<(), PeerError> {
        if entry.peer.id.is_empty() {
            return Err(PeerError::EmptyId);
        }
        self.entries.write().push(entry);
        Ok(())
    }

    /// The first entry whose peer id equals `id`.
    pub fn get_entry(&self, id: &[u8]) -> Option<PeerEntry> {
        self.entries
            .read()
            .iter()
            .find(|entry| entry.peer.id.matches(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl PeerDirectory for PeerStore {
    fn add_peer(&self, peer: &Peer) -> Result<(), PeerError> {
        self.add_entry(PeerEntry { peer: peer.clone() })
    }

    fn find_peer_by_id(&self, id: &[u8]) -> Result<Peer, PeerError> {
        self.get_entry(id)
            .map(|entry| entry.peer)
            .ok_or_else(|| PeerError::NotFound(PeerId::new(id)))
    }
}
