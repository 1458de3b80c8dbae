// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # EMBER Protocol: Ephemeral Key Exchange Core
//!
//! Bootstraps a secure channel between two peers: a fresh elliptic-curve key
//! pair per connection, a canonical wire encoding for public points, and an
//! ECDH shared secret that feeds a downstream key-stretching step.
//!
//! ## Architecture
//!
//! - **crypto**: curves, point codec, ephemeral key pairs, ECDH, and the
//!   stretched key material container.
//! - **peer**: the add/lookup interface for known peers, plus an in-memory store.
//! - **handshake**: per-connection session tying the above together.
//! - **config**: protocol constants and the handshake configuration.
//!
//! ## Quick start
//!
//! ```
//! use ember_protocol::config::HandshakeConfig;
//! use ember_protocol::handshake::HandshakeSession;
//! use ember_protocol::peer::{Peer, PeerDirectory, PeerStore};
//!
//! let peers = PeerStore::new();
//! peers.add_peer(&Peer::new("bob")).unwrap();
//! peers.add_peer(&Peer::new("alice")).unwrap();
//!
//! let config = HandshakeConfig::default();
//! let mut alice = HandshakeSession::initiate(&config).unwrap();
//! let mut bob = HandshakeSession::initiate(&config).unwrap();
//! let alice_pub = alice.local_public_bytes().unwrap().clone();
//! let bob_pub = bob.local_public_bytes().unwrap().clone();
//!
//! let a = alice.complete(bob_pub.as_bytes(), b"bob", &peers).unwrap();
//! let b = bob.complete(alice_pub.as_bytes(), b"alice", &peers).unwrap();
//! assert_eq!(a.shared_secret(), b.shared_secret());
//! ```
//!
//! ## Ground rules
//!
//! 1. No field or group arithmetic of our own. RustCrypto does that.
//! 2. Secrets are zeroized when they go out of scope and never logged.
//! 3. Bad peer input fails one handshake, never the process.

pub mod config;
pub mod crypto;
pub mod handshake;
pub mod peer;
