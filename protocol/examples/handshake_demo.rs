//! Walkthrough of one ephemeral handshake per supported curve.
//!
//! Prints each side's public point, confirms both sides derived the same
//! secret, and shows what happens when a peer sends a compressed point.
//!
//! Run with:
//!   cargo run --example handshake_demo

use ember_protocol::config::{HandshakeConfig, SUPPORTED_CURVES};
use ember_protocol::handshake::HandshakeSession;
use ember_protocol::peer::{Peer, PeerDirectory, PeerStore};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";

fn short_hex(bytes: &[u8]) -> String {
    let full = hex::encode(bytes);
    if full.len() <= 24 {
        return full;
    }
    format!("{}..{}", &full[..12], &full[full.len() - 8..])
}

fn main() {
    let peers = PeerStore::new();
    peers.add_peer(&Peer::new("alice")).expect("add alice");
    peers.add_peer(&Peer::new("bob")).expect("add bob");

    for name in SUPPORTED_CURVES {
        println!("{BOLD}== {name} =={RESET}");
        let config = HandshakeConfig::with_curve(name);

        let mut alice = HandshakeSession::initiate(&config).expect("alice initiates");
        let mut bob = HandshakeSession::initiate(&config).expect("bob initiates");
        let alice_pub = alice.local_public_bytes().expect("alice public").clone();
        let bob_pub = bob.local_public_bytes().expect("bob public").clone();

        println!("  alice -> {} {DIM}({} bytes){RESET}", short_hex(alice_pub.as_bytes()), alice_pub.len());
        println!("  bob   -> {} {DIM}({} bytes){RESET}", short_hex(bob_pub.as_bytes()), bob_pub.len());

        let a = alice.complete(bob_pub.as_bytes(), b"bob", &peers).expect("alice completes");
        let b = bob.complete(alice_pub.as_bytes(), b"alice", &peers).expect("bob completes");

        if a.shared_secret() == b.shared_secret() {
            println!("  {GREEN}secrets match{RESET} {DIM}({} bytes){RESET}", a.shared_secret().len());
        } else {
            println!("  {RED}secrets differ{RESET}");
        }

        let mut carol = HandshakeSession::initiate(&config).expect("carol initiates");
        let mut compressed = bob_pub.as_bytes().to_vec();
        compressed[0] = 0x02;
        match carol.complete(&compressed, b"bob", &peers) {
            Ok(_) => println!("  {RED}compressed point accepted{RESET}"),
            Err(e) => println!("  compressed point rejected: {DIM}{e}{RESET}"),
        }
        println!();
    }
}
