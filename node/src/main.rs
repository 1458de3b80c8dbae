// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # EMBER Node Tool
//!
//! Entry point for the `ember-node` binary. Parses CLI arguments,
//! initializes logging, and runs one of the subcommands:
//!
//! - `curves`  : list supported curves and wire sizes
//! - `keygen`  : generate ephemeral key pairs, print public points
//! - `exchange`: run a local two-party handshake
//! - `stress`  : run many handshakes concurrently
//! - `version` : print build version information
//!
//! Private scalars and shared secrets are never printed. `exchange` shows a
//! SHA-256 fingerprint of the secret so two runs can be compared by eye.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;

use ember_protocol::config::{HandshakeConfig, PROTOCOL_VERSION};
use ember_protocol::crypto::curve;
use ember_protocol::crypto::keys::KeyPair;
use ember_protocol::handshake::HandshakeSession;
use ember_protocol::peer::{Peer, PeerDirectory, PeerStore};

use cli::{Commands, EmberNodeCli};

/// Peer ids used by the local two-party handshake.
const INITIATOR_ID: &str = "initiator";
const RESPONDER_ID: &str = "responder";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = EmberNodeCli::parse();
    logging::init_logging("ember_node=info,ember_protocol=warn", cli.log_format);

    match cli.command {
        Commands::Curves(args) => list_curves(args),
        Commands::Keygen(args) => keygen(args),
        Commands::Exchange(args) => exchange(args),
        Commands::Stress(args) => stress(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn list_curves(args: cli::CurvesArgs) -> Result<()> {
    if args.json {
        let rows: Vec<_> = curve::supported()
            .iter()
            .map(|c| {
                serde_json::json!({
                    "name": c.name(),
                    "bits": c.bits(),
                    "coordinate_bytes": c.byte_length(),
                    "encoded_point_bytes": c.encoded_point_length(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<8}{:>6}{:>14}{:>16}", "curve", "bits", "coord bytes", "encoded bytes");
    for c in curve::supported() {
        println!(
            "{:<8}{:>6}{:>14}{:>16}",
            c.name(),
            c.bits(),
            c.byte_length(),
            c.encoded_point_length()
        );
    }
    Ok(())
}

fn keygen(args: cli::KeygenArgs) -> Result<()> {
    let config = args.handshake.resolve()?;
    let curve = config.validate().context("invalid handshake config")?;

    for _ in 0..args.count {
        let mut keypair = KeyPair::generate(curve).context("key generation failed")?;
        let public_hex = keypair.public_bytes()?.to_hex();
        keypair.destroy()?;

        if args.json {
            println!(
                "{}",
                serde_json::json!({ "curve": curve.name(), "public_key": public_hex })
            );
        } else {
            println!("{}", public_hex);
        }
    }
    tracing::info!(curve = %curve, count = args.count, "ephemeral keys generated");
    Ok(())
}

/// Outcome of one local handshake, with the secret reduced to a fingerprint.
struct ExchangeReport {
    initiator_public: String,
    responder_public: String,
    fingerprint: String,
    key_material_len: (usize, usize, usize),
}

/// Both sides of a handshake in one process.
fn run_local_exchange(config: &HandshakeConfig, peers: &dyn PeerDirectory) -> Result<ExchangeReport> {
    let mut initiator = HandshakeSession::initiate(config)?;
    let mut responder = HandshakeSession::initiate(config)?;
    let initiator_public = initiator.local_public_bytes()?.clone();
    let responder_public = responder.local_public_bytes()?.clone();

    let a = initiator.complete(responder_public.as_bytes(), RESPONDER_ID.as_bytes(), peers)?;
    let b = responder.complete(initiator_public.as_bytes(), INITIATOR_ID.as_bytes(), peers)?;

    if a.shared_secret() != b.shared_secret() {
        bail!("shared secrets differ between initiator and responder");
    }

    let suite = a.cipher();
    Ok(ExchangeReport {
        initiator_public: initiator_public.to_hex(),
        responder_public: responder_public.to_hex(),
        fingerprint: hex::encode(Sha256::digest(a.shared_secret().as_bytes())),
        key_material_len: (
            suite.cipher_key_length(),
            suite.iv_length(),
            suite.mac_key_length(),
        ),
    })
}

fn local_directory() -> Result<PeerStore> {
    let peers = PeerStore::new();
    peers.add_peer(&Peer::new(INITIATOR_ID))?;
    peers.add_peer(&Peer::new(RESPONDER_ID))?;
    Ok(peers)
}

fn exchange(args: cli::ExchangeArgs) -> Result<()> {
    let config = args.handshake.resolve()?;
    let peers = local_directory()?;
    let report = run_local_exchange(&config, &peers).context("local handshake failed")?;

    let (key, iv, mac) = report.key_material_len;
    println!("curve        : {}", config.curve);
    println!("cipher       : {} (key {} / iv {} / mac {} bytes)", config.cipher, key, iv, mac);
    println!("initiator    : {}", report.initiator_public);
    println!("responder    : {}", report.responder_public);
    println!("secret sha256: {}", report.fingerprint);
    Ok(())
}

async fn stress(args: cli::StressArgs) -> Result<()> {
    let config = Arc::new(args.handshake.resolve()?);
    config.validate().context("invalid handshake config")?;
    let peers = Arc::new(local_directory()?);

    tracing::info!(
        sessions = args.sessions,
        curve = %config.curve,
        "starting concurrent handshakes"
    );
    let started = Instant::now();

    let handles: Vec<_> = (0..args.sessions)
        .map(|_| {
            let config = Arc::clone(&config);
            let peers = Arc::clone(&peers);
            tokio::task::spawn_blocking(move || run_local_exchange(&config, peers.as_ref()))
        })
        .collect();

    let mut failures = 0usize;
    let mut fingerprints = std::collections::HashSet::new();
    for handle in handles {
        match handle.await.context("handshake task panicked")? {
            Ok(report) => {
                fingerprints.insert(report.fingerprint);
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(error = %e, "handshake failed");
            }
        }
    }

    let elapsed = started.elapsed();
    let completed = args.sessions - failures;
    println!("handshakes   : {} ok / {} failed", completed, failures);
    println!("distinct keys: {}", fingerprints.len());
    println!("elapsed      : {:.3}s", elapsed.as_secs_f64());
    if elapsed.as_secs_f64() > 0.0 {
        println!(
            "rate         : {:.1} handshakes/s",
            completed as f64 / elapsed.as_secs_f64()
        );
    }

    if failures > 0 {
        bail!("{} of {} handshakes failed", failures, args.sessions);
    }
    if fingerprints.len() != completed {
        bail!("ephemeral secrets repeated across sessions");
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("ember-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol   {}", PROTOCOL_VERSION);
    println!("curves     {}", ember_protocol::config::SUPPORTED_CURVES.join(", "));
}
