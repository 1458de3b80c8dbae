//! # CLI Interface
//!
//! Command-line structure for `ember-node`, built with `clap` derive.
//! Handshake options can come from flags, from a JSON config file, or from
//! `EMBER_*` environment variables; flags win over the file.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use ember_protocol::config::{CipherSuite, HandshakeConfig};

use crate::logging::LogFormat;

/// EMBER ephemeral key-exchange tool.
///
/// Inspects the supported curves, generates ephemeral public keys, and runs
/// local handshakes to check that both sides agree on a secret.
#[derive(Parser, Debug)]
#[command(
    name = "ember-node",
    about = "EMBER ephemeral key-exchange tool",
    version,
    propagate_version = true
)]
pub struct EmberNodeCli {
    /// Log output format.
    #[arg(
        long,
        global = true,
        value_enum,
        env = "EMBER_LOG_FORMAT",
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported curves and their wire sizes.
    Curves(CurvesArgs),
    /// Generate ephemeral key pairs and print their encoded public points.
    Keygen(KeygenArgs),
    /// Run a local two-party handshake and print a fingerprint of the secret.
    Exchange(ExchangeArgs),
    /// Run many concurrent local handshakes and report throughput.
    Stress(StressArgs),
    /// Print version information and exit.
    Version,
}

/// Curve and cipher selection shared by the key-exchange subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct HandshakeArgs {
    /// Path to a JSON handshake config (`{ "curve": ..., "cipher": ... }`).
    #[arg(long, short = 'c', env = "EMBER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Curve name: P-256, P-384 or P-521.
    #[arg(long, env = "EMBER_CURVE")]
    pub curve: Option<String>,

    /// Cipher the key material is sized for: AES-128, AES-256 or Blowfish.
    #[arg(long)]
    pub cipher: Option<CipherSuite>,
}

impl HandshakeArgs {
    /// Merge the config file (if any) with flag overrides.
    pub fn resolve(&self) -> Result<HandshakeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                HandshakeConfig::from_json(&raw)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => HandshakeConfig::default(),
        };
        if let Some(curve) = &self.curve {
            config.curve = curve.clone();
        }
        if let Some(cipher) = self.cipher {
            config.cipher = cipher;
        }
        Ok(config)
    }
}

/// Arguments for the `curves` subcommand.
#[derive(Args, Debug)]
pub struct CurvesArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    #[command(flatten)]
    pub handshake: HandshakeArgs,

    /// Number of key pairs to generate.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,

    /// Emit JSON lines instead of bare hex.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `exchange` subcommand.
#[derive(Args, Debug)]
pub struct ExchangeArgs {
    #[command(flatten)]
    pub handshake: HandshakeArgs,
}

/// Arguments for the `stress` subcommand.
#[derive(Args, Debug)]
pub struct StressArgs {
    #[command(flatten)]
    pub handshake: HandshakeArgs,

    /// Number of handshakes to run.
    #[arg(long, short = 'n', default_value_t = 256)]
    pub sessions: usize,
}
