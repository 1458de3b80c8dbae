//! # Protocol Configuration & Constants
//!
//! Every magic number in EMBER lives here. The wire tag, the curve names we
//! are willing to speak, and the sizes the key-stretching step must hit.
//!
//! Most of these values are shared with remote peers. Changing them is a wire
//! break, so treat edits here like protocol version bumps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::curve::{self, Curve};
use crate::crypto::error::EphemeralError;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The full version string of the key-exchange protocol.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Wire Format
// ---------------------------------------------------------------------------

/// Leading byte of an uncompressed SEC1 point. The only format we accept.
pub const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// SEC1 tags we explicitly refuse: compressed points (even / odd y).
pub const COMPRESSED_POINT_TAGS: [u8; 2] = [0x02, 0x03];

/// SEC1 tag for the point at infinity. Never valid on the wire.
pub const IDENTITY_POINT_TAG: u8 = 0x00;

// ---------------------------------------------------------------------------
// Curves
// ---------------------------------------------------------------------------

/// Curve names accepted during negotiation, in preference order.
pub const SUPPORTED_CURVES: [&str; 3] = ["P-256", "P-384", "P-521"];

/// Curve used when the configuration does not name one.
pub const DEFAULT_CURVE: &str = "P-256";

/// Upper bound on rejection-sampling rounds when drawing a private scalar.
///
/// For every supported curve a single draw lands in `[1, n-1]` with
/// probability above 1/2, so hitting this bound means the entropy source is
/// returning garbage.
pub const MAX_SCALAR_SAMPLING_ATTEMPTS: usize = 64;

// ---------------------------------------------------------------------------
// Stretched Key Sizes
// ---------------------------------------------------------------------------

/// Initialization vector length produced by the key-stretching step.
pub const STRETCHED_IV_LENGTH: usize = 16;

/// MAC key length produced by the key-stretching step (HMAC-SHA1 sized).
pub const STRETCHED_MAC_KEY_LENGTH: usize = 20;

/// Cipher key length for AES-128.
pub const AES_128_KEY_LENGTH: usize = 16;

/// Cipher key length for AES-256.
pub const AES_256_KEY_LENGTH: usize = 32;

/// Cipher key length for Blowfish.
pub const BLOWFISH_KEY_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Cipher Suites
// ---------------------------------------------------------------------------

/// Symmetric cipher the session will run once the handshake is done.
///
/// Only its key sizes matter to this crate: they tell the key-stretching
/// step how much material to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherSuite {
    #[serde(rename = "AES-128")]
    Aes128,
    #[serde(rename = "AES-256")]
    Aes256,
    #[serde(rename = "Blowfish")]
    Blowfish,
}

impl CipherSuite {
    /// Cipher key length in bytes.
    pub fn cipher_key_length(self) -> usize {
        match self {
            CipherSuite::Aes128 => AES_128_KEY_LENGTH,
            CipherSuite::Aes256 => AES_256_KEY_LENGTH,
            CipherSuite::Blowfish => BLOWFISH_KEY_LENGTH,
        }
    }

    /// IV length in bytes. Identical for every suite today.
    pub fn iv_length(self) -> usize {
        STRETCHED_IV_LENGTH
    }

    /// MAC key length in bytes. Identical for every suite today.
    pub fn mac_key_length(self) -> usize {
        STRETCHED_MAC_KEY_LENGTH
    }

    /// Wire name of the suite.
    pub fn name(self) -> &'static str {
        match self {
            CipherSuite::Aes128 => "AES-128",
            CipherSuite::Aes256 => "AES-256",
            CipherSuite::Blowfish => "Blowfish",
        }
    }
}

impl Default for CipherSuite {
    fn default() -> Self {
        CipherSuite::Aes256
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherSuite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AES-128" => Ok(CipherSuite::Aes128),
            "AES-256" => Ok(CipherSuite::Aes256),
            "Blowfish" => Ok(CipherSuite::Blowfish),
            other => Err(format!("unsupported cipher suite: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Handshake Configuration
// ---------------------------------------------------------------------------

/// Per-handshake settings, usually loaded from a JSON file or CLI flags.
///
/// ```
/// use ember_protocol::config::{CipherSuite, HandshakeConfig};
///
/// let cfg = HandshakeConfig::from_json(r#"{ "curve": "P-384", "cipher": "AES-128" }"#).unwrap();
/// assert_eq!(cfg.curve, "P-384");
/// assert_eq!(cfg.cipher, CipherSuite::Aes128);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeConfig {
    /// Curve name, resolved through the curve registry.
    pub curve: String,
    /// Cipher the stretched key material is sized for.
    pub cipher: CipherSuite,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            curve: DEFAULT_CURVE.to_string(),
            cipher: CipherSuite::default(),
        }
    }
}

impl HandshakeConfig {
    /// Build a config for a given curve name with the default cipher.
    pub fn with_curve(curve: impl Into<String>) -> Self {
        Self {
            curve: curve.into(),
            ..Self::default()
        }
    }

    /// Parse a config from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Resolve the configured curve. Fails with `UnknownCurve` for names we
    /// do not speak; there is no silent fallback.
    pub fn validate(&self) -> Result<Curve, EphemeralError> {
        curve::resolve(&self.curve)
    }
}
