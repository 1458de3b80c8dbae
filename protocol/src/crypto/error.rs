//! Error types for the ephemeral key-exchange core.
//!
//! Every operation in [`crate::crypto`] that can fail returns an
//! [`EphemeralError`]. All variants are local and recoverable: the caller
//! aborts the one handshake that hit them, nothing else.

use thiserror::Error;

/// Errors that can occur while generating, encoding, or combining
/// ephemeral keys.
///
/// Messages never include key material. A peer that sends garbage learns
/// nothing from our error text beyond "no".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EphemeralError {
    /// The curve name is not in the supported set.
    #[error("unknown curve: {0}")]
    UnknownCurve(String),

    /// Entropy sourcing or curve arithmetic failed while producing a key.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Wire bytes are malformed: wrong length or unsupported format tag.
    #[error("invalid point encoding: {0}")]
    InvalidEncoding(String),

    /// The peer's point lives on a different curve than our key.
    #[error("curve mismatch: local key is {local}, remote point is {remote}")]
    CurveMismatch {
        /// Curve of the local key pair.
        local: &'static str,
        /// Curve of the remote point.
        remote: &'static str,
    },

    /// The peer's point is off the curve, out of range, or the identity.
    #[error("invalid remote point on {0}")]
    InvalidRemotePoint(&'static str),

    /// The key pair was already destroyed.
    #[error("ephemeral key used after destruction")]
    UseAfterDestroy,

    /// Stretched key material does not have the size the cipher needs.
    #[error("{field} has {actual} bytes, expected {expected}")]
    KeyMaterialLength {
        /// Which buffer is off.
        field: &'static str,
        /// Length the cipher suite expects.
        expected: usize,
        /// Length actually present.
        actual: usize,
    },
}
