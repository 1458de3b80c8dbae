//! # Shared Secret Derivation
//!
//! Combines our ephemeral scalar with the peer's public point. The result is
//! the x-coordinate of `d·Q`, kept at full field width (32 / 48 / 66 bytes)
//! and handed to the key-stretching step untouched.
//!
//! The remote point is untrusted. Before any arithmetic happens it is checked
//! for curve agreement and then for curve membership; the identity and any
//! coordinate outside `[0, p)` are refused.

use num_bigint::BigUint;
use std::fmt;
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroizing;

use super::arith;
use super::curve::Curve;
use super::error::EphemeralError;
use super::keys::KeyPair;
use super::point::{self, PublicPoint};

/// Raw ECDH output: big-endian x-coordinate, `byte_length` bytes.
///
/// Zeroized on drop. Equality is constant-time.
pub struct SharedSecret {
    curve: Curve,
    bytes: Zeroizing<Vec<u8>>,
}

impl SharedSecret {
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Full-width big-endian bytes, leading zeros included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The secret as an integer. The caller owns zeroizing the copy.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.bytes)
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.curve == other.curve && bool::from(self.bytes.as_slice().ct_eq(other.bytes.as_slice()))
    }
}

impl Eq for SharedSecret {}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret({}, {} bytes, [REDACTED])", self.curve, self.bytes.len())
    }
}

/// Derive the ECDH shared secret between `local` and `remote`.
///
/// Errors, in the order they are checked:
/// - `UseAfterDestroy` if `local` has been destroyed;
/// - `CurveMismatch` if `remote` is on another curve;
/// - `InvalidRemotePoint` if `remote` is not a valid non-identity point.
///
/// ```
/// use ember_protocol::crypto::curve::resolve;
/// use ember_protocol::crypto::keys::KeyPair;
/// use ember_protocol::crypto::shared::derive;
///
/// let curve = resolve("P-256").unwrap();
/// let alice = KeyPair::generate(curve).unwrap();
/// let bob = KeyPair::generate(curve).unwrap();
///
/// let ab = derive(&alice, &bob.public_point().unwrap()).unwrap();
/// let ba = derive(&bob, &alice.public_point().unwrap()).unwrap();
/// assert_eq!(ab, ba);
/// assert_eq!(ab.len(), 32);
/// ```
pub fn derive(local: &KeyPair, remote: &PublicPoint) -> Result<SharedSecret, EphemeralError> {
    let scalar = local.scalar()?;
    let curve = local.curve();
    if remote.curve() != curve {
        return Err(EphemeralError::CurveMismatch {
            local: curve.name(),
            remote: remote.curve().name(),
        });
    }

    let bytes = arith::shared_x(curve, scalar, remote)?;
    debug!(curve = %curve, "derived ephemeral shared secret");
    Ok(SharedSecret { curve, bytes })
}

/// Decode the peer's wire bytes on our curve and [`derive`].
///
/// Malformed input surfaces as `InvalidEncoding`; a well-formed but bogus
/// point as `InvalidRemotePoint`.
pub fn derive_from_bytes(local: &KeyPair, remote: &[u8]) -> Result<SharedSecret, EphemeralError> {
    if local.is_destroyed() {
        return Err(EphemeralError::UseAfterDestroy);
    }
    let point = point::decode(local.curve(), remote)?;
    derive(local, &point)
}

/// Check an untrusted point without deriving anything.
pub fn validate_remote(remote: &PublicPoint) -> Result<(), EphemeralError> {
    arith::validate_point(remote)
}
