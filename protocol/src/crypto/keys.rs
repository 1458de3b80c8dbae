//! # Ephemeral Key Pairs
//!
//! One [`KeyPair`] per handshake attempt. It is created fresh from OS
//! entropy, used for exactly one ECDH derivation, and then destroyed.
//!
//! ## Lifecycle
//!
//! ```text
//!   generate() ──► Active ──destroy()──► Destroyed
//! ```
//!
//! The transition happens exactly once. A destroyed pair refuses every
//! operation with [`EphemeralError::UseAfterDestroy`] and its scalar buffer
//! reads as all zeros. Dropping an active pair zeroizes it as well, so an
//! abandoned handshake never leaves key material behind.
//!
//! ## Sampling
//!
//! The private scalar is drawn uniformly from `[1, n-1]` by rejection
//! sampling: fill `scalar_length` random bytes, mask off the bits above the
//! order's bit length, retry if the candidate is zero or `>= n`. Every draw
//! pulls fresh bytes from the RNG; there is no personalization label and no
//! reuse across calls.
//!
//! Key bytes are never logged. `Debug` shows the curve, the state and the
//! public point only.

use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use std::fmt;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use super::arith;
use super::curve::Curve;
use super::error::EphemeralError;
use super::point::{EncodedPoint, PublicPoint};
use crate::config::MAX_SCALAR_SAMPLING_ATTEMPTS;

/// Lifecycle state of a [`KeyPair`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    /// Scalar present, usable for one derivation.
    Active,
    /// Scalar wiped. Terminal.
    Destroyed,
}

/// An ephemeral EC key pair on one of the supported curves.
///
/// Owns the private scalar (big-endian, `scalar_length` bytes) and the
/// matching public point. The encoded public bytes are computed once at
/// construction and served from cache afterwards.
///
/// `KeyPair` is deliberately not `Clone`: a second copy of the scalar would
/// outlive `destroy()`.
///
/// # Examples
///
/// ```
/// use ember_protocol::crypto::curve::resolve;
/// use ember_protocol::crypto::keys::KeyPair;
///
/// let mut kp = KeyPair::generate(resolve("P-384").unwrap()).unwrap();
/// assert_eq!(kp.public_bytes().unwrap().len(), 97);
///
/// kp.destroy().unwrap();
/// assert!(kp.public_bytes().is_err());
/// assert!(kp.expose_scalar().iter().all(|b| *b == 0));
/// ```
pub struct KeyPair {
    curve: Curve,
    state: KeyState,
    scalar: Zeroizing<Vec<u8>>,
    public: PublicPoint,
    encoded: EncodedPoint,
}

impl KeyPair {
    /// Generate a fresh key pair from the operating system's CSPRNG.
    pub fn generate(curve: Curve) -> Result<Self, EphemeralError> {
        Self::generate_with_rng(curve, &mut OsRng)
    }

    /// Generate a fresh key pair from a caller-supplied CSPRNG.
    ///
    /// Fails with `KeyGeneration` if the RNG reports an error, or if
    /// [`MAX_SCALAR_SAMPLING_ATTEMPTS`] candidates in a row fall outside
    /// `[1, n-1]`. It never returns a zero or out-of-range key.
    pub fn generate_with_rng<R>(curve: Curve, rng: &mut R) -> Result<Self, EphemeralError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let order = padded_order(curve);
        let mask = top_byte_mask(curve);
        let mut candidate = Zeroizing::new(vec![0u8; curve.scalar_length()]);

        for attempt in 1..=MAX_SCALAR_SAMPLING_ATTEMPTS {
            rng.try_fill_bytes(&mut candidate)
                .map_err(|e| EphemeralError::KeyGeneration(format!("entropy source: {}", e)))?;
            candidate[0] &= mask;

            if in_scalar_range(&candidate, &order) {
                let kp = Self::from_scalar_bytes(curve, &candidate)?;
                debug!(
                    curve = %curve,
                    attempts = attempt,
                    "generated ephemeral key pair"
                );
                return Ok(kp);
            }
        }

        Err(EphemeralError::KeyGeneration(format!(
            "no valid scalar for {} after {} attempts",
            curve, MAX_SCALAR_SAMPLING_ATTEMPTS
        )))
    }

    /// Rebuild a key pair from a big-endian private scalar.
    ///
    /// `bytes` must be exactly `curve.scalar_length()` long and encode a
    /// value in `[1, n-1]`; anything else is a `KeyGeneration` error. Meant
    /// for known-answer tests and for callers that source scalars from an
    /// HSM. Handshakes should use [`KeyPair::generate`].
    pub fn from_scalar_bytes(curve: Curve, bytes: &[u8]) -> Result<Self, EphemeralError> {
        let public = arith::public_from_scalar(curve, bytes)?;
        let encoded = public.encode();
        Ok(Self {
            curve,
            state: KeyState::Active,
            scalar: Zeroizing::new(bytes.to_vec()),
            public,
            encoded,
        })
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == KeyState::Destroyed
    }

    /// The public point. Fails once the pair is destroyed.
    pub fn public_point(&self) -> Result<PublicPoint, EphemeralError> {
        self.ensure_active()?;
        Ok(self.public.clone())
    }

    /// The cached wire encoding of the public point (`0x04 || X || Y`).
    pub fn public_bytes(&self) -> Result<&EncodedPoint, EphemeralError> {
        self.ensure_active()?;
        Ok(&self.encoded)
    }

    /// Wipe the scalar and move to [`KeyState::Destroyed`].
    ///
    /// Destroying twice is a `UseAfterDestroy` error; the pair stays
    /// destroyed either way.
    pub fn destroy(&mut self) -> Result<(), EphemeralError> {
        self.ensure_active()?;
        self.wipe();
        debug!(curve = %self.curve, "ephemeral key pair destroyed");
        Ok(())
    }

    /// Raw view of the scalar buffer.
    ///
    /// Reads as all zeros after destruction. Exists so zeroization can be
    /// audited; do not log or persist the result.
    pub fn expose_scalar(&self) -> &[u8] {
        &self.scalar
    }

    /// Scalar for the derivation path. Active pairs only.
    pub(crate) fn scalar(&self) -> Result<&[u8], EphemeralError> {
        self.ensure_active()?;
        Ok(&self.scalar)
    }

    fn ensure_active(&self) -> Result<(), EphemeralError> {
        match self.state {
            KeyState::Active => Ok(()),
            KeyState::Destroyed => Err(EphemeralError::UseAfterDestroy),
        }
    }

    fn wipe(&mut self) {
        // Slice zeroize keeps the length, so the buffer still reads as zeros.
        self.scalar.as_mut_slice().zeroize();
        self.state = KeyState::Destroyed;
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        if self.state == KeyState::Active {
            self.wipe();
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("curve", &self.curve)
            .field("state", &self.state)
            .field("public", &self.encoded)
            .field("scalar", &"[REDACTED]")
            .finish()
    }
}

/// The group order as a big-endian buffer of `scalar_length` bytes.
fn padded_order(curve: Curve) -> Vec<u8> {
    let raw = curve.order().to_bytes_be();
    let mut out = vec![0u8; curve.scalar_length().saturating_sub(raw.len())];
    out.extend_from_slice(&raw);
    out
}

/// Mask for the leading byte so a candidate has at most `order_bits` bits.
fn top_byte_mask(curve: Curve) -> u8 {
    let excess = curve.scalar_length() * 8 - curve.order_bits();
    0xffu8 >> excess
}

/// `1 <= candidate < order`, both big-endian and equally long.
fn in_scalar_range(candidate: &[u8], order: &[u8]) -> bool {
    candidate.iter().any(|b| *b != 0) && candidate < order
}
