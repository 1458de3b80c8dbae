//! # Ephemeral Key-Exchange Primitives
//!
//! Everything a handshake needs to agree on a secret with a peer:
//!
//! - **curve**: the supported NIST curves and their parameters.
//! - **point**: uncompressed SEC1 wire encoding of public points.
//! - **keys**: one-shot key pairs with an explicit destroy step.
//! - **shared**: ECDH with validation of the peer's point.
//! - **stretch**: the container the key-stretching step fills in.
//!
//! Curve arithmetic is delegated to the RustCrypto `p256`/`p384`/`p521`
//! crates behind a private `arith` module. We don't implement field or
//! group operations here, and nothing outside `arith` touches them.

mod arith;
pub mod curve;
pub mod error;
pub mod keys;
pub mod point;
pub mod shared;
pub mod stretch;

pub use curve::{resolve, Curve, CurveId};
pub use error::EphemeralError;
pub use keys::{KeyPair, KeyState};
pub use point::{decode, encode, EncodedPoint, PublicPoint};
pub use shared::{derive, derive_from_bytes, SharedSecret};
pub use stretch::StretchedKeyMaterial;
