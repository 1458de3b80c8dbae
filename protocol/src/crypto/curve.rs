//! # Curve Registry
//!
//! Maps a negotiated curve name to its parameters. This is the only place
//! curve *names* are looked at; everything downstream branches on the
//! resolved [`Curve`] value.
//!
//! | Name  | Field bits | Coordinate bytes | Encoded point |
//! |-------|-----------:|-----------------:|--------------:|
//! | P-256 | 256        | 32               | 65            |
//! | P-384 | 384        | 48               | 97            |
//! | P-521 | 521        | 66               | 133           |
//!
//! Adding a curve means adding a [`CurveId`] variant, its parameter row
//! below, and its arithmetic backend in `crypto::arith`.

use num_bigint::BigUint;
use std::fmt;
use std::str::FromStr;

use super::error::EphemeralError;

/// Identifier of a supported curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CurveId {
    /// NIST P-256 (secp256r1).
    P256,
    /// NIST P-384 (secp384r1).
    P384,
    /// NIST P-521 (secp521r1).
    P521,
}

/// Immutable parameters of a supported curve.
///
/// Cheap to copy. Two `Curve` values are equal iff they name the same curve.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Curve {
    id: CurveId,
    name: &'static str,
    bits: usize,
    order_hex: &'static str,
}

const P256: Curve = Curve {
    id: CurveId::P256,
    name: "P-256",
    bits: 256,
    order_hex: "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
};

const P384: Curve = Curve {
    id: CurveId::P384,
    name: "P-384",
    bits: 384,
    order_hex: "ffffffffffffffffffffffffffffffffffffffffffffffff\
                c7634d81f4372ddf581a0db248b0a77aecec196accc52973",
};

const P521: Curve = Curve {
    id: CurveId::P521,
    name: "P-521",
    bits: 521,
    order_hex: "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\
                fa51868783bf2f966b7fcc0148f709a5d03bb5c9b8899c47aebb6fb71e91386409",
};

const REGISTRY: [Curve; 3] = [P256, P384, P521];

/// Look up a curve by its wire name ("P-256", "P-384", "P-521").
///
/// Matching is exact. An unknown name is an error, never a fallback.
///
/// ```
/// use ember_protocol::crypto::curve::resolve;
///
/// let curve = resolve("P-521").unwrap();
/// assert_eq!(curve.byte_length(), 66);
/// assert!(resolve("secp256k1").is_err());
/// ```
pub fn resolve(name: &str) -> Result<Curve, EphemeralError> {
    REGISTRY
        .iter()
        .find(|c| c.name == name)
        .copied()
        .ok_or_else(|| EphemeralError::UnknownCurve(name.to_string()))
}

/// All supported curves, smallest first.
pub fn supported() -> &'static [Curve] {
    &REGISTRY
}

impl Curve {
    /// The parameters for a given identifier.
    pub fn from_id(id: CurveId) -> Curve {
        match id {
            CurveId::P256 => P256,
            CurveId::P384 => P384,
            CurveId::P521 => P521,
        }
    }

    pub fn id(&self) -> CurveId {
        self.id
    }

    /// Wire name of the curve.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field size in bits.
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Coordinate width on the wire: `ceil(bits / 8)`.
    pub fn byte_length(&self) -> usize {
        self.bits.div_ceil(8)
    }

    /// Exact length of an encoded uncompressed point: `2 * byte_length + 1`.
    pub fn encoded_point_length(&self) -> usize {
        2 * self.byte_length() + 1
    }

    /// Order `n` of the base point.
    pub fn order(&self) -> BigUint {
        // The table above is static and reviewed; a parse failure is a
        // programming error caught by the registry tests.
        BigUint::parse_bytes(self.order_hex.as_bytes(), 16).unwrap_or_default()
    }

    /// Bit length of the group order. Equal to `bits` for every NIST prime curve.
    pub fn order_bits(&self) -> usize {
        self.order().bits() as usize
    }

    /// Width of a private scalar in bytes.
    pub fn scalar_length(&self) -> usize {
        self.order_bits().div_ceil(8)
    }
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Curve({})", self.name)
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl FromStr for Curve {
    type Err = EphemeralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SUPPORTED_CURVES;

    #[test]
    fn test_resolve_known_curves() {
        for name in SUPPORTED_CURVES {
            let curve = resolve(name).unwrap();
            assert_eq!(curve.name(), name);
            assert_eq!(Curve::from_id(curve.id()), curve);
        }
    }

    #[test]
    fn test_resolve_unknown_curve() {
        assert_eq!(
            resolve("P-192"),
            Err(EphemeralError::UnknownCurve("P-192".to_string()))
        );
        // Matching is exact: no case folding, no aliases.
        assert!(resolve("p-256").is_err());
        assert!(resolve("secp256r1").is_err());
        assert!(resolve("").is_err());
    }

    #[test]
    fn test_byte_lengths() {
        let lengths: Vec<_> = supported()
            .iter()
            .map(|c| (c.byte_length(), c.encoded_point_length()))
            .collect();
        assert_eq!(lengths, vec![(32, 65), (48, 97), (66, 133)]);
    }

    #[test]
    fn test_orders_parse_and_match_field_size() {
        for curve in supported() {
            let order = curve.order();
            assert!(order > BigUint::from(0u8), "{} order must parse", curve);
            assert_eq!(curve.order_bits(), curve.bits());
            assert_eq!(curve.scalar_length(), curve.byte_length());
        }
    }

    #[test]
    fn test_p521_bits_not_byte_aligned() {
        let curve = resolve("P-521").unwrap();
        assert_ne!(curve.bits() % 8, 0);
        assert_eq!(curve.byte_length() * 8 - curve.bits(), 7);
    }

    #[test]
    fn test_from_str() {
        let curve: Curve = "P-384".parse().unwrap();
        assert_eq!(curve.id(), CurveId::P384);
        assert_eq!(curve.to_string(), "P-384");
    }
}
