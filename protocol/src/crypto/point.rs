//! # Point Codec
//!
//! Wire encoding for ephemeral public keys: uncompressed SEC1.
//!
//! ```text
//! 0x04 || X || Y
//! ```
//!
//! `X` and `Y` are big-endian and left-padded with zeros to the curve's
//! coordinate width, so the length depends only on the curve (65 / 97 / 133
//! bytes). Compressed points and the identity are refused outright; we never
//! have to compute a square root on attacker-controlled input.
//!
//! Decoding is purely syntactic. Whether the coordinates actually describe a
//! point on the curve is checked when the point is used, in
//! [`crate::crypto::shared`].

use num_bigint::BigUint;
use std::fmt;

use super::curve::Curve;
use super::error::EphemeralError;
use crate::config::{COMPRESSED_POINT_TAGS, IDENTITY_POINT_TAG, UNCOMPRESSED_POINT_TAG};

/// Affine coordinates of a public point, tagged with the curve they belong to.
///
/// Coordinates are arbitrary-precision. A P-521 coordinate is 66 bytes wide
/// and must survive a round trip untouched.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicPoint {
    curve: Curve,
    x: BigUint,
    y: BigUint,
}

impl PublicPoint {
    /// Build a point from raw coordinates.
    ///
    /// Fails with `InvalidEncoding` if either coordinate does not fit in the
    /// curve's coordinate width. Membership on the curve is not checked here.
    pub fn from_coordinates(curve: Curve, x: BigUint, y: BigUint) -> Result<Self, EphemeralError> {
        let width = curve.byte_length();
        for (label, value) in [("x", &x), ("y", &y)] {
            if coordinate_width(value) > width {
                return Err(EphemeralError::InvalidEncoding(format!(
                    "{} coordinate wider than {} bytes for {}",
                    label, width, curve
                )));
            }
        }
        Ok(Self { curve, x, y })
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn x(&self) -> &BigUint {
        &self.x
    }

    pub fn y(&self) -> &BigUint {
        &self.y
    }

    /// Shorthand for [`encode`] on this point's own curve.
    pub fn encode(&self) -> EncodedPoint {
        encode(self.curve, self)
    }
}

impl fmt::Debug for PublicPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicPoint")
            .field("curve", &self.curve)
            .field("x", &format_args!("{:x}", self.x))
            .field("y", &format_args!("{:x}", self.y))
            .finish()
    }
}

/// Opaque wire bytes of an uncompressed point. Always `2 * byte_length + 1`
/// long when produced by [`encode`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedPoint(Vec<u8>);

impl EncodedPoint {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex of the wire bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for EncodedPoint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EncodedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedPoint({})", self.to_hex())
    }
}

/// Encode `point` for `curve` as `0x04 || X || Y`.
///
/// Infallible: [`PublicPoint::from_coordinates`] already guarantees both
/// coordinates fit the curve width. `curve` is normally `point.curve()`; the
/// width used is the one of `curve`.
///
/// ```
/// use ember_protocol::crypto::curve::resolve;
/// use ember_protocol::crypto::keys::KeyPair;
/// use ember_protocol::crypto::point::{decode, encode};
///
/// let curve = resolve("P-256").unwrap();
/// let kp = KeyPair::generate(curve).unwrap();
/// let point = kp.public_point().unwrap();
/// let wire = encode(curve, &point);
/// assert_eq!(wire.len(), 65);
/// assert_eq!(wire.as_bytes()[0], 0x04);
/// assert_eq!(decode(curve, wire.as_bytes()).unwrap(), point);
/// ```
pub fn encode(curve: Curve, point: &PublicPoint) -> EncodedPoint {
    let width = curve.byte_length();
    let mut out = Vec::with_capacity(curve.encoded_point_length());
    out.push(UNCOMPRESSED_POINT_TAG);
    write_padded(&mut out, point.x(), width);
    write_padded(&mut out, point.y(), width);
    EncodedPoint(out)
}

/// Parse wire bytes into a point on `curve`.
///
/// Rejects, with `InvalidEncoding`, any buffer whose length is not exactly
/// `2 * byte_length + 1` and any leading byte other than `0x04`.
pub fn decode(curve: Curve, bytes: &[u8]) -> Result<PublicPoint, EphemeralError> {
    let expected = curve.encoded_point_length();
    if bytes.len() != expected {
        return Err(EphemeralError::InvalidEncoding(format!(
            "expected {} bytes for {}, got {}",
            expected,
            curve,
            bytes.len()
        )));
    }

    match bytes[0] {
        UNCOMPRESSED_POINT_TAG => {}
        tag if COMPRESSED_POINT_TAGS.contains(&tag) => {
            return Err(EphemeralError::InvalidEncoding(
                "compressed points are not supported".to_string(),
            ));
        }
        IDENTITY_POINT_TAG => {
            return Err(EphemeralError::InvalidEncoding(
                "point at infinity".to_string(),
            ));
        }
        tag => {
            return Err(EphemeralError::InvalidEncoding(format!(
                "unknown point tag 0x{:02x}",
                tag
            )));
        }
    }

    let (x, y) = bytes[1..].split_at(curve.byte_length());
    Ok(PublicPoint {
        curve,
        x: BigUint::from_bytes_be(x),
        y: BigUint::from_bytes_be(y),
    })
}

fn coordinate_width(value: &BigUint) -> usize {
    (value.bits() as usize).div_ceil(8)
}

fn write_padded(out: &mut Vec<u8>, value: &BigUint, width: usize) {
    let bytes = value.to_bytes_be();
    // to_bytes_be() renders zero as a single 0x00 byte.
    let significant = if value.bits() == 0 { &[][..] } else { &bytes[..] };
    out.resize(out.len() + width.saturating_sub(significant.len()), 0);
    out.extend_from_slice(significant);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::curve::{resolve, supported};

    fn p256() -> Curve {
        resolve("P-256").unwrap()
    }

    #[test]
    fn test_encode_pads_small_coordinates() {
        let curve = p256();
        let point =
            PublicPoint::from_coordinates(curve, BigUint::from(1u8), BigUint::from(0x0203u16))
                .unwrap();
        let wire = encode(curve, &point);

        assert_eq!(wire.len(), 65);
        assert_eq!(wire.as_bytes()[0], 0x04);
        assert_eq!(wire.as_bytes()[32], 0x01);
        assert!(wire.as_bytes()[1..32].iter().all(|b| *b == 0));
        assert_eq!(&wire.as_bytes()[63..], &[0x02, 0x03]);
    }

    #[test]
    fn test_zero_coordinates_encode_full_width() {
        for curve in supported() {
            let point =
                PublicPoint::from_coordinates(*curve, BigUint::default(), BigUint::default())
                    .unwrap();
            let wire = encode(*curve, &point);
            assert_eq!(wire.len(), curve.encoded_point_length());
            assert!(wire.as_bytes()[1..].iter().all(|b| *b == 0));
        }
    }

    #[test]
    fn test_p521_top_byte_survives() {
        let curve = resolve("P-521").unwrap();
        // 521-bit all-ones coordinate: leading byte is 0x01, 66 bytes total.
        let max = (BigUint::from(1u8) << 521usize) - BigUint::from(1u8);
        let point = PublicPoint::from_coordinates(curve, max.clone(), max.clone()).unwrap();
        let wire = encode(curve, &point);

        assert_eq!(wire.len(), 133);
        assert_eq!(wire.as_bytes()[1], 0x01);
        assert_eq!(wire.as_bytes()[67], 0x01);
        let back = decode(curve, wire.as_bytes()).unwrap();
        assert_eq!(back.x(), &max);
        assert_eq!(back.y(), &max);
    }

    #[test]
    fn test_from_coordinates_rejects_oversized() {
        let curve = p256();
        let too_wide = BigUint::from(1u8) << 256usize;
        let err = PublicPoint::from_coordinates(curve, too_wide, BigUint::from(1u8)).unwrap_err();
        assert!(matches!(err, EphemeralError::InvalidEncoding(_)));
    }

    #[test]
    fn test_decode_rejects_bad_lengths() {
        let curve = p256();
        for len in [0usize, 1, 33, 64, 66, 97] {
            let mut bytes = vec![0u8; len];
            if let Some(first) = bytes.first_mut() {
                *first = 0x04;
            }
            assert!(
                matches!(decode(curve, &bytes), Err(EphemeralError::InvalidEncoding(_))),
                "length {} must be rejected",
                len
            );
        }
    }

    #[test]
    fn test_decode_rejects_non_uncompressed_tags() {
        let curve = p256();
        for tag in [0x00u8, 0x02, 0x03, 0x05, 0x06, 0x07, 0xff] {
            let mut bytes = vec![0u8; 65];
            bytes[0] = tag;
            assert!(
                matches!(decode(curve, &bytes), Err(EphemeralError::InvalidEncoding(_))),
                "tag 0x{:02x} must be rejected",
                tag
            );
        }
    }

    #[test]
    fn test_decode_splits_halves() {
        let curve = p256();
        let mut bytes = vec![0u8; 65];
        bytes[0] = 0x04;
        bytes[32] = 0xaa;
        bytes[64] = 0xbb;
        let point = decode(curve, &bytes).unwrap();
        assert_eq!(point.x(), &BigUint::from(0xaau8));
        assert_eq!(point.y(), &BigUint::from(0xbbu8));
        assert_eq!(point.curve(), curve);
    }

    #[test]
    fn test_decode_uses_curve_width() {
        // A valid P-256 length is the wrong length for P-384.
        let p384 = resolve("P-384").unwrap();
        let mut bytes = vec![0u8; 65];
        bytes[0] = 0x04;
        assert!(decode(p384, &bytes).is_err());
    }
}
