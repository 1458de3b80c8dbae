//! Curve arithmetic backend.
//!
//! Thin generic layer over the RustCrypto prime-order curves. Each helper is
//! written once against `elliptic_curve` traits and instantiated per curve in
//! a single `match` on [`CurveId`]. Scalar multiplication uses complete
//! formulas and is constant-time.
//!
//! Everything crossing this boundary is plain bytes or [`PublicPoint`], so
//! the rest of the crate never names a RustCrypto type.

use elliptic_curve::ecdh;
use elliptic_curve::sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint};
use elliptic_curve::{AffinePoint, CurveArithmetic, FieldBytesSize, PublicKey, SecretKey};
use num_bigint::BigUint;
use zeroize::Zeroizing;

use super::curve::{Curve, CurveId};
use super::error::EphemeralError;
use super::point::{self, PublicPoint};

/// Compute `d·G` for a big-endian scalar.
///
/// Fails with `KeyGeneration` if the scalar is zero, not below the group
/// order, or not exactly `scalar_length` bytes.
pub(crate) fn public_from_scalar(curve: Curve, scalar: &[u8]) -> Result<PublicPoint, EphemeralError> {
    if scalar.len() != curve.scalar_length() {
        return Err(EphemeralError::KeyGeneration(format!(
            "scalar must be {} bytes for {}, got {}",
            curve.scalar_length(),
            curve,
            scalar.len()
        )));
    }
    match curve.id() {
        CurveId::P256 => public_point::<p256::NistP256>(curve, scalar),
        CurveId::P384 => public_point::<p384::NistP384>(curve, scalar),
        CurveId::P521 => public_point::<p521::NistP521>(curve, scalar),
    }
}

/// Compute the x-coordinate of `d·Q`, full field width.
///
/// `remote` is re-validated here: off-curve points, out-of-range coordinates
/// and the identity all fail with `InvalidRemotePoint`.
pub(crate) fn shared_x(
    curve: Curve,
    scalar: &[u8],
    remote: &PublicPoint,
) -> Result<Zeroizing<Vec<u8>>, EphemeralError> {
    let wire = point::encode(curve, remote);
    match curve.id() {
        CurveId::P256 => ecdh_x::<p256::NistP256>(curve, scalar, wire.as_bytes()),
        CurveId::P384 => ecdh_x::<p384::NistP384>(curve, scalar, wire.as_bytes()),
        CurveId::P521 => ecdh_x::<p521::NistP521>(curve, scalar, wire.as_bytes()),
    }
}

/// Check that `point` is a valid, non-identity point on its curve.
pub(crate) fn validate_point(point: &PublicPoint) -> Result<(), EphemeralError> {
    let curve = point.curve();
    let wire = point.encode();
    match curve.id() {
        CurveId::P256 => parse_public::<p256::NistP256>(curve, wire.as_bytes()).map(|_| ()),
        CurveId::P384 => parse_public::<p384::NistP384>(curve, wire.as_bytes()).map(|_| ()),
        CurveId::P521 => parse_public::<p521::NistP521>(curve, wire.as_bytes()).map(|_| ()),
    }
}

fn secret_key<C>(curve: Curve, scalar: &[u8]) -> Result<SecretKey<C>, EphemeralError>
where
    C: CurveArithmetic,
{
    SecretKey::<C>::from_slice(scalar).map_err(|_| {
        EphemeralError::KeyGeneration(format!("scalar out of range for {}", curve))
    })
}

fn parse_public<C>(curve: Curve, sec1: &[u8]) -> Result<PublicKey<C>, EphemeralError>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    PublicKey::<C>::from_sec1_bytes(sec1).map_err(|_| EphemeralError::InvalidRemotePoint(curve.name()))
}

fn public_point<C>(curve: Curve, scalar: &[u8]) -> Result<PublicPoint, EphemeralError>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let secret = secret_key::<C>(curve, scalar)?;
    let encoded = secret.public_key().to_encoded_point(false);
    match (encoded.x(), encoded.y()) {
        (Some(x), Some(y)) => PublicPoint::from_coordinates(
            curve,
            BigUint::from_bytes_be(x),
            BigUint::from_bytes_be(y),
        ),
        _ => Err(EphemeralError::KeyGeneration(format!(
            "public point on {} has no affine coordinates",
            curve
        ))),
    }
}

fn ecdh_x<C>(curve: Curve, scalar: &[u8], remote_sec1: &[u8]) -> Result<Zeroizing<Vec<u8>>, EphemeralError>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let remote = parse_public::<C>(curve, remote_sec1)?;
    let secret = secret_key::<C>(curve, scalar)?;
    let shared = ecdh::diffie_hellman(secret.to_nonzero_scalar(), remote.as_affine());
    Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
}
