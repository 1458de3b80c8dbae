//! Integration tests for the ephemeral key exchange.
//!
//! These go through the public API only: curve lookup, key generation, the
//! wire codec, ECDH, and full handshake sessions against a shared peer store.
//! Each test builds its own keys and store.

use std::sync::Arc;
use std::thread;

use ember_protocol::config::{CipherSuite, HandshakeConfig, SUPPORTED_CURVES};
use ember_protocol::crypto::curve::{self, Curve};
use ember_protocol::crypto::error::EphemeralError;
use ember_protocol::crypto::keys::KeyPair;
use ember_protocol::crypto::point::{decode, encode};
use ember_protocol::crypto::shared::{derive, derive_from_bytes, SharedSecret};
use ember_protocol::crypto::stretch::StretchedKeyMaterial;
use ember_protocol::handshake::{HandshakeError, HandshakeSession, KeyStretcher, SessionState};
use ember_protocol::peer::{Peer, PeerDirectory, PeerStore};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn all_curves() -> Vec<Curve> {
    SUPPORTED_CURVES
        .iter()
        .map(|name| curve::resolve(name).expect("supported curve"))
        .collect()
}

fn store_with(ids: &[&str]) -> PeerStore {
    let store = PeerStore::new();
    for id in ids {
        store.add_peer(&Peer::new(*id)).expect("add peer");
    }
    store
}

/// Splits the secret into key material by repetition. Test-only.
struct RepeatStretcher;

impl KeyStretcher for RepeatStretcher {
    fn stretch(
        &self,
        secret: &SharedSecret,
        suite: CipherSuite,
        out: &mut StretchedKeyMaterial,
    ) -> Result<(), String> {
        let bytes = secret.as_bytes();
        if bytes.is_empty() {
            return Err("empty secret".into());
        }
        let fill = |n: usize| bytes.iter().cycle().take(n).copied().collect::<Vec<u8>>();
        out.set_cipher_key(&fill(suite.cipher_key_length()));
        out.set_iv(&fill(suite.iv_length()));
        out.set_mac_key(&fill(suite.mac_key_length()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

#[test]
fn round_trip_on_every_curve() {
    for curve in all_curves() {
        for _ in 0..4 {
            let kp = KeyPair::generate(curve).unwrap();
            let point = kp.public_point().unwrap();
            let wire = encode(curve, &point);
            assert_eq!(wire.len(), 2 * curve.bits().div_ceil(8) + 1);
            assert_eq!(&wire, kp.public_bytes().unwrap());
            assert_eq!(decode(curve, wire.as_bytes()).unwrap(), point);
        }
    }
}

#[test]
fn p256_scenario() {
    let curve = curve::resolve("P-256").unwrap();
    let kp = KeyPair::generate(curve).unwrap();
    let wire = kp.public_bytes().unwrap();
    assert_eq!(wire.len(), 65);
    assert_eq!(wire.as_bytes()[0], 4);
    assert_eq!(
        decode(curve, wire.as_bytes()).unwrap(),
        kp.public_point().unwrap()
    );
}

#[test]
fn encoded_lengths() {
    let lengths: Vec<usize> = all_curves()
        .iter()
        .map(|c| c.encoded_point_length())
        .collect();
    assert_eq!(lengths, vec![65, 97, 133]);
}

#[test]
fn malformed_buffers_rejected() {
    let curve = curve::resolve("P-256").unwrap();
    let kp = KeyPair::generate(curve).unwrap();
    let good = kp.public_bytes().unwrap().as_bytes().to_vec();

    let short = &good[..64];
    let mut even = good.clone();
    even[0] = 0x02;
    let mut odd = good.clone();
    odd[0] = 0x03;

    for bad in [&[][..], short, &even[..], &odd[..]] {
        assert!(matches!(
            decode(curve, bad),
            Err(EphemeralError::InvalidEncoding(_))
        ));
    }
}

// ---------------------------------------------------------------------------
// ECDH
// ---------------------------------------------------------------------------

#[test]
fn ecdh_symmetry_on_every_curve() {
    for curve in all_curves() {
        let a = KeyPair::generate(curve).unwrap();
        let b = KeyPair::generate(curve).unwrap();

        let ab = derive(&a, &b.public_point().unwrap()).unwrap();
        let ba = derive_from_bytes(&b, a.public_bytes().unwrap().as_bytes()).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.len(), curve.byte_length(), "{} secret is full width", curve);
    }
}

#[test]
fn p256_key_against_p384_point() {
    let a = KeyPair::generate(curve::resolve("P-256").unwrap()).unwrap();
    let b = KeyPair::generate(curve::resolve("P-384").unwrap()).unwrap();
    assert!(matches!(
        derive(&a, &b.public_point().unwrap()),
        Err(EphemeralError::CurveMismatch { .. })
    ));
}

#[test]
fn destroyed_key_refuses_and_reads_zero() {
    for curve in all_curves() {
        let mut a = KeyPair::generate(curve).unwrap();
        let b = KeyPair::generate(curve).unwrap();
        a.destroy().unwrap();

        assert_eq!(
            derive(&a, &b.public_point().unwrap()),
            Err(EphemeralError::UseAfterDestroy)
        );
        assert!(a.expose_scalar().iter().all(|byte| *byte == 0));
    }
}

#[test]
fn concurrent_exchanges_on_threads() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || {
                let curve = curve::supported()[i % 3];
                let a = KeyPair::generate(curve).unwrap();
                let b = KeyPair::generate(curve).unwrap();
                let ab = derive(&a, &b.public_point().unwrap()).unwrap();
                let ba = derive(&b, &a.public_point().unwrap()).unwrap();
                assert_eq!(ab, ba);
                ab.as_bytes().to_vec()
            })
        })
        .collect();

    let secrets: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, s) in secrets.iter().enumerate() {
        for t in &secrets[i + 1..] {
            assert_ne!(s, t, "independent handshakes must not share secrets");
        }
    }
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

#[test]
fn full_handshake_with_stretching() {
    let peers = store_with(&["alice", "bob"]);
    for curve in SUPPORTED_CURVES {
        for cipher in [CipherSuite::Aes128, CipherSuite::Aes256, CipherSuite::Blowfish] {
            let config = HandshakeConfig {
                curve: curve.to_string(),
                cipher,
            };
            let mut alice = HandshakeSession::initiate(&config).unwrap();
            let mut bob = HandshakeSession::initiate(&config).unwrap();
            let alice_pub = alice.local_public_bytes().unwrap().clone();
            let bob_pub = bob.local_public_bytes().unwrap().clone();

            let mut a = alice.complete(bob_pub.as_bytes(), b"bob", &peers).unwrap();
            let mut b = bob.complete(alice_pub.as_bytes(), b"alice", &peers).unwrap();

            let ka = a.stretch_with(&RepeatStretcher).unwrap().cipher_key().to_vec();
            let kb = b.stretch_with(&RepeatStretcher).unwrap().cipher_key().to_vec();
            assert_eq!(ka, kb);
            assert_eq!(ka.len(), cipher.cipher_key_length());
            assert_eq!(alice.state(), SessionState::Established);
        }
    }
}

#[test]
fn handshakes_share_one_directory_across_threads() {
    let peers = Arc::new(store_with(&["initiator", "responder"]));
    let handles: Vec<_> = (0..6)
        .map(|_| {
            let peers = Arc::clone(&peers);
            thread::spawn(move || {
                let config = HandshakeConfig::default();
                let mut i = HandshakeSession::initiate(&config).unwrap();
                let mut r = HandshakeSession::initiate(&config).unwrap();
                let i_pub = i.local_public_bytes().unwrap().clone();
                let r_pub = r.local_public_bytes().unwrap().clone();
                let a = i.complete(r_pub.as_bytes(), b"responder", peers.as_ref()).unwrap();
                let b = r.complete(i_pub.as_bytes(), b"initiator", peers.as_ref()).unwrap();
                a.shared_secret() == b.shared_secret()
            })
        })
        .collect();

    for h in handles {
        assert!(h.join().unwrap());
    }
}

#[test]
fn garbage_from_peer_aborts_only_that_handshake() {
    let peers = store_with(&["good", "evil"]);
    let config = HandshakeConfig::with_curve("P-384");

    let mut victim = HandshakeSession::initiate(&config).unwrap();
    let mut healthy = HandshakeSession::initiate(&config).unwrap();
    let partner = HandshakeSession::initiate(&config).unwrap();

    let mut garbage = vec![0u8; 97];
    garbage[0] = 0x04;
    garbage[1] = 0x01;
    let err = victim.complete(&garbage, b"evil", &peers).unwrap_err();
    assert!(matches!(
        err,
        HandshakeError::Ephemeral(EphemeralError::InvalidRemotePoint("P-384"))
    ));
    assert_eq!(victim.state(), SessionState::Aborted);

    let partner_pub = partner.local_public_bytes().unwrap().clone();
    assert!(healthy.complete(partner_pub.as_bytes(), b"good", &peers).is_ok());
}

#[test]
fn unknown_curve_is_not_a_fallback() {
    let err = HandshakeSession::initiate(&HandshakeConfig::with_curve("P-192")).unwrap_err();
    assert!(matches!(
        err,
        HandshakeError::Ephemeral(EphemeralError::UnknownCurve(ref name)) if name == "P-192"
    ));
}
