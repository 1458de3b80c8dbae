//! # Handshake Sessions
//!
//! Ties the primitives together for one connection attempt.
//!
//! ## Flow
//!
//! 1. Each side calls [`HandshakeSession::initiate`] with the negotiated
//!    [`HandshakeConfig`]. That resolves the curve and generates a fresh
//!    ephemeral key pair.
//! 2. Each side sends [`HandshakeSession::local_public_bytes`] to the other.
//! 3. On receipt, [`HandshakeSession::complete`] looks the peer up, derives
//!    the shared secret from the remote bytes and destroys the key pair.
//!    The result is an [`EstablishedSession`].
//! 4. The caller's key-stretching step fills the session's
//!    [`StretchedKeyMaterial`] through [`EstablishedSession::stretch_with`].
//!
//! Any failure in step 3 aborts the session and destroys its key pair. A
//! session that is dropped before completing destroys its key pair too.
//! Nothing here is shared between sessions, so any number of them can run
//! on different threads at once.

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{CipherSuite, HandshakeConfig};
use crate::crypto::curve::Curve;
use crate::crypto::error::EphemeralError;
use crate::crypto::keys::KeyPair;
use crate::crypto::point::EncodedPoint;
use crate::crypto::shared::{self, SharedSecret};
use crate::crypto::stretch::StretchedKeyMaterial;
use crate::peer::{Peer, PeerDirectory, PeerError};

/// Errors surfaced by a handshake.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error(transparent)]
    Ephemeral(#[from] EphemeralError),

    #[error(transparent)]
    Peer(#[from] PeerError),

    #[error("handshake already completed")]
    AlreadyCompleted,

    #[error("key stretching failed: {0}")]
    Stretch(String),
}

/// Where a [`HandshakeSession`] is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Key pair generated, waiting for the peer's public point.
    Pending,
    /// Shared secret derived; key pair destroyed.
    Established,
    /// Aborted locally or because of bad peer input; key pair destroyed.
    Aborted,
}

/// External key-stretching step.
///
/// Receives the raw ECDH secret and must fill `out` with exactly the sizes
/// `suite` asks for. The algorithm is up to the implementor.
pub trait KeyStretcher {
    fn stretch(
        &self,
        secret: &SharedSecret,
        suite: CipherSuite,
        out: &mut StretchedKeyMaterial,
    ) -> Result<(), String>;
}

/// One side of an ephemeral key exchange.
#[derive(Debug)]
pub struct HandshakeSession {
    id: Uuid,
    curve: Curve,
    cipher: CipherSuite,
    keypair: KeyPair,
    state: SessionState,
}

impl HandshakeSession {
    /// Start a handshake: resolve the curve and generate a key pair.
    ///
    /// ```
    /// use ember_protocol::config::HandshakeConfig;
    /// use ember_protocol::handshake::HandshakeSession;
    ///
    /// let session = HandshakeSession::initiate(&HandshakeConfig::with_curve("P-521")).unwrap();
    /// assert_eq!(session.local_public_bytes().unwrap().len(), 133);
    /// ```
    pub fn initiate(config: &HandshakeConfig) -> Result<Self, HandshakeError> {
        let curve = config.validate()?;
        let keypair = KeyPair::generate(curve)?;
        let id = Uuid::new_v4();
        debug!(
            session = %id,
            curve = %curve,
            cipher = %config.cipher,
            "handshake initiated"
        );
        Ok(Self {
            id,
            curve,
            cipher: config.cipher,
            keypair,
            state: SessionState::Pending,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn cipher(&self) -> CipherSuite {
        self.cipher
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Our public point, ready for the wire.
    pub fn local_public_bytes(&self) -> Result<&EncodedPoint, HandshakeError> {
        Ok(self.keypair.public_bytes()?)
    }

    /// Finish the exchange with the peer's encoded public point.
    ///
    /// `peer_id` must be known to `peers`. On success the key pair is
    /// destroyed and the session is `Established`; on failure it is
    /// destroyed and the session is `Aborted`. Calling again after success
    /// is `AlreadyCompleted`.
    pub fn complete(
        &mut self,
        remote: &[u8],
        peer_id: &[u8],
        peers: &dyn PeerDirectory,
    ) -> Result<EstablishedSession, HandshakeError> {
        match self.state {
            SessionState::Pending => {}
            SessionState::Established => return Err(HandshakeError::AlreadyCompleted),
            SessionState::Aborted => return Err(EphemeralError::UseAfterDestroy.into()),
        }

        let outcome = peers
            .find_peer_by_id(peer_id)
            .map_err(HandshakeError::from)
            .and_then(|peer| {
                let secret = shared::derive_from_bytes(&self.keypair, remote)?;
                Ok((peer, secret))
            });

        let (peer, secret) = match outcome {
            Ok(parts) => parts,
            Err(e) => {
                warn!(session = %self.id, curve = %self.curve, error = %e, "handshake aborted");
                self.finish(SessionState::Aborted);
                return Err(e);
            }
        };

        self.finish(SessionState::Established);
        debug!(session = %self.id, peer = %peer.id, "handshake established");

        Ok(EstablishedSession {
            id: self.id,
            peer,
            cipher: self.cipher,
            secret,
            material: StretchedKeyMaterial::with_capacity_for(self.cipher),
        })
    }

    /// Give up on the handshake and destroy the key pair. No-op once the
    /// session has already finished.
    pub fn abort(&mut self) {
        if self.state == SessionState::Pending {
            debug!(session = %self.id, "handshake aborted locally");
            self.finish(SessionState::Aborted);
        }
    }

    fn finish(&mut self, state: SessionState) {
        if !self.keypair.is_destroyed() {
            // Only fails when already destroyed, which was just ruled out.
            let _ = self.keypair.destroy();
        }
        self.state = state;
    }

    #[cfg(test)]
    fn keypair(&self) -> &KeyPair {
        &self.keypair
    }
}

impl Drop for HandshakeSession {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Result of a successful handshake.
#[derive(Debug)]
pub struct EstablishedSession {
    id: Uuid,
    peer: Peer,
    cipher: CipherSuite,
    secret: SharedSecret,
    material: StretchedKeyMaterial,
}

impl EstablishedSession {
    /// Id of the [`HandshakeSession`] this came from.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn peer(&self) -> &Peer {
        &self.peer
    }

    pub fn cipher(&self) -> CipherSuite {
        self.cipher
    }

    pub fn shared_secret(&self) -> &SharedSecret {
        &self.secret
    }

    /// Stretched key material. Empty until [`stretch_with`](Self::stretch_with) succeeds.
    pub fn key_material(&self) -> &StretchedKeyMaterial {
        &self.material
    }

    /// Run the external key-stretching step and check its output sizes
    /// against the session's cipher. On failure the material is cleared.
    pub fn stretch_with<S: KeyStretcher + ?Sized>(
        &mut self,
        stretcher: &S,
    ) -> Result<&StretchedKeyMaterial, HandshakeError> {
        let filled = stretcher
            .stretch(&self.secret, self.cipher, &mut self.material)
            .map_err(HandshakeError::Stretch)
            .and_then(|()| Ok(self.material.check_lengths(self.cipher)?));

        if let Err(e) = filled {
            self.material.clear();
            return Err(e);
        }
        Ok(&self.material)
    }
}
