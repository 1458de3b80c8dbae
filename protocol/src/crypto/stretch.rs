//! Container for the output of the key-stretching step.
//!
//! The stretching algorithm itself lives outside this crate. It receives the
//! [`SharedSecret`](super::shared::SharedSecret) and fills the three buffers
//! here: cipher key, IV, MAC key. Each buffer is owned, sized independently,
//! and wiped on [`StretchedKeyMaterial::clear`] or drop.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::EphemeralError;
use crate::config::CipherSuite;

/// Cipher key, IV and MAC key for one session.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct StretchedKeyMaterial {
    cipher_key: Vec<u8>,
    iv: Vec<u8>,
    mac_key: Vec<u8>,
}

impl StretchedKeyMaterial {
    /// Empty container; all three buffers have length zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty container with capacity reserved for `suite`.
    pub fn with_capacity_for(suite: CipherSuite) -> Self {
        Self {
            cipher_key: Vec::with_capacity(suite.cipher_key_length()),
            iv: Vec::with_capacity(suite.iv_length()),
            mac_key: Vec::with_capacity(suite.mac_key_length()),
        }
    }

    pub fn set_cipher_key(&mut self, bytes: &[u8]) {
        replace(&mut self.cipher_key, bytes);
    }

    pub fn set_iv(&mut self, bytes: &[u8]) {
        replace(&mut self.iv, bytes);
    }

    pub fn set_mac_key(&mut self, bytes: &[u8]) {
        replace(&mut self.mac_key, bytes);
    }

    pub fn cipher_key(&self) -> &[u8] {
        &self.cipher_key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn mac_key(&self) -> &[u8] {
        &self.mac_key
    }

    /// `(cipher_key, iv, mac_key)` lengths in bytes.
    pub fn lengths(&self) -> (usize, usize, usize) {
        (self.cipher_key.len(), self.iv.len(), self.mac_key.len())
    }

    /// True once every buffer holds something.
    pub fn is_populated(&self) -> bool {
        !self.cipher_key.is_empty() && !self.iv.is_empty() && !self.mac_key.is_empty()
    }

    /// Wipe all three buffers and reset them to empty.
    pub fn clear(&mut self) {
        self.zeroize();
    }

    /// Check that every buffer has exactly the size `suite` expects.
    pub fn check_lengths(&self, suite: CipherSuite) -> Result<(), EphemeralError> {
        let expected = [
            ("cipher key", suite.cipher_key_length(), self.cipher_key.len()),
            ("IV", suite.iv_length(), self.iv.len()),
            ("MAC key", suite.mac_key_length(), self.mac_key.len()),
        ];
        for (field, expected, actual) in expected {
            if expected != actual {
                return Err(EphemeralError::KeyMaterialLength {
                    field,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

fn replace(slot: &mut Vec<u8>, bytes: &[u8]) {
    slot.zeroize();
    slot.extend_from_slice(bytes);
}

impl fmt::Debug for StretchedKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (k, iv, m) = self.lengths();
        write!(
            f,
            "StretchedKeyMaterial {{ cipher_key: {} bytes, iv: {} bytes, mac_key: {} bytes }}",
            k, iv, m
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(suite: CipherSuite) -> StretchedKeyMaterial {
        let mut m = StretchedKeyMaterial::new();
        m.set_cipher_key(&vec![0x11; suite.cipher_key_length()]);
        m.set_iv(&vec![0x22; suite.iv_length()]);
        m.set_mac_key(&vec![0x33; suite.mac_key_length()]);
        m
    }

    #[test]
    fn test_new_is_empty() {
        let m = StretchedKeyMaterial::new();
        assert_eq!(m.lengths(), (0, 0, 0));
        assert!(!m.is_populated());

        let m = StretchedKeyMaterial::with_capacity_for(CipherSuite::Aes256);
        assert_eq!(m.lengths(), (0, 0, 0));
    }

    #[test]
    fn test_independent_sizes() {
        let m = filled(CipherSuite::Aes128);
        assert_eq!(m.lengths(), (16, 16, 20));
        assert!(m.is_populated());
        assert_eq!(m.iv(), &[0x22; 16]);
        assert!(m.check_lengths(CipherSuite::Aes128).is_ok());
    }

    #[test]
    fn test_setter_replaces_contents() {
        let mut m = StretchedKeyMaterial::new();
        m.set_cipher_key(&[1, 2, 3, 4]);
        m.set_cipher_key(&[9, 9]);
        assert_eq!(m.cipher_key(), &[9, 9]);
    }

    #[test]
    fn test_check_lengths_reports_field() {
        let m = filled(CipherSuite::Aes128);
        assert_eq!(
            m.check_lengths(CipherSuite::Blowfish),
            Err(EphemeralError::KeyMaterialLength {
                field: "cipher key",
                expected: 32,
                actual: 16,
            })
        );

        let mut m = filled(CipherSuite::Aes256);
        m.set_mac_key(&[0u8; 32]);
        assert!(matches!(
            m.check_lengths(CipherSuite::Aes256),
            Err(EphemeralError::KeyMaterialLength { field: "MAC key", .. })
        ));
    }

    #[test]
    fn test_clear_empties_buffers() {
        let mut m = filled(CipherSuite::Blowfish);
        m.clear();
        assert_eq!(m.lengths(), (0, 0, 0));
        assert!(!m.is_populated());
    }

    #[test]
    fn test_debug_shows_lengths_only() {
        let m = filled(CipherSuite::Aes128);
        let rendered = format!("{:?}", m);
        assert!(rendered.contains("16 bytes"));
        assert!(!rendered.contains("11"));
    }
}
