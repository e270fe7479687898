//! ChaCha20-Poly1305 AEAD primitive, as used by both the pairing
//! ceremonies (spec §4.3, fixed label-suffixed nonces) and session
//! framing (spec §4.4, per-direction counters).
//!
//! Unlike a general-purpose AEAD wrapper, HAP never generates a random
//! nonce: every nonce is either an 8-byte ASCII ceremony label or a
//! little-endian frame counter, both left-padded with four zero bytes
//! to the required 12. Construction of those two nonce shapes lives
//! here so `hap-pairing` and `hap-framing` share one code path.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};
use hap_core::{Error, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;
pub const KEY_SIZE: usize = 32;

/// A zeroizing 32-byte ChaCha20-Poly1305 key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AeadKey([u8; KEY_SIZE]);

impl AeadKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::invalid_input(format!("expected {KEY_SIZE}-byte AEAD key")))?;
        Ok(Self(array))
    }
}

impl std::fmt::Debug for AeadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AeadKey").field(&"[REDACTED]").finish()
    }
}

/// Build the 12-byte nonce for a pairing ceremony step: four zero bytes
/// followed by an 8-byte ASCII label (e.g. `PS-Msg05`).
pub fn ceremony_nonce(label: &[u8; 8]) -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    nonce[4..].copy_from_slice(label);
    nonce
}

/// Build the 12-byte nonce for session/GATT framing: four zero bytes
/// followed by the little-endian frame counter (spec §4.4).
pub fn counter_nonce(counter: u64) -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    nonce[4..].copy_from_slice(&counter.to_le_bytes());
    nonce
}

/// Encrypt `plaintext` under `key`/`nonce`, authenticating `aad`.
/// Returns ciphertext with the 16-byte tag appended.
pub fn seal(key: &AeadKey, nonce: &[u8; NONCE_SIZE], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new((&key.0).into());
    cipher
        .encrypt(Nonce::from_slice(nonce), Payload { msg: plaintext, aad })
        .map_err(|_| Error::auth("AEAD encryption failed"))
}

/// Decrypt `ciphertext` (tag included) under `key`/`nonce`, verifying `aad`.
pub fn open(key: &AeadKey, nonce: &[u8; NONCE_SIZE], aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new((&key.0).into());
    cipher
        .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad })
        .map_err(|_| Error::auth("AEAD tag verification failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceremony_nonce_zero_pads_and_suffixes_label() {
        let nonce = ceremony_nonce(b"PS-Msg05");
        assert_eq!(&nonce[..4], &[0, 0, 0, 0]);
        assert_eq!(&nonce[4..], b"PS-Msg05");
    }

    #[test]
    fn counter_nonce_is_little_endian() {
        let nonce = counter_nonce(1);
        assert_eq!(nonce, [0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn seal_open_round_trip() {
        let key = AeadKey::from_bytes([7u8; 32]);
        let nonce = ceremony_nonce(b"PV-Msg02");
        let aad = b"";
        let ct = seal(&key, &nonce, aad, b"hello").unwrap();
        assert_eq!(ct.len(), 5 + TAG_SIZE);
        let pt = open(&key, &nonce, aad, &ct).unwrap();
        assert_eq!(pt, b"hello");
    }

    #[test]
    fn tampered_ciphertext_rejected() {
        let key = AeadKey::from_bytes([7u8; 32]);
        let nonce = counter_nonce(0);
        let mut ct = seal(&key, &nonce, b"", b"data").unwrap();
        ct[0] ^= 0xFF;
        assert!(open(&key, &nonce, b"", &ct).is_err());
    }

    #[test]
    fn wrong_aad_rejected() {
        let key = AeadKey::from_bytes([7u8; 32]);
        let nonce = counter_nonce(0);
        let ct = seal(&key, &nonce, b"ctx-a", b"data").unwrap();
        assert!(open(&key, &nonce, b"ctx-b", &ct).is_err());
    }

    #[test]
    fn reused_nonce_with_different_counter_fails() {
        let key = AeadKey::from_bytes([9u8; 32]);
        let ct0 = seal(&key, &counter_nonce(0), b"", b"msg0").unwrap();
        assert!(open(&key, &counter_nonce(1), b"", &ct0).is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let key = AeadKey::from_bytes([1u8; 32]);
        let dbg = format!("{key:?}");
        assert!(dbg.contains("REDACTED"));
    }
}
