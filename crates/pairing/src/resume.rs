//! Pair-Resume (spec §4.3): a fast re-handshake that trades a cached
//! 8-byte session ID and X25519 shared secret from a prior Pair-Verify
//! for a new pair of session keys, without repeating the signature dance.
//!
//! The accessory may decline and fall back to a standard Pair-Verify M2
//! using the same bytes the client already has in hand — the client
//! can't tell which happened until it tries to open the resume response,
//! so [`PairResume::parse_m2`] reports [`ResumeOutcome::Declined`] rather
//! than an error when decryption fails, leaving the caller free to retry
//! the same buffer against [`crate::PairVerify`].

use hap_core::Result;
use hap_crypto::{ceremony_nonce, generate_keypair, hkdf_derive, open, seal, AeadKey, SecretKey, SharedSecret};
use hap_tlv::Tlv;
use x25519_dalek::PublicKey;

use crate::error::check_state;
use crate::tags;
use crate::verify::SessionKeys;

const M1_NONCE: &[u8; 8] = b"PR-Msg01";
const M2_NONCE: &[u8; 8] = b"PR-Msg02";

/// What a successful Pair-Verify leaves behind for a future resume attempt.
#[derive(Clone)]
pub struct ResumeSession {
    pub session_id: [u8; 8],
    pub shared_secret: SharedSecret,
}

pub enum ResumeOutcome {
    Resumed(SessionKeys),
    /// The accessory didn't honor the resume; the caller should replay
    /// `buf` through a full [`crate::PairVerify::parse_m2`] instead.
    Declined,
}

pub struct PairResume {
    cached: ResumeSession,
    secret: SecretKey,
    public: PublicKey,
    request_key: AeadKey,
}

impl PairResume {
    /// Start a resume attempt against a session cached from a prior
    /// Pair-Verify. Generates a fresh ephemeral keypair for the salt.
    pub fn new(cached: ResumeSession) -> Result<Self> {
        let (secret, public) = generate_keypair();
        let request_key_bytes = derive_resume_bytes(&cached, &public, b"Pair-Resume-Request-Info")?;
        let request_key = AeadKey::from_slice(&request_key_bytes)?;
        Ok(Self {
            cached,
            secret,
            public,
            request_key,
        })
    }

    /// M1 (build): `{State=1, PublicKey=ephemeral, EncryptedData=<empty>}`.
    pub fn build_m1(&self) -> Result<Vec<u8>> {
        let ciphertext = seal(&self.request_key, &ceremony_nonce(M1_NONCE), b"", b"")?;
        Ok(Tlv::builder()
            .add_u8(tags::STATE, 1)
            .add(tags::PUBLIC_KEY, self.public.as_bytes().to_vec())
            .add(tags::ENCRYPTED_DATA, ciphertext)
            .encode())
    }

    /// M2 (parse): try to decrypt as a resume response. A decrypt failure
    /// means the accessory declined — not a ceremony error.
    pub fn parse_m2(self, buf: &[u8]) -> Result<ResumeOutcome> {
        let tlv = Tlv::decode(buf);
        if tlv.get_u8(tags::ERROR).is_some() {
            return Ok(ResumeOutcome::Declined);
        }
        let Some(ciphertext) = tlv.get(tags::ENCRYPTED_DATA) else {
            return Ok(ResumeOutcome::Declined);
        };

        let response_key_bytes = derive_resume_bytes(&self.cached, &self.public, b"Pair-Resume-Response-Info")?;
        let response_key = AeadKey::from_slice(&response_key_bytes)?;
        let Ok(_plaintext) = open(&response_key, &ceremony_nonce(M2_NONCE), b"", ciphertext) else {
            return Ok(ResumeOutcome::Declined);
        };
        check_state(&tlv, 2)?;

        let new_shared = derive_resume_bytes(&self.cached, &self.public, b"Pair-Resume-Shared-Secret-Info")?;
        let write_bytes = hkdf_derive(&new_shared, b"Control-Salt", b"Control-Write-Encryption-Key", 32)?;
        let read_bytes = hkdf_derive(&new_shared, b"Control-Salt", b"Control-Read-Encryption-Key", 32)?;

        Ok(ResumeOutcome::Resumed(SessionKeys {
            controller_to_accessory: AeadKey::from_slice(&write_bytes)?,
            accessory_to_controller: AeadKey::from_slice(&read_bytes)?,
            resume: ResumeSession {
                session_id: self.cached.session_id,
                shared_secret: hap_crypto::shared_secret_from_bytes(&new_shared)?,
            },
        }))
    }
}

/// Derives one of the three Pair-Resume keys: `salt = ephemeral_public ‖ session_id`.
fn derive_resume_bytes(cached: &ResumeSession, ephemeral_public: &PublicKey, info: &[u8]) -> Result<Vec<u8>> {
    let mut salt = Vec::with_capacity(32 + 8);
    salt.extend_from_slice(ephemeral_public.as_bytes());
    salt.extend_from_slice(&cached.session_id);
    let bytes = hkdf_derive(cached.shared_secret.as_bytes(), &salt, info, 32)?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declined_resume_does_not_error() {
        let cached = ResumeSession {
            session_id: [0u8; 8],
            shared_secret: hap_crypto::shared_secret_from_bytes(&[9u8; 32]).unwrap(),
        };
        let resume = PairResume::new(cached).unwrap();
        let buf = Tlv::builder().add_u8(tags::STATE, 2).add_u8(tags::ERROR, 6).encode();
        assert!(matches!(resume.parse_m2(&buf).unwrap(), ResumeOutcome::Declined));
    }
}
