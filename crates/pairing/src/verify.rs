//! Pair-Verify (spec §4.3): per-session Curve25519 key agreement that
//! authenticates both ends against the long-term identities Pair-Setup
//! established, and derives the two session AEAD keys.

use crate::error::{check_state, PairingError};
use crate::resume::ResumeSession;
use crate::tags;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use hap_core::{Error, PairingIdentity, Result};
use hap_crypto::{ceremony_nonce, derive_shared_secret, generate_keypair, hkdf_derive, open, seal, AeadKey, SharedSecret};
use hap_tlv::Tlv;
use x25519_dalek::PublicKey;

const M2_NONCE: &[u8; 8] = b"PV-Msg02";
const M3_NONCE: &[u8; 8] = b"PV-Msg03";

/// The two per-direction session keys produced by a successful Pair-Verify
/// (or Pair-Resume), plus the resume bundle the caller may cache for next time.
pub struct SessionKeys {
    pub controller_to_accessory: AeadKey,
    pub accessory_to_controller: AeadKey,
    pub resume: ResumeSession,
}

pub struct PairVerify<'a> {
    identity: &'a PairingIdentity,
    secret: hap_crypto::SecretKey,
    public: PublicKey,
    accessory_public: Option<PublicKey>,
    shared_secret: Option<SharedSecret>,
    verify_key: Option<AeadKey>,
    session_id: Option<[u8; 8]>,
}

impl<'a> PairVerify<'a> {
    /// Start a new ceremony against a previously established identity,
    /// generating a fresh ephemeral Curve25519 keypair.
    pub fn new(identity: &'a PairingIdentity) -> Self {
        let (secret, public) = generate_keypair();
        Self {
            identity,
            secret,
            public,
            accessory_public: None,
            shared_secret: None,
            verify_key: None,
            session_id: None,
        }
    }

    /// M1 (build): `{State=1, PublicKey=iOSPub}`.
    pub fn build_m1(&self) -> Vec<u8> {
        Tlv::builder()
            .add_u8(tags::STATE, 1)
            .add(tags::PUBLIC_KEY, self.public.as_bytes().to_vec())
            .encode()
    }

    /// M2 (parse): derives the shared secret and verify key, decrypts the
    /// accessory's identity sub-TLV, and rejects an identifier mismatch
    /// (the substitution attack spec §4.3 calls out by name).
    pub fn parse_m2(&mut self, buf: &[u8]) -> Result<()> {
        let tlv = Tlv::decode(buf);
        check_state(&tlv, 2)?;

        let accessory_public_bytes = tlv.get_required(tags::PUBLIC_KEY)?;
        let accessory_public = hap_crypto::deserialize_public_key(accessory_public_bytes)?;
        let shared_secret = derive_shared_secret(&self.secret, &accessory_public)?;

        let verify_key = derive_verify_encrypt_key(shared_secret.as_bytes())?;
        let session_id_bytes = hkdf_derive(
            shared_secret.as_bytes(),
            b"Pair-Verify-Resume-Salt",
            b"Pair-Verify-Resume-Info",
            8,
        )?;
        let session_id: [u8; 8] = session_id_bytes.as_slice().try_into().expect("8-byte HKDF output");

        let ciphertext = tlv.get_required(tags::ENCRYPTED_DATA)?;
        let plaintext = open(&verify_key, &ceremony_nonce(M2_NONCE), b"", ciphertext)?;
        let sub_tlv = Tlv::decode(&plaintext);

        let identifier = sub_tlv.get_required(tags::IDENTIFIER)?;
        if identifier != self.identity.accessory_pairing_id.as_bytes() {
            return Err(PairingError::IdentifierMismatch.into());
        }

        let signature_bytes: [u8; 64] = sub_tlv
            .get_required(tags::SIGNATURE)?
            .try_into()
            .map_err(|_| PairingError::MalformedSubTlv)?;

        let mut message = Vec::with_capacity(32 + identifier.len() + 32);
        message.extend_from_slice(accessory_public.as_bytes());
        message.extend_from_slice(identifier);
        message.extend_from_slice(self.public.as_bytes());

        let verifying_key = VerifyingKey::from_bytes(&self.identity.accessory_ltpk)
            .map_err(|_| PairingError::MalformedSubTlv)?;
        let signature = ed25519_dalek::Signature::from_bytes(&signature_bytes);
        verifying_key
            .verify(&message, &signature)
            .map_err(|_| PairingError::SignatureInvalid)?;

        self.accessory_public = Some(accessory_public);
        self.shared_secret = Some(shared_secret);
        self.verify_key = Some(verify_key);
        self.session_id = Some(session_id);
        Ok(())
    }

    /// M3 (build): signs our own identity over the ephemeral public keys
    /// and encrypts it under the verify key.
    pub fn build_m3(&self) -> Result<Vec<u8>> {
        let accessory_public = self
            .accessory_public
            .as_ref()
            .ok_or_else(|| Error::protocol("M3 built before M2 was parsed"))?;
        let verify_key = self
            .verify_key
            .as_ref()
            .ok_or_else(|| Error::protocol("M3 built before M2 was parsed"))?;

        let mut message = Vec::with_capacity(32 + self.identity.ios_device_pairing_id.len() + 32);
        message.extend_from_slice(self.public.as_bytes());
        message.extend_from_slice(self.identity.ios_device_pairing_id.as_bytes());
        message.extend_from_slice(accessory_public.as_bytes());
        let signing_key = SigningKey::from_keypair_bytes(&self.identity.ios_device_ltsk)
            .map_err(|_| PairingError::MalformedSubTlv)?;
        let signature = signing_key.sign(&message);

        let sub_tlv = Tlv::builder()
            .add(tags::IDENTIFIER, self.identity.ios_device_pairing_id.as_bytes().to_vec())
            .add(tags::SIGNATURE, signature.to_bytes().to_vec())
            .encode();

        let ciphertext = seal(verify_key, &ceremony_nonce(M3_NONCE), b"", &sub_tlv)?;

        Ok(Tlv::builder()
            .add_u8(tags::STATE, 3)
            .add(tags::ENCRYPTED_DATA, ciphertext)
            .encode())
    }

    /// M4 (parse): only `State=4` and the absence of `Error` are checked.
    pub fn parse_m4(&self, buf: &[u8]) -> Result<()> {
        let tlv = Tlv::decode(buf);
        check_state(&tlv, 4)
    }

    /// Derive the two session AEAD keys once M4 confirms success.
    pub fn finish(self) -> Result<SessionKeys> {
        let shared_secret = self
            .shared_secret
            .ok_or_else(|| Error::protocol("finish() called before M2 was parsed"))?;
        let session_id = self.session_id.ok_or_else(|| Error::protocol("finish() called before M2 was parsed"))?;

        let write_bytes = hkdf_derive(shared_secret.as_bytes(), b"Control-Salt", b"Control-Write-Encryption-Key", 32)?;
        let read_bytes = hkdf_derive(shared_secret.as_bytes(), b"Control-Salt", b"Control-Read-Encryption-Key", 32)?;

        Ok(SessionKeys {
            controller_to_accessory: AeadKey::from_slice(&write_bytes)?,
            accessory_to_controller: AeadKey::from_slice(&read_bytes)?,
            resume: ResumeSession {
                session_id,
                shared_secret,
            },
        })
    }
}

fn derive_verify_encrypt_key(shared_secret: &[u8]) -> Result<AeadKey> {
    let bytes = hkdf_derive(shared_secret, b"Pair-Verify-Encrypt-Salt", b"Pair-Verify-Encrypt-Info", 32)?;
    AeadKey::from_slice(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_identity() -> PairingIdentity {
        PairingIdentity {
            accessory_pairing_id: "AA:BB:CC:DD:EE:FF".into(),
            accessory_ltpk: [1u8; 32],
            ios_device_pairing_id: "11111111-2222-3333-4444-555555555555".into(),
            ios_device_ltsk: [2u8; 64],
            ios_device_ltpk: [3u8; 32],
        }
    }

    #[test]
    fn m1_carries_ephemeral_public_key() {
        let identity = sample_identity();
        let verify = PairVerify::new(&identity);
        let tlv = Tlv::decode(&verify.build_m1());
        assert_eq!(tlv.get(tags::PUBLIC_KEY).unwrap().len(), 32);
    }

    #[test]
    fn parse_m2_rejects_wrong_state() {
        let identity = sample_identity();
        let mut verify = PairVerify::new(&identity);
        let buf = Tlv::builder().add_u8(tags::STATE, 99).encode();
        assert!(verify.parse_m2(&buf).is_err());
    }
}
