//! Pair-Setup (spec §4.3): SRP-6a-authenticated first-time pairing that
//! establishes the long-term Ed25519 identities on both sides.

use crate::error::{check_state, PairingError};
use crate::tags;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use hap_core::{Error, PairingIdentity, Result};
use hap_crypto::{ceremony_nonce, hkdf_derive, open, seal, AeadKey, SrpClient, SrpPremaster};
use hap_tlv::Tlv;
use rand::RngCore;
use uuid::Uuid;

const M5_NONCE: &[u8; 8] = b"PS-Msg05";
const M6_NONCE: &[u8; 8] = b"PS-Msg06";

/// Drives a single Pair-Setup ceremony end to end. Each `build_*`/`parse_*`
/// method is the pure-function state transition spec §4.3 describes; the
/// struct itself is the "previously stored state" it consumes and updates.
pub struct PairSetup {
    ios_device_pairing_id: String,
    signing_key: SigningKey,
    srp: Option<SrpClient>,
    premaster: Option<SrpPremaster>,
}

impl PairSetup {
    /// Start a new ceremony: mints a fresh `iOSDevicePairingID` (UUIDv4)
    /// and a fresh long-term Ed25519 identity.
    pub fn new() -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        Self {
            ios_device_pairing_id: Uuid::new_v4().to_string(),
            signing_key: SigningKey::from_bytes(&seed),
            srp: None,
            premaster: None,
        }
    }

    /// The `iOSDevicePairingID` this ceremony will present in M5, kept
    /// around so the caller can persist it alongside the resulting identity.
    pub fn ios_device_pairing_id(&self) -> &str {
        &self.ios_device_pairing_id
    }

    /// M1 (build): `{State=1, Method=PairSetupWithAuth}`.
    pub fn build_m1(&self) -> Vec<u8> {
        Tlv::builder()
            .add_u8(tags::STATE, 1)
            .add_u8(tags::METHOD, tags::method::PAIR_SETUP_WITH_AUTH)
            .encode()
    }

    /// M2 (parse): expect `State=2`; returns the `(salt, server_public)`
    /// pair the caller needs to prompt for a PIN and build M3.
    pub fn parse_m2(&self, buf: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
        let tlv = Tlv::decode(buf);
        check_state(&tlv, 2)?;
        let salt = tlv.get_required(tags::SALT)?.to_vec();
        let server_public = tlv.get_required(tags::PUBLIC_KEY)?.to_vec();
        Ok((salt, server_public))
    }

    /// M3 (build, needs PIN): generates the SRP client private exponent,
    /// computes `A` and the `M1` proof, and stashes both for M4/M5.
    pub fn build_m3(&mut self, pin: &str, salt: &[u8], server_public: &[u8]) -> Result<Vec<u8>> {
        let srp = SrpClient::new();
        let premaster = srp.compute_premaster(pin.as_bytes(), salt, server_public)?;

        let tlv = Tlv::builder()
            .add_u8(tags::STATE, 3)
            .add(tags::PUBLIC_KEY, srp.public_key())
            .add(tags::PROOF, premaster.client_proof.clone());

        self.srp = Some(srp);
        self.premaster = Some(premaster);
        Ok(tlv.encode())
    }

    /// M4 (parse): expect `State=4`; verify the accessory's `M2` proof.
    pub fn parse_m4(&self, buf: &[u8]) -> Result<()> {
        let tlv = Tlv::decode(buf);
        check_state(&tlv, 4)?;
        let server_proof = tlv.get_required(tags::PROOF)?;
        let srp = self.srp.as_ref().ok_or_else(|| Error::protocol("M4 parsed before M3 was built"))?;
        let premaster = self.premaster.as_ref().ok_or_else(|| Error::protocol("M4 parsed before M3 was built"))?;
        srp.verify_server_proof(&premaster.session_key, &premaster.client_proof, server_proof)
    }

    /// M5 (build): derives the setup AEAD key and `iOSDeviceX`, signs the
    /// device's long-term identity, and emits the encrypted sub-TLV.
    pub fn build_m5(&self) -> Result<Vec<u8>> {
        let premaster = self.premaster.as_ref().ok_or_else(|| Error::protocol("M5 built before M3/M4 ran"))?;

        let setup_key = derive_setup_encrypt_key(&premaster.session_key)?;
        let ios_device_x = hkdf_derive(
            &premaster.session_key,
            b"Pair-Setup-Controller-Sign-Salt",
            b"Pair-Setup-Controller-Sign-Info",
            32,
        )?;

        let verifying_key = self.signing_key.verifying_key();
        let mut message = Vec::with_capacity(32 + self.ios_device_pairing_id.len() + 32);
        message.extend_from_slice(&ios_device_x);
        message.extend_from_slice(self.ios_device_pairing_id.as_bytes());
        message.extend_from_slice(verifying_key.as_bytes());
        let signature = self.signing_key.sign(&message);

        let sub_tlv = Tlv::builder()
            .add(tags::IDENTIFIER, self.ios_device_pairing_id.as_bytes().to_vec())
            .add(tags::PUBLIC_KEY, verifying_key.as_bytes().to_vec())
            .add(tags::SIGNATURE, signature.to_bytes().to_vec())
            .encode();

        let ciphertext = seal(&setup_key, &ceremony_nonce(M5_NONCE), b"", &sub_tlv)?;

        Ok(Tlv::builder()
            .add_u8(tags::STATE, 5)
            .add(tags::ENCRYPTED_DATA, ciphertext)
            .encode())
    }

    /// M6 (parse): decrypts the accessory's identity sub-TLV, verifies
    /// its signature, and returns the persistent [`PairingIdentity`].
    pub fn parse_m6(&self, buf: &[u8]) -> Result<PairingIdentity> {
        let tlv = Tlv::decode(buf);
        check_state(&tlv, 6)?;
        let premaster = self.premaster.as_ref().ok_or_else(|| Error::protocol("M6 parsed before M3/M4 ran"))?;

        let setup_key = derive_setup_encrypt_key(&premaster.session_key)?;
        let ciphertext = tlv.get_required(tags::ENCRYPTED_DATA)?;
        let plaintext = open(&setup_key, &ceremony_nonce(M6_NONCE), b"", ciphertext)?;

        let sub_tlv = Tlv::decode(&plaintext);
        let identifier = sub_tlv.get_required(tags::IDENTIFIER)?;
        let accessory_pairing_id =
            String::from_utf8(identifier.to_vec()).map_err(|_| PairingError::MalformedSubTlv)?;
        let ltpk_bytes: [u8; 32] = sub_tlv
            .get_required(tags::PUBLIC_KEY)?
            .try_into()
            .map_err(|_| PairingError::MalformedSubTlv)?;
        let signature_bytes: [u8; 64] = sub_tlv
            .get_required(tags::SIGNATURE)?
            .try_into()
            .map_err(|_| PairingError::MalformedSubTlv)?;

        let accessory_x = hkdf_derive(
            &premaster.session_key,
            b"Pair-Setup-Accessory-Sign-Salt",
            b"Pair-Setup-Accessory-Sign-Info",
            32,
        )?;

        let mut message = Vec::with_capacity(32 + accessory_pairing_id.len() + 32);
        message.extend_from_slice(&accessory_x);
        message.extend_from_slice(accessory_pairing_id.as_bytes());
        message.extend_from_slice(&ltpk_bytes);

        let verifying_key =
            VerifyingKey::from_bytes(&ltpk_bytes).map_err(|_| PairingError::MalformedSubTlv)?;
        let signature = ed25519_dalek::Signature::from_bytes(&signature_bytes);
        verifying_key
            .verify(&message, &signature)
            .map_err(|_| PairingError::SignatureInvalid)?;

        Ok(PairingIdentity {
            accessory_pairing_id,
            accessory_ltpk: ltpk_bytes,
            ios_device_pairing_id: self.ios_device_pairing_id.clone(),
            ios_device_ltsk: self.signing_key.to_keypair_bytes(),
            ios_device_ltpk: *self.signing_key.verifying_key().as_bytes(),
        })
    }
}

fn derive_setup_encrypt_key(session_key: &[u8]) -> Result<AeadKey> {
    let bytes = hkdf_derive(session_key, b"Pair-Setup-Encrypt-Salt", b"Pair-Setup-Encrypt-Info", 32)?;
    AeadKey::from_slice(&bytes)
}

impl Default for PairSetup {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn m1_is_method_one_state_one() {
        let setup = PairSetup::new();
        let tlv = Tlv::decode(&setup.build_m1());
        assert_eq!(tlv.get_u8(tags::STATE), Some(1));
        assert_eq!(tlv.get_u8(tags::METHOD), Some(tags::method::PAIR_SETUP_WITH_AUTH));
    }

    #[test]
    fn parse_m2_rejects_wrong_state() {
        let setup = PairSetup::new();
        let buf = Tlv::builder().add_u8(tags::STATE, 99).encode();
        assert!(setup.parse_m2(&buf).is_err());
    }

    #[test]
    fn parse_m2_surfaces_accessory_error_tag() {
        let setup = PairSetup::new();
        let buf = Tlv::builder()
            .add_u8(tags::STATE, 2)
            .add_u8(tags::ERROR, tags::error_code::MAX_TRIES)
            .encode();
        assert!(matches!(
            setup.parse_m2(&buf),
            Err(hap_core::Error::AuthenticationError(_))
        ));
    }

    #[test]
    fn ios_device_pairing_id_is_a_uuid() {
        let setup = PairSetup::new();
        assert!(Uuid::parse_str(setup.ios_device_pairing_id()).is_ok());
    }
}
