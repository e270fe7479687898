//! Ed25519 long-term identity signing (spec §3, §4.3).

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hap_core::{Error, Result};

pub fn sign(signing_key: &SigningKey, message: &[u8]) -> Signature {
    signing_key.sign(message)
}

pub fn verify(verifying_key: &VerifyingKey, message: &[u8], signature: &Signature) -> Result<()> {
    verifying_key
        .verify(message, signature)
        .map_err(|_| Error::auth("Ed25519 signature verification failed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn sign_then_verify_succeeds() {
        let mut seed = [0u8; 32];
        rand::Rng::fill(&mut OsRng, &mut seed);
        let signing_key = SigningKey::from_bytes(&seed);
        let verifying_key = signing_key.verifying_key();
        let message = b"iOSDeviceX || iOSDevicePairingID || iOSDeviceLTPK";

        let signature = sign(&signing_key, message);
        assert!(verify(&verifying_key, message, &signature).is_ok());
    }

    #[test]
    fn tampered_message_fails_verification() {
        let mut seed = [0u8; 32];
        rand::Rng::fill(&mut OsRng, &mut seed);
        let signing_key = SigningKey::from_bytes(&seed);
        let verifying_key = signing_key.verifying_key();

        let signature = sign(&signing_key, b"original");
        assert!(verify(&verifying_key, b"tampered", &signature).is_err());
    }
}
