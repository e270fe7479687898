//! X25519 (Curve25519) ECDH, as used by Pair-Verify's ephemeral key
//! agreement (spec §4.3, RFC 7748).
//!
//! Note: x25519-dalek 2.0 removed `StaticSecret`; ephemeral secrets are
//! represented directly as a `curve25519_dalek::Scalar` here.

use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;
use hap_core::{Error, Result};
use rand::RngCore;
use x25519_dalek::PublicKey;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A zeroizing X25519 secret scalar.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    scalar: Scalar,
}

impl SecretKey {
    /// Build from raw bytes, applying the standard X25519 clamping.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(Error::invalid_input(format!(
                "expected 32-byte X25519 secret, got {}",
                bytes.len()
            )));
        }

        let mut array = [0u8; 32];
        array.copy_from_slice(bytes);
        array[0] &= 248;
        array[31] &= 127;
        array[31] |= 64;

        let scalar = Scalar::from_bytes_mod_order(array);
        array.zeroize();

        Ok(Self { scalar })
    }

    pub fn public_key(&self) -> PublicKey {
        let point = &self.scalar * &curve25519_dalek::constants::X25519_BASEPOINT;
        PublicKey::from(*point.as_bytes())
    }

    pub(crate) fn as_scalar(&self) -> &Scalar {
        &self.scalar
    }
}

/// The shared secret output of an X25519 ECDH operation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    bytes: [u8; 32],
}

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

/// Wrap a 32-byte value already derived elsewhere (e.g. Pair-Resume's
/// re-derived shared secret, spec §4.3) as a `SharedSecret` so it gets
/// the same zeroizing/redacted treatment as one from `derive_shared_secret`.
pub fn shared_secret_from_bytes(bytes: &[u8]) -> Result<SharedSecret> {
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| Error::invalid_input("expected 32-byte shared secret"))?;
    Ok(SharedSecret { bytes: array })
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generate a fresh ephemeral X25519 keypair.
pub fn generate_keypair() -> (SecretKey, PublicKey) {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);

    bytes[0] &= 248;
    bytes[31] &= 127;
    bytes[31] |= 64;

    let scalar = Scalar::from_bytes_mod_order(bytes);
    let secret = SecretKey { scalar };
    let public = secret.public_key();

    bytes.zeroize();

    (secret, public)
}

/// Derive the shared secret from our secret key and the peer's public key.
/// Rejects the all-zero output, which indicates a low-order point was
/// supplied (contributory-behavior substitution attempt).
pub fn derive_shared_secret(our_secret: &SecretKey, their_public: &PublicKey) -> Result<SharedSecret> {
    let their_point = MontgomeryPoint(*their_public.as_bytes());
    let shared_point = our_secret.as_scalar() * their_point;
    let bytes = *shared_point.as_bytes();

    if bytes == [0u8; 32] {
        return Err(Error::auth("X25519 agreement produced a low-order point"));
    }

    Ok(SharedSecret { bytes })
}

pub fn serialize_public_key(public: &PublicKey) -> [u8; 32] {
    *public.as_bytes()
}

pub fn deserialize_public_key(bytes: &[u8]) -> Result<PublicKey> {
    if bytes.len() != 32 {
        return Err(Error::invalid_input(format!(
            "expected 32-byte X25519 public key, got {}",
            bytes.len()
        )));
    }
    let mut array = [0u8; 32];
    array.copy_from_slice(bytes);
    Ok(PublicKey::from(array))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_sides_derive_the_same_secret() {
        let (alice_secret, alice_public) = generate_keypair();
        let (bob_secret, bob_public) = generate_keypair();

        let alice_shared = derive_shared_secret(&alice_secret, &bob_public).unwrap();
        let bob_shared = derive_shared_secret(&bob_secret, &alice_public).unwrap();

        assert_eq!(alice_shared.as_bytes(), bob_shared.as_bytes());
    }

    #[test]
    fn public_key_round_trips_through_bytes() {
        let (_secret, public) = generate_keypair();
        let bytes = serialize_public_key(&public);
        let parsed = deserialize_public_key(&bytes).unwrap();
        assert_eq!(public.as_bytes(), parsed.as_bytes());
    }

    #[test]
    fn rejects_wrong_length_public_key() {
        assert!(deserialize_public_key(&[0u8; 31]).is_err());
    }

    #[test]
    fn low_order_point_is_rejected() {
        let (secret, _public) = generate_keypair();
        let bad_public = PublicKey::from([0u8; 32]);
        assert!(derive_shared_secret(&secret, &bad_public).is_err());
    }

    #[test]
    fn debug_redacts_shared_secret() {
        let (alice_secret, _) = generate_keypair();
        let (_, bob_public) = generate_keypair();
        let shared = derive_shared_secret(&alice_secret, &bob_public).unwrap();
        assert!(format!("{shared:?}").contains("REDACTED"));
    }
}
