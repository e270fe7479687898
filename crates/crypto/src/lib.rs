//! # hap-crypto
//!
//! Cryptographic primitives the pairing engine (`hap-pairing`) and
//! secure framing (`hap-framing`) build on: SRP-6a, X25519, Ed25519,
//! HKDF-SHA-512, and the ChaCha20-Poly1305 AEAD primitive with HAP's
//! deterministic nonce construction.
//!
//! Every secret-carrying type here is zeroized on drop and has a
//! redacted `Debug` impl.

pub mod aead;
pub mod key_agreement;
pub mod key_derivation;
pub mod signing;
pub mod srp;

pub use aead::{ceremony_nonce, counter_nonce, open, seal, AeadKey, NONCE_SIZE, TAG_SIZE};
pub use key_agreement::{
    deserialize_public_key, derive_shared_secret, generate_keypair, serialize_public_key, shared_secret_from_bytes,
    SecretKey, SharedSecret,
};
pub use key_derivation::derive as hkdf_derive;
pub use signing::{sign, verify};
pub use srp::{SrpClient, SrpPremaster, SRP_USERNAME};
