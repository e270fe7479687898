//! HKDF-SHA-512 key derivation (spec §4.3's `(salt, info, length)` table).

use hap_core::{Error, Result};
use hkdf::Hkdf;
use sha2::Sha512;
use zeroize::Zeroizing;

/// Derive `output_length` bytes from `parent_key` via HKDF-SHA-512,
/// using `salt` and `info` exactly as spec.md's derivation table lists them.
pub fn derive(parent_key: &[u8], salt: &[u8], info: &[u8], output_length: usize) -> Result<Zeroizing<Vec<u8>>> {
    let hkdf = Hkdf::<Sha512>::new(Some(salt), parent_key);
    let mut output = Zeroizing::new(vec![0u8; output_length]);
    hkdf.expand(info, &mut output)
        .map_err(|e| Error::protocol(format!("HKDF expand failed: {e}")))?;
    Ok(output)
}
