//! Pairing identity export/import (spec §6, promoted to a typed API per
//! the supplemented-features list): the caller owns at-rest persistence,
//! but needs a concrete, serializable shape to persist. A single
//! hex-encoded, pipe-separated line round-trips every field of
//! [`PairingIdentity`] without pulling in a serialization format of its
//! own opinion about whitespace or escaping.

use hap_core::{Error, PairingIdentity, Result};
use std::fmt;

const FIELD_COUNT: usize = 5;

/// Renders as `accessory_pairing_id|accessory_ltpk|ios_device_pairing_id|ios_device_ltsk|ios_device_ltpk`,
/// with the three key fields hex-encoded.
pub struct ExportedIdentity(pub(crate) PairingIdentity);

impl fmt::Display for ExportedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.0.accessory_pairing_id,
            hex::encode(self.0.accessory_ltpk),
            self.0.ios_device_pairing_id,
            hex::encode(self.0.ios_device_ltsk),
            hex::encode(self.0.ios_device_ltpk),
        )
    }
}

pub fn export(identity: &PairingIdentity) -> ExportedIdentity {
    ExportedIdentity(identity.clone())
}

pub fn import(line: &str) -> Result<PairingIdentity> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != FIELD_COUNT {
        return Err(Error::invalid_input(format!(
            "expected {FIELD_COUNT} pipe-separated fields, got {}",
            fields.len()
        )));
    }

    let accessory_ltpk = decode_array::<32>(fields[1])?;
    let ios_device_ltsk = decode_array::<64>(fields[3])?;
    let ios_device_ltpk = decode_array::<32>(fields[4])?;

    Ok(PairingIdentity {
        accessory_pairing_id: fields[0].to_string(),
        accessory_ltpk,
        ios_device_pairing_id: fields[2].to_string(),
        ios_device_ltsk,
        ios_device_ltpk,
    })
}

fn decode_array<const N: usize>(hex_str: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(hex_str).map_err(|e| Error::invalid_input(format!("bad hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| Error::invalid_input(format!("expected {N} bytes, got {}", v.len())))
}
