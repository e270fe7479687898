//! DNS-SD TXT record fields advertised by a HAP accessory (spec §3/§6).
//! Parsing the actual mDNS packets is out of scope (caller-supplied,
//! per the Non-goals) — this only types the record once the caller has
//! handed over the key/value pairs.

use std::collections::HashMap;

use hap_core::Result;

/// Typed view over a HAP `_hap._tcp` (or `_hap._ble`) TXT record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HapTxtRecord {
    /// `c#` — current configuration number, bumped whenever the
    /// accessory's attribute database changes.
    pub configuration_number: u32,
    /// `ff` — feature flags bitmask (bit 0: supports HAP pairing).
    pub feature_flags: u8,
    /// `id` — accessory's pairing identifier (its Ed25519 public key's
    /// paired identity, formatted as a MAC-style hex string).
    pub device_id: String,
    /// `md` — human-readable model name.
    pub model: String,
    /// `pv` — protocol version, e.g. `"1.1"`.
    pub protocol_version: String,
    /// `s#` — state number, incremented on every characteristic change.
    pub state_number: u32,
    /// `sf` — status flags bitmask (bit 0: not paired with any controller).
    pub status_flags: u8,
    /// `ci` — accessory category identifier (spec glossary; mirrors
    /// `hap_registry::categories`).
    pub category_identifier: u16,
}

impl HapTxtRecord {
    /// Builds a typed record from the raw key/value pairs a caller's
    /// DNS-SD resolver handed back. Unknown keys are ignored; missing
    /// required keys fail with [`hap_core::Error::invalid_input`].
    pub fn from_pairs(pairs: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| -> Result<&str> {
            pairs
                .get(key)
                .map(String::as_str)
                .ok_or_else(|| hap_core::Error::invalid_input(format!("TXT record missing `{key}`")))
        };
        let parse_u32 = |key: &str, value: &str| -> Result<u32> {
            value
                .parse()
                .map_err(|_| hap_core::Error::invalid_input(format!("TXT record `{key}` is not a u32: {value}")))
        };
        let parse_u16 = |key: &str, value: &str| -> Result<u16> {
            value
                .parse()
                .map_err(|_| hap_core::Error::invalid_input(format!("TXT record `{key}` is not a u16: {value}")))
        };
        let parse_flags = |key: &str, value: &str| -> Result<u8> {
            value
                .parse()
                .map_err(|_| hap_core::Error::invalid_input(format!("TXT record `{key}` is not a u8: {value}")))
        };

        Ok(Self {
            configuration_number: parse_u32("c#", get("c#")?)?,
            feature_flags: parse_flags("ff", pairs.get("ff").map(String::as_str).unwrap_or("0"))?,
            device_id: get("id")?.to_string(),
            model: get("md")?.to_string(),
            protocol_version: pairs.get("pv").cloned().unwrap_or_else(|| "1.1".to_string()),
            state_number: parse_u32("s#", get("s#")?)?,
            status_flags: parse_flags("sf", get("sf")?)?,
            category_identifier: parse_u16("ci", get("ci")?)?,
        })
    }

    /// Bit 0 of `sf`: the accessory is not currently paired with any controller.
    pub fn is_unpaired(&self) -> bool {
        self.status_flags & 0x01 != 0
    }
}
