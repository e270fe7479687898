//! Core data model: attribute database, HAP value formats, and the
//! persistent pairing identity bundle (spec §3).

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Accessory identifier. Unique per accessory; `1` for a non-bridge accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aid(pub u64);

impl fmt::Display for Aid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Instance identifier. Unique per accessory (across its services and characteristics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Iid(pub u64);

impl fmt::Display for Iid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the HAP-documented characteristic value formats (spec §3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapFormat {
    Bool,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int,
    Float,
    String,
    Data,
}

impl HapFormat {
    /// Parse the HAP wire name (e.g. `"uint8"`) into a format.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "uint8" => Self::UInt8,
            "uint16" => Self::UInt16,
            "uint32" => Self::UInt32,
            "uint64" => Self::UInt64,
            "int" => Self::Int,
            "float" => Self::Float,
            "string" => Self::String,
            "data" => Self::Data,
            _ => return None,
        })
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Data => "data",
        }
    }
}

/// A decoded HAP characteristic value, tagged by the format it was decoded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HapValue {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
    Str(String),
    Data(Vec<u8>),
}

/// Read/write/notify permission flags decoded from a GATT characteristic's
/// 16-bit permission bitmask (spec §4.6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perms {
    /// Additional authorization data supported (`aa`).
    pub additional_authorization: bool,
    /// Timed write supported (`tw`).
    pub timed_write: bool,
    /// Paired read (`pr`).
    pub paired_read: bool,
    /// Paired write (`pw`).
    pub paired_write: bool,
    /// Hidden from normal UIs (`hd`).
    pub hidden: bool,
    /// Notify/indicate supported (`ev`).
    pub events: bool,
}

impl Perms {
    pub const AA: u16 = 0x0004;
    pub const TW: u16 = 0x0008;
    pub const PR: u16 = 0x0010;
    pub const PW: u16 = 0x0020;
    pub const HD: u16 = 0x0040;
    pub const EV_LO: u16 = 0x0080;
    pub const EV_HI: u16 = 0x0100;

    /// Decode from a little-endian 16-bit permission bitmask.
    pub fn from_bits(bits: u16) -> Self {
        Self {
            additional_authorization: bits & Self::AA != 0,
            timed_write: bits & Self::TW != 0,
            paired_read: bits & Self::PR != 0,
            paired_write: bits & Self::PW != 0,
            hidden: bits & Self::HD != 0,
            events: bits & (Self::EV_LO | Self::EV_HI) != 0,
        }
    }

    pub fn as_strings(&self) -> Vec<&'static str> {
        let mut v = Vec::new();
        if self.additional_authorization {
            v.push("aa");
        }
        if self.timed_write {
            v.push("tw");
        }
        if self.paired_read {
            v.push("pr");
        }
        if self.paired_write {
            v.push("pw");
        }
        if self.hidden {
            v.push("hd");
        }
        if self.events {
            v.push("ev");
        }
        v
    }
}

/// A single characteristic within a service (spec §3 attribute database).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Characteristic {
    pub iid: Iid,
    #[serde(rename = "type")]
    pub type_: String,
    pub format: HapFormat,
    pub perms: Perms,
    pub ev: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<HapValue>,
    #[serde(rename = "minValue", skip_serializing_if = "Option::is_none")]
    pub min_value: Option<HapValue>,
    #[serde(rename = "maxValue", skip_serializing_if = "Option::is_none")]
    pub max_value: Option<HapValue>,
    #[serde(rename = "minStep", skip_serializing_if = "Option::is_none")]
    pub min_step: Option<HapValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "valid-values", skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<Vec<u64>>,
    #[serde(rename = "valid-values-range", skip_serializing_if = "Option::is_none")]
    pub valid_values_range: Option<(u64, u64)>,
}

/// A service within an accessory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub iid: Iid,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    pub characteristics: Vec<Characteristic>,
}

/// One accessory within the attribute database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accessory {
    pub aid: Aid,
    pub services: Vec<Service>,
}

/// The attribute database returned by the accessory (IP) or reconstructed
/// from GATT discovery (BLE) — spec §3.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessoryDatabase {
    pub accessories: Vec<Accessory>,
}

/// The persistent, five-field pairing identity bundle produced by a
/// successful Pair-Setup (spec §3). Immutable until the caller re-pairs.
///
/// The caller owns at-rest persistence (spec §1's Non-goal on storage);
/// this type is just the in-memory/export shape. The long-term secret
/// key is zeroized on drop.
#[derive(Clone, Serialize, Deserialize)]
pub struct PairingIdentity {
    pub accessory_pairing_id: String,
    #[serde(with = "hex_bytes")]
    pub accessory_ltpk: [u8; 32],
    pub ios_device_pairing_id: String,
    #[serde(with = "hex_bytes_64")]
    pub ios_device_ltsk: [u8; 64],
    #[serde(with = "hex_bytes")]
    pub ios_device_ltpk: [u8; 32],
}

impl Drop for PairingIdentity {
    fn drop(&mut self) {
        self.ios_device_ltsk.zeroize();
    }
}

impl fmt::Debug for PairingIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairingIdentity")
            .field("accessory_pairing_id", &self.accessory_pairing_id)
            .field("accessory_ltpk", &hex::encode(self.accessory_ltpk))
            .field("ios_device_pairing_id", &self.ios_device_pairing_id)
            .field("ios_device_ltsk", &"[REDACTED]")
            .field("ios_device_ltpk", &hex::encode(self.ios_device_ltpk))
            .finish()
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        let v = hex::decode(s).map_err(serde::de::Error::custom)?;
        v.try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}

mod hex_bytes_64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 64], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 64], D::Error> {
        let s = String::deserialize(d)?;
        let v = hex::decode(s).map_err(serde::de::Error::custom)?;
        v.try_into()
            .map_err(|_| serde::de::Error::custom("expected 64 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perms_decode_all_rw() {
        let p = Perms::from_bits(0x003C);
        assert!(p.additional_authorization);
        assert!(p.timed_write);
        assert!(p.paired_read);
        assert!(p.paired_write);
        assert!(!p.hidden);
        assert!(!p.events);
    }

    #[test]
    fn perms_decode_events_only() {
        let p = Perms::from_bits(0x0180);
        assert_eq!(p.as_strings(), vec!["ev"]);
    }

    #[test]
    fn perms_decode_both_ev_bits_once() {
        let p = Perms::from_bits(Perms::EV_LO | Perms::EV_HI);
        assert_eq!(p.as_strings(), vec!["ev"]);
    }

    #[test]
    fn pairing_identity_debug_redacts_secret() {
        let id = PairingIdentity {
            accessory_pairing_id: "AA:BB:CC:DD:EE:FF".into(),
            accessory_ltpk: [1u8; 32],
            ios_device_pairing_id: "11111111-2222-3333-4444-555555555555".into(),
            ios_device_ltsk: [2u8; 64],
            ios_device_ltpk: [3u8; 32],
        };
        let dbg = format!("{:?}", id);
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains(&hex::encode([2u8; 64])));
    }
}
