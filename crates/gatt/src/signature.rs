//! Decodes a Characteristic-Signature-Read (or Service-Signature-Read)
//! response body into the attribute-database fields it describes
//! (spec §4.6's closing paragraph on `getAccessories()`).

use hap_core::{HapFormat, HapValue, Perms};
use hap_registry::{value_codec, GattParamTag};
use hap_tlv::Tlv;

use crate::error::GattTransportError;

/// Everything a characteristic signature read can tell us about one
/// characteristic, beyond the instance ID already known from discovery.
#[derive(Debug, Clone, Default)]
pub struct CharacteristicSignature {
    pub type_uuid: Option<String>,
    pub perms: Perms,
    pub format: Option<HapFormat>,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub min_value: Option<HapValue>,
    pub max_value: Option<HapValue>,
    pub min_step: Option<HapValue>,
}

/// Everything a service signature read can tell us: whether the service
/// is primary and/or hidden (spec §4.6).
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceSignature {
    pub primary: bool,
    pub hidden: bool,
}

pub fn decode_characteristic_signature(body: &[u8]) -> Result<CharacteristicSignature, GattTransportError> {
    let tlv = Tlv::decode(body);
    let mut signature = CharacteristicSignature::default();

    if let Some(bytes) = tlv.get(GattParamTag::HapParamCharacteristicType as u8) {
        signature.type_uuid = Some(hap_registry::canonicalize_uuid(&hex::encode(bytes)).unwrap_or_else(|_| hex::encode(bytes)));
    }

    if let Some(bytes) = tlv.get(GattParamTag::HapParamHapCharacteristicPropertiesDescriptor as u8) {
        if bytes.len() >= 2 {
            let bits = u16::from_le_bytes([bytes[0], bytes[1]]);
            signature.perms = Perms::from_bits(bits);
        }
    }

    if let Some(bytes) = tlv.get(GattParamTag::HapParamGattPresentationFormatDescriptor as u8) {
        if let Some(&format_byte) = bytes.first() {
            signature.format = value_codec::hap_format_from_bt_sig(format_byte);
        }
        if bytes.len() >= 3 {
            let unit_uuid = u16::from_le_bytes([bytes[1], bytes[2]]);
            signature.unit = value_codec::hap_unit_from_bt_sig(unit_uuid).map(str::to_string);
        }
    }

    if let Some(bytes) = tlv.get(GattParamTag::HapParamGattUserDescriptionDescriptor as u8) {
        signature.description = std::str::from_utf8(bytes).ok().map(str::to_string);
    }

    if let (Some(format), Some(range)) = (signature.format, tlv.get(GattParamTag::HapParamGattValidRange as u8)) {
        let half = range.len() / 2;
        if half > 0 {
            signature.min_value = value_codec::buffer_to_value(&range[..half], format).ok();
            signature.max_value = value_codec::buffer_to_value(&range[half..], format).ok();
        }
    }

    if let (Some(format), Some(bytes)) = (signature.format, tlv.get(GattParamTag::HapParamHapStepValueDescriptor as u8)) {
        signature.min_step = value_codec::buffer_to_value(bytes, format).ok();
    }

    Ok(signature)
}

pub fn decode_service_signature(body: &[u8]) -> ServiceSignature {
    let tlv = Tlv::decode(body);
    // HAP's service properties descriptor is a 2-byte bitmask: bit 0
    // primary, bit 1 hidden (mirroring the characteristic properties
    // descriptor's bit-per-flag convention).
    let bits = tlv
        .get(GattParamTag::HapParamHapCharacteristicPropertiesDescriptor as u8)
        .and_then(|b| (b.len() >= 2).then(|| u16::from_le_bytes([b[0], b[1]])))
        .unwrap_or(0);
    ServiceSignature {
        primary: bits & 0x01 != 0,
        hidden: bits & 0x02 != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hap_tlv::Tlv;

    #[test]
    fn decodes_perms_and_format() {
        let body = Tlv::builder()
            .add(GattParamTag::HapParamHapCharacteristicPropertiesDescriptor as u8, 0x003Cu16.to_le_bytes().to_vec())
            .add(GattParamTag::HapParamGattPresentationFormatDescriptor as u8, vec![0x04, 0x00, 0x27])
            .encode();

        let signature = decode_characteristic_signature(&body).unwrap();
        assert!(signature.perms.paired_read);
        assert_eq!(signature.format, Some(HapFormat::UInt8));
    }

    #[test]
    fn decodes_service_primary_flag() {
        let body = Tlv::builder()
            .add(GattParamTag::HapParamHapCharacteristicPropertiesDescriptor as u8, 0x0001u16.to_le_bytes().to_vec())
            .encode();
        let signature = decode_service_signature(&body);
        assert!(signature.primary);
        assert!(!signature.hidden);
    }
}
