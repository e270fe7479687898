//! Add/Remove/List Pairings (spec §4.3's closing paragraph, promoted to
//! a first-class API per the supplemented-features list): simple M1/M2
//! TLV exchanges that run inside an already-verified session. Framing
//! and transport are someone else's problem; these are pure builders
//! and parsers over the same TLV8 container the ceremonies use.

use crate::error::check_state;
use crate::tags;
use hap_core::Result;
use hap_tlv::Tlv;

/// One entry of a `ListPairings` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingEntry {
    pub identifier: String,
    pub public_key: [u8; 32],
    pub is_admin: bool,
}

/// `AddPairing` M1: `{State=1, Method=3, Identifier, PublicKey=ltpk, Permissions}`.
pub fn build_add_pairing_request(identifier: &str, ltpk: &[u8; 32], is_admin: bool) -> Vec<u8> {
    let permissions = if is_admin { tags::permissions::ADMIN } else { tags::permissions::REGULAR_USER };
    Tlv::builder()
        .add_u8(tags::STATE, 1)
        .add_u8(tags::METHOD, tags::method::ADD_PAIRING)
        .add(tags::IDENTIFIER, identifier.as_bytes().to_vec())
        .add(tags::PUBLIC_KEY, ltpk.to_vec())
        .add_u8(tags::PERMISSIONS, permissions)
        .encode()
}

/// `RemovePairing` M1: `{State=1, Method=4, Identifier}`.
pub fn build_remove_pairing_request(identifier: &str) -> Vec<u8> {
    Tlv::builder()
        .add_u8(tags::STATE, 1)
        .add_u8(tags::METHOD, tags::method::REMOVE_PAIRING)
        .add(tags::IDENTIFIER, identifier.as_bytes().to_vec())
        .encode()
}

/// `ListPairings` M1: `{State=1, Method=5}`.
pub fn build_list_pairings_request() -> Vec<u8> {
    Tlv::builder()
        .add_u8(tags::STATE, 1)
        .add_u8(tags::METHOD, tags::method::LIST_PAIRINGS)
        .encode()
}

/// Shared M2 validation for Add/Remove-Pairing: `State=2`, no `Error` tag.
pub fn parse_pairing_ack(buf: &[u8]) -> Result<()> {
    let tlv = Tlv::decode(buf);
    check_state(&tlv, 2)
}

/// `ListPairings` M2: zero or more `{Identifier, PublicKey, Permissions}`
/// groups, each separated on the wire by the `0xFF` separator tag.
pub fn parse_list_pairings_response(buf: &[u8]) -> Result<Vec<PairingEntry>> {
    let tlv = Tlv::decode(buf);
    check_state(&tlv, 2)?;

    let identifiers = tlv.get_all(tags::IDENTIFIER);
    let public_keys = tlv.get_all(tags::PUBLIC_KEY);
    let permissions = tlv.get_all(tags::PERMISSIONS);

    let mut entries = Vec::with_capacity(identifiers.len());
    for i in 0..identifiers.len() {
        let identifier = String::from_utf8(identifiers[i].to_vec())
            .map_err(|_| crate::error::PairingError::MalformedSubTlv)?;
        let public_key: [u8; 32] = public_keys
            .get(i)
            .copied()
            .unwrap_or(&[])
            .try_into()
            .map_err(|_| crate::error::PairingError::MalformedSubTlv)?;
        let is_admin = permissions.get(i).and_then(|p| p.first()).copied().unwrap_or(0) == tags::permissions::ADMIN;

        entries.push(PairingEntry {
            identifier,
            public_key,
            is_admin,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_pairing_request_carries_admin_permission() {
        let ltpk = [7u8; 32];
        let buf = build_add_pairing_request("device-1", &ltpk, true);
        let tlv = Tlv::decode(&buf);
        assert_eq!(tlv.get_u8(tags::METHOD), Some(tags::method::ADD_PAIRING));
        assert_eq!(tlv.get_u8(tags::PERMISSIONS), Some(tags::permissions::ADMIN));
    }

    #[test]
    fn list_pairings_parses_multiple_entries() {
        let buf = Tlv::builder()
            .add_u8(tags::STATE, 2)
            .add(tags::IDENTIFIER, b"one".to_vec())
            .add(tags::PUBLIC_KEY, vec![1u8; 32])
            .add_u8(tags::PERMISSIONS, tags::permissions::ADMIN)
            .add_u8(hap_tlv::SEPARATOR_TAG, 0)
            .add(tags::IDENTIFIER, b"two".to_vec())
            .add(tags::PUBLIC_KEY, vec![2u8; 32])
            .add_u8(tags::PERMISSIONS, tags::permissions::REGULAR_USER)
            .encode();

        let entries = parse_list_pairings_response(&buf).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].identifier, "one");
        assert!(entries[0].is_admin);
        assert_eq!(entries[1].identifier, "two");
        assert!(!entries[1].is_admin);
    }

    #[test]
    fn remove_pairing_ack_rejects_error_tag() {
        let buf = Tlv::builder()
            .add_u8(tags::STATE, 2)
            .add_u8(tags::ERROR, tags::error_code::UNKNOWN)
            .encode();
        assert!(parse_pairing_ack(&buf).is_err());
    }
}
