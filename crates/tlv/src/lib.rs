//! TLV8 container codec (spec §4.1, §3): the byte-level container used
//! by pairing messages and GATT command bodies.
//!
//! The wire representation is an ordered stream of `tag(1) | len(1) |
//! value(len)` entries. Three rules complicate a naive tag→bytes map:
//!
//! - values longer than 255 bytes are split into consecutive same-tag
//!   chunks and must be reassembled by the decoder;
//! - two *distinct* values under the same tag must be separated by a
//!   `tag=0xFF, len=0` separator entry, or the decoder treats them as
//!   one concatenated continuation;
//! - "same tag, adjacent" means continuation, "same tag with other
//!   tags (or a separator) in between" means another value.
//!
//! Both directions are unified on a single representation — an ordered
//! list of `(tag, value-or-values)` — rather than the mix of shapes
//! the wire format superficially suggests.

use std::collections::HashMap;
use thiserror::Error;

/// Tag reserved by the wire format to separate adjacent same-tag values.
pub const SEPARATOR_TAG: u8 = 0xFF;

const MAX_CHUNK_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum TlvError {
    #[error("TLV field {0:#04x} is missing")]
    MissingField(u8),
}

impl From<TlvError> for hap_core::Error {
    fn from(err: TlvError) -> Self {
        hap_core::Error::protocol(err.to_string())
    }
}

/// What a tag maps to once repeated-value semantics are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Stored {
    One(Vec<u8>),
    Many(Vec<Vec<u8>>),
}

/// An ordered tag→value(s) container, decoded from or destined for the
/// TLV8 wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tlv {
    // Insertion-ordered; `HashMap` below is an index into this Vec so
    // lookups by tag stay O(1) while iteration keeps first-seen order.
    entries: Vec<(u8, Stored)>,
    index: HashMap<u8, usize>,
}

impl Tlv {
    pub fn builder() -> Tlv {
        Tlv::default()
    }

    /// Append a value under `tag`. A repeated call with the same tag
    /// records a *distinct* value (separated by 0xFF on the wire) —
    /// for a single value that merely exceeds 255 bytes, pass the
    /// whole value in one `add` call; chunking is automatic.
    pub fn add(mut self, tag: u8, value: impl Into<Vec<u8>>) -> Self {
        self.add_mut(tag, value);
        self
    }

    pub fn add_mut(&mut self, tag: u8, value: impl Into<Vec<u8>>) {
        let value = value.into();
        match self.index.get(&tag) {
            None => {
                self.index.insert(tag, self.entries.len());
                self.entries.push((tag, Stored::One(value)));
            }
            Some(&idx) => match &mut self.entries[idx].1 {
                Stored::One(existing) => {
                    let prev = std::mem::take(existing);
                    self.entries[idx].1 = Stored::Many(vec![prev, value]);
                }
                Stored::Many(list) => list.push(value),
            },
        }
    }

    pub fn add_u8(self, tag: u8, value: u8) -> Self {
        self.add(tag, vec![value])
    }

    /// The first (or only) value stored under `tag`.
    pub fn get(&self, tag: u8) -> Option<&[u8]> {
        let idx = *self.index.get(&tag)?;
        match &self.entries[idx].1 {
            Stored::One(v) => Some(v),
            Stored::Many(list) => list.first().map(|v| v.as_slice()),
        }
    }

    /// Every distinct value stored under `tag`, in the order added/decoded.
    pub fn get_all(&self, tag: u8) -> Vec<&[u8]> {
        let Some(&idx) = self.index.get(&tag) else {
            return Vec::new();
        };
        match &self.entries[idx].1 {
            Stored::One(v) => vec![v.as_slice()],
            Stored::Many(list) => list.iter().map(|v| v.as_slice()).collect(),
        }
    }

    pub fn get_required(&self, tag: u8) -> Result<&[u8], TlvError> {
        self.get(tag).ok_or(TlvError::MissingField(tag))
    }

    pub fn get_u8(&self, tag: u8) -> Option<u8> {
        self.get(tag).and_then(|v| v.first().copied())
    }

    pub fn contains(&self, tag: u8) -> bool {
        self.index.contains_key(&tag)
    }

    /// Serialize to the TLV8 wire format (spec §4.1 encode rules).
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (tag, stored) in &self.entries {
            match stored {
                Stored::One(v) => encode_chunks(&mut out, *tag, v),
                Stored::Many(list) => {
                    for (i, v) in list.iter().enumerate() {
                        if i > 0 {
                            out.push(SEPARATOR_TAG);
                            out.push(0);
                        }
                        encode_chunks(&mut out, *tag, v);
                    }
                }
            }
        }
        out
    }

    /// Decode the TLV8 wire format (spec §4.1 decode/merge rules).
    ///
    /// Never fails: a truncated trailing entry yields a truncated
    /// value instead of an error, matching the accessory-tolerant
    /// behavior spec.md §4.1 calls for.
    pub fn decode(buf: &[u8]) -> Tlv {
        let mut tlv = Tlv::default();
        let mut last_tag: Option<u8> = None;
        let mut pos = 0usize;

        while pos + 2 <= buf.len() {
            let tag = buf[pos];
            let len = buf[pos + 1] as usize;
            pos += 2;

            let available = buf.len().saturating_sub(pos);
            let take = len.min(available);
            let value = buf[pos..pos + take].to_vec();
            pos += take;

            match tlv.index.get(&tag).copied() {
                None => {
                    tlv.index.insert(tag, tlv.entries.len());
                    tlv.entries.push((tag, Stored::One(value)));
                }
                Some(idx) => {
                    if last_tag == Some(tag) {
                        match &mut tlv.entries[idx].1 {
                            Stored::One(existing) => existing.extend_from_slice(&value),
                            Stored::Many(list) => {
                                list.last_mut().expect("non-empty list").extend_from_slice(&value)
                            }
                        }
                    } else {
                        match &mut tlv.entries[idx].1 {
                            Stored::One(existing) => {
                                let prev = std::mem::take(existing);
                                tlv.entries[idx].1 = Stored::Many(vec![prev, value]);
                            }
                            Stored::Many(list) => list.push(value),
                        }
                    }
                }
            }

            last_tag = Some(tag);

            if take < len {
                // Length overran the remaining buffer: malformed input,
                // stop after recording the truncated trailing value.
                break;
            }
        }

        tlv
    }
}

fn encode_chunks(out: &mut Vec<u8>, tag: u8, value: &[u8]) {
    if value.is_empty() {
        out.push(tag);
        out.push(0);
        return;
    }
    for chunk in value.chunks(MAX_CHUNK_LEN) {
        out.push(tag);
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_simple() {
        let tlv = Tlv::builder().add_u8(6, 1).add_u8(0, 0);
        let encoded = tlv.encode();
        assert_eq!(encoded, vec![6, 1, 1, 0, 1, 0]);

        let decoded = Tlv::decode(&encoded);
        assert_eq!(decoded.get_u8(6), Some(1));
        assert_eq!(decoded.get_u8(0), Some(0));
    }

    #[test]
    fn split_long_value_into_255_byte_chunks() {
        let value = vec![0xAAu8; 600];
        let tlv = Tlv::builder().add(3, value.clone());
        let encoded = tlv.encode();

        // tag|255|<255 bytes>  tag|255|<255 bytes>  tag|90|<90 bytes>
        assert_eq!(encoded[0], 3);
        assert_eq!(encoded[1], 255);
        assert_eq!(encoded[2 + 255], 3);
        assert_eq!(encoded[2 + 255 + 1], 255);
        assert_eq!(encoded[2 + 255 + 1 + 255 + 2], 3);
        assert_eq!(encoded[2 + 255 + 1 + 255 + 2 + 1], 90);

        let decoded = Tlv::decode(&encoded);
        assert_eq!(decoded.get(3).unwrap(), value.as_slice());
    }

    #[test]
    fn separator_splits_two_distinct_values_of_same_tag() {
        let tlv = Tlv::builder().add(9, vec![1, 2]).add(9, vec![3, 4]);
        let encoded = tlv.encode();
        assert_eq!(
            encoded,
            vec![9, 2, 1, 2, SEPARATOR_TAG, 0, 9, 2, 3, 4]
        );

        let decoded = Tlv::decode(&encoded);
        assert_eq!(decoded.get_all(9), vec![&[1, 2][..], &[3, 4][..]]);
    }

    #[test]
    fn without_separator_same_tag_concatenates() {
        // No 0xFF between the two tag-9 entries: decoder treats it as
        // one continuation, not two values.
        let buf = vec![9, 2, 1, 2, 9, 2, 3, 4];
        let decoded = Tlv::decode(&buf);
        assert_eq!(decoded.get(9), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(decoded.get_all(9).len(), 1);
    }

    #[test]
    fn interleaved_other_tag_forces_new_value() {
        // tag 9, tag 1, tag 9: the intervening tag 1 breaks adjacency,
        // so the two tag-9 entries are distinct values, not a continuation.
        let buf = vec![9, 1, 0xAA, 1, 1, 0x01, 9, 1, 0xBB];
        let decoded = Tlv::decode(&buf);
        assert_eq!(decoded.get_all(9), vec![&[0xAAu8][..], &[0xBBu8][..]]);
    }

    #[test]
    fn truncated_input_yields_truncated_trailing_value() {
        let buf = vec![5, 10, 1, 2, 3]; // declares 10 bytes, only 3 present
        let decoded = Tlv::decode(&buf);
        assert_eq!(decoded.get(5), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn zero_length_value_round_trips() {
        let tlv = Tlv::builder().add(7, Vec::new());
        let encoded = tlv.encode();
        assert_eq!(encoded, vec![7, 0]);
        let decoded = Tlv::decode(&encoded);
        assert_eq!(decoded.get(7), Some(&[][..]));
    }

    #[test]
    fn missing_required_field_errors() {
        let decoded = Tlv::decode(&[6, 1, 2]);
        assert!(matches!(decoded.get_required(9), Err(TlvError::MissingField(9))));
    }

    proptest::proptest! {
        #[test]
        fn round_trip_arbitrary_single_values(
            tag in 0u8..254u8,
            value in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..2048),
        ) {
            let tlv = Tlv::builder().add(tag, value.clone());
            let decoded = Tlv::decode(&tlv.encode());
            proptest::prop_assert_eq!(decoded.get(tag), Some(value.as_slice()));
        }
    }
}
