//! HAP-over-GATT PDU header codec (spec §4.6).
//!
//! Request header (no body): `ControlField(1) | Opcode(1) | TID(1) | IID(2 LE)`.
//! Request header (with body): the above plus `BodyLen(2 LE) | Body`.
//! Response header: `ControlField(1) | TID(1) | Status(1)`, optionally
//! followed by `BodyLen(2 LE) | Body` when the response carries one.
//! A response (or a write) that outruns one characteristic `read()`/
//! `write()` call continues across further PDU fragments, each of which
//! drops everything but `ControlField | TID` before its body bytes.

use hap_registry::{GattOpcode, GattStatus};

use crate::error::GattTransportError;

/// Request-side control field. Bit layout beyond "this is a request" is
/// not meaningful to anything this crate decodes, so a single constant
/// value is used for every outgoing PDU.
const REQUEST_CONTROL_FIELD: u8 = 0x00;

/// 8-bit wrapping transaction ID counter (spec §4.6).
#[derive(Debug, Default)]
pub struct TidCounter(u8);

impl TidCounter {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn next(&mut self) -> u8 {
        let tid = self.0;
        self.0 = self.0.wrapping_add(1);
        tid
    }
}

/// Builds a bodyless request PDU: `Signature-Read`, `Read`, `Service-Signature-Read`.
pub fn encode_request(opcode: GattOpcode, tid: u8, iid: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(5);
    out.push(REQUEST_CONTROL_FIELD);
    out.push(opcode.as_u8());
    out.push(tid);
    out.extend_from_slice(&iid.to_le_bytes());
    out
}

/// Builds a request PDU carrying a body: `Write`, `Timed-Write`, `Execute-Write`.
pub fn encode_request_with_body(opcode: GattOpcode, tid: u8, iid: u16, body: &[u8]) -> Vec<u8> {
    let mut out = encode_request(opcode, tid, iid);
    out.extend_from_slice(&(body.len() as u16).to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// The decoded contents of one response PDU fragment.
pub struct ResponseFragment<'a> {
    pub tid: u8,
    /// Only present on the first fragment of a response.
    pub status: Option<GattStatus>,
    /// The fragment's declared total body length, only present on the
    /// first fragment — later fragments just carry more body bytes.
    pub total_len: Option<usize>,
    pub body: &'a [u8],
}

/// Decodes one already-decrypted GATT response fragment. `is_first` tells
/// the codec whether to expect the 5-byte first-fragment header
/// (`ControlField|TID|Status|BodyLen`) or the 2-byte continuation header
/// (`ControlField|TID`).
pub fn decode_response_fragment(bytes: &[u8], is_first: bool) -> Result<ResponseFragment<'_>, GattTransportError> {
    let min_len = if is_first { 3 } else { 2 };
    if bytes.len() < min_len {
        return Err(GattTransportError::FragmentTooShort(bytes.len()));
    }

    let tid = bytes[1];
    if !is_first {
        return Ok(ResponseFragment { tid, status: None, total_len: None, body: &bytes[2..] });
    }

    let status = GattStatus::try_from(bytes[2])?;
    if bytes.len() < 5 {
        return Ok(ResponseFragment { tid, status: Some(status), total_len: Some(0), body: &[] });
    }
    let total_len = u16::from_le_bytes([bytes[3], bytes[4]]) as usize;
    Ok(ResponseFragment {
        tid,
        status: Some(status),
        total_len: Some(total_len),
        body: &bytes[5..],
    })
}

/// Accumulates response fragments into one reassembled TLV body (spec
/// §4.6's "slice off the 5-byte header from the first PDU and the 2-byte
/// header from each subsequent one, then concatenate" rule).
#[derive(Default)]
pub struct ResponseReassembler {
    tid: Option<u8>,
    status: Option<GattStatus>,
    total_len: Option<usize>,
    body: Vec<u8>,
}

impl ResponseReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, decrypted_fragment: &[u8]) -> Result<(), GattTransportError> {
        let is_first = self.tid.is_none();
        let fragment = decode_response_fragment(decrypted_fragment, is_first)?;

        if is_first {
            self.tid = Some(fragment.tid);
            self.status = fragment.status;
            self.total_len = fragment.total_len;
        } else if let Some(expected) = self.tid {
            if fragment.tid != expected {
                return Err(GattTransportError::TransactionIdMismatch { expected, actual: fragment.tid });
            }
        }

        self.body.extend_from_slice(fragment.body);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.total_len, Some(total) if self.body.len() >= total)
    }

    pub fn status(&self) -> Option<GattStatus> {
        self.status
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tid_counter_wraps_at_256() {
        let mut counter = TidCounter::new();
        for expected in 0..=255u8 {
            assert_eq!(counter.next(), expected);
        }
        assert_eq!(counter.next(), 0);
    }

    #[test]
    fn encodes_bodyless_read_request() {
        let pdu = encode_request(GattOpcode::Read, 7, 0x0010);
        assert_eq!(pdu, vec![0x00, GattOpcode::Read.as_u8(), 7, 0x10, 0x00]);
    }

    #[test]
    fn encodes_write_request_with_body() {
        let pdu = encode_request_with_body(GattOpcode::Write, 3, 0x0004, &[1, 2, 3]);
        assert_eq!(pdu[5..7], [3, 0]);
        assert_eq!(&pdu[7..], &[1, 2, 3]);
    }

    #[test]
    fn reassembles_single_fragment_response() {
        let mut reassembler = ResponseReassembler::new();
        // ControlField | TID | Status=0 | BodyLen=3 | body
        reassembler.feed(&[0x00, 9, 0x00, 3, 0, 1, 2, 3]).unwrap();
        assert!(reassembler.is_complete());
        assert_eq!(reassembler.status(), Some(GattStatus::Success));
        assert_eq!(reassembler.into_body(), vec![1, 2, 3]);
    }

    #[test]
    fn reassembles_multi_fragment_response() {
        let mut reassembler = ResponseReassembler::new();
        reassembler.feed(&[0x00, 5, 0x00, 5, 0, 1, 2]).unwrap();
        assert!(!reassembler.is_complete());
        reassembler.feed(&[0x00, 5, 3, 4, 5]).unwrap();
        assert!(reassembler.is_complete());
        assert_eq!(reassembler.into_body(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn rejects_mismatched_continuation_tid() {
        let mut reassembler = ResponseReassembler::new();
        reassembler.feed(&[0x00, 5, 0x00, 5, 0, 1, 2]).unwrap();
        assert!(reassembler.feed(&[0x00, 6, 3, 4, 5]).is_err());
    }
}
