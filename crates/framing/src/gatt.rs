//! GATT framing (spec §4.4): same per-direction counter and AEAD
//! primitive as IP framing, but with no length-prefix AAD — the PDU
//! header (owned by `hap-gatt`) already carries the body length.

use hap_core::Result;
use hap_crypto::{counter_nonce, open, seal, AeadKey, TAG_SIZE};

use crate::error::FramingError;

pub const MAX_CHUNK_LEN: usize = 496;

pub struct GattFrameEncoder {
    key: AeadKey,
    counter: u64,
}

impl GattFrameEncoder {
    pub fn new(key: AeadKey) -> Self {
        Self { key, counter: 0 }
    }

    /// Split `message` into ≤496-byte plaintext chunks and encrypt each
    /// one, concatenating the ciphertext+tag frames with no extra framing.
    pub fn encode_message(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        if message.is_empty() {
            return self.encode_frame(&[]);
        }
        let mut out = Vec::with_capacity(message.len() + (message.len() / MAX_CHUNK_LEN + 1) * TAG_SIZE);
        for chunk in message.chunks(MAX_CHUNK_LEN) {
            out.extend_from_slice(&self.encode_frame(chunk)?);
        }
        Ok(out)
    }

    fn encode_frame(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = counter_nonce(self.counter);
        let ciphertext = seal(&self.key, &nonce, b"", plaintext)?;
        self.counter = self.counter.wrapping_add(1);
        Ok(ciphertext)
    }
}

pub struct GattFrameDecoder {
    key: AeadKey,
    counter: u64,
}

impl GattFrameDecoder {
    pub fn new(key: AeadKey) -> Self {
        Self { key, counter: 0 }
    }

    /// Decrypt a whole GATT body (already reassembled from its PDU
    /// fragments) by walking fixed-size ciphertext+tag frames — every
    /// frame but the last is exactly `MAX_CHUNK_LEN + TAG_SIZE` bytes, so
    /// the final (possibly shorter) frame falls out of the loop without
    /// needing to know the plaintext length up front. Unlike IP framing
    /// there is no resync: the body is delivered whole, so any tag
    /// failure fails the entire decode.
    pub fn decode_body(&mut self, ciphertext_stream: &[u8]) -> Result<Vec<u8>> {
        let frame_size = MAX_CHUNK_LEN + TAG_SIZE;
        if ciphertext_stream.len() < TAG_SIZE {
            return Err(FramingError::TruncatedGattBody(ciphertext_stream.len()).into());
        }

        let mut plaintext = Vec::with_capacity(ciphertext_stream.len());
        let mut offset = 0;
        while offset < ciphertext_stream.len() {
            let remaining = ciphertext_stream.len() - offset;
            let this_frame = remaining.min(frame_size);
            let nonce = counter_nonce(self.counter);
            let chunk = open(&self.key, &nonce, b"", &ciphertext_stream[offset..offset + this_frame])?;
            self.counter = self.counter.wrapping_add(1);
            plaintext.extend_from_slice(&chunk);
            offset += this_frame;
        }

        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> AeadKey {
        AeadKey::from_bytes([3u8; 32])
    }

    #[test]
    fn round_trip_short_message() {
        let mut encoder = GattFrameEncoder::new(key());
        let mut decoder = GattFrameDecoder::new(key());

        let wire = encoder.encode_message(b"hap-over-gatt").unwrap();
        let plaintext = decoder.decode_body(&wire).unwrap();
        assert_eq!(plaintext, b"hap-over-gatt");
    }

    #[test]
    fn round_trip_message_spanning_multiple_frames() {
        let mut encoder = GattFrameEncoder::new(key());
        let mut decoder = GattFrameDecoder::new(key());

        let message = vec![0x5Au8; MAX_CHUNK_LEN * 2 + 50];
        let wire = encoder.encode_message(&message).unwrap();
        let plaintext = decoder.decode_body(&wire).unwrap();
        assert_eq!(plaintext, message);
    }

    #[test]
    fn tampered_body_fails_whole_decode() {
        let mut encoder = GattFrameEncoder::new(key());
        let mut decoder = GattFrameDecoder::new(key());

        let mut wire = encoder.encode_message(b"short").unwrap();
        let last = wire.len() - 1;
        wire[last] ^= 0xFF;
        assert!(decoder.decode_body(&wire).is_err());
    }
}
