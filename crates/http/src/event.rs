//! The non-standard `EVENT/1.0` push-message parser (spec §4.5, §8, §9):
//! after a subscription write, the same socket carries asynchronous
//! messages whose request line reads `EVENT/1.0 <code> <reason>` instead
//! of `HTTP/1.1 ...`. Three states: `EMPTY` → `REQUEST_LINE_COMPLETE` →
//! `HEADERS_COMPLETE`.
//!
//! Divergence from the source this was distilled from (documented as an
//! open question, spec §9): the source treats a missing `Content-Length`
//! as zero and resets immediately, even though its own test suite expects
//! a body to still arrive. Here, a missing `Content-Length` instead keeps
//! the parser in `HEADERS_COMPLETE` accumulating bytes; the caller signals
//! the end of the message (socket idle, or a size hint it has out-of-band)
//! via [`EventParser::flush`] rather than the parser silently assuming zero.

use hap_core::events::{CharacteristicChange, HapEvent};
use hap_core::{Aid, HapValue, Iid};
use serde::Deserialize;

use crate::error::HttpError;
use crate::message::{header_value, parse_headers, parse_status_line};

#[derive(Deserialize)]
struct EventBody {
    characteristics: Vec<EventCharacteristic>,
}

#[derive(Deserialize)]
struct EventCharacteristic {
    aid: u64,
    iid: u64,
    value: HapValue,
}

enum State {
    Empty,
    RequestLineComplete { status_code: u16 },
    HeadersComplete { status_code: u16, expected_len: Option<usize> },
}

pub struct EventParser {
    state: State,
    buffer: Vec<u8>,
}

impl EventParser {
    pub fn new() -> Self {
        Self {
            state: State::Empty,
            buffer: Vec::new(),
        }
    }

    /// Feeds newly-arrived bytes. Returns `Some(event)` once a complete
    /// message (with a known `Content-Length`) has been accumulated.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Option<HapEvent>, HttpError> {
        self.buffer.extend_from_slice(bytes);
        self.advance(false)
    }

    /// Signals that no more bytes are coming for the current message
    /// (socket EOF, idle timeout, or an out-of-band size hint the caller
    /// has already satisfied). If a message is mid-flight with no known
    /// `Content-Length`, whatever has been buffered so far becomes the body.
    pub fn flush(&mut self) -> Result<Option<HapEvent>, HttpError> {
        self.advance(true)
    }

    fn advance(&mut self, force_body_complete: bool) -> Result<Option<HapEvent>, HttpError> {
        loop {
            match &self.state {
                State::Empty => {
                    let Some(pos) = find_crlf(&self.buffer) else { return Ok(None) };
                    let line = String::from_utf8_lossy(&self.buffer[..pos]).to_string();
                    self.buffer.drain(0..pos + 2);
                    let status_line = parse_status_line(&line)?;
                    if status_line.protocol != "EVENT" {
                        return Err(HttpError::UnexpectedProtocol {
                            expected: "EVENT",
                            actual: status_line.protocol,
                        });
                    }
                    self.state = State::RequestLineComplete { status_code: status_line.status_code };
                }
                State::RequestLineComplete { status_code } => {
                    let Some(pos) = find_double_crlf(&self.buffer) else { return Ok(None) };
                    let status_code = *status_code;
                    let block = String::from_utf8_lossy(&self.buffer[..pos]).to_string();
                    self.buffer.drain(0..pos + 4);
                    let headers = parse_headers(&block)?;
                    let expected_len = header_value(&headers, "content-length").and_then(|v| v.parse().ok());
                    self.state = State::HeadersComplete { status_code, expected_len };
                }
                State::HeadersComplete { expected_len: Some(0), .. } => {
                    // spec §4.5 state 2: an explicit `Content-Length: 0`
                    // carries no body — reset and emit nothing, rather than
                    // handing an empty slice to the JSON decoder.
                    self.state = State::Empty;
                    return Ok(None);
                }
                State::HeadersComplete { expected_len: Some(len), .. } => {
                    let len = *len;
                    if self.buffer.len() < len {
                        return Ok(None);
                    }
                    let body: Vec<u8> = self.buffer.drain(0..len).collect();
                    self.state = State::Empty;
                    return Ok(Some(decode_event_body(&body)?));
                }
                State::HeadersComplete { expected_len: None, .. } => {
                    if !force_body_complete {
                        return Ok(None);
                    }
                    let body: Vec<u8> = self.buffer.drain(..).collect();
                    self.state = State::Empty;
                    return Ok(Some(decode_event_body(&body)?));
                }
            }
        }
    }
}

impl Default for EventParser {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_event_body(body: &[u8]) -> Result<HapEvent, HttpError> {
    let parsed: EventBody = serde_json::from_slice(body)?;
    Ok(HapEvent::CharacteristicsChanged {
        changes: parsed
            .characteristics
            .into_iter()
            .map(|c| CharacteristicChange {
                aid: Aid(c.aid),
                iid: Iid(c.iid),
                value: c.value,
            })
            .collect(),
    })
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn find_double_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_A: &[u8] = b"EVENT/1.0 200 OK\r\nContent-Type: application/hap+json\r\nContent-Length: 128\r\n\r\n{\n    \"characteristics\" : [\n        {\n            \"aid\" : 1,\n            \"iid\" : 4,\n            \"value\" : 23.0\n        }\n    ]\n}";

    #[test]
    fn scenario_a_emits_one_event_with_known_content_length() {
        let mut parser = EventParser::new();
        let event = parser.feed(SCENARIO_A).unwrap().unwrap();
        match event {
            HapEvent::CharacteristicsChanged { changes } => {
                assert_eq!(changes.len(), 1);
                assert_eq!(changes[0].aid, Aid(1));
                assert_eq!(changes[0].iid, Iid(4));
                assert_eq!(changes[0].value, HapValue::Float(23.0));
            }
        }
    }

    #[test]
    fn scenario_b_missing_content_length_waits_for_flush_instead_of_resetting() {
        let mut parser = EventParser::new();
        let body = br#"{"characteristics":[{"aid":1,"iid":4,"value":23.0}]}"#;
        let wire = [b"EVENT/1.0 200 OK\r\nContent-Type: application/hap+json\r\n\r\n", &body[..]].concat();

        // No Content-Length: feed() alone must not emit (and must not
        // silently treat the message as a zero-byte body).
        assert!(parser.feed(&wire).unwrap().is_none());

        // Only once the caller signals end-of-message does the
        // accumulated body surface as an event.
        let event = parser.flush().unwrap().unwrap();
        match event {
            HapEvent::CharacteristicsChanged { changes } => {
                assert_eq!(changes[0].value, HapValue::Float(23.0));
            }
        }
    }

    #[test]
    fn explicit_zero_content_length_resets_without_erroring() {
        let mut parser = EventParser::new();
        let wire = b"EVENT/1.0 200 OK\r\nContent-Length: 0\r\n\r\n";
        assert!(parser.feed(wire).unwrap().is_none());

        // The parser is back at State::Empty and ready for the next message.
        assert!(parser.feed(SCENARIO_A).unwrap().is_some());
    }

    #[test]
    fn rejects_non_event_protocol_token() {
        let mut parser = EventParser::new();
        assert!(parser.feed(b"HTTP/1.1 200 OK\r\n\r\n").is_err());
    }

    #[test]
    fn resets_for_the_next_message_after_emitting() {
        let mut parser = EventParser::new();
        parser.feed(SCENARIO_A).unwrap();
        assert!(parser.feed(SCENARIO_A).unwrap().is_some());
    }
}
