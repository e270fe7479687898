//! Standard HTTP/1.1 response parser. Spec §4.5 treats this one as "a
//! standard HTTP/1.1 response parser supplied externally" — there is no
//! ambiguity to resolve here the way there is for the `EVENT/1.0` parser,
//! so a missing `Content-Length` is simply an empty body (the accessory
//! always sends one on `200`/`207`; `204` never carries a body at all).

use crate::error::HttpError;
use crate::message::{header_value, parse_headers, parse_status_line};

pub struct HttpResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn content_type(&self) -> Option<&str> {
        header_value(&self.headers, "content-type")
    }
}

enum State {
    AwaitingStatusLine,
    AwaitingHeaders { status_code: u16 },
    AwaitingBody { status_code: u16, headers: Vec<(String, String)>, expected_len: usize },
}

/// Parses exactly one response at a time off a byte stream, the way
/// `HttpConnection`'s one-outstanding-request-at-a-time pipelining
/// contract requires (spec §4.5).
pub struct ResponseParser {
    state: State,
    buffer: Vec<u8>,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            state: State::AwaitingStatusLine,
            buffer: Vec::new(),
        }
    }

    /// Feeds newly-received bytes. Returns `Some(response)` once a whole
    /// response has been parsed, after which the parser resets for the
    /// next one (supporting pipelined responses on the same socket).
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Option<HttpResponse>, HttpError> {
        self.buffer.extend_from_slice(bytes);

        loop {
            match &self.state {
                State::AwaitingStatusLine => {
                    let Some(pos) = find_crlf(&self.buffer) else { return Ok(None) };
                    let line = String::from_utf8_lossy(&self.buffer[..pos]).to_string();
                    self.buffer.drain(0..pos + 2);
                    let status_line = parse_status_line(&line)?;
                    if status_line.protocol != "HTTP" {
                        return Err(HttpError::UnexpectedProtocol {
                            expected: "HTTP",
                            actual: status_line.protocol,
                        });
                    }
                    self.state = State::AwaitingHeaders { status_code: status_line.status_code };
                }
                State::AwaitingHeaders { status_code } => {
                    let Some(pos) = find_double_crlf(&self.buffer) else { return Ok(None) };
                    let status_code = *status_code;
                    let block = String::from_utf8_lossy(&self.buffer[..pos]).to_string();
                    self.buffer.drain(0..pos + 4);
                    let headers = parse_headers(&block)?;
                    let expected_len = header_value(&headers, "content-length")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                    self.state = State::AwaitingBody { status_code, headers, expected_len };
                }
                State::AwaitingBody { status_code, headers, expected_len } => {
                    if self.buffer.len() < *expected_len {
                        return Ok(None);
                    }
                    let body = self.buffer.drain(0..*expected_len).collect();
                    let response = HttpResponse {
                        status_code: *status_code,
                        headers: headers.clone(),
                        body,
                    };
                    self.state = State::AwaitingStatusLine;
                    return Ok(Some(response));
                }
            }
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn find_double_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
