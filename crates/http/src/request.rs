//! Composes the textual HTTP/1.1 request line, headers, and body that
//! `HttpConnection::request` hands to the (possibly encrypted) byte
//! stream (spec §4.5).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// `application/hap+json` is the default content type for the
/// accessories/characteristics endpoints; `application/pairing+tlv8`
/// is used for every `/pair-*` endpoint (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    HapJson,
    PairingTlv8,
}

impl ContentType {
    fn as_str(self) -> &'static str {
        match self {
            Self::HapJson => "application/hap+json",
            Self::PairingTlv8 => "application/pairing+tlv8",
        }
    }
}

/// Builds a complete HTTP/1.1 request message (request line, headers,
/// optional body) ready to hand to [`crate::HttpConnection::request`].
pub fn build_request(method: Method, path: &str, content_type: ContentType, body: &[u8]) -> Vec<u8> {
    let mut message = format!("{} {} HTTP/1.1\r\n", method.as_str(), path);
    message.push_str("Host: hap\r\n");
    if !body.is_empty() {
        message.push_str(&format!("Content-Type: {}\r\n", content_type.as_str()));
        message.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    message.push_str("\r\n");

    let mut out = message.into_bytes();
    out.extend_from_slice(body);
    out
}
