//! Shared status-line/header parsing for the standard HTTP/1.1 response
//! parser and the non-standard `EVENT/1.0` push parser (spec §4.5):
//! both are `PROTOCOL/VERSION CODE REASON\r\n` followed by case-insensitive
//! `Name: value` headers and a `\r\n\r\n` terminator.

use crate::error::HttpError;

pub struct StatusLine {
    pub protocol: String,
    pub version: String,
    pub status_code: u16,
    pub reason: String,
}

/// Parses one `PROTOCOL/VERSION CODE REASON` line (no trailing `\r\n`).
pub fn parse_status_line(line: &str) -> Result<StatusLine, HttpError> {
    let mut parts = line.splitn(3, ' ');
    let protocol_version = parts.next().ok_or_else(|| HttpError::MalformedStatusLine(line.to_string()))?;
    let status_code = parts.next().ok_or_else(|| HttpError::MalformedStatusLine(line.to_string()))?;
    let reason = parts.next().unwrap_or("").to_string();

    let (protocol, version) = protocol_version
        .split_once('/')
        .ok_or_else(|| HttpError::MalformedStatusLine(line.to_string()))?;

    let status_code: u16 = status_code
        .parse()
        .map_err(|_| HttpError::MalformedStatusLine(line.to_string()))?;

    Ok(StatusLine {
        protocol: protocol.to_string(),
        version: version.to_string(),
        status_code,
        reason,
    })
}

/// Parses a block of `Name: value\r\n`-separated header lines (already
/// split off the trailing blank line) into case-insensitive-keyed pairs,
/// preserving the header's original casing in the value lookup key's
/// lowercased form.
pub fn parse_headers(block: &str) -> Result<Vec<(String, String)>, HttpError> {
    let mut headers = Vec::new();
    for line in block.split("\r\n").filter(|l| !l.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| HttpError::MalformedHeaderLine(line.to_string()))?;
        headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
    }
    Ok(headers)
}

pub fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_status_line() {
        let line = parse_status_line("HTTP/1.1 200 OK").unwrap();
        assert_eq!(line.protocol, "HTTP");
        assert_eq!(line.version, "1.1");
        assert_eq!(line.status_code, 200);
        assert_eq!(line.reason, "OK");
    }

    #[test]
    fn parses_event_status_line() {
        let line = parse_status_line("EVENT/1.0 200 OK").unwrap();
        assert_eq!(line.protocol, "EVENT");
        assert_eq!(line.status_code, 200);
    }

    #[test]
    fn headers_are_case_insensitive() {
        let headers = parse_headers("Content-Type: application/hap+json\r\nContent-Length: 128").unwrap();
        assert_eq!(header_value(&headers, "content-length"), Some("128"));
        assert_eq!(header_value(&headers, "CONTENT-TYPE"), Some("application/hap+json"));
    }
}
