//! `HttpConnection` (spec §4.5): owns one byte-stream transport and at
//! most one outstanding request at a time. `request()` composes and
//! sends a message and waits for its response; `next_event()` is the
//! EVENT/1.0-mode counterpart a caller drives after a subscription write
//! leaves the socket listening for asynchronous push messages.

use hap_core::events::HapEvent;
use hap_core::Result as HapResult;
use hap_crypto::AeadKey;
use hap_framing::{IpFrameDecoder, IpFrameEncoder};
use hap_transport::ByteTransport;

use crate::error::HttpError;
use crate::event::EventParser;
use crate::request::{build_request, ContentType, Method};
use crate::response::{HttpResponse, ResponseParser};
use crate::state::{ConnectionEvent, ConnectionState, ConnectionStateMachine};

/// One TCP-equivalent byte-stream connection to an accessory's HAP
/// HTTP server, plain until `set_session_keys` is called after a
/// successful Pair-Verify/Pair-Resume.
pub struct HttpConnection<T: ByteTransport> {
    transport: T,
    state: ConnectionStateMachine,
    encoder: Option<IpFrameEncoder>,
    decoder: Option<IpFrameDecoder>,
    response_parser: ResponseParser,
    event_parser: EventParser,
}

impl<T: ByteTransport> HttpConnection<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ConnectionStateMachine::new(),
            encoder: None,
            decoder: None,
            response_parser: ResponseParser::new(),
            event_parser: EventParser::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.state()
    }

    /// Marks the connection open and ready. The actual socket connect is
    /// the caller's concern (it owns `T`); this only drives the state label.
    pub fn open(&mut self) -> HapResult<()> {
        self.state.transition(ConnectionEvent::Open)?;
        self.state.transition(ConnectionEvent::Connected)?;
        Ok(())
    }

    /// Installs the two session AEAD keys a successful Pair-Verify (or
    /// Pair-Resume) produced. All subsequent `request`/`next_event` calls
    /// route through `_encrypted`.
    pub fn set_session_keys(&mut self, controller_to_accessory: AeadKey, accessory_to_controller: AeadKey) {
        self.encoder = Some(IpFrameEncoder::new(controller_to_accessory));
        self.decoder = Some(IpFrameDecoder::new(accessory_to_controller));
    }

    pub fn is_encrypted(&self) -> bool {
        self.encoder.is_some()
    }

    pub async fn get(&mut self, path: &str, content_type: ContentType) -> HapResult<HttpResponse> {
        self.request(build_request(Method::Get, path, content_type, b"")).await
    }

    pub async fn post(&mut self, path: &str, content_type: ContentType, body: &[u8]) -> HapResult<HttpResponse> {
        self.request(build_request(Method::Post, path, content_type, body)).await
    }

    pub async fn put(&mut self, path: &str, content_type: ContentType, body: &[u8]) -> HapResult<HttpResponse> {
        self.request(build_request(Method::Put, path, content_type, body)).await
    }

    /// Sends a fully-composed HTTP/1.1 message (plaintext or encrypted
    /// per `set_session_keys`) and waits for its response. Only one
    /// request may be outstanding per connection (spec §4.5).
    pub async fn request(&mut self, message: Vec<u8>) -> HapResult<HttpResponse> {
        if !self.state.is_ready() {
            return Err(HttpError::NotReady(self.state()).into());
        }

        let wire = match &mut self.encoder {
            Some(encoder) => encoder.encode_message(&message)?,
            None => message,
        };
        self.transport.send(&wire).await?;

        loop {
            let received = self.transport.recv().await?;
            let plaintext = self.decrypt_if_needed(&received)?;
            if let Some(response) = self.response_parser.feed(&plaintext)? {
                return Ok(response);
            }
        }
    }

    /// Drives the EVENT/1.0 parser across however many socket reads the
    /// next push message takes. Call this when the connection is in
    /// subscription/listening mode rather than mid-request.
    pub async fn next_event(&mut self) -> HapResult<HapEvent> {
        loop {
            let received = self.transport.recv().await?;
            if received.is_empty() {
                if let Some(event) = self.event_parser.flush()? {
                    return Ok(event);
                }
                continue;
            }
            let plaintext = self.decrypt_if_needed(&received)?;
            if let Some(event) = self.event_parser.feed(&plaintext)? {
                return Ok(event);
            }
        }
    }

    fn decrypt_if_needed(&mut self, received: &[u8]) -> HapResult<Vec<u8>> {
        match &mut self.decoder {
            Some(decoder) => Ok(decoder.feed(received)?),
            None => Ok(received.to_vec()),
        }
    }

    /// Half-closes on `end`/timeout, then fully closes. Mirrors the
    /// `end/timeout` → CLOSING → `close` → CLOSED path spec §4.5 describes.
    pub async fn close(&mut self) -> HapResult<()> {
        self.state.transition(ConnectionEvent::EndOrTimeout)?;
        self.transport.close().await?;
        self.state.transition(ConnectionEvent::Close)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hap_transport::TransportError;
    use std::collections::VecDeque;

    struct MockTransport {
        inbox: VecDeque<Vec<u8>>,
        sent: Vec<Vec<u8>>,
    }

    #[async_trait]
    impl ByteTransport for MockTransport {
        async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            self.sent.push(bytes.to_vec());
            Ok(())
        }

        async fn recv(&mut self) -> Result<Vec<u8>, TransportError> {
            Ok(self.inbox.pop_front().unwrap_or_default())
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn plaintext_get_round_trip() {
        let transport = MockTransport {
            inbox: VecDeque::from([b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi".to_vec()]),
            sent: Vec::new(),
        };
        let mut connection = HttpConnection::new(transport);
        connection.open().unwrap();

        let response = connection.get("/accessories", ContentType::HapJson).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, b"hi");
        assert!(connection.transport.sent[0].starts_with(b"GET /accessories HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn request_before_open_is_rejected() {
        let transport = MockTransport { inbox: VecDeque::new(), sent: Vec::new() };
        let mut connection = HttpConnection::new(transport);
        assert!(connection.get("/accessories", ContentType::HapJson).await.is_err());
    }
}
