//! The byte-stream seam for HAP-over-HTTP/IP (spec §5, §1 Non-goal: "Raw
//! TCP ... I/O — the core assumes a byte-stream sender/receiver"). Grounded
//! on the physical-layer trait shape the teacher repo uses for its own
//! swappable link implementations.

use async_trait::async_trait;

use crate::error::TransportError;

/// A connected, ordered byte stream to a single accessory. Implementors
/// own the socket (or whatever carries bytes to the accessory); HAP only
/// ever calls `send`/`recv`/`close` against it.
#[async_trait]
pub trait ByteTransport: Send + Sync {
    /// Writes `bytes` to the stream. Must not return until the bytes are
    /// handed to the underlying transport (buffering internally is fine).
    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Reads whatever is currently available, blocking until at least one
    /// byte has arrived or the stream closes. Returns an empty vector on
    /// a clean EOF.
    async fn recv(&mut self) -> Result<Vec<u8>, TransportError>;

    /// Tears down the underlying connection. Idempotent.
    async fn close(&mut self) -> Result<(), TransportError>;
}
