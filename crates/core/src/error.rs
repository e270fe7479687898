//! Unified error taxonomy for the HAP controller stack.

use thiserror::Error;

/// Result type alias using the controller's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for every HAP controller crate.
///
/// Each crate-local error type (TLV, registry, pairing, framing,
/// transport) converts into one of these variants at its public
/// boundary, so callers only ever match on one error taxonomy
/// (see spec §7).
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed caller input: bad PIN, unknown UUID, unsupported format name.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Connect failed, socket error, BLE disconnect, operation timeout.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Missing TLV tag, wrong `State`, unexpected opcode/status, invalid HTTP status.
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// SRP proof mismatch, signature verification failure, AEAD tag failure,
    /// pairing identifier mismatch, or an `Error` tag present in a TLV response.
    #[error("authentication error: {0}")]
    AuthenticationError(String),

    /// The operation requires an established session but none exists.
    #[error("not paired: no verified session for this connection")]
    NotPaired,
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::ProtocolError(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::AuthenticationError(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }
}
