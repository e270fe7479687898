use thiserror::Error;

/// Transport-local failure modes (spec §7's `TransportError` taxonomy entry),
/// raised by whatever the caller plugs in behind [`crate::ByteTransport`] or
/// [`crate::GattPeripheral`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    ConnectFailed(String),
    #[error("socket error: {0}")]
    SocketError(String),
    #[error("peripheral disconnected")]
    Disconnected,
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<TransportError> for hap_core::Error {
    fn from(err: TransportError) -> Self {
        hap_core::Error::transport(err.to_string())
    }
}
