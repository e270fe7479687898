use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("connection is {0:?}, not READY")]
    NotReady(crate::state::ConnectionState),
    #[error("invalid state transition: {from:?} does not accept {event:?}")]
    InvalidTransition {
        from: crate::state::ConnectionState,
        event: crate::state::ConnectionEvent,
    },
    #[error("malformed HTTP status line: {0}")]
    MalformedStatusLine(String),
    #[error("malformed HTTP header line: {0}")]
    MalformedHeaderLine(String),
    #[error("unexpected protocol token: expected `{expected}`, got `{actual}`")]
    UnexpectedProtocol { expected: &'static str, actual: String },
    #[error("HTTP response carried unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("response body was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<HttpError> for hap_core::Error {
    fn from(err: HttpError) -> Self {
        hap_core::Error::protocol(err.to_string())
    }
}
