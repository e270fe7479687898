//! Client-facade-local failure modes that don't already have a home in
//! one of the lower crates' error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("PIN must match NNN-NN-NNN, got {0:?}")]
    InvalidPin(String),
    #[error("no verified session: call pair_verify() first")]
    NotPaired,
    #[error("accessory returned unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
    #[error("GATT characteristic {1:?} not found in service {0:?}")]
    CharacteristicNotFound(&'static str, &'static str),
}

impl From<ClientError> for hap_core::Error {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::InvalidPin(_) => hap_core::Error::invalid_input(err.to_string()),
            ClientError::NotPaired => hap_core::Error::NotPaired,
            ClientError::UnexpectedStatus(_) | ClientError::CharacteristicNotFound(..) => {
                hap_core::Error::protocol(err.to_string())
            }
        }
    }
}
