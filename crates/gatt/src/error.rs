use thiserror::Error;

use hap_registry::RegistryError;

#[derive(Debug, Error)]
pub enum GattTransportError {
    #[error("PDU fragment is too short to carry a header ({0} bytes)")]
    FragmentTooShort(usize),
    #[error("accessory returned PDU status {0:?} for opcode {1:?}")]
    NonSuccessStatus(hap_registry::GattStatus, hap_registry::GattOpcode),
    #[error("response transaction ID {actual} does not match request {expected}")]
    TransactionIdMismatch { expected: u8, actual: u8 },
    #[error("instance ID discovery could not find a descriptor for {0}")]
    InstanceIdNotFound(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Tlv(#[from] hap_tlv::TlvError),
    #[error(transparent)]
    Transport(#[from] hap_transport::TransportError),
    #[error(transparent)]
    Core(#[from] hap_core::Error),
}

impl From<GattTransportError> for hap_core::Error {
    fn from(err: GattTransportError) -> Self {
        hap_core::Error::protocol(err.to_string())
    }
}
