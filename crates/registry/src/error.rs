use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("not a valid HAP UUID: {0}")]
    InvalidUuid(String),
    #[error("unsupported HAP format: {0}")]
    UnsupportedFormat(String),
    #[error("value does not fit the declared format {0:?}")]
    ValueFormatMismatch(hap_core::HapFormat),
    #[error("unknown GATT opcode: {0:#04x}")]
    UnknownOpcode(u8),
    #[error("unknown GATT status: {0:#04x}")]
    UnknownGattStatus(u8),
}

impl From<RegistryError> for hap_core::Error {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidUuid(_) | RegistryError::UnsupportedFormat(_) => {
                hap_core::Error::invalid_input(err.to_string())
            }
            RegistryError::ValueFormatMismatch(_)
            | RegistryError::UnknownOpcode(_)
            | RegistryError::UnknownGattStatus(_) => hap_core::Error::protocol(err.to_string()),
        }
    }
}
