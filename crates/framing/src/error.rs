use thiserror::Error;

#[derive(Debug, Error)]
pub enum FramingError {
    #[error("frame declares {declared}-byte plaintext, which exceeds the {max}-byte chunk limit")]
    ChunkTooLarge { declared: usize, max: usize },
    #[error("GATT ciphertext ({0} bytes) is not a whole number of frames")]
    TruncatedGattBody(usize),
}

impl From<FramingError> for hap_core::Error {
    fn from(err: FramingError) -> Self {
        hap_core::Error::protocol(err.to_string())
    }
}
