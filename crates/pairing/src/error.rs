use thiserror::Error;

/// Pairing-protocol-local failure modes that don't already have a home
/// in `hap_core::Error`, `hap_tlv::TlvError`, or `hap_crypto`'s errors.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("expected TLV state {expected}, got {actual}")]
    UnexpectedState { expected: u8, actual: u8 },
    #[error("accessory returned pairing error code {0:#04x}")]
    AccessoryError(u8),
    #[error("Ed25519 signature verification failed")]
    SignatureInvalid,
    #[error("accessory pairing identifier does not match the stored identity")]
    IdentifierMismatch,
    #[error("no cached session available to resume")]
    ResumeUnavailable,
    #[error("malformed sub-TLV in encrypted payload")]
    MalformedSubTlv,
}

impl From<PairingError> for hap_core::Error {
    fn from(err: PairingError) -> Self {
        match err {
            PairingError::AccessoryError(_)
            | PairingError::SignatureInvalid
            | PairingError::IdentifierMismatch => hap_core::Error::auth(err.to_string()),
            PairingError::UnexpectedState { .. }
            | PairingError::MalformedSubTlv
            | PairingError::ResumeUnavailable => hap_core::Error::protocol(err.to_string()),
        }
    }
}

/// Fail with an [`hap_core::Error::AuthenticationError`] if the TLV
/// carries an `Error` tag, and with `UnexpectedState` if `State` isn't
/// `expected`.
pub(crate) fn check_state(tlv: &hap_tlv::Tlv, expected: u8) -> hap_core::Result<()> {
    if let Some(code) = tlv.get_u8(crate::tags::ERROR) {
        return Err(PairingError::AccessoryError(code).into());
    }
    let actual = tlv
        .get_u8(crate::tags::STATE)
        .ok_or_else(|| hap_tlv::TlvError::MissingField(crate::tags::STATE))?;
    if actual != expected {
        return Err(PairingError::UnexpectedState { expected, actual }.into());
    }
    Ok(())
}
