//! HAP-over-GATT opcode and status tables (spec §4.6).

use crate::error::RegistryError;

/// Opcode carried in byte 1 of a GATT PDU request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GattOpcode {
    SignatureRead = 1,
    Write = 2,
    Read = 3,
    TimedWrite = 4,
    ExecuteWrite = 5,
    ServiceSignatureRead = 6,
}

impl GattOpcode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for GattOpcode {
    type Error = RegistryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::SignatureRead,
            2 => Self::Write,
            3 => Self::Read,
            4 => Self::TimedWrite,
            5 => Self::ExecuteWrite,
            6 => Self::ServiceSignatureRead,
            other => return Err(RegistryError::UnknownOpcode(other)),
        })
    }
}

/// Status byte carried at offset 2 of a GATT PDU response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GattStatus {
    Success = 0x00,
    UnsupportedPdu = 0x01,
    MaxProcedures = 0x02,
    InsufficientAuthorization = 0x03,
    InvalidInstanceId = 0x04,
    InsufficientAuthentication = 0x05,
    InvalidRequest = 0x06,
}

impl GattStatus {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl TryFrom<u8> for GattStatus {
    type Error = RegistryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x00 => Self::Success,
            0x01 => Self::UnsupportedPdu,
            0x02 => Self::MaxProcedures,
            0x03 => Self::InsufficientAuthorization,
            0x04 => Self::InvalidInstanceId,
            0x05 => Self::InsufficientAuthentication,
            0x06 => Self::InvalidRequest,
            other => return Err(RegistryError::UnknownGattStatus(other)),
        })
    }
}

/// GATT parameter type tags carried in a characteristic/service signature
/// read response body (spec §4.6's per-characteristic signature fetch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GattParamTag {
    HapParamValue = 0x01,
    HapParamAdditionalAuthorizationData = 0x02,
    HapParamOrigin = 0x03,
    HapParamCharacteristicType = 0x04,
    HapParamCharacteristicInstanceId = 0x05,
    HapParamServiceType = 0x06,
    HapParamServiceInstanceId = 0x07,
    HapParamHapCharacteristicPropertiesDescriptor = 0x0A,
    HapParamGattUserDescriptionDescriptor = 0x0B,
    HapParamGattPresentationFormatDescriptor = 0x0C,
    HapParamGattValidRange = 0x0D,
    HapParamHapStepValueDescriptor = 0x0E,
    HapParamHapValidValuesDescriptor = 0x0F,
    HapParamHapValidValuesRangeDescriptor = 0x10,
}

impl TryFrom<u8> for GattParamTag {
    type Error = RegistryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x01 => Self::HapParamValue,
            0x02 => Self::HapParamAdditionalAuthorizationData,
            0x03 => Self::HapParamOrigin,
            0x04 => Self::HapParamCharacteristicType,
            0x05 => Self::HapParamCharacteristicInstanceId,
            0x06 => Self::HapParamServiceType,
            0x07 => Self::HapParamServiceInstanceId,
            0x0A => Self::HapParamHapCharacteristicPropertiesDescriptor,
            0x0B => Self::HapParamGattUserDescriptionDescriptor,
            0x0C => Self::HapParamGattPresentationFormatDescriptor,
            0x0D => Self::HapParamGattValidRange,
            0x0E => Self::HapParamHapStepValueDescriptor,
            0x0F => Self::HapParamHapValidValuesDescriptor,
            0x10 => Self::HapParamHapValidValuesRangeDescriptor,
            other => return Err(RegistryError::UnknownOpcode(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_round_trips() {
        for raw in 1..=6u8 {
            let op = GattOpcode::try_from(raw).unwrap();
            assert_eq!(op.as_u8(), raw);
        }
    }

    #[test]
    fn unknown_opcode_errors() {
        assert!(GattOpcode::try_from(0).is_err());
        assert!(GattOpcode::try_from(7).is_err());
    }

    #[test]
    fn status_success_recognized() {
        assert!(GattStatus::try_from(0).unwrap().is_success());
        assert!(!GattStatus::try_from(4).unwrap().is_success());
    }
}
