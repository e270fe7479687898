//! Pair-Setup PIN validation (spec §4.7's pre-condition: literal pattern
//! `^\d{3}-\d{2}-\d{3}$`).

use crate::error::ClientError;
use hap_core::{Error, Result};

/// Checks a caller-supplied PIN against the `NNN-NN-NNN` shape HAP
/// requires, without pulling in a regex engine for one fixed pattern.
pub fn validate(pin: &str) -> Result<()> {
    let bytes = pin.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[0..3].iter().all(u8::is_ascii_digit)
        && bytes[3] == b'-'
        && bytes[4..6].iter().all(u8::is_ascii_digit)
        && bytes[6] == b'-'
        && bytes[7..10].iter().all(u8::is_ascii_digit);

    if shape_ok {
        Ok(())
    } else {
        Err(Error::from(ClientError::InvalidPin(pin.to_string())))
    }
}
