//! Short/long HAP UUID canonicalization (spec §4.2).
//!
//! Short-form UUIDs (≤8 hex chars) are the first group of Apple's base
//! UUID for HAP-defined types; comparison is case-insensitive but the
//! stored canonical form is uppercase with dashes at 8-4-4-4-12.

use crate::error::RegistryError;

pub const HAP_BASE_UUID_SUFFIX: &str = "-0000-1000-8000-0026BB765291";

/// Normalize any HAP UUID spelling (short hex, bare 32-hex, or already
/// dashed) into the canonical uppercase 8-4-4-4-12 form.
pub fn canonicalize(input: &str) -> Result<String, RegistryError> {
    let compact: String = input.chars().filter(|c| *c != '-').collect();
    if compact.is_empty() || !compact.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RegistryError::InvalidUuid(input.to_string()));
    }

    match compact.len() {
        1..=8 => Ok(format!(
            "{:0>8}{}",
            compact.to_ascii_uppercase(),
            HAP_BASE_UUID_SUFFIX
        )),
        32 => Ok(format_dashed(&compact.to_ascii_uppercase())),
        _ => Err(RegistryError::InvalidUuid(input.to_string())),
    }
}

fn format_dashed(hex32: &str) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        &hex32[0..8],
        &hex32[8..12],
        &hex32[12..16],
        &hex32[16..20],
        &hex32[20..32]
    )
}

/// The short form (leading hex group, base-suffix stripped) of a
/// canonical HAP UUID, if it is one of Apple's base-suffixed types.
pub fn short_form(canonical: &str) -> Option<&str> {
    let upper_suffix = HAP_BASE_UUID_SUFFIX;
    if canonical.len() == 8 + upper_suffix.len() && canonical[8..].eq_ignore_ascii_case(upper_suffix) {
        Some(&canonical[..8])
    } else {
        None
    }
}

/// Case-insensitive equality after canonicalization.
pub fn uuids_equal(a: &str, b: &str) -> bool {
    match (canonicalize(a), canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
