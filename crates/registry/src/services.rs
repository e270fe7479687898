//! Service UUID ⇄ name table (spec §4.2).
//!
//! Seeded with the common accessory types; not an exhaustive transcription
//! of Apple's HAP specification. Extend `TABLE` as new services are needed.

use crate::uuid::canonicalize;
use std::collections::HashMap;
use std::sync::OnceLock;

const TABLE: &[(&str, &str)] = &[
    ("3E", "AccessoryInformation"),
    ("55", "Pairing"),
    ("A2", "ProtocolInformation"),
    ("A5", "ServiceSignature"),
    ("40", "Fan"),
    ("41", "GarageDoorOpener"),
    ("43", "Lightbulb"),
    ("44", "LockManagement"),
    ("45", "LockMechanism"),
    ("47", "Outlet"),
    ("49", "Switch"),
    ("4A", "Thermostat"),
    ("7E", "SecuritySystem"),
    ("80", "StatelessProgrammableSwitch"),
    ("89", "WindowCovering"),
    ("8A", "AirQualitySensor"),
    ("D7", "Battery"),
];

fn index() -> &'static HashMap<&'static str, &'static str> {
    static INDEX: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    INDEX.get_or_init(|| TABLE.iter().copied().collect())
}

fn reverse_index() -> &'static HashMap<&'static str, &'static str> {
    static INDEX: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    INDEX.get_or_init(|| TABLE.iter().map(|&(short, name)| (name, short)).collect())
}

/// The registered name for a service UUID, after canonicalization.
pub fn name_from_uuid(uuid: &str) -> Option<&'static str> {
    let full = canonicalize(uuid).ok()?;
    let short = crate::uuid::short_form(&full)?;
    index().get(short).copied()
}

/// The canonical (long form) UUID for a registered service name.
pub fn uuid_from_name(name: &str) -> Option<String> {
    let short = reverse_index().get(name)?;
    canonicalize(short).ok()
}
