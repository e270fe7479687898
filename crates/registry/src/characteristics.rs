//! Characteristic UUID ⇄ name table (spec §4.2). Seeded, non-exhaustive —
//! see [`crate::services`] for the same caveat.

use crate::uuid::canonicalize;
use std::collections::HashMap;
use std::sync::OnceLock;

const TABLE: &[(&str, &str)] = &[
    ("14", "Identify"),
    ("20", "Manufacturer"),
    ("21", "Model"),
    ("23", "Name"),
    ("30", "SerialNumber"),
    ("52", "FirmwareRevision"),
    ("25", "On"),
    ("8", "Brightness"),
    ("13", "Hue"),
    ("2F", "Saturation"),
    ("37", "Version"),
    ("11", "CurrentTemperature"),
    ("35", "TargetTemperature"),
    ("F", "CurrentHeatingCoolingState"),
    ("33", "TargetHeatingCoolingState"),
    ("36", "TemperatureDisplayUnits"),
    ("6", "BatteryLevel"),
    ("79", "StatusLowBattery"),
    ("4C", "PairSetup"),
    ("4E", "PairVerify"),
    ("4F", "PairingFeatures"),
    ("50", "PairingPairings"),
];

fn index() -> &'static HashMap<&'static str, &'static str> {
    static INDEX: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    INDEX.get_or_init(|| TABLE.iter().copied().collect())
}

fn reverse_index() -> &'static HashMap<&'static str, &'static str> {
    static INDEX: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    INDEX.get_or_init(|| TABLE.iter().map(|&(short, name)| (name, short)).collect())
}

pub fn name_from_uuid(uuid: &str) -> Option<&'static str> {
    let full = canonicalize(uuid).ok()?;
    let short = crate::uuid::short_form(&full)?;
    index().get(short).copied()
}

pub fn uuid_from_name(name: &str) -> Option<String> {
    let short = reverse_index().get(name)?;
    canonicalize(short).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_on_characteristic() {
        assert_eq!(name_from_uuid("25"), Some("On"));
    }

    #[test]
    fn round_trips_every_entry() {
        for &(short, name) in TABLE {
            let full = canonicalize(short).unwrap();
            assert_eq!(uuid_from_name(name).unwrap(), full);
            assert_eq!(name_from_uuid(&full), Some(name));
        }
    }
}
