//! Accessory-category ID ⇄ name table (spec §4.2, used for DNS-SD `ci` and
//! GATT bridge discovery).

use std::collections::HashMap;
use std::sync::OnceLock;

const TABLE: &[(u16, &str)] = &[
    (1, "Other"),
    (2, "Bridge"),
    (3, "Fan"),
    (4, "GarageDoorOpener"),
    (5, "Lightbulb"),
    (6, "DoorLock"),
    (7, "Outlet"),
    (8, "Switch"),
    (9, "Thermostat"),
    (10, "Sensor"),
    (11, "SecuritySystem"),
    (12, "Door"),
    (13, "Window"),
    (14, "WindowCovering"),
    (15, "ProgrammableSwitch"),
    (16, "RangeExtender"),
    (17, "IPCamera"),
    (18, "VideoDoorbell"),
    (19, "AirPurifier"),
];

fn index() -> &'static HashMap<u16, &'static str> {
    static INDEX: OnceLock<HashMap<u16, &'static str>> = OnceLock::new();
    INDEX.get_or_init(|| TABLE.iter().copied().collect())
}

fn reverse_index() -> &'static HashMap<&'static str, u16> {
    static INDEX: OnceLock<HashMap<&'static str, u16>> = OnceLock::new();
    INDEX.get_or_init(|| TABLE.iter().map(|&(id, name)| (name, id)).collect())
}

pub fn name_from_id(id: u16) -> Option<&'static str> {
    index().get(&id).copied()
}

pub fn id_from_name(name: &str) -> Option<u16> {
    reverse_index().get(name).copied()
}
