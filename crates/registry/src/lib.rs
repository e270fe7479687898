//! # hap-registry
//!
//! Stable lookup tables and the little-endian value codec spec.md §4.2
//! calls C2: UUID short/long canonicalization, service/characteristic/
//! category name tables, HAP-over-GATT opcode/status/parameter-tag
//! tables, HAP-over-HTTP status helpers, and BT-SIG format/unit mapping.

pub mod categories;
pub mod characteristics;
mod error;
pub mod gatt;
pub mod http;
pub mod services;
pub mod uuid;
pub mod value_codec;

pub use error::RegistryError;
pub use gatt::{GattOpcode, GattParamTag, GattStatus};
pub use uuid::{canonicalize as canonicalize_uuid, short_form as uuid_short_form, uuids_equal};
pub use value_codec::{buffer_to_value, hap_format_from_bt_sig, hap_unit_from_bt_sig, value_to_buffer};
