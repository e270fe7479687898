//! # hap-client
//!
//! Controller-side client facades (spec.md C7): `HttpClient` and
//! `GattClient` tie the pairing engine (`hap-pairing`), secure framing
//! (`hap-framing`), and the transport crates (`hap-http`, `hap-gatt`)
//! together into the single public surface a caller drives — identify,
//! pair, verify, and read/write/subscribe characteristics, by name
//! regardless of whether the accessory sits on IP or BLE.

mod error;
mod gatt_client;
mod http_client;
mod ids;
mod pin;

pub use error::ClientError;
pub use gatt_client::GattClient;
pub use http_client::HttpClient;
pub use ids::{
    CharacteristicId, CharacteristicReadResult, CharacteristicWrite, GetCharacteristicsOptions, SetCharacteristicResult,
};
