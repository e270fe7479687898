//! # hap-transport
//!
//! The I/O seam between the HAP protocol stack and whatever actually owns
//! the wire: a TCP socket for HAP-over-HTTP, a BLE GATT connection for
//! HAP-over-GATT. The controller core never opens a socket or scans for
//! peripherals itself (spec §1 Non-goals) — callers implement
//! [`ByteTransport`] or [`GattPeripheral`] against their own networking
//! stack and hand the implementation to `hap-http`/`hap-gatt`.

mod byte_transport;
mod error;
mod gatt_peripheral;
mod txt;

pub use byte_transport::ByteTransport;
pub use error::TransportError;
pub use gatt_peripheral::{GattCharacteristic, GattPeripheral, GattService};
pub use txt::HapTxtRecord;
