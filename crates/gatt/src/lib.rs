//! # hap-gatt
//!
//! HAP-over-GATT transport (spec.md C6): PDU request/response framing
//! over BLE characteristics, instance-ID discovery, and subscriptions.

mod discovery;
mod error;
mod pdu;
mod session;
mod signature;

pub use discovery::discover_accessory;
pub use error::GattTransportError;
pub use pdu::{encode_request, encode_request_with_body, ResponseFragment, ResponseReassembler, TidCounter};
pub use session::GattSession;
pub use signature::{decode_characteristic_signature, decode_service_signature, CharacteristicSignature, ServiceSignature};
