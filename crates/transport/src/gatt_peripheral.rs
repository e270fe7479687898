//! The GATT seam for HAP-over-BLE (spec §1 Non-goal: "... and a GATT
//! read/write/subscribe primitive — the core assumes the caller already
//! has one"). Naming follows the cross-platform BLE crate in the example
//! pack (`Adapter` → `Device` → `Service` → `Characteristic`), trimmed to
//! the handful of operations `hap-gatt`'s PDU layer actually drives.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TransportError;

/// A connected BLE peripheral exposing the HAP Accessory Information /
/// Protocol Information / Pairing / per-service GATT hierarchy.
#[async_trait]
pub trait GattPeripheral: Send + Sync {
    type Service: GattService;

    /// Enumerates the peripheral's primary services.
    async fn services(&mut self) -> Result<Vec<Self::Service>, TransportError>;

    /// Maximum Transmission Unit currently negotiated for this link, in
    /// bytes, used by `hap-gatt` to decide its encrypted chunk size.
    fn mtu(&self) -> usize;

    async fn disconnect(&mut self) -> Result<(), TransportError>;
}

/// A single GATT service on a peripheral.
#[async_trait]
pub trait GattService: Send + Sync {
    type Characteristic: GattCharacteristic;

    fn uuid(&self) -> Uuid;

    async fn characteristics(&mut self) -> Result<Vec<Self::Characteristic>, TransportError>;
}

/// A single GATT characteristic. HAP's PDU protocol always performs a
/// write followed by a read (or a write with no response for a simple
/// signature read), so both primitives are required here regardless of
/// the characteristic's own HAP-level permissions.
#[async_trait]
pub trait GattCharacteristic: Send + Sync {
    fn uuid(&self) -> Uuid;

    async fn write(&mut self, value: &[u8]) -> Result<(), TransportError>;

    async fn read(&mut self) -> Result<Vec<u8>, TransportError>;

    /// Reads the characteristic's Instance ID descriptor: a plain,
    /// unencrypted BLE descriptor read (not a PDU exchange) returning the
    /// 2-byte little-endian `iid` HAP discovery addresses it by.
    async fn read_instance_id(&mut self) -> Result<[u8; 2], TransportError>;

    /// Enables indications/notifications on this characteristic. HAP
    /// uses indications exclusively (spec §6) so delivery is confirmed.
    async fn subscribe(&mut self) -> Result<(), TransportError>;

    async fn unsubscribe(&mut self) -> Result<(), TransportError>;

    /// Blocks until the next indication arrives on a subscribed
    /// characteristic. HAP signals a value change with an empty-bodied
    /// indication (spec §4.6) that `hap-gatt` turns into a follow-up read.
    async fn next_indication(&mut self) -> Result<Vec<u8>, TransportError>;
}
