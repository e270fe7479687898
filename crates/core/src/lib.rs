//! # hap-core
//!
//! Shared data model, error taxonomy, and event types for the HAP
//! controller client stack.
//!
//! ## Module structure
//!
//! - `types`: attribute database model and the persistent pairing identity
//! - `traits`: small cross-crate traits (`Validate`)
//! - `error`: the unified error taxonomy (spec §7)
//! - `events`: asynchronous events surfaced to the caller

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use events::{CharacteristicChange, HapEvent};
pub use traits::Validate;
pub use types::{Accessory, AccessoryDatabase, Aid, Characteristic, HapFormat, HapValue, Iid, PairingIdentity, Perms, Service};
