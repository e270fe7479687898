//! Asynchronous events the controller surfaces to the caller.

use crate::types::{Aid, HapValue, Iid};
use serde::{Deserialize, Serialize};

/// Events pushed to the caller outside of a request/response exchange.
///
/// On the HTTP transport these arrive via `EVENT/1.0` push messages
/// (spec §4.5); on the GATT transport they arrive as a zero-byte
/// indication followed by a signature-read-initiated re-read of the
/// characteristic's current value (spec §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HapEvent {
    /// One or more subscribed characteristics changed value.
    CharacteristicsChanged {
        changes: Vec<CharacteristicChange>,
    },
}

/// A single characteristic's new value, as carried by a [`HapEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacteristicChange {
    pub aid: Aid,
    pub iid: Iid,
    pub value: HapValue,
}
