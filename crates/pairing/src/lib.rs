//! # hap-pairing
//!
//! Pure, I/O-free state machines for the four HAP pairing ceremonies
//! (Pair-Setup, Pair-Verify, Pair-Resume) and pairing maintenance
//! (Add/Remove/List Pairings). Every `build_*`/`parse_*` step here
//! consumes previously stored state and produces either the next
//! outgoing TLV buffer or an update to that state — transport, framing,
//! and retry policy all live elsewhere.

mod error;
mod identity_codec;
mod pairings;
mod resume;
mod setup;
pub mod tags;
mod verify;

pub use error::PairingError;
pub use identity_codec::{export as export_identity, import as import_identity, ExportedIdentity};
pub use pairings::{
    build_add_pairing_request, build_list_pairings_request, build_remove_pairing_request, parse_list_pairings_response,
    parse_pairing_ack, PairingEntry,
};
pub use resume::{PairResume, ResumeOutcome, ResumeSession};
pub use setup::PairSetup;
pub use verify::{PairVerify, SessionKeys};
