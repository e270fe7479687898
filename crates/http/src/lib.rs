//! # hap-http
//!
//! HAP-over-HTTP transport (spec §4.5, C5): a single-socket,
//! one-request-at-a-time HTTP/1.1 client plus the non-standard
//! `EVENT/1.0` push-message parser that shares the same connection
//! after a subscription write. Pairing state machines live in
//! `hap-pairing`; this crate only carries their TLV bytes over the wire,
//! encrypting/decrypting via `hap-framing` once session keys exist.

mod connection;
mod error;
mod event;
mod message;
mod request;
mod response;
mod state;

pub use connection::HttpConnection;
pub use error::HttpError;
pub use event::EventParser;
pub use request::{build_request, ContentType, Method};
pub use response::{HttpResponse, ResponseParser};
pub use state::{ConnectionEvent, ConnectionState, ConnectionStateMachine};
