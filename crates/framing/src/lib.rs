//! # hap-framing
//!
//! The per-session ChaCha20-Poly1305 frame format used for every byte
//! exchanged after Pair-Verify (or Pair-Resume) succeeds — distinct
//! from TLS, with independent 64-bit nonce counters per direction
//! (spec §4.4). `hap-http` drives [`ip::IpFrameEncoder`]/[`ip::IpFrameDecoder`];
//! `hap-gatt` drives [`gatt::GattFrameEncoder`]/[`gatt::GattFrameDecoder`].

mod error;
pub mod gatt;
pub mod ip;

pub use error::FramingError;
pub use gatt::{GattFrameDecoder, GattFrameEncoder};
pub use ip::{IpFrameDecoder, IpFrameEncoder};
