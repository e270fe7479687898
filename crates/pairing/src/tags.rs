//! TLV8 tag and enumerated-value constants shared by every ceremony
//! (spec §4.3's message tables).

pub const METHOD: u8 = 0x00;
pub const IDENTIFIER: u8 = 0x01;
pub const SALT: u8 = 0x02;
pub const PUBLIC_KEY: u8 = 0x03;
pub const PROOF: u8 = 0x04;
pub const ENCRYPTED_DATA: u8 = 0x05;
pub const STATE: u8 = 0x06;
pub const ERROR: u8 = 0x07;
pub const RETRY_DELAY: u8 = 0x08;
pub const CERTIFICATE: u8 = 0x09;
pub const SIGNATURE: u8 = 0x0A;
pub const PERMISSIONS: u8 = 0x0B;
pub const FRAGMENT_DATA: u8 = 0x0C;
pub const FRAGMENT_LAST: u8 = 0x0D;
pub const FLAGS: u8 = 0x13;

/// `Method` tag values (spec §4.3).
pub mod method {
    pub const PAIR_SETUP: u8 = 0x00;
    pub const PAIR_SETUP_WITH_AUTH: u8 = 0x01;
    pub const PAIR_VERIFY: u8 = 0x02;
    pub const ADD_PAIRING: u8 = 0x03;
    pub const REMOVE_PAIRING: u8 = 0x04;
    pub const LIST_PAIRINGS: u8 = 0x05;
}

/// `Permissions` tag values for Add-Pairing (spec §4.3's closing paragraph).
pub mod permissions {
    pub const REGULAR_USER: u8 = 0x00;
    pub const ADMIN: u8 = 0x01;
}

/// `Error` tag values an accessory can report in any ceremony's response.
pub mod error_code {
    pub const UNKNOWN: u8 = 0x01;
    pub const AUTHENTICATION: u8 = 0x02;
    pub const BACKOFF: u8 = 0x03;
    pub const MAX_PEERS: u8 = 0x04;
    pub const MAX_TRIES: u8 = 0x05;
    pub const UNAVAILABLE: u8 = 0x06;
    pub const BUSY: u8 = 0x07;
}
