//! Wire constants for the PIV application

/// Application identifier for the PIV applet
pub const PIV_AID: &[u8] = &[
    0xA0, 0x00, 0x00, 0x03, 0x08, 0x00, 0x00, 0x10, 0x00, 0x01, 0x00,
];

/// Key slot holding the card management key
pub const SLOT_CARD_MANAGEMENT: u8 = 0x9B;

/// PIN and PUK fields are always transmitted padded to this length
pub const PIN_FIELD_LEN: usize = 8;

/// Instruction bytes
pub mod ins {
    /// SELECT (ISO 7816-4, interindustry)
    pub const SELECT: u8 = 0xA4;
    /// VERIFY a PIN reference
    pub const VERIFY: u8 = 0x20;
    /// CHANGE REFERENCE DATA (PIN or PUK)
    pub const CHANGE_REFERENCE: u8 = 0x24;
    /// RESET RETRY COUNTER (unblock PIN with PUK)
    pub const RESET_RETRY: u8 = 0x2C;
    /// GENERAL AUTHENTICATE (management key handshake)
    pub const AUTHENTICATE: u8 = 0x87;
    /// Read PIN/PUK/slot metadata
    pub const GET_METADATA: u8 = 0xF7;
    /// Read the device serial number
    pub const GET_SERIAL: u8 = 0xF8;
    /// Set PIN and PUK attempt limits
    pub const SET_PIN_PUK_ATTEMPTS: u8 = 0xFA;
    /// Reset the PIV application (requires blocked PIN and PUK)
    pub const RESET: u8 = 0xFB;
    /// Read the firmware version
    pub const GET_VERSION: u8 = 0xFD;
    /// Replace the card management key
    pub const SET_MANAGEMENT_KEY: u8 = 0xFF;
}

/// BER-TLV tags used in PIV requests and responses
pub mod tags {
    /// Dynamic authentication template wrapping the handshake fields
    pub const DYN_AUTH: u8 = 0x7C;
    /// Witness (card-to-host proof), encrypted under the management key
    pub const WITNESS: u8 = 0x80;
    /// Host challenge
    pub const CHALLENGE: u8 = 0x81;
    /// Card response to the host challenge
    pub const RESPONSE: u8 = 0x82;

    /// Metadata: key algorithm (1 byte); absent implies Triple-DES
    pub const ALGORITHM: u8 = 0x01;
    /// Metadata: touch policy (2 bytes; policy is the second byte)
    pub const TOUCH_POLICY: u8 = 0x02;
    /// Metadata: whether the reference still holds its default value (1 byte)
    pub const IS_DEFAULT: u8 = 0x05;
    /// Metadata: retry counters (2 bytes: total, remaining)
    pub const RETRIES: u8 = 0x06;
}

/// P2 values selecting a PIN reference
pub mod p2 {
    /// The PIN reference
    pub const PIN: u8 = 0x80;
    /// The PUK reference
    pub const PUK: u8 = 0x81;
}
