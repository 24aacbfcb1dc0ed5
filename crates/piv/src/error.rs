//! Error types for PIV sessions

use pivot_apdu_core::StatusWord;

use crate::tlv::TlvError;
use crate::types::Feature;

/// Error type for PIV operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport or APDU-level error
    #[error(transparent)]
    Apdu(#[from] pivot_apdu_core::Error),

    /// Malformed TLV data in a card response
    #[error("TLV error: {0}")]
    Tlv(#[from] TlvError),

    /// Operation requires firmware the card does not have
    #[error("{0} requires newer firmware")]
    UnsupportedFeature(Feature),

    /// Management key material has the wrong length for its algorithm
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    BadKeyLength {
        /// Length required by the key algorithm
        expected: usize,
        /// Length actually supplied
        actual: usize,
    },

    /// Response contained a different tag than the protocol requires
    #[error("unexpected tag: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedTag {
        /// The tag the protocol requires here
        expected: u8,
        /// The tag actually received
        actual: u8,
    },

    /// Card's response to the mutual challenge did not match
    #[error("management key authentication failed")]
    AuthenticationFailed,

    /// Card returned a non-success status word
    #[error("card returned status {0}")]
    CardStatus(StatusWord),

    /// PIN was rejected, retries remain
    #[error("wrong PIN, {attempts_remaining} attempts remaining")]
    WrongPin {
        /// Verification attempts left before the PIN blocks
        attempts_remaining: u8,
    },

    /// PUK was rejected, retries remain
    #[error("wrong PUK, {attempts_remaining} attempts remaining")]
    WrongPuk {
        /// Attempts left before the PUK blocks
        attempts_remaining: u8,
    },

    /// PIN retry counter is exhausted
    #[error("PIN is blocked")]
    PinBlocked,

    /// PUK retry counter is exhausted
    #[error("PUK is blocked")]
    PukBlocked,

    /// Card response was well-formed TLV but semantically invalid
    #[error("invalid response: {0}")]
    InvalidResponse(&'static str),
}

/// Result type for PIV operations
pub type Result<T> = std::result::Result<T, Error>;
