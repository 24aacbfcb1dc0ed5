//! Core error type for all APDU operations
//!
//! All error variants are consolidated here to simplify error handling and
//! facilitate bubbling up through the call stack.

use crate::response::status::StatusWord;

/// Result type alias using the core [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    //
    // Transport related errors
    //
    /// Failed to connect to the device
    #[error("Connection error: failed to connect to device")]
    Connection,

    /// Failed to transmit data
    #[error("Transmission error: failed to transmit data")]
    Transmission,

    /// Device error
    #[error("Device error")]
    Device,

    /// Operation timed out
    #[error("Operation timed out")]
    Timeout,

    /// Operation cancelled by the transport
    #[error("Operation cancelled")]
    Cancelled,

    //
    // Response related errors
    //
    /// Parse error when processing a response
    #[error("Parse error: {0}")]
    Parse(&'static str),

    /// Incomplete response (less than the 2 status bytes)
    #[error("Incomplete response")]
    Incomplete,

    /// Status error from a response
    #[error("Status error {status}")]
    Status {
        /// Status word that caused the error
        status: StatusWord,
    },

    //
    // Command related errors
    //
    /// Payload too long for the selected APDU format
    #[error("Payload length {len} exceeds the {max} byte limit of the selected format")]
    PayloadTooLong {
        /// Actual payload length
        len: usize,
        /// Limit imposed by the format
        max: usize,
    },

    /// Expected length too large for the selected APDU format
    #[error("Expected length {le} exceeds the {max} byte limit of the selected format")]
    ExpectedLengthTooLong {
        /// Requested expected length
        le: u32,
        /// Limit imposed by the format
        max: u32,
    },

    //
    // General errors
    //
    /// Other error with a static message
    #[error("{0}")]
    Other(&'static str),

    /// Generic dynamic error with a string message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Create a new error with a static message
    pub const fn other(message: &'static str) -> Self {
        Self::Other(message)
    }

    /// Create a new error with a dynamic message
    pub fn message<S: Into<String>>(message: S) -> Self {
        Self::Message(message.into())
    }

    /// Create a new status error
    pub const fn status(sw1: u8, sw2: u8) -> Self {
        Self::Status {
            status: StatusWord::new(sw1, sw2),
        }
    }

    /// Create a new parse error
    pub const fn parse(message: &'static str) -> Self {
        Self::Parse(message)
    }
}
