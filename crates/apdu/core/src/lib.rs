//! Core traits and types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the foundational types and traits for working with smart card
//! APDU commands and responses according to ISO/IEC 7816-4.
//!
//! ## Overview
//!
//! APDU (Application Protocol Data Unit) is the communication format used by smart cards.
//! This crate provides abstractions for:
//!
//! - Creating and serializing APDU commands in short or extended form
//! - Parsing APDU responses and status words
//! - Communicating with smart cards through different transport layers
//! - Error handling and status word interpretation
//!
//! Application-level protocols (PIV et al.) build on these types; the transport
//! itself (PC/SC, NFC, USB) lives behind the [`CardTransport`] trait.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Main modules
pub mod command;
pub mod executor;
pub mod response;
pub mod transport;

// Core error types
mod error;
pub use error::{Error, Result};

// Re-exports for common types
pub use command::{ApduFormat, Command};
pub use executor::{CardExecutor, Executor};
pub use response::Response;
pub use response::status::StatusWord;
pub use transport::CardTransport;

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Bytes, BytesMut, Error, Result,
        command::{ApduFormat, Command},
        executor::{CardExecutor, Executor},
        response::Response,
        response::status::{StatusWord, common as status},
        transport::CardTransport,
    };
}
