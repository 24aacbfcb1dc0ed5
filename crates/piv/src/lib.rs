//! PIV (Personal Identity Verification) smart card client
//!
//! This crate drives the management surface of a PIV applet over any
//! [`pivot_apdu_core`] executor: PIN and PUK verification and change,
//! management-key mutual authentication and rotation, metadata and serial
//! queries, retry-limit configuration and factory reset.
//!
//! ## Usage
//!
//! ```no_run
//! use pivot_apdu_core::{CardExecutor, CardTransport};
//! use pivot_piv::{ManagementKey, PivSession};
//!
//! fn open<T: CardTransport>(transport: T) -> pivot_piv::Result<()> {
//!     let executor = CardExecutor::new(transport);
//!     let mut session = PivSession::new(executor)?;
//!     session.authenticate(&ManagementKey::default_key())?;
//!     session.verify_pin(b"123456")?;
//!     Ok(())
//! }
//! ```
//!
//! Retry-counter reporting differs across firmware generations; the session
//! reads the version at selection time and interprets status words
//! accordingly, so callers never see raw status-word encodings.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

mod auth;
pub mod constants;
mod crypto;
mod error;
pub mod retries;
mod session;
pub mod tlv;
pub mod types;

pub use error::{Error, Result};
pub use retries::RetryStatus;
pub use session::PivSession;
pub use types::{
    DEFAULT_MANAGEMENT_KEY, Feature, Features, ManagementKey, ManagementKeyMetadata,
    ManagementKeyType, PinMetadata, TouchPolicy, Version,
};
