//! Domain types for PIV sessions

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Error, Result};

mod features;
mod version;

pub use features::{Feature, Features};
pub use version::Version;

/// Default management key shipped on factory-fresh cards
pub const DEFAULT_MANAGEMENT_KEY: [u8; 24] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
    0x08, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
];

/// Algorithm of the card management key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagementKeyType {
    /// Three-key triple DES (the factory default)
    TripleDes,
    /// AES with a 128-bit key
    Aes128,
    /// AES with a 192-bit key
    Aes192,
    /// AES with a 256-bit key
    Aes256,
}

impl ManagementKeyType {
    /// PIV algorithm identifier sent on the wire
    pub const fn algorithm_id(self) -> u8 {
        match self {
            Self::TripleDes => 0x03,
            Self::Aes128 => 0x08,
            Self::Aes192 => 0x0A,
            Self::Aes256 => 0x0C,
        }
    }

    /// Required key material length in bytes
    pub const fn key_len(self) -> usize {
        match self {
            Self::TripleDes | Self::Aes192 => 24,
            Self::Aes128 => 16,
            Self::Aes256 => 32,
        }
    }

    /// Cipher block size, which is also the challenge length
    pub const fn challenge_len(self) -> usize {
        match self {
            Self::TripleDes => 8,
            Self::Aes128 | Self::Aes192 | Self::Aes256 => 16,
        }
    }

    /// Map a wire algorithm identifier back to a key type
    pub const fn from_algorithm_id(id: u8) -> Option<Self> {
        match id {
            0x03 => Some(Self::TripleDes),
            0x08 => Some(Self::Aes128),
            0x0A => Some(Self::Aes192),
            0x0C => Some(Self::Aes256),
            _ => None,
        }
    }
}

/// Management key material, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ManagementKey {
    #[zeroize(skip)]
    key_type: ManagementKeyType,
    bytes: Vec<u8>,
}

impl ManagementKey {
    /// Wrap key material, validating its length against the algorithm
    pub fn new(key_type: ManagementKeyType, bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() != key_type.key_len() {
            return Err(Error::BadKeyLength {
                expected: key_type.key_len(),
                actual: bytes.len(),
            });
        }
        Ok(Self { key_type, bytes })
    }

    /// The well-known factory default key
    pub fn default_key() -> Self {
        Self {
            key_type: ManagementKeyType::TripleDes,
            bytes: DEFAULT_MANAGEMENT_KEY.to_vec(),
        }
    }

    /// Algorithm of this key
    pub const fn key_type(&self) -> ManagementKeyType {
        self.key_type
    }

    /// Raw key bytes
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for ManagementKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementKey")
            .field("key_type", &self.key_type)
            .finish_non_exhaustive()
    }
}

/// Touch requirement attached to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPolicy {
    /// Card decides (no explicit policy set)
    Default,
    /// Touch never required
    Never,
    /// Touch required on every use
    Always,
    /// Touch required, cached for 15 seconds
    Cached,
}

impl TouchPolicy {
    /// Map a wire policy byte to a policy
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Default),
            0x01 => Some(Self::Never),
            0x02 => Some(Self::Always),
            0x03 => Some(Self::Cached),
            _ => None,
        }
    }
}

/// Metadata describing a PIN or PUK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMetadata {
    /// Whether the value is still the factory default
    pub is_default: bool,
    /// Configured retry limit
    pub retries_total: u8,
    /// Retries remaining right now
    pub retries_remaining: u8,
}

/// Metadata describing the management key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagementKeyMetadata {
    /// Algorithm of the configured key
    pub key_type: ManagementKeyType,
    /// Touch policy attached to the key
    pub touch_policy: TouchPolicy,
    /// Whether the key is still the factory default
    pub is_default: bool,
}
