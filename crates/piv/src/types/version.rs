//! Firmware version reported by the card

use derive_more::Display;

use crate::{Error, Result};

/// A firmware version as `major.minor.micro`
///
/// Ordering is lexicographic over the three components, so version
/// comparisons against feature thresholds work with the standard
/// comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{major}.{minor}.{micro}")]
pub struct Version {
    /// Major version component
    pub major: u8,
    /// Minor version component
    pub minor: u8,
    /// Micro (patch) version component
    pub micro: u8,
}

impl Version {
    /// Create a version from its components
    pub const fn new(major: u8, minor: u8, micro: u8) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }
}

impl TryFrom<&[u8]> for Version {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self> {
        match data {
            [major, minor, micro, ..] => Ok(Self::new(*major, *minor, *micro)),
            _ => Err(Error::InvalidResponse("version payload shorter than 3 bytes")),
        }
    }
}
