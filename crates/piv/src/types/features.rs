//! Version-gated capability checks

use derive_more::Display;

use super::Version;

/// A capability introduced in a particular firmware version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Feature {
    /// Per-key PIN and touch usage policies
    #[display("usage policy")]
    UsagePolicy,
    /// AES management keys
    #[display("AES management key")]
    AesKey,
    /// The metadata query
    #[display("metadata")]
    Metadata,
    /// The serial number query
    #[display("serial number")]
    SerialNumber,
}

impl Feature {
    /// First firmware version that supports this feature
    pub const fn min_version(self) -> Version {
        match self {
            Self::UsagePolicy => Version::new(4, 0, 0),
            Self::AesKey => Version::new(5, 4, 0),
            Self::Metadata => Version::new(5, 3, 0),
            Self::SerialNumber => Version::new(5, 0, 0),
        }
    }
}

/// Capability set derived from a card's firmware version
#[derive(Debug, Clone, Copy)]
pub struct Features {
    version: Version,
}

impl Features {
    /// Derive the capability set for a firmware version
    pub const fn new(version: Version) -> Self {
        Self { version }
    }

    /// Whether the card supports `feature`
    pub fn supports(&self, feature: Feature) -> bool {
        self.version >= feature.min_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        let features = Features::new(Version::new(5, 2, 4));
        assert!(features.supports(Feature::UsagePolicy));
        assert!(features.supports(Feature::SerialNumber));
        assert!(!features.supports(Feature::Metadata));
        assert!(!features.supports(Feature::AesKey));

        let features = Features::new(Version::new(5, 4, 0));
        assert!(features.supports(Feature::Metadata));
        assert!(features.supports(Feature::AesKey));

        let features = Features::new(Version::new(3, 9, 9));
        assert!(!features.supports(Feature::UsagePolicy));
    }
}
