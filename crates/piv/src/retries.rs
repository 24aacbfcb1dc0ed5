//! Retry-counter interpretation of verification status words
//!
//! The encoding of "wrong PIN, N retries left" changed across firmware
//! generations. Before 1.0.4 the whole `0x63XX` range carries the counter
//! in the low byte; from 1.0.4 on only `0x63CX` does, with the counter in
//! the low nibble. `0x6983` always means the counter is exhausted.

use pivot_apdu_core::StatusWord;
use pivot_apdu_core::response::status::common as status;

use crate::types::Version;

const COUNTER_ENCODING_CHANGE: Version = Version::new(1, 0, 4);

/// What a status word says about the retry counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStatus {
    /// Counter exhausted, the credential is blocked
    Exhausted,
    /// Wrong credential, this many attempts remain
    Remaining(u8),
    /// Status word carries no retry information
    Unrelated,
}

impl RetryStatus {
    /// Interpret a status word under the given firmware's encoding
    pub fn from_status_word(sw: StatusWord, version: Version) -> Self {
        if sw == status::AUTHENTICATION_METHOD_BLOCKED {
            return Self::Exhausted;
        }
        let word = sw.to_u16();
        if version < COUNTER_ENCODING_CHANGE {
            match word {
                0x6300..=0x63FF => Self::Remaining((word & 0xFF) as u8),
                _ => Self::Unrelated,
            }
        } else {
            match word {
                0x63C0..=0x63CF => Self::Remaining((word & 0x0F) as u8),
                _ => Self::Unrelated,
            }
        }
    }

    /// Remaining attempts, if this status carries a counter
    pub const fn count(self) -> Option<u8> {
        match self {
            Self::Exhausted => Some(0),
            Self::Remaining(n) => Some(n),
            Self::Unrelated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OLD: Version = Version::new(1, 0, 3);
    const NEW: Version = Version::new(5, 2, 4);

    #[test]
    fn test_blocked_is_exhausted_everywhere() {
        for version in [OLD, NEW] {
            assert_eq!(
                RetryStatus::from_status_word(StatusWord::from_u16(0x6983), version),
                RetryStatus::Exhausted
            );
        }
    }

    #[test]
    fn test_old_encoding_uses_low_byte() {
        assert_eq!(
            RetryStatus::from_status_word(StatusWord::from_u16(0x6300), OLD),
            RetryStatus::Remaining(0)
        );
        assert_eq!(
            RetryStatus::from_status_word(StatusWord::from_u16(0x6305), OLD),
            RetryStatus::Remaining(5)
        );
        assert_eq!(
            RetryStatus::from_status_word(StatusWord::from_u16(0x63C2), OLD),
            RetryStatus::Remaining(0xC2)
        );
    }

    #[test]
    fn test_new_encoding_uses_low_nibble() {
        assert_eq!(
            RetryStatus::from_status_word(StatusWord::from_u16(0x63C2), NEW),
            RetryStatus::Remaining(2)
        );
        // Outside 0x63C0..=0x63CF the word carries no counter
        assert_eq!(
            RetryStatus::from_status_word(StatusWord::from_u16(0x6305), NEW),
            RetryStatus::Unrelated
        );
    }

    #[test]
    fn test_encoding_boundary_version() {
        let boundary = Version::new(1, 0, 4);
        assert_eq!(
            RetryStatus::from_status_word(StatusWord::from_u16(0x6305), boundary),
            RetryStatus::Unrelated
        );
    }

    #[test]
    fn test_unrelated() {
        assert_eq!(
            RetryStatus::from_status_word(StatusWord::from_u16(0x9000), NEW),
            RetryStatus::Unrelated
        );
        assert_eq!(
            RetryStatus::from_status_word(StatusWord::from_u16(0x6A80), NEW),
            RetryStatus::Unrelated
        );
    }

    #[test]
    fn test_count() {
        assert_eq!(RetryStatus::Exhausted.count(), Some(0));
        assert_eq!(RetryStatus::Remaining(3).count(), Some(3));
        assert_eq!(RetryStatus::Unrelated.count(), None);
    }
}
