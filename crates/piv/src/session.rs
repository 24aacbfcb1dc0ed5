//! PIV application session
//!
//! A [`PivSession`] owns an executor with the PIV application selected and
//! exposes the management operations: credential verification and change,
//! management-key authentication and rotation, metadata and serial queries,
//! and factory reset.

use bytes::Bytes;
use pivot_apdu_core::{ApduFormat, Command, Executor};
use tracing::{debug, warn};

use crate::auth;
use crate::constants::{PIN_FIELD_LEN, PIV_AID, SLOT_CARD_MANAGEMENT, ins, p2, tags};
use crate::retries::RetryStatus;
use crate::tlv::{self, Tlv};
use crate::types::{
    Feature, Features, ManagementKey, ManagementKeyMetadata, ManagementKeyType, PinMetadata,
    TouchPolicy, Version,
};
use crate::{Error, Result};

/// Factory-default retry limit for both PIN and PUK
const DEFAULT_ATTEMPTS: u8 = 3;

/// Upper bound on deliberate failures when driving a counter to zero
const MAX_BLOCK_ROUNDS: u8 = 15;

/// Which credential a command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reference {
    Pin,
    Puk,
}

impl Reference {
    const fn p2(self) -> u8 {
        match self {
            Self::Pin => p2::PIN,
            Self::Puk => p2::PUK,
        }
    }

    fn wrong(self, attempts_remaining: u8) -> Error {
        match self {
            Self::Pin => Error::WrongPin { attempts_remaining },
            Self::Puk => Error::WrongPuk { attempts_remaining },
        }
    }

    const fn blocked(self) -> Error {
        match self {
            Self::Pin => Error::PinBlocked,
            Self::Puk => Error::PukBlocked,
        }
    }
}

/// An open session with a card's PIV application
#[derive(Debug)]
pub struct PivSession<E: Executor> {
    executor: E,
    version: Version,
    features: Features,
    current_pin_attempts: u8,
    max_pin_attempts: u8,
}

impl<E: Executor> PivSession<E> {
    /// Select the PIV application and read the firmware version
    pub fn new(mut executor: E) -> Result<Self> {
        let select =
            Command::new_with_data(0x00, ins::SELECT, 0x04, 0x00, PIV_AID.to_vec()).with_le(256);
        let response = executor.execute(&select, ApduFormat::Short)?;
        if !response.is_success() {
            return Err(Error::CardStatus(response.status()));
        }

        let response = executor.execute(
            &Command::new(0x00, ins::GET_VERSION, 0x00, 0x00).with_le(256),
            ApduFormat::Short,
        )?;
        if !response.is_success() {
            return Err(Error::CardStatus(response.status()));
        }
        let payload = response
            .payload()
            .ok_or(Error::InvalidResponse("empty version response"))?;
        let version = Version::try_from(payload.as_ref())?;
        debug!(%version, "PIV application selected");

        Ok(Self {
            executor,
            version,
            features: Features::new(version),
            current_pin_attempts: DEFAULT_ATTEMPTS,
            max_pin_attempts: DEFAULT_ATTEMPTS,
        })
    }

    /// Firmware version reported by the card
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Access the underlying executor
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Mutable access to the underlying executor
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Whether the card supports `feature`
    pub fn supports(&self, feature: Feature) -> bool {
        self.features.supports(feature)
    }

    fn require(&self, feature: Feature) -> Result<()> {
        if self.supports(feature) {
            Ok(())
        } else {
            Err(Error::UnsupportedFeature(feature))
        }
    }

    /// Authenticate to the card with the management key
    pub fn authenticate(&mut self, key: &ManagementKey) -> Result<()> {
        auth::authenticate(&mut self.executor, key)
    }

    /// Replace the management key
    ///
    /// Requires a prior [`authenticate`](Self::authenticate) with the
    /// current key. AES keys and touch policies are version-gated.
    pub fn set_management_key(&mut self, key: &ManagementKey, require_touch: bool) -> Result<()> {
        if require_touch {
            self.require(Feature::UsagePolicy)?;
        }
        if key.key_type() != ManagementKeyType::TripleDes {
            self.require(Feature::AesKey)?;
        }

        let mut data = vec![key.key_type().algorithm_id()];
        data.extend_from_slice(
            &Tlv::new(SLOT_CARD_MANAGEMENT, Bytes::copy_from_slice(key.as_bytes()))?.to_bytes(),
        );

        let touch = if require_touch { 0xFE } else { 0xFF };
        let response = self.executor.execute(
            &Command::new_with_data(0x00, ins::SET_MANAGEMENT_KEY, 0xFF, touch, data),
            ApduFormat::Short,
        )?;
        if !response.is_success() {
            return Err(Error::CardStatus(response.status()));
        }
        debug!(algorithm = key.key_type().algorithm_id(), "management key replaced");
        Ok(())
    }

    /// Verify the PIN for this session
    pub fn verify_pin(&mut self, pin: &[u8]) -> Result<()> {
        let response = self.executor.execute(
            &Command::new_with_data(0x00, ins::VERIFY, 0x00, p2::PIN, pad_credential(pin)),
            ApduFormat::Short,
        )?;
        if response.is_success() {
            self.current_pin_attempts = self.max_pin_attempts;
            return Ok(());
        }
        match RetryStatus::from_status_word(response.status(), self.version) {
            RetryStatus::Remaining(n) => {
                self.current_pin_attempts = n;
                Err(Error::WrongPin {
                    attempts_remaining: n,
                })
            }
            RetryStatus::Exhausted => {
                self.current_pin_attempts = 0;
                Err(Error::PinBlocked)
            }
            RetryStatus::Unrelated => Err(Error::CardStatus(response.status())),
        }
    }

    /// Change the PIN
    pub fn change_pin(&mut self, old_pin: &[u8], new_pin: &[u8]) -> Result<()> {
        self.change_reference(Reference::Pin, old_pin, new_pin)
    }

    /// Change the PUK
    pub fn change_puk(&mut self, old_puk: &[u8], new_puk: &[u8]) -> Result<()> {
        self.change_reference(Reference::Puk, old_puk, new_puk)
    }

    /// Set a new PIN using the PUK, unblocking the PIN if necessary
    pub fn unblock_pin(&mut self, puk: &[u8], new_pin: &[u8]) -> Result<()> {
        let mut data = pad_credential(puk);
        data.extend_from_slice(&pad_credential(new_pin));
        let response = self.executor.execute(
            &Command::new_with_data(0x00, ins::RESET_RETRY, 0x00, p2::PIN, data),
            ApduFormat::Short,
        )?;
        if response.is_success() {
            self.current_pin_attempts = self.max_pin_attempts;
            return Ok(());
        }
        // Failures here consume PUK attempts, not PIN attempts
        self.map_failure(Reference::Puk, response.status())
    }

    fn change_reference(&mut self, reference: Reference, old: &[u8], new: &[u8]) -> Result<()> {
        let mut data = pad_credential(old);
        data.extend_from_slice(&pad_credential(new));
        let response = self.executor.execute(
            &Command::new_with_data(0x00, ins::CHANGE_REFERENCE, 0x00, reference.p2(), data),
            ApduFormat::Short,
        )?;
        if response.is_success() {
            if reference == Reference::Pin {
                self.current_pin_attempts = self.max_pin_attempts;
            }
            return Ok(());
        }
        let result = self.map_failure(reference, response.status());
        if let Err(Error::WrongPin { attempts_remaining }) = &result {
            self.current_pin_attempts = *attempts_remaining;
        }
        if matches!(result, Err(Error::PinBlocked)) {
            self.current_pin_attempts = 0;
        }
        result
    }

    fn map_failure(&self, reference: Reference, status: pivot_apdu_core::StatusWord) -> Result<()> {
        match RetryStatus::from_status_word(status, self.version) {
            RetryStatus::Remaining(n) => Err(reference.wrong(n)),
            RetryStatus::Exhausted => Err(reference.blocked()),
            RetryStatus::Unrelated => Err(Error::CardStatus(status)),
        }
    }

    /// PIN attempts remaining
    ///
    /// Uses the metadata query when the firmware supports it. Otherwise
    /// probes with an empty VERIFY, which reports the counter without
    /// consuming an attempt.
    pub fn pin_attempts(&mut self) -> Result<u8> {
        if self.supports(Feature::Metadata) {
            return Ok(self.pin_metadata()?.retries_remaining);
        }
        let response = self.executor.execute(
            &Command::new(0x00, ins::VERIFY, 0x00, p2::PIN),
            ApduFormat::Short,
        )?;
        if response.is_success() {
            // A session-verified PIN answers the probe with success; the
            // card reveals no counter, so report the tracked value.
            return Ok(self.current_pin_attempts);
        }
        match RetryStatus::from_status_word(response.status(), self.version) {
            RetryStatus::Remaining(n) => Ok(n),
            RetryStatus::Exhausted => Ok(0),
            RetryStatus::Unrelated => Err(Error::CardStatus(response.status())),
        }
    }

    /// Configure the PIN and PUK retry limits
    ///
    /// Requires management-key authentication and a verified PIN in this
    /// session. Resets both counters to their new limits.
    pub fn set_pin_puk_attempts(&mut self, pin_attempts: u8, puk_attempts: u8) -> Result<()> {
        let response = self.executor.execute(
            &Command::new(0x00, ins::SET_PIN_PUK_ATTEMPTS, pin_attempts, puk_attempts),
            ApduFormat::Short,
        )?;
        if !response.is_success() {
            return Err(Error::CardStatus(response.status()));
        }
        self.max_pin_attempts = pin_attempts;
        self.current_pin_attempts = pin_attempts;
        debug!(pin_attempts, puk_attempts, "retry limits updated");
        Ok(())
    }

    /// Metadata for the PIN
    pub fn pin_metadata(&mut self) -> Result<PinMetadata> {
        self.credential_metadata(p2::PIN)
    }

    /// Metadata for the PUK
    pub fn puk_metadata(&mut self) -> Result<PinMetadata> {
        self.credential_metadata(p2::PUK)
    }

    fn credential_metadata(&mut self, slot: u8) -> Result<PinMetadata> {
        let records = self.metadata_records(slot)?;

        let is_default = tlv::find(&records, tags::IS_DEFAULT)
            .and_then(|tlv| tlv.value().first().copied())
            .ok_or(Error::InvalidResponse("metadata missing default flag"))?
            != 0;
        let retries = tlv::find(&records, tags::RETRIES)
            .map(|tlv| tlv.value().as_ref())
            .ok_or(Error::InvalidResponse("metadata missing retry counts"))?;
        let [total, remaining, ..] = retries else {
            return Err(Error::InvalidResponse("metadata retry field too short"));
        };

        Ok(PinMetadata {
            is_default,
            retries_total: *total,
            retries_remaining: *remaining,
        })
    }

    /// Metadata for the management key
    pub fn management_key_metadata(&mut self) -> Result<ManagementKeyMetadata> {
        let records = self.metadata_records(SLOT_CARD_MANAGEMENT)?;

        // Old firmware omits the algorithm for the factory triple DES key
        let key_type = match tlv::find(&records, tags::ALGORITHM) {
            Some(tlv) => {
                let id = *tlv
                    .value()
                    .first()
                    .ok_or(Error::InvalidResponse("empty algorithm field"))?;
                ManagementKeyType::from_algorithm_id(id)
                    .ok_or(Error::InvalidResponse("unknown management key algorithm"))?
            }
            None => ManagementKeyType::TripleDes,
        };

        // Usage policy is two bytes; touch policy is the second
        let touch_policy = tlv::find(&records, tags::TOUCH_POLICY)
            .and_then(|tlv| tlv.value().get(1).copied())
            .and_then(TouchPolicy::from_byte)
            .ok_or(Error::InvalidResponse("metadata missing touch policy"))?;

        let is_default = tlv::find(&records, tags::IS_DEFAULT)
            .and_then(|tlv| tlv.value().first().copied())
            .ok_or(Error::InvalidResponse("metadata missing default flag"))?
            != 0;

        Ok(ManagementKeyMetadata {
            key_type,
            touch_policy,
            is_default,
        })
    }

    fn metadata_records(&mut self, slot: u8) -> Result<Vec<Tlv>> {
        self.require(Feature::Metadata)?;
        let response = self.executor.execute(
            &Command::new(0x00, ins::GET_METADATA, 0x00, slot).with_le(256),
            ApduFormat::Short,
        )?;
        if !response.is_success() {
            return Err(Error::CardStatus(response.status()));
        }
        let payload = response
            .payload()
            .ok_or(Error::InvalidResponse("empty metadata response"))?;
        Ok(Tlv::parse_all(payload)?)
    }

    /// The card's serial number
    pub fn serial_number(&mut self) -> Result<u32> {
        self.require(Feature::SerialNumber)?;
        let response = self.executor.execute(
            &Command::new(0x00, ins::GET_SERIAL, 0x00, 0x00).with_le(256),
            ApduFormat::Short,
        )?;
        if !response.is_success() {
            return Err(Error::CardStatus(response.status()));
        }
        let payload = response
            .payload()
            .ok_or(Error::InvalidResponse("empty serial response"))?;
        let bytes: [u8; 4] = payload
            .as_ref()
            .try_into()
            .map_err(|_| Error::InvalidResponse("serial number is not 4 bytes"))?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Factory-reset the PIV application
    ///
    /// The card only accepts a reset once both the PIN and the PUK are
    /// blocked, so this deliberately exhausts both counters first.
    pub fn reset(&mut self) -> Result<()> {
        warn!("resetting PIV application to factory defaults");
        self.block(Reference::Pin)?;
        self.block(Reference::Puk)?;

        let response = self
            .executor
            .execute(&Command::new(0x00, ins::RESET, 0x00, 0x00), ApduFormat::Short)?;
        if !response.is_success() {
            return Err(Error::CardStatus(response.status()));
        }
        self.max_pin_attempts = DEFAULT_ATTEMPTS;
        self.current_pin_attempts = DEFAULT_ATTEMPTS;
        debug!("PIV application reset");
        Ok(())
    }

    /// Drive a credential's retry counter to zero with deliberate failures
    fn block(&mut self, reference: Reference) -> Result<()> {
        // A value no sane card accepts as a current PIN or PUK
        let bogus = vec![0xFFu8; PIN_FIELD_LEN];

        for _ in 0..=MAX_BLOCK_ROUNDS {
            let command = match reference {
                Reference::Pin => {
                    Command::new_with_data(0x00, ins::VERIFY, 0x00, p2::PIN, bogus.clone())
                }
                Reference::Puk => {
                    let mut data = bogus.clone();
                    data.extend_from_slice(&bogus);
                    Command::new_with_data(0x00, ins::CHANGE_REFERENCE, 0x00, p2::PUK, data)
                }
            };
            let response = self.executor.execute(&command, ApduFormat::Short)?;
            match RetryStatus::from_status_word(response.status(), self.version) {
                RetryStatus::Exhausted | RetryStatus::Remaining(0) => {
                    if reference == Reference::Pin {
                        self.current_pin_attempts = 0;
                    }
                    return Ok(());
                }
                RetryStatus::Remaining(_) => continue,
                RetryStatus::Unrelated => return Err(Error::CardStatus(response.status())),
            }
        }
        // Counter larger than the round bound; treat as good enough
        Ok(())
    }
}

/// Pad a PIN or PUK to the fixed field length
///
/// Values at or over the field length are sent as-is, never truncated;
/// the card is the authority on maximum length.
fn pad_credential(value: &[u8]) -> Vec<u8> {
    let mut padded = value.to_vec();
    if padded.len() < PIN_FIELD_LEN {
        padded.resize(PIN_FIELD_LEN, 0xFF);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_credential() {
        assert_eq!(
            pad_credential(b"123456"),
            vec![0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0xFF, 0xFF]
        );
        assert_eq!(pad_credential(b"12345678"), b"12345678".to_vec());
        // Over-length values pass through untouched
        assert_eq!(pad_credential(b"123456789"), b"123456789".to_vec());
        assert_eq!(pad_credential(b""), vec![0xFF; 8]);
    }
}
