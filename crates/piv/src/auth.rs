//! Mutual challenge-response authentication with the management key
//!
//! The card proves knowledge of the management key by having its witness
//! decrypted, and the host proves knowledge by having its challenge
//! encrypted by the card. Both exchanges ride on GENERAL AUTHENTICATE
//! against the card-management slot.

use bytes::Bytes;
use pivot_apdu_core::{ApduFormat, Command, Executor};
use rand::RngCore;
use tracing::debug;

use crate::constants::{SLOT_CARD_MANAGEMENT, ins, tags};
use crate::crypto;
use crate::tlv::Tlv;
use crate::types::ManagementKey;
use crate::{Error, Result};

/// Run mutual authentication with a random host challenge
pub(crate) fn authenticate<E: Executor>(executor: &mut E, key: &ManagementKey) -> Result<()> {
    let mut challenge = vec![0u8; key.key_type().challenge_len()];
    rand::rng().fill_bytes(&mut challenge);
    authenticate_with_challenge(executor, key, &challenge)
}

pub(crate) fn authenticate_with_challenge<E: Executor>(
    executor: &mut E,
    key: &ManagementKey,
    challenge: &[u8],
) -> Result<()> {
    debug!(algorithm = key.key_type().algorithm_id(), "starting management key authentication");

    // Request a witness from the card
    let witness_request = Tlv::new(tags::DYN_AUTH, Tlv::new(tags::WITNESS, Bytes::new())?.to_bytes())?;
    let response = executor.execute(
        &Command::new_with_data(
            0x00,
            ins::AUTHENTICATE,
            key.key_type().algorithm_id(),
            SLOT_CARD_MANAGEMENT,
            witness_request.to_bytes(),
        )
        .with_le(256),
        ApduFormat::Short,
    )?;
    if !response.is_success() {
        return Err(Error::CardStatus(response.status()));
    }
    let witness = extract(response.payload(), tags::WITNESS)?;
    let decrypted_witness = crypto::decrypt_block(key, &witness)?;

    // Return the decrypted witness along with our own challenge
    let mut proof = Tlv::new(tags::WITNESS, decrypted_witness)?.to_bytes().to_vec();
    proof.extend_from_slice(&Tlv::new(tags::CHALLENGE, Bytes::copy_from_slice(challenge))?.to_bytes());
    let proof_request = Tlv::new(tags::DYN_AUTH, proof)?;

    let response = executor.execute(
        &Command::new_with_data(
            0x00,
            ins::AUTHENTICATE,
            key.key_type().algorithm_id(),
            SLOT_CARD_MANAGEMENT,
            proof_request.to_bytes(),
        )
        .with_le(256),
        ApduFormat::Short,
    )?;
    if !response.is_success() {
        return Err(Error::CardStatus(response.status()));
    }

    // The card's response must be our challenge under the same key
    let card_response = extract(response.payload(), tags::RESPONSE)?;
    let expected = crypto::encrypt_block(key, challenge)?;
    if card_response.as_ref() != expected.as_slice() {
        return Err(Error::AuthenticationFailed);
    }

    debug!("management key authentication succeeded");
    Ok(())
}

/// Unwrap the dynamic authentication template and pull out one inner tag
fn extract(payload: Option<&Bytes>, inner_tag: u8) -> Result<Bytes> {
    let payload = payload.ok_or(Error::InvalidResponse("empty authentication response"))?;
    let outer = Tlv::from_bytes(payload)?;
    if outer.tag() != tags::DYN_AUTH {
        return Err(Error::UnexpectedTag {
            expected: tags::DYN_AUTH,
            actual: outer.tag(),
        });
    }
    let inner = Tlv::from_bytes(outer.value())?;
    if inner.tag() != inner_tag {
        return Err(Error::UnexpectedTag {
            expected: inner_tag,
            actual: inner.tag(),
        });
    }
    Ok(inner.value().clone())
}
