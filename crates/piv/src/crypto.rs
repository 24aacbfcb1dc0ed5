//! Single-block cipher operations for management-key authentication
//!
//! Mutual authentication exchanges exactly one cipher block in each
//! direction, so there is no chaining mode and no padding here. The
//! key type selects the cipher: three-key triple DES or AES.

use aes::{Aes128, Aes192, Aes256};
use cipher::{Block, BlockDecrypt, BlockEncrypt, BlockSizeUser, KeyInit};
use des::TdesEde3;

use crate::types::{ManagementKey, ManagementKeyType};
use crate::{Error, Result};

/// Encrypt one block under the management key
pub(crate) fn encrypt_block(key: &ManagementKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    match key.key_type() {
        ManagementKeyType::TripleDes => one_block::<TdesEde3>(key.as_bytes(), plaintext, true),
        ManagementKeyType::Aes128 => one_block::<Aes128>(key.as_bytes(), plaintext, true),
        ManagementKeyType::Aes192 => one_block::<Aes192>(key.as_bytes(), plaintext, true),
        ManagementKeyType::Aes256 => one_block::<Aes256>(key.as_bytes(), plaintext, true),
    }
}

/// Decrypt one block under the management key
pub(crate) fn decrypt_block(key: &ManagementKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    match key.key_type() {
        ManagementKeyType::TripleDes => one_block::<TdesEde3>(key.as_bytes(), ciphertext, false),
        ManagementKeyType::Aes128 => one_block::<Aes128>(key.as_bytes(), ciphertext, false),
        ManagementKeyType::Aes192 => one_block::<Aes192>(key.as_bytes(), ciphertext, false),
        ManagementKeyType::Aes256 => one_block::<Aes256>(key.as_bytes(), ciphertext, false),
    }
}

fn one_block<C>(key: &[u8], input: &[u8], encrypt: bool) -> Result<Vec<u8>>
where
    C: BlockEncrypt + BlockDecrypt + KeyInit + BlockSizeUser,
{
    if input.len() != C::block_size() {
        return Err(Error::InvalidResponse("cipher input is not one block"));
    }
    // Key length is validated when the ManagementKey is constructed
    let cipher =
        C::new_from_slice(key).map_err(|_| Error::InvalidResponse("cipher key length mismatch"))?;

    let mut block = Block::<C>::default();
    block.copy_from_slice(input);
    if encrypt {
        cipher.encrypt_block(&mut block);
    } else {
        cipher.decrypt_block(&mut block);
    }
    Ok(block.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // Triple DES with all three subkeys equal degenerates to single DES,
    // so the classic DES known-answer vector applies.
    #[test]
    fn test_tdes_known_answer() {
        let key = ManagementKey::new(
            ManagementKeyType::TripleDes,
            hex!("0123456789ABCDEF 0123456789ABCDEF 0123456789ABCDEF").to_vec(),
        )
        .unwrap();
        let plaintext = hex!("4E6F772069732074");
        let ciphertext = hex!("3FA40E8A984D4815");

        assert_eq!(encrypt_block(&key, &plaintext).unwrap(), ciphertext);
        assert_eq!(decrypt_block(&key, &ciphertext).unwrap(), plaintext);
    }

    // FIPS-197 appendix C vectors
    #[test]
    fn test_aes_known_answers() {
        let plaintext = hex!("00112233445566778899aabbccddeeff");

        let key = ManagementKey::new(
            ManagementKeyType::Aes128,
            hex!("000102030405060708090a0b0c0d0e0f").to_vec(),
        )
        .unwrap();
        assert_eq!(
            encrypt_block(&key, &plaintext).unwrap(),
            hex!("69c4e0d86a7b0430d8cdb78070b4c55a")
        );

        let key = ManagementKey::new(
            ManagementKeyType::Aes192,
            hex!("000102030405060708090a0b0c0d0e0f1011121314151617").to_vec(),
        )
        .unwrap();
        assert_eq!(
            encrypt_block(&key, &plaintext).unwrap(),
            hex!("dda97ca4864cdfe06eaf70a0ec0d7191")
        );

        let key = ManagementKey::new(
            ManagementKeyType::Aes256,
            hex!("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f").to_vec(),
        )
        .unwrap();
        let ciphertext = hex!("8ea2b7ca516745bfeafc49904b496089");
        assert_eq!(encrypt_block(&key, &plaintext).unwrap(), ciphertext);
        assert_eq!(decrypt_block(&key, &ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn test_wrong_block_size_rejected() {
        let key = ManagementKey::default_key();
        assert!(encrypt_block(&key, &[0u8; 16]).is_err());
        assert!(decrypt_block(&key, &[0u8; 7]).is_err());
    }
}
