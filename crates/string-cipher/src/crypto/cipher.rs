//! AES-256-CBC with PKCS#7 padding.
//!
//! CBC on its own gives no integrity. Callers must authenticate the output
//! (see [`super::mac`]) and verify before calling [`decrypt`], otherwise the
//! padding check below becomes an oracle.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use super::{PrimitiveError, KEY_LEN};
use common::envelope::NONCE_LEN;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Encrypt `plaintext` under `key` with the given CBC `nonce`.
///
/// The output length is the plaintext length rounded up to the next whole
/// block; a full padding block is added when the input is already aligned.
///
/// # Errors
///
/// Returns [`PrimitiveError::InvalidLength`] if `key` is not [`KEY_LEN`] bytes.
pub fn encrypt(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, PrimitiveError> {
    let cipher = build_encryptor(key, nonce)?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt `ciphertext` under `key` with the given CBC `nonce`.
///
/// # Errors
///
/// Returns [`PrimitiveError::InvalidLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`PrimitiveError::Padding`] if the ciphertext is not block aligned or
/// the recovered padding is invalid.
pub fn decrypt(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, PrimitiveError> {
    let cipher = build_decryptor(key, nonce)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| PrimitiveError::Padding)
}

fn build_encryptor(key: &[u8], nonce: &[u8; NONCE_LEN]) -> Result<Aes256CbcEnc, PrimitiveError> {
    if key.len() != KEY_LEN {
        return Err(PrimitiveError::InvalidLength);
    }
    Aes256CbcEnc::new_from_slices(key, nonce).map_err(|_| PrimitiveError::InvalidLength)
}

fn build_decryptor(key: &[u8], nonce: &[u8; NONCE_LEN]) -> Result<Aes256CbcDec, PrimitiveError> {
    if key.len() != KEY_LEN {
        return Err(PrimitiveError::InvalidLength);
    }
    Aes256CbcDec::new_from_slices(key, nonce).map_err(|_| PrimitiveError::InvalidLength)
}
