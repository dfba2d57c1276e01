//! AES-256-CBC and HMAC-SHA256 primitives over raw key bytes.
//!
//! This module is free of key storage concerns. Key handles in [`crate::keys`]
//! call into it, and the string cipher only ever reaches it through a handle,
//! apart from nonce generation.
//!
//! Every function builds a fresh cipher or MAC instance; nothing here holds
//! state between calls.

pub mod cipher;
pub mod mac;

use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

use common::envelope::NONCE_LEN;

/// Byte length of the AES-256 and HMAC-SHA256 keys (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Errors produced by the primitive layer.
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// The key or nonce has the wrong length for the algorithm.
    #[error("invalid key or nonce length")]
    InvalidLength,

    /// PKCS#7 padding did not check out after CBC decryption.
    #[error("invalid padding")]
    Padding,

    /// The OS random number generator failed.
    #[error("random number generator failed: {0}")]
    Rng(String),
}

/// Draw a fresh random nonce from the OS CSPRNG.
///
/// # Errors
///
/// Returns [`PrimitiveError::Rng`] if the OS generator is unavailable.
pub fn generate_nonce() -> Result<[u8; NONCE_LEN], PrimitiveError> {
    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce)?;
    Ok(nonce)
}

/// Fill `buf` from the OS CSPRNG.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<(), PrimitiveError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| PrimitiveError::Rng(e.to_string()))
}
