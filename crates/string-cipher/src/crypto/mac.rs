//! HMAC-SHA256 integrity tags.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::PrimitiveError;
use common::envelope::TAG_LEN;

type HmacSha256 = Hmac<Sha256>;

/// Compute `HMAC-SHA256(key, data)`.
///
/// # Errors
///
/// Returns [`PrimitiveError::InvalidLength`] if the MAC rejects the key
/// (HMAC accepts any length, so this should be unreachable).
pub fn sign(key: &[u8], data: &[u8]) -> Result<[u8; TAG_LEN], PrimitiveError> {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| PrimitiveError::InvalidLength)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}
