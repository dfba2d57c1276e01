//! Key provider contract: purpose-scoped symmetric key handles looked up by alias.
//!
//! A provider hands back opaque handles. The string cipher never sees key
//! bytes; it only asks a handle to encrypt, decrypt or compute a MAC.
//!
//! # Provider obligations
//!
//! - Key material never leaves the provider's boundary in plaintext.
//! - `get_or_create_*` is idempotent under races: concurrent first callers for
//!   one alias must all receive the same logical key.
//! - A key created for one purpose is never handed out for the other.

pub mod store;

pub use store::SoftwareKeyStore;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use common::envelope::NONCE_LEN;

/// What a key may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPurpose {
    /// Block-cipher encrypt/decrypt only.
    Encryption,
    /// MAC sign/verify only.
    Integrity,
}

impl fmt::Display for KeyPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyPurpose::Encryption => "encryption",
            KeyPurpose::Integrity => "integrity",
        })
    }
}

/// Errors produced by key providers and key handles.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The provider could not look up or create the key.
    #[error("key `{alias}` unavailable: {reason}")]
    Unavailable { alias: String, reason: String },

    /// A handle failed to perform an operation (e.g. the key was invalidated).
    #[error("key operation failed: {0}")]
    Operation(String),
}

impl KeyError {
    pub(crate) fn unavailable(alias: &str, reason: impl Into<String>) -> Self {
        KeyError::Unavailable {
            alias: alias.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Handle to a key usable only for block-cipher operations.
pub trait EncryptionKey: Send + Sync {
    /// Encrypt `plaintext` with the given nonce, returning padded ciphertext.
    fn cipher_encrypt(&self, nonce: &[u8; NONCE_LEN], plaintext: &[u8])
        -> Result<Vec<u8>, KeyError>;

    /// Decrypt `ciphertext` produced by [`EncryptionKey::cipher_encrypt`].
    fn cipher_decrypt(
        &self,
        nonce: &[u8; NONCE_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, KeyError>;
}

/// Handle to a key usable only for computing integrity tags.
pub trait IntegrityKey: Send + Sync {
    /// Compute the MAC of `data`.
    fn mac(&self, data: &[u8]) -> Result<Vec<u8>, KeyError>;
}

/// Supplies encryption and integrity keys by stable alias, creating them on first use.
#[cfg_attr(test, mockall::automock)]
pub trait KeyProvider: Send + Sync {
    /// Return the encryption key stored under `alias`, creating it if absent.
    fn get_or_create_encryption_key(&self, alias: &str)
        -> Result<Arc<dyn EncryptionKey>, KeyError>;

    /// Return the integrity key stored under `alias`, creating it if absent.
    fn get_or_create_integrity_key(&self, alias: &str) -> Result<Arc<dyn IntegrityKey>, KeyError>;
}

impl<T> KeyProvider for Arc<T>
where
    T: KeyProvider + ?Sized,
{
    fn get_or_create_encryption_key(
        &self,
        alias: &str,
    ) -> Result<Arc<dyn EncryptionKey>, KeyError> {
        (**self).get_or_create_encryption_key(alias)
    }

    fn get_or_create_integrity_key(&self, alias: &str) -> Result<Arc<dyn IntegrityKey>, KeyError> {
        (**self).get_or_create_integrity_key(alias)
    }
}

impl<T> KeyProvider for Box<T>
where
    T: KeyProvider + ?Sized,
{
    fn get_or_create_encryption_key(
        &self,
        alias: &str,
    ) -> Result<Arc<dyn EncryptionKey>, KeyError> {
        (**self).get_or_create_encryption_key(alias)
    }

    fn get_or_create_integrity_key(&self, alias: &str) -> Result<Arc<dyn IntegrityKey>, KeyError> {
        (**self).get_or_create_integrity_key(alias)
    }
}
