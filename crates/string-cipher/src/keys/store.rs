//! [`SoftwareKeyStore`]: in-process key provider backed by random 256-bit keys.
//!
//! Intended for hosts without a hardware keystore and for tests. Keys live
//! only as long as the store value; a platform keystore adapter should be used
//! wherever keys must outlive the process.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::info;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{EncryptionKey, IntegrityKey, KeyError, KeyPurpose, KeyProvider};
use crate::crypto::{self, KEY_LEN};
use common::envelope::NONCE_LEN;

/// Fixed-size key buffer, zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
struct KeyBytes([u8; KEY_LEN]);

impl KeyBytes {
    fn generate() -> Result<Self, crypto::PrimitiveError> {
        let mut key = KeyBytes([0u8; KEY_LEN]);
        crypto::fill_random(&mut key.0)?;
        Ok(key)
    }
}

impl fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        f.write_str("KeyBytes([REDACTED])")
    }
}

#[derive(Debug)]
struct StoredKey {
    purpose: KeyPurpose,
    bytes: Arc<KeyBytes>,
}

#[derive(Debug, Default)]
struct Inner {
    keys: HashMap<String, StoredKey>,
    created: usize,
}

/// Thread-safe software key provider.
///
/// Lookup and creation happen under a single mutex, so any number of
/// concurrent first callers for one alias converge on one key. An alias is
/// bound to the purpose it was created for; asking for it under the other
/// purpose fails.
#[derive(Debug, Default)]
pub struct SoftwareKeyStore {
    inner: Mutex<Inner>,
}

impl SoftwareKeyStore {
    /// Create a new, empty [`SoftwareKeyStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a key with `alias` exists for `purpose`.
    pub fn contains(&self, purpose: KeyPurpose, alias: &str) -> bool {
        self.lock()
            .map(|inner| {
                inner
                    .keys
                    .get(alias)
                    .is_some_and(|stored| stored.purpose == purpose)
            })
            .unwrap_or(false)
    }

    /// Number of keys created since this store was constructed.
    pub fn created_count(&self) -> usize {
        self.lock().map(|inner| inner.created).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, KeyError> {
        self.inner
            .lock()
            .map_err(|_| KeyError::Operation("key store lock poisoned".into()))
    }

    fn get_or_create(&self, purpose: KeyPurpose, alias: &str) -> Result<Arc<KeyBytes>, KeyError> {
        if alias.trim().is_empty() {
            return Err(KeyError::unavailable(alias, "alias must not be empty"));
        }

        let mut inner = self
            .lock()
            .map_err(|e| KeyError::unavailable(alias, e.to_string()))?;

        if let Some(stored) = inner.keys.get(alias) {
            if stored.purpose != purpose {
                return Err(KeyError::unavailable(
                    alias,
                    format!("key is bound to {} use", stored.purpose),
                ));
            }
            return Ok(Arc::clone(&stored.bytes));
        }

        let bytes = Arc::new(
            KeyBytes::generate().map_err(|e| KeyError::unavailable(alias, e.to_string()))?,
        );
        inner.keys.insert(
            alias.to_owned(),
            StoredKey {
                purpose,
                bytes: Arc::clone(&bytes),
            },
        );
        inner.created += 1;
        info!(alias, %purpose, "created key");
        Ok(bytes)
    }
}

impl KeyProvider for SoftwareKeyStore {
    fn get_or_create_encryption_key(
        &self,
        alias: &str,
    ) -> Result<Arc<dyn EncryptionKey>, KeyError> {
        let key = self.get_or_create(KeyPurpose::Encryption, alias)?;
        Ok(Arc::new(SoftwareEncryptionKey { key }))
    }

    fn get_or_create_integrity_key(&self, alias: &str) -> Result<Arc<dyn IntegrityKey>, KeyError> {
        let key = self.get_or_create(KeyPurpose::Integrity, alias)?;
        Ok(Arc::new(SoftwareIntegrityKey { key }))
    }
}

#[derive(Debug)]
struct SoftwareEncryptionKey {
    key: Arc<KeyBytes>,
}

impl EncryptionKey for SoftwareEncryptionKey {
    fn cipher_encrypt(
        &self,
        nonce: &[u8; NONCE_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, KeyError> {
        crypto::cipher::encrypt(&self.key.0, nonce, plaintext)
            .map_err(|e| KeyError::Operation(e.to_string()))
    }

    fn cipher_decrypt(
        &self,
        nonce: &[u8; NONCE_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, KeyError> {
        crypto::cipher::decrypt(&self.key.0, nonce, ciphertext)
            .map_err(|e| KeyError::Operation(e.to_string()))
    }
}

#[derive(Debug)]
struct SoftwareIntegrityKey {
    key: Arc<KeyBytes>,
}

impl IntegrityKey for SoftwareIntegrityKey {
    fn mac(&self, data: &[u8]) -> Result<Vec<u8>, KeyError> {
        crypto::mac::sign(&self.key.0, data)
            .map(|tag| tag.to_vec())
            .map_err(|e| KeyError::Operation(e.to_string()))
    }
}
