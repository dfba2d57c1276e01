//! Lazy `Uninitialized -> Ready` key state shared by every call on one cipher.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::config::CipherConfig;
use crate::keys::{EncryptionKey, IntegrityKey, KeyProvider};
use common::CipherError;

/// Key handles obtained on the transition to `Ready`.
///
/// Cloning only bumps reference counts; calls run against the clones outside
/// the state lock.
#[derive(Clone)]
pub(crate) struct ReadyKeys {
    pub(crate) encryption: Arc<dyn EncryptionKey>,
    pub(crate) integrity: Arc<dyn IntegrityKey>,
}

enum CipherState {
    Uninitialized,
    Ready(ReadyKeys),
}

/// Mutex-guarded state machine. There is no transition back to `Uninitialized`.
pub(crate) struct KeyState {
    inner: Mutex<CipherState>,
}

impl KeyState {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(CipherState::Uninitialized),
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(*state, CipherState::Ready(_))
    }

    /// Return the ready key handles, performing the transition first if needed.
    ///
    /// The lock is held across the provider calls so concurrent first callers
    /// wait for one transition instead of racing to create keys. On failure the
    /// state stays `Uninitialized`.
    pub(crate) fn ensure_ready<P>(
        &self,
        provider: &P,
        config: &CipherConfig,
    ) -> Result<ReadyKeys, CipherError>
    where
        P: KeyProvider + ?Sized,
    {
        // The state is only ever replaced by a single assignment, so a
        // poisoned lock still holds a consistent value.
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let CipherState::Ready(keys) = &*state {
            return Ok(keys.clone());
        }

        let encryption = provider
            .get_or_create_encryption_key(&config.encryption_key_alias)
            .map_err(|e| CipherError::KeyUnavailable(e.to_string()))?;
        let integrity = provider
            .get_or_create_integrity_key(&config.integrity_key_alias)
            .map_err(|e| CipherError::KeyUnavailable(e.to_string()))?;

        let keys = ReadyKeys {
            encryption,
            integrity,
        };
        *state = CipherState::Ready(keys.clone());
        info!(
            encryption_key_alias = %config.encryption_key_alias,
            integrity_key_alias = %config.integrity_key_alias,
            "string cipher ready"
        );
        Ok(keys)
    }
}
