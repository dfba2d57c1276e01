//! Run blocking cipher calls on the tokio blocking pool.
//!
//! Key provider calls can take a long time, particularly the first one that
//! creates keys. These helpers keep that latency off async worker threads.

use std::sync::Arc;

use common::CipherError;

use crate::secure::StringCipher;

/// Encrypt `plaintext` on the blocking pool.
///
/// # Errors
///
/// Propagates the cipher's error. A panicked or cancelled blocking task is
/// reported as [`CipherError::EncryptionFailure`].
pub async fn encrypt_blocking<C>(cipher: Arc<C>, plaintext: String) -> Result<String, CipherError>
where
    C: StringCipher + ?Sized + 'static,
{
    tokio::task::spawn_blocking(move || cipher.encrypt(&plaintext))
        .await
        .map_err(|e| CipherError::EncryptionFailure(format!("blocking task failed: {e}")))?
}

/// Decrypt `cipher_text` on the blocking pool.
///
/// # Errors
///
/// Propagates the cipher's error. A panicked or cancelled blocking task is
/// reported as [`CipherError::DecryptionFailure`].
pub async fn decrypt_blocking<C>(cipher: Arc<C>, cipher_text: String) -> Result<String, CipherError>
where
    C: StringCipher + ?Sized + 'static,
{
    tokio::task::spawn_blocking(move || cipher.decrypt(&cipher_text))
        .await
        .map_err(|e| CipherError::DecryptionFailure(format!("blocking task failed: {e}")))?
}
