//! Encrypt-then-MAC protection for short strings.
//!
//! # Encryption
//!
//! 1. Obtain both key handles (first call only, see [`state`]).
//! 2. Draw a fresh 16-byte nonce and AES-256-CBC encrypt the UTF-8 plaintext.
//! 3. `tag = HMAC-SHA256(integrity_key, ciphertext ++ nonce)`.
//! 4. Encode `ciphertext;nonce;tag` (see [`common::envelope`]).
//!
//! # Decryption
//!
//! The envelope is parsed strictly and the tag is recomputed and compared in
//! constant time. The cipher only runs once the tag has verified, so padding
//! errors are never observable on tampered input.

mod state;

use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::config::CipherConfig;
use crate::crypto;
use crate::keys::KeyProvider;
use common::envelope::{authenticated_data, Envelope, TAG_LEN};
use common::CipherError;
use state::{KeyState, ReadyKeys};

/// Encrypts and decrypts short strings into transportable text.
///
/// Calls may block on the key provider, especially the first one. Use
/// [`crate::offload`] from async contexts.
pub trait StringCipher: Send + Sync {
    /// Obtain keys ahead of the first `encrypt`/`decrypt` call.
    fn initialize(&self) -> Result<(), CipherError>;

    /// Encrypt `plaintext` into an envelope string.
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    /// Verify and decrypt an envelope string produced by [`StringCipher::encrypt`].
    fn decrypt(&self, cipher_text: &str) -> Result<String, CipherError>;
}

impl<T> StringCipher for Arc<T>
where
    T: StringCipher + ?Sized,
{
    fn initialize(&self) -> Result<(), CipherError> {
        (**self).initialize()
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, cipher_text: &str) -> Result<String, CipherError> {
        (**self).decrypt(cipher_text)
    }
}

/// [`StringCipher`] backed by a [`KeyProvider`].
///
/// One instance owns one logical key pair. Share it (e.g. behind an `Arc`)
/// rather than constructing one per call.
pub struct SecureStringCipher<P>
where
    P: KeyProvider,
{
    provider: P,
    config: CipherConfig,
    state: KeyState,
}

impl<P> SecureStringCipher<P>
where
    P: KeyProvider,
{
    /// Construct a cipher using the aliases in `config`. No keys are fetched yet.
    pub fn new(provider: P, config: CipherConfig) -> Self {
        Self {
            provider,
            config,
            state: KeyState::new(),
        }
    }

    /// Construct a cipher using the default key aliases.
    pub fn with_defaults(provider: P) -> Self {
        Self::new(provider, CipherConfig::default())
    }

    /// The configuration this cipher was built with.
    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    /// Returns `true` once both keys have been obtained.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    fn ready(&self) -> Result<ReadyKeys, CipherError> {
        self.state.ensure_ready(&self.provider, &self.config)
    }
}

impl<P> StringCipher for SecureStringCipher<P>
where
    P: KeyProvider,
{
    fn initialize(&self) -> Result<(), CipherError> {
        self.ready().map(|_| ())
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let keys = self.ready()?;

        let nonce =
            crypto::generate_nonce().map_err(|e| CipherError::EncryptionFailure(e.to_string()))?;
        let ciphertext = keys
            .encryption
            .cipher_encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| CipherError::EncryptionFailure(e.to_string()))?;

        let tag = keys
            .integrity
            .mac(&authenticated_data(&ciphertext, &nonce))
            .map_err(|e| CipherError::EncryptionFailure(e.to_string()))?;
        let tag: [u8; TAG_LEN] = tag.as_slice().try_into().map_err(|_| {
            CipherError::EncryptionFailure(format!("integrity tag has length {}", tag.len()))
        })?;

        let envelope = Envelope::new(ciphertext, nonce, tag)
            .map_err(|e| CipherError::EncryptionFailure(e.to_string()))?;
        debug!("string encrypted");
        Ok(envelope.encode())
    }

    fn decrypt(&self, cipher_text: &str) -> Result<String, CipherError> {
        let keys = self.ready()?;

        let envelope = Envelope::decode(cipher_text).map_err(|e| {
            let err = CipherError::from(e);
            warn!(code = err.code(), "rejected envelope");
            err
        })?;

        verify_tag(&keys, &envelope)?;

        let plaintext = keys
            .encryption
            .cipher_decrypt(envelope.nonce(), envelope.ciphertext())
            .map_err(|e| CipherError::DecryptionFailure(e.to_string()))?;
        let plaintext = String::from_utf8(plaintext)
            .map_err(|_| CipherError::DecryptionFailure("plaintext is not valid UTF-8".into()))?;
        debug!("string decrypted");
        Ok(plaintext)
    }
}

/// Recompute the tag over `ciphertext ++ nonce` and compare in constant time.
fn verify_tag(keys: &ReadyKeys, envelope: &Envelope) -> Result<(), CipherError> {
    let expected = keys
        .integrity
        .mac(&envelope.authenticated_data())
        .map_err(|e| CipherError::DecryptionFailure(e.to_string()))?;

    if bool::from(expected.as_slice().ct_eq(envelope.tag().as_slice())) {
        Ok(())
    } else {
        let err = CipherError::IntegrityViolation;
        warn!(code = err.code(), "rejected envelope");
        Err(err)
    }
}
