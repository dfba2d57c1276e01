//! `string-cipher`: protects short credentials (access tokens and the like)
//! while they are stored outside process memory.
//!
//! Encryption is AES-256-CBC under one provider-held key, followed by
//! HMAC-SHA256 over `ciphertext ++ nonce` under a second, independent key.
//! Decryption verifies the tag in constant time before the cipher runs.
//!
//! ```no_run
//! use std::sync::Arc;
//! use string_cipher::{SecureStringCipher, SoftwareKeyStore, StringCipher};
//!
//! # fn main() -> Result<(), string_cipher::CipherError> {
//! let cipher = SecureStringCipher::with_defaults(Arc::new(SoftwareKeyStore::new()));
//! let stored = cipher.encrypt("session-token-abc123")?;
//! assert_eq!(cipher.decrypt(&stored)?, "session-token-abc123");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod keys;
pub mod offload;
pub mod secure;
pub mod telemetry;

pub use common::{CipherError, Envelope, EnvelopeError};
pub use config::CipherConfig;
pub use keys::{EncryptionKey, IntegrityKey, KeyError, KeyPurpose, KeyProvider, SoftwareKeyStore};
pub use secure::{SecureStringCipher, StringCipher};
