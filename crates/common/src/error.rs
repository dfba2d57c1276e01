//! Common error types shared across crates.

use thiserror::Error;

use crate::envelope::EnvelopeError;

/// Failure taxonomy for encrypting and decrypting strings.
///
/// None of these are retried internally. Callers above this layer are
/// expected to treat every variant as "credential unavailable, re-authenticate".
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key provider could not supply or create a key.
    #[error("key unavailable: {0}")]
    KeyUnavailable(String),

    /// The input is not a well-formed envelope string.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[from] EnvelopeError),

    /// The integrity tag did not verify; the envelope was altered or corrupted.
    #[error("integrity violation: cipher text has been tampered with")]
    IntegrityViolation,

    /// The cipher or a key operation failed while encrypting.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// The cipher failed after the integrity tag verified.
    #[error("decryption failure: {0}")]
    DecryptionFailure(String),
}

impl CipherError {
    /// Short machine-readable code, safe to put in logs.
    pub fn code(&self) -> &'static str {
        match self {
            CipherError::KeyUnavailable(_) => "key_unavailable",
            CipherError::MalformedEnvelope(_) => "malformed_envelope",
            CipherError::IntegrityViolation => "integrity_violation",
            CipherError::EncryptionFailure(_) => "encryption_failure",
            CipherError::DecryptionFailure(_) => "decryption_failure",
        }
    }

    /// Returns `true` if the error indicates tampering or corruption of stored data.
    pub fn is_tampering(&self) -> bool {
        matches!(self, CipherError::IntegrityViolation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!(CipherError::KeyUnavailable("x".into()).code(), "key_unavailable");
        assert_eq!(
            CipherError::MalformedEnvelope(EnvelopeError::Empty).code(),
            "malformed_envelope"
        );
        assert_eq!(CipherError::IntegrityViolation.code(), "integrity_violation");
        assert_eq!(
            CipherError::EncryptionFailure("x".into()).code(),
            "encryption_failure"
        );
        assert_eq!(
            CipherError::DecryptionFailure("x".into()).code(),
            "decryption_failure"
        );
    }

    #[test]
    fn only_integrity_violation_is_tampering() {
        assert!(CipherError::IntegrityViolation.is_tampering());
        assert!(!CipherError::MalformedEnvelope(EnvelopeError::FieldCount(2)).is_tampering());
        assert!(!CipherError::DecryptionFailure("x".into()).is_tampering());
    }

    #[test]
    fn envelope_errors_convert() {
        let e: CipherError = EnvelopeError::FieldCount(4).into();
        assert!(matches!(e, CipherError::MalformedEnvelope(_)));
        assert!(e.to_string().contains("found 4"));
    }
}
