//! The encrypted string envelope and its text encoding.
//!
//! # Wire format
//!
//! ```text
//! base64(ciphertext);base64(nonce);base64(tag)
//! ```
//!
//! Every field uses the standard base64 alphabet with canonical padding, which
//! never contains the `;` delimiter. Exactly three fields are accepted. Older
//! two-field strings (ciphertext and IV without an integrity tag) are rejected
//! rather than interpreted.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Separator placed between the encoded fields.
pub const DELIMITER: char = ';';

/// Number of fields in an encoded envelope.
pub const FIELD_COUNT: usize = 3;

/// Cipher block length in bytes (AES).
pub const BLOCK_LEN: usize = 16;

/// Nonce (CBC initialisation vector) length in bytes; one cipher block.
pub const NONCE_LEN: usize = BLOCK_LEN;

/// Integrity tag length in bytes (HMAC-SHA256 output).
pub const TAG_LEN: usize = 32;

/// Identifies one of the three envelope fields in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeField {
    Ciphertext,
    Nonce,
    Tag,
}

impl fmt::Display for EnvelopeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EnvelopeField::Ciphertext => "ciphertext",
            EnvelopeField::Nonce => "nonce",
            EnvelopeField::Tag => "tag",
        })
    }
}

/// Reasons an encoded envelope is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The input string was empty.
    #[error("empty envelope")]
    Empty,

    /// The input did not split into exactly [`FIELD_COUNT`] fields.
    #[error("expected {FIELD_COUNT} fields, found {0}")]
    FieldCount(usize),

    /// A field is not canonical base64.
    #[error("{0} field is not valid base64")]
    Encoding(EnvelopeField),

    /// A field decoded to a length the primitives cannot have produced.
    #[error("{field} field has invalid length {actual} (expected {expected})")]
    Length {
        field: EnvelopeField,
        expected: &'static str,
        actual: usize,
    },
}

/// One encryption result: ciphertext, the nonce it was produced with, and the
/// integrity tag over `ciphertext ++ nonce`.
///
/// Envelopes are immutable. They come either straight out of an encryption or
/// out of [`Envelope::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    ciphertext: Vec<u8>,
    nonce: [u8; NONCE_LEN],
    tag: [u8; TAG_LEN],
}

impl Envelope {
    /// Assemble an envelope from freshly produced encryption output.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Length`] if `ciphertext` is empty or not a
    /// whole number of cipher blocks.
    pub fn new(
        ciphertext: Vec<u8>,
        nonce: [u8; NONCE_LEN],
        tag: [u8; TAG_LEN],
    ) -> Result<Self, EnvelopeError> {
        check_ciphertext_len(ciphertext.len())?;
        Ok(Self {
            ciphertext,
            nonce,
            tag,
        })
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    pub fn tag(&self) -> &[u8; TAG_LEN] {
        &self.tag
    }

    /// The bytes covered by the integrity tag: `ciphertext ++ nonce`.
    pub fn authenticated_data(&self) -> Vec<u8> {
        authenticated_data(&self.ciphertext, &self.nonce)
    }

    /// Encode this envelope to its transportable string.
    pub fn encode(&self) -> String {
        format!(
            "{}{DELIMITER}{}{DELIMITER}{}",
            STANDARD.encode(&self.ciphertext),
            STANDARD.encode(self.nonce),
            STANDARD.encode(self.tag),
        )
    }

    /// Parse a transportable string back into an [`Envelope`].
    ///
    /// The field count is checked before any field is decoded, so a legacy
    /// two-field string is always reported as [`EnvelopeError::FieldCount`].
    ///
    /// # Errors
    ///
    /// Returns an [`EnvelopeError`] describing the first problem found.
    pub fn decode(s: &str) -> Result<Self, EnvelopeError> {
        if s.is_empty() {
            return Err(EnvelopeError::Empty);
        }

        let parts: Vec<&str> = s.split(DELIMITER).collect();
        if parts.len() != FIELD_COUNT {
            return Err(EnvelopeError::FieldCount(parts.len()));
        }

        let ciphertext = decode_field(parts[0], EnvelopeField::Ciphertext)?;
        check_ciphertext_len(ciphertext.len())?;
        let nonce = decode_fixed::<NONCE_LEN>(parts[1], EnvelopeField::Nonce)?;
        let tag = decode_fixed::<TAG_LEN>(parts[2], EnvelopeField::Tag)?;

        Ok(Self {
            ciphertext,
            nonce,
            tag,
        })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Envelope {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// Concatenate `ciphertext ++ nonce`, the input to the integrity function.
pub fn authenticated_data(ciphertext: &[u8], nonce: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(ciphertext.len() + nonce.len());
    data.extend_from_slice(ciphertext);
    data.extend_from_slice(nonce);
    data
}

fn decode_field(part: &str, field: EnvelopeField) -> Result<Vec<u8>, EnvelopeError> {
    STANDARD
        .decode(part)
        .map_err(|_| EnvelopeError::Encoding(field))
}

fn decode_fixed<const N: usize>(
    part: &str,
    field: EnvelopeField,
) -> Result<[u8; N], EnvelopeError> {
    let bytes = decode_field(part, field)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| EnvelopeError::Length {
        field,
        expected: fixed_len_label(field),
        actual: bytes.len(),
    })
}

fn fixed_len_label(field: EnvelopeField) -> &'static str {
    match field {
        EnvelopeField::Nonce => "16 bytes",
        EnvelopeField::Tag => "32 bytes",
        EnvelopeField::Ciphertext => "a non-zero multiple of 16 bytes",
    }
}

fn check_ciphertext_len(len: usize) -> Result<(), EnvelopeError> {
    if len == 0 || len % BLOCK_LEN != 0 {
        return Err(EnvelopeError::Length {
            field: EnvelopeField::Ciphertext,
            expected: fixed_len_label(EnvelopeField::Ciphertext),
            actual: len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        let ciphertext: Vec<u8> = (0u8..32).collect();
        Envelope::new(ciphertext, [0x11; NONCE_LEN], [0x22; TAG_LEN]).unwrap()
    }

    fn b64(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn encode_has_three_fields_in_order() {
        let env = sample();
        let s = env.encode();
        let parts: Vec<&str> = s.split(DELIMITER).collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], b64(env.ciphertext()));
        assert_eq!(parts[1], b64(env.nonce()));
        assert_eq!(parts[2], b64(env.tag()));
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(sample().encode(), sample().encode());
    }

    #[test]
    fn decode_inverts_encode() {
        let env = sample();
        let s = env.encode();
        let parsed = Envelope::decode(&s).unwrap();
        assert_eq!(parsed, env);
        assert_eq!(parsed.encode(), s);
    }

    #[test]
    fn display_and_from_str_match_codec() {
        let env = sample();
        let s = env.to_string();
        assert_eq!(s, env.encode());
        let parsed: Envelope = s.parse().unwrap();
        assert_eq!(parsed, env);
    }

    #[test]
    fn authenticated_data_is_ciphertext_then_nonce() {
        let env = sample();
        let data = env.authenticated_data();
        assert_eq!(&data[..32], env.ciphertext());
        assert_eq!(&data[32..], env.nonce());
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(Envelope::decode(""), Err(EnvelopeError::Empty));
    }

    #[test]
    fn rejects_wrong_field_counts() {
        let c = b64(&[0u8; 16]);
        let n = b64(&[0u8; NONCE_LEN]);
        let t = b64(&[0u8; TAG_LEN]);

        assert_eq!(Envelope::decode(&c), Err(EnvelopeError::FieldCount(1)));
        assert_eq!(
            Envelope::decode(&format!("{c};{n}")),
            Err(EnvelopeError::FieldCount(2))
        );
        assert_eq!(
            Envelope::decode(&format!("{c};{n};{t};{t}")),
            Err(EnvelopeError::FieldCount(4))
        );
        assert_eq!(Envelope::decode(";"), Err(EnvelopeError::FieldCount(2)));
    }

    #[test]
    fn rejects_non_base64_in_each_field() {
        let c = b64(&[0u8; 16]);
        let n = b64(&[0u8; NONCE_LEN]);
        let t = b64(&[0u8; TAG_LEN]);

        assert_eq!(
            Envelope::decode(&format!("!!!!;{n};{t}")),
            Err(EnvelopeError::Encoding(EnvelopeField::Ciphertext))
        );
        assert_eq!(
            Envelope::decode(&format!("{c};@@@@;{t}")),
            Err(EnvelopeError::Encoding(EnvelopeField::Nonce))
        );
        assert_eq!(
            Envelope::decode(&format!("{c};{n};****")),
            Err(EnvelopeError::Encoding(EnvelopeField::Tag))
        );
    }

    #[test]
    fn rejects_unpadded_base64() {
        let c = b64(&[0u8; 16]);
        let t = b64(&[0u8; TAG_LEN]);
        let unpadded_nonce = b64(&[0u8; NONCE_LEN]).trim_end_matches('=').to_owned();
        assert_eq!(
            Envelope::decode(&format!("{c};{unpadded_nonce};{t}")),
            Err(EnvelopeError::Encoding(EnvelopeField::Nonce))
        );
    }

    #[test]
    fn rejects_wrong_nonce_length() {
        let c = b64(&[0u8; 16]);
        let t = b64(&[0u8; TAG_LEN]);
        let short = b64(&[0u8; 12]);
        let err = Envelope::decode(&format!("{c};{short};{t}")).unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::Length {
                field: EnvelopeField::Nonce,
                actual: 12,
                ..
            }
        ));
    }

    #[test]
    fn rejects_wrong_tag_length() {
        let c = b64(&[0u8; 16]);
        let n = b64(&[0u8; NONCE_LEN]);
        let long = b64(&[0u8; 64]);
        let err = Envelope::decode(&format!("{c};{n};{long}")).unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::Length {
                field: EnvelopeField::Tag,
                actual: 64,
                ..
            }
        ));
    }

    #[test]
    fn rejects_ciphertext_not_block_aligned() {
        let n = b64(&[0u8; NONCE_LEN]);
        let t = b64(&[0u8; TAG_LEN]);
        for len in [0usize, 1, 15, 17] {
            let c = b64(&vec![0u8; len]);
            let err = Envelope::decode(&format!("{c};{n};{t}")).unwrap_err();
            assert!(
                matches!(
                    err,
                    EnvelopeError::Length {
                        field: EnvelopeField::Ciphertext,
                        ..
                    }
                ),
                "length {len} accepted"
            );
        }
    }

    #[test]
    fn new_rejects_unaligned_ciphertext() {
        assert!(Envelope::new(vec![0u8; 10], [0; NONCE_LEN], [0; TAG_LEN]).is_err());
        assert!(Envelope::new(Vec::new(), [0; NONCE_LEN], [0; TAG_LEN]).is_err());
    }

    #[test]
    fn error_messages_name_the_field() {
        let e = EnvelopeError::Encoding(EnvelopeField::Tag);
        assert!(e.to_string().contains("tag"));
        let e = EnvelopeError::FieldCount(2);
        assert!(e.to_string().contains("found 2"));
    }
}
