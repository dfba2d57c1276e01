//! Envelope wire format and error types shared across `string-cipher` crates.

pub mod envelope;
pub mod error;

pub use envelope::{Envelope, EnvelopeError};
pub use error::CipherError;
