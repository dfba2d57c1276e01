//! Tracing subscriber setup for processes that host the string cipher.
//!
//! The library itself only emits `tracing` events. No plaintext, ciphertext or
//! key material ever appears in an event field.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise a global JSON tracing subscriber at the given log level.
///
/// `RUST_LOG`, when set, takes precedence over `log_level`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}
