//! Configuration for a [`crate::SecureStringCipher`].
//!
//! Values come from an optional TOML file layered over built-in defaults.
//! Nothing is read from the environment.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated string cipher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CipherConfig {
    /// Key provider alias of the block-cipher key.
    #[serde(default = "default_encryption_key_alias")]
    pub encryption_key_alias: String,

    /// Key provider alias of the HMAC key. Must differ from the encryption alias.
    #[serde(default = "default_integrity_key_alias")]
    pub integrity_key_alias: String,

    /// Tracing log level for hosts that call [`crate::telemetry::init`].
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_encryption_key_alias() -> String {
    "secure-string.encryption".into()
}
fn default_integrity_key_alias() -> String {
    "secure-string.integrity".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            encryption_key_alias: default_encryption_key_alias(),
            integrity_key_alias: default_integrity_key_alias(),
            log_level: default_log_level(),
        }
    }
}

impl CipherConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// Keys missing from the file take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if validation fails.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let cfg = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        let c: CipherConfig = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    pub fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.encryption_key_alias, "encryption_key_alias")?;
        ensure_non_empty(&self.integrity_key_alias, "integrity_key_alias")?;
        ensure_non_empty(&self.log_level, "log_level")?;

        if self.encryption_key_alias == self.integrity_key_alias {
            anyhow::bail!("encryption_key_alias and integrity_key_alias must differ");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
