//! Configuration settings for signed-params.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::SigningError;
use crate::signature::{DigestAlgorithm, SecretKey, DEFAULT_CURRENCY, DEFAULT_MAX_AGE_SECONDS};

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub signing: SigningConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Signing configuration.
#[derive(Clone, Deserialize)]
pub struct SigningConfig {
    /// Inline private key.
    #[serde(default)]
    pub private_key: Option<String>,
    /// Path to a file holding the private key.
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,
    /// Digest algorithm ("sha1" or "sha256").
    #[serde(default)]
    pub algorithm: DigestAlgorithm,
    /// Accepted distance between a token's timestamp and now, in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
    /// Currency used by the legacy transaction helper.
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_max_age() -> u64 {
    DEFAULT_MAX_AGE_SECONDS
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            private_key_path: None,
            algorithm: DigestAlgorithm::default(),
            max_age_seconds: default_max_age(),
            default_currency: default_currency(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("private_key_path", &self.private_key_path)
            .field("algorithm", &self.algorithm)
            .field("max_age_seconds", &self.max_age_seconds)
            .field("default_currency", &self.default_currency)
            .finish()
    }
}

impl SigningConfig {
    /// Resolve the configured secret.
    ///
    /// Reads `private_key_path` when set. With neither source configured the
    /// result is an unset key, which makes every signing call fail.
    pub fn secret(&self) -> Result<SecretKey, SigningError> {
        match (&self.private_key, &self.private_key_path) {
            (Some(key), _) => Ok(SecretKey::from(key.as_str())),
            (None, Some(path)) => SecretKey::load(path),
            (None, None) => Ok(SecretKey::unset()),
        }
    }

    fn validate(&self) -> Result<(), SigningError> {
        if self.private_key.is_some() && self.private_key_path.is_some() {
            return Err(SigningError::config(
                "Set either signing.private_key or signing.private_key_path, not both",
            ));
        }

        if self.max_age_seconds == 0 {
            return Err(SigningError::config(
                "signing.max_age_seconds must be greater than zero",
            ));
        }

        let currency = &self.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SigningError::config(format!(
                "Invalid default currency '{}'. Expected a three-letter code (e.g., 'USD')",
                currency
            )));
        }

        Ok(())
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SigningError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SigningError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            SigningError::Config { message } => SigningError::config(format!(
                "Invalid config file '{}': {}",
                path.display(),
                message
            )),
            other => other,
        })
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SigningError> {
        let settings: Settings = toml::from_str(content).map_err(|e| SigningError::Config {
            message: e.to_string(),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), SigningError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(SigningError::config(format!(
                "Invalid log level '{}'. Valid levels: {:?}",
                self.logging.level, valid_levels
            )));
        }

        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(SigningError::config(format!(
                "Invalid log format '{}'. Valid formats: {:?}",
                self.logging.format, valid_formats
            )));
        }

        self.signing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("[signing]\nprivate_key = \"abc\"\n").unwrap();
        assert_eq!(settings.signing.algorithm, DigestAlgorithm::Sha1);
        assert_eq!(settings.signing.max_age_seconds, 3600);
        assert_eq!(settings.signing.default_currency, "USD");
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, "pretty");
    }

    #[test]
    fn test_full_config() {
        let settings = Settings::from_toml(
            r#"
            [signing]
            private_key = "abc"
            algorithm = "sha256"
            max_age_seconds = 600
            default_currency = "EUR"

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(settings.signing.algorithm, DigestAlgorithm::Sha256);
        assert_eq!(settings.signing.max_age_seconds, 600);
        assert_eq!(settings.logging.format, "json");
    }

    #[test]
    fn test_rejects_unknown_algorithm() {
        let err = Settings::from_toml("[signing]\nalgorithm = \"md5\"\n").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_rejects_bad_values() {
        for toml in [
            "[signing]\nmax_age_seconds = 0\n",
            "[signing]\ndefault_currency = \"dollars\"\n",
            "[signing]\nprivate_key = \"a\"\nprivate_key_path = \"/tmp/key\"\n",
            "[signing]\n[logging]\nlevel = \"loud\"\n",
            "[signing]\n[logging]\nformat = \"xml\"\n",
        ] {
            assert!(Settings::from_toml(toml).is_err(), "accepted: {}", toml);
        }
    }

    #[test]
    fn test_missing_key_is_unset() {
        let settings = Settings::from_toml("[signing]\n").unwrap();
        assert!(settings.signing.secret().unwrap().is_empty());
    }

    #[test]
    fn test_debug_redacts_inline_key() {
        let settings = Settings::from_toml("[signing]\nprivate_key = \"hunter2\"\n").unwrap();
        let shown = format!("{:?}", settings);
        assert!(!shown.contains("hunter2"));
    }
}
