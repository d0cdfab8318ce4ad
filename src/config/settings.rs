//! Configuration settings for Lumo nonces.

use serde::Deserialize;
use std::path::Path;

use crate::auth::{HashAlgorithm, NonceConfig, DEFAULT_LIFETIME_SECONDS};
use crate::error::NonceError;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub nonce: NonceSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Nonce configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NonceSettings {
    /// Nonce lifetime in seconds; a nonce is accepted for between half of
    /// this and all of it.
    #[serde(default = "default_lifetime")]
    pub lifetime_seconds: u64,
    /// HMAC hash algorithm (md5, sha1, sha256, sha512).
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
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

// Default value functions
fn default_lifetime() -> u64 {
    DEFAULT_LIFETIME_SECONDS
}

fn default_algorithm() -> String {
    HashAlgorithm::default().name().to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for NonceSettings {
    fn default() -> Self {
        Self {
            lifetime_seconds: default_lifetime(),
            algorithm: default_algorithm(),
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

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NonceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| NonceError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        let settings = Self::parse(&content).map_err(|e| match e {
            NonceError::Config { message } => NonceError::Config {
                message: format!("Failed to parse config file '{}': {}", path.display(), message),
            },
            other => other,
        })?;

        Ok(settings)
    }

    /// Parse and validate settings from TOML text.
    pub fn parse(content: &str) -> Result<Self, NonceError> {
        let settings: Settings = toml::from_str(content).map_err(|e| NonceError::Config {
            message: e.to_string(),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Build the immutable nonce configuration.
    pub fn nonce_config(&self) -> Result<NonceConfig, NonceError> {
        let algorithm = self.nonce.algorithm.parse::<HashAlgorithm>()?;
        NonceConfig::new(self.nonce.lifetime_seconds, algorithm)
    }

    /// Validate the settings.
    fn validate(&self) -> Result<(), NonceError> {
        // Rejects a zero lifetime and unknown algorithms
        self.nonce_config()?;

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(NonceError::Config {
                message: format!(
                    "Invalid log level '{}'. Valid levels: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        // Validate log format
        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(NonceError::Config {
                message: format!(
                    "Invalid log format '{}'. Valid formats: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_lifetime(), 86_400);
        assert_eq!(default_algorithm(), "sha256");
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_log_format(), "pretty");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings = Settings::parse("").unwrap();
        let config = settings.nonce_config().unwrap();
        assert_eq!(config.lifetime_seconds(), 86_400);
        assert_eq!(config.algorithm(), HashAlgorithm::Sha256);
    }

    #[test]
    fn test_full_document() {
        let settings = Settings::parse(
            r#"
            [nonce]
            lifetime_seconds = 3600
            algorithm = "md5"

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();
        let config = settings.nonce_config().unwrap();
        assert_eq!(config.lifetime_seconds(), 3600);
        assert_eq!(config.algorithm(), HashAlgorithm::Md5);
        assert_eq!(settings.logging.format, "json");
    }

    #[test]
    fn test_zero_lifetime_rejected() {
        let result = Settings::parse("[nonce]\nlifetime_seconds = 0\n");
        assert!(matches!(result, Err(NonceError::Config { .. })));
    }

    #[test]
    fn test_negative_lifetime_rejected() {
        let result = Settings::parse("[nonce]\nlifetime_seconds = -5\n");
        assert!(matches!(result, Err(NonceError::Config { .. })));
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let result = Settings::parse("[nonce]\nalgorithm = \"crc32\"\n");
        assert!(matches!(
            result,
            Err(NonceError::UnsupportedAlgorithm { .. })
        ));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let result = Settings::parse("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result, Err(NonceError::Config { .. })));
    }
}
