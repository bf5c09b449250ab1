//! Configuration management for corpusmill
//!
//! Settings are loaded from environment variables with sensible defaults.
//! Configuration covers the batch execution model (worker count, per-file
//! timeout, read bounds) and classifier extensions.
//!
//! # Environment Variables
//!
//! - `CORPUSMILL_CONCURRENCY`: Worker pool size - default: 2x available threads
//! - `CORPUSMILL_FILE_TIMEOUT`: Per-file I/O timeout in seconds - default: "30"
//! - `CORPUSMILL_MAX_READ_BYTES`: Max bytes read per file - default: "512000" (500KB)
//! - `CORPUSMILL_LOG_LEVEL`: Logging level - default: "info"
//! - `CORPUSMILL_LANG_EXTENSIONS`: Extra extension mappings, e.g. "inc=php,cgi=perl"
//!
//! # Example
//!
//! ```no_run
//! use corpusmill::CorpusmillConfig;
//!
//! let config = CorpusmillConfig::default();
//! config.validate().expect("Invalid configuration");
//! ```

use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default values for configuration
const DEFAULT_FILE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_READ_BYTES: usize = 512_000; // 500KB
const DEFAULT_LOG_LEVEL: &str = "info";
const FALLBACK_CONCURRENCY: usize = 8;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Main configuration structure for corpusmill
///
/// Constructed via `Default::default()`, which loads from environment
/// variables with fallback defaults. CLI flags override individual fields
/// after construction.
#[derive(Debug, Clone)]
pub struct CorpusmillConfig {
    /// Maximum number of concurrently in-flight files
    pub concurrency_limit: usize,

    /// Per-file I/O timeout in seconds
    pub per_file_timeout_secs: u64,

    /// Maximum bytes read from a single file
    pub max_read_bytes: usize,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Extra extension -> language mappings, merged over the defaults
    pub language_overrides: Vec<(String, String)>,
}

impl Default for CorpusmillConfig {
    fn default() -> Self {
        let concurrency_limit = env::var("CORPUSMILL_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or_else(default_concurrency);

        let per_file_timeout_secs = env::var("CORPUSMILL_FILE_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_FILE_TIMEOUT_SECS);

        let max_read_bytes = env::var("CORPUSMILL_MAX_READ_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_READ_BYTES);

        let log_level = env::var("CORPUSMILL_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let language_overrides = env::var("CORPUSMILL_LANG_EXTENSIONS")
            .ok()
            .map(|v| parse_extension_overrides(&v))
            .unwrap_or_default();

        Self {
            concurrency_limit,
            per_file_timeout_secs,
            max_read_bytes,
            log_level,
            language_overrides,
        }
    }
}

/// A small multiple of the available hardware threads.
fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(FALLBACK_CONCURRENCY)
}

/// Parses "ext=lang,ext=lang" pairs; malformed segments are skipped.
fn parse_extension_overrides(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (ext, lang) = pair.split_once('=')?;
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            let lang = lang.trim().to_lowercase();
            if ext.is_empty() || lang.is_empty() {
                None
            } else {
                Some((ext, lang))
            }
        })
        .collect()
}

impl CorpusmillConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency_limit == 0 {
            return Err(ConfigError::ValidationFailed(
                "Concurrency limit must be at least 1".to_string(),
            ));
        }
        if self.per_file_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Per-file timeout must be at least 1 second".to_string(),
            ));
        }
        if self.per_file_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Per-file timeout cannot exceed 10 minutes".to_string(),
            ));
        }
        if self.max_read_bytes < 1024 {
            return Err(ConfigError::ValidationFailed(
                "Max read size must be at least 1KB".to_string(),
            ));
        }
        if self.max_read_bytes > 104_857_600 {
            return Err(ConfigError::ValidationFailed(
                "Max read size cannot exceed 100MB".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Per-file timeout as a `Duration`
    pub fn per_file_timeout(&self) -> Duration {
        Duration::from_secs(self.per_file_timeout_secs)
    }
}

impl fmt::Display for CorpusmillConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Corpusmill Configuration:")?;
        writeln!(f, "  Concurrency Limit: {}", self.concurrency_limit)?;
        writeln!(f, "  Per-File Timeout: {}s", self.per_file_timeout_secs)?;
        writeln!(f, "  Max Read Size: {} bytes", self.max_read_bytes)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        if !self.language_overrides.is_empty() {
            let pairs: Vec<String> = self
                .language_overrides
                .iter()
                .map(|(e, l)| format!("{}={}", e, l))
                .collect();
            writeln!(f, "  Language Overrides: {}", pairs.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn clear(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::clear("CORPUSMILL_CONCURRENCY"),
            EnvGuard::clear("CORPUSMILL_FILE_TIMEOUT"),
            EnvGuard::clear("CORPUSMILL_MAX_READ_BYTES"),
            EnvGuard::clear("CORPUSMILL_LOG_LEVEL"),
            EnvGuard::clear("CORPUSMILL_LANG_EXTENSIONS"),
        ];

        let config = CorpusmillConfig::default();

        assert!(config.concurrency_limit >= 1);
        assert_eq!(config.per_file_timeout_secs, DEFAULT_FILE_TIMEOUT_SECS);
        assert_eq!(config.max_read_bytes, DEFAULT_MAX_READ_BYTES);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(config.language_overrides.is_empty());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("CORPUSMILL_CONCURRENCY", "4"),
            EnvGuard::set("CORPUSMILL_FILE_TIMEOUT", "60"),
            EnvGuard::set("CORPUSMILL_MAX_READ_BYTES", "1024000"),
            EnvGuard::set("CORPUSMILL_LOG_LEVEL", "debug"),
            EnvGuard::set("CORPUSMILL_LANG_EXTENSIONS", "inc=php, cgi=perl"),
        ];

        let config = CorpusmillConfig::default();

        assert_eq!(config.concurrency_limit, 4);
        assert_eq!(config.per_file_timeout_secs, 60);
        assert_eq!(config.max_read_bytes, 1_024_000);
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.language_overrides,
            vec![
                ("inc".to_string(), "php".to_string()),
                ("cgi".to_string(), "perl".to_string())
            ]
        );
    }

    #[test]
    fn test_validation_valid() {
        let config = CorpusmillConfig {
            concurrency_limit: 4,
            per_file_timeout_secs: 30,
            max_read_bytes: 512_000,
            log_level: "info".to_string(),
            language_overrides: Vec::new(),
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_concurrency() {
        let config = CorpusmillConfig {
            concurrency_limit: 0,
            per_file_timeout_secs: 30,
            max_read_bytes: 512_000,
            log_level: "info".to_string(),
            language_overrides: Vec::new(),
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_timeout() {
        let config = CorpusmillConfig {
            concurrency_limit: 4,
            per_file_timeout_secs: 0,
            max_read_bytes: 512_000,
            log_level: "info".to_string(),
            language_overrides: Vec::new(),
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let config = CorpusmillConfig {
            concurrency_limit: 4,
            per_file_timeout_secs: 30,
            max_read_bytes: 512_000,
            log_level: "loud".to_string(),
            language_overrides: Vec::new(),
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_extension_overrides_skips_malformed() {
        let parsed = parse_extension_overrides("inc=php,broken,=x,cgi=perl");
        assert_eq!(
            parsed,
            vec![
                ("inc".to_string(), "php".to_string()),
                ("cgi".to_string(), "perl".to_string())
            ]
        );
    }

    #[test]
    fn test_config_display() {
        let config = CorpusmillConfig {
            concurrency_limit: 4,
            per_file_timeout_secs: 30,
            max_read_bytes: 512_000,
            log_level: "info".to_string(),
            language_overrides: vec![("inc".to_string(), "php".to_string())],
        };
        let display = format!("{}", config);
        assert!(display.contains("Corpusmill Configuration:"));
        assert!(display.contains("inc=php"));
    }
}
