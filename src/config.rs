//! Tunables for the messaging services.
//!
//! Every field has a default, so an empty TOML document yields
//! [`MessagingConfig::default`]. Unknown keys are rejected.
//!
//! ```toml
//! default_page_limit = 20
//! max_page_limit = 100
//! count_scan_cap = 10000
//! store_timeout_ms = 2000
//! idempotent_retries = 2
//! retry_backoff_ms = 25
//! max_content_bytes = 65536
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::messaging::domain::{PageRequest, PaginationError};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Read(#[from] std::io::Error),

    /// The document is not valid TOML or has unexpected keys.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside its permitted range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Service-level settings shared by all messaging components.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessagingConfig {
    /// Page size used when a caller does not supply one.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,

    /// Largest page size a caller may request.
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u32,

    /// Rows a count scan reads before giving up and reporting an inexact
    /// total.
    #[serde(default = "default_count_scan_cap")]
    pub count_scan_cap: u64,

    /// Deadline applied to every store call, in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Extra attempts for idempotent store calls that fail transiently.
    #[serde(default = "default_idempotent_retries")]
    pub idempotent_retries: u32,

    /// Pause between retry attempts, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Largest accepted message body, in bytes.
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,
}

const fn default_page_limit() -> u32 {
    20
}

const fn default_max_page_limit() -> u32 {
    100
}

const fn default_count_scan_cap() -> u64 {
    10_000
}

const fn default_store_timeout_ms() -> u64 {
    2_000
}

const fn default_idempotent_retries() -> u32 {
    2
}

const fn default_retry_backoff_ms() -> u64 {
    25
}

const fn default_max_content_bytes() -> usize {
    64 * 1024
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
            count_scan_cap: default_count_scan_cap(),
            store_timeout_ms: default_store_timeout_ms(),
            idempotent_retries: default_idempotent_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_content_bytes: default_max_content_bytes(),
        }
    }
}

impl MessagingConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] when a value fails validation.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, otherwise
    /// the errors of [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Checks value ranges and cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_limit == 0 {
            return Err(ConfigError::Invalid("max_page_limit must be at least 1".into()));
        }
        if self.default_page_limit == 0 || self.default_page_limit > self.max_page_limit {
            return Err(ConfigError::Invalid(format!(
                "default_page_limit must be between 1 and max_page_limit ({})",
                self.max_page_limit
            )));
        }
        if self.count_scan_cap == 0 {
            return Err(ConfigError::Invalid("count_scan_cap must be at least 1".into()));
        }
        if self.store_timeout_ms == 0 {
            return Err(ConfigError::Invalid("store_timeout_ms must be at least 1".into()));
        }
        if self.max_content_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_content_bytes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Deadline for a single store call.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Pause between retry attempts.
    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Builds a page request from optional raw query values, applying the
    /// default page (1) and the configured default limit.
    ///
    /// # Errors
    ///
    /// Returns the [`PaginationError`] of [`PageRequest::new`], or
    /// [`PaginationError::LimitTooLarge`] when the limit exceeds
    /// `max_page_limit`.
    pub fn page_request(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<PageRequest, PaginationError> {
        let request = PageRequest::new(
            page.unwrap_or(1),
            limit.unwrap_or_else(|| i64::from(self.default_page_limit)),
        )?;
        self.check_limit(&request)?;
        Ok(request)
    }

    /// Rejects requests whose limit exceeds `max_page_limit`.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::LimitTooLarge`].
    pub const fn check_limit(&self, request: &PageRequest) -> Result<(), PaginationError> {
        if request.limit() > self.max_page_limit {
            return Err(PaginationError::LimitTooLarge {
                requested: request.limit(),
                max: self.max_page_limit,
            });
        }
        Ok(())
    }
}
