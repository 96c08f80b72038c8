//! # Partition Configuration
//!
//! Layered configuration for the job transfer tooling, loaded with the
//! `config` crate.
//!
//! ## Sources
//!
//! Later sources override earlier ones:
//!
//! 1. Built-in defaults ([`PartitionConfig::default`])
//! 2. `config/partition.toml` (optional)
//! 3. `config/partition.<environment>.toml` (optional)
//! 4. `PARTITION__`-prefixed environment variables, `__` between sections,
//!    e.g. `PARTITION__EXPORT__PAGE_SIZE=500`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use partition_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let page_size = manager.config().export.page_size;
//! # let _ = page_size;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Largest page a single keyset fetch may request
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PartitionConfig {
    pub database: DatabaseConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// PostgreSQL connection pool settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/partition_development".to_string(),
            max_connections: 10,
            acquire_timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

/// Keyset export settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Maximum rows per keyset fetch
    pub page_size: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { page_size: 100 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset; derived from the
    /// environment when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    pub format: LogFormat,
}

impl PartitionConfig {
    /// Validate configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "database.url",
                "database configuration",
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.max_connections",
                "0",
                "pool size must be greater than 0",
            ));
        }

        if self.export.page_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "export.page_size",
                "0",
                "page size must be greater than 0",
            ));
        }

        if self.export.page_size > MAX_PAGE_SIZE {
            return Err(ConfigurationError::invalid_value(
                "export.page_size",
                self.export.page_size.to_string(),
                format!("page size must not exceed {MAX_PAGE_SIZE}"),
            ));
        }

        Ok(())
    }
}
