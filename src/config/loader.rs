//! Configuration loading with environment-specific overrides.

use super::error::ConfigResult;
use super::PartitionConfig;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const BASE_FILE: &str = "partition.toml";
const ENV_PREFIX: &str = "PARTITION";
const ENV_SEPARATOR: &str = "__";

/// Loaded configuration together with where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: PartitionConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Useful for testing without touching `PARTITION_ENV`.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            environment = %environment,
            directory = %config_directory.display(),
            "Loading configuration"
        );

        let config = Self::load_layers(&config_directory, environment)?;
        config.validate()?;

        info!(
            environment = %environment,
            page_size = config.export.page_size,
            max_connections = config.database.max_connections,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    fn load_layers(config_directory: &Path, environment: &str) -> ConfigResult<PartitionConfig> {
        let layered = Config::builder()
            .add_source(Config::try_from(&PartitionConfig::default())?)
            .add_source(File::from(config_directory.join(BASE_FILE)).required(false))
            .add_source(
                File::from(config_directory.join(format!("partition.{environment}.toml")))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        Ok(layered.try_deserialize()?)
    }

    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// `PARTITION_ENV`, then `APP_ENV`, then `development`
    pub fn detect_environment() -> String {
        crate::logging::get_environment()
    }

    fn default_config_directory() -> PathBuf {
        PathBuf::from("config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigurationError, LogFormat};
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_config_dir() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().to_path_buf();

        fs::write(
            config_dir.join("partition.toml"),
            r#"
[database]
url = "postgresql://localhost/partition_base"
max_connections = 5

[export]
page_size = 250
"#,
        )
        .unwrap();

        fs::write(
            config_dir.join("partition.production.toml"),
            r#"
[database]
url = "postgresql://db.internal/partition"

[logging]
level = "warn"
format = "json"
"#,
        )
        .unwrap();

        (temp_dir, config_dir)
    }

    #[test]
    fn test_missing_directory_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let manager =
            ConfigManager::load_from_directory_with_env(Some(temp_dir.path().to_path_buf()), "test")
                .unwrap();

        assert_eq!(manager.environment(), "test");
        assert_eq!(manager.config().database.max_connections, 10);
        assert_eq!(manager.config().logging, Default::default());
    }

    #[test]
    fn test_base_file_overrides_defaults() {
        let (_temp_dir, config_dir) = setup_test_config_dir();
        let manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir), "development").unwrap();
        let config = manager.config();

        assert_eq!(config.database.url, "postgresql://localhost/partition_base");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.export.page_size, 250);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_environment_specific_overrides() {
        let (_temp_dir, config_dir) = setup_test_config_dir();
        let manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir.clone()), "production")
                .unwrap();
        let config = manager.config();

        assert_eq!(config.database.url, "postgresql://db.internal/partition");
        // Untouched keys fall through to the base file
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level.as_deref(), Some("warn"));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(manager.config_directory(), config_dir.as_path());
    }

    #[test]
    fn test_environment_variables_override_files() {
        let (_temp_dir, config_dir) = setup_test_config_dir();

        env::set_var("PARTITION__DATABASE__ACQUIRE_TIMEOUT_SECONDS", "45");
        let result = ConfigManager::load_from_directory_with_env(Some(config_dir), "development");
        env::remove_var("PARTITION__DATABASE__ACQUIRE_TIMEOUT_SECONDS");

        assert_eq!(result.unwrap().config().database.acquire_timeout_seconds, 45);
    }

    #[test]
    fn test_invalid_file_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("partition.toml"),
            "[export]\npage_size = 0\n",
        )
        .unwrap();

        let result =
            ConfigManager::load_from_directory_with_env(
                Some(temp_dir.path().to_path_buf()),
                "test",
            );
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_a_load_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("partition.toml"), "[export\npage_size = ").unwrap();

        let result =
            ConfigManager::load_from_directory_with_env(
                Some(temp_dir.path().to_path_buf()),
                "test",
            );
        assert!(matches!(result, Err(ConfigurationError::Load(_))));
    }
}
