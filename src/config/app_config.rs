use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Persistent backend kind: "file" or "memory"
    pub backend: String,
    /// Snapshot file for the persistent store; defaults to the platform
    /// data directory
    pub data_file: Option<PathBuf>,
    /// Prefix for the persistent namespace
    pub persistent_prefix: String,
    /// Prefix for the session-scoped namespace
    pub session_prefix: String,
    /// Base64-encode stored envelopes
    pub encode: bool,
    /// Seconds between expiry sweeps
    pub expiry_sweep_secs: u64,
    /// Seconds between size-guard checks
    pub size_check_secs: u64,
    /// Hard limit on the combined approximate size of both stores
    pub max_total_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "file".to_string(),
            data_file: None,
            persistent_prefix: "asante_".to_string(),
            session_prefix: "asante_session_".to_string(),
            encode: false,
            expiry_sweep_secs: 30 * 60,
            size_check_secs: 5 * 60,
            max_total_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl StorageConfig {
    /// Resolves the snapshot file path, falling back to the platform data
    /// directory
    pub fn resolve_data_file(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("asante")
                .join("storage.json")
        })
    }

    pub fn expiry_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_sweep_secs)
    }

    pub fn size_check_interval(&self) -> Duration {
        Duration::from_secs(self.size_check_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("ASANTE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.storage.backend, "file");
        assert_eq!(config.storage.persistent_prefix, "asante_");
        assert_eq!(config.storage.session_prefix, "asante_session_");
        assert_eq!(config.storage.expiry_sweep_secs, 1800);
        assert_eq!(config.storage.size_check_secs, 300);
        assert_eq!(config.storage.max_total_bytes, 5 * 1024 * 1024);
        assert!(!config.storage.encode);
    }

    #[test]
    fn test_resolve_data_file_honors_override() {
        let config = StorageConfig {
            data_file: Some(PathBuf::from("/tmp/custom.json")),
            ..Default::default()
        };

        assert_eq!(config.resolve_data_file(), PathBuf::from("/tmp/custom.json"));
    }

    #[test]
    fn test_intervals() {
        let config = StorageConfig::default();

        assert_eq!(config.expiry_sweep_interval(), Duration::from_secs(1800));
        assert_eq!(config.size_check_interval(), Duration::from_secs(300));
    }
}
