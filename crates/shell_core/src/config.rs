//! Application configuration

use crate::CoreError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub shell: ShellSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    /// Custom browser command, `{0}` or `%1` is replaced by the URL.
    /// Empty uses the system default.
    pub url_handler: String,
    pub use_recycle_bin: bool,
    /// Suppress native progress and confirmation dialogs
    pub silent_operations: bool,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            url_handler: String::new(),
            use_recycle_bin: true,
            silent_operations: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json_console: bool,
    pub keep_log_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_console: false,
            keep_log_files: 10,
        }
    }
}

impl LoggingConfig {
    pub fn log_options(&self) -> shell_log::LogOptions {
        shell_log::LogOptions {
            level: self.level.clone(),
            json_console: self.json_console,
            directory: None,
        }
    }
}

impl ShellConfig {
    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::load_from(&Self::config_path())?)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        Ok(self.save_to(&Self::config_path())?)
    }

    /// Load from `path`, defaults when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "ShellBridge", "ShellBridge")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ShellConfig::load_from(&tmp.path().join("none.toml")).unwrap();
        assert_eq!(config, ShellConfig::default());
        assert!(config.shell.use_recycle_bin);
        assert!(config.shell.url_handler.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let mut config = ShellConfig::default();
        config.shell.url_handler = "mybrowser '{0}'".to_string();
        config.logging.keep_log_files = 3;
        config.save_to(&path).unwrap();

        assert_eq!(ShellConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[shell]\nsilent_operations = true\n").unwrap();

        let config = ShellConfig::load_from(&path).unwrap();
        assert!(config.shell.silent_operations);
        assert!(config.shell.use_recycle_bin);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[shell\nurl_handler = ").unwrap();

        let err = ShellConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse(_)));
        assert!(err.is_recoverable());
    }
}
