//! Configuration provider trait

use super::file::{ConfigFile, ConfigLevel};

/// Source of a layered configuration file
///
/// Implementations:
/// - `FileConfigProvider`: YAML file (~/.config/webprobe/config.yaml or a workspace copy)
/// - `MemoryConfigProvider`: In-memory for testing
pub trait ConfigProvider: Send + Sync {
    /// Which layer this provider represents
    fn level(&self) -> ConfigLevel;

    /// Load the configuration; a missing source yields an empty `ConfigFile`
    fn load(&self) -> ConfigResult<ConfigFile>;
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            value: value.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
