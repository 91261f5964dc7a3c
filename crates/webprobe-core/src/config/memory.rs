//! In-memory configuration provider

use parking_lot::RwLock;

use super::file::{ConfigFile, ConfigLevel};
use super::traits::{ConfigProvider, ConfigResult};

/// In-memory configuration provider for testing
#[derive(Debug)]
pub struct MemoryConfigProvider {
    level: ConfigLevel,
    config: RwLock<ConfigFile>,
}

impl MemoryConfigProvider {
    /// Create an empty provider at the given level
    pub fn new(level: ConfigLevel) -> Self {
        Self::with_config(level, ConfigFile::default())
    }

    /// Create a provider holding an initial configuration
    pub fn with_config(level: ConfigLevel, config: ConfigFile) -> Self {
        Self {
            level,
            config: RwLock::new(config),
        }
    }

    /// Replace the configuration
    pub fn set(&self, config: ConfigFile) {
        *self.config.write() = config;
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn level(&self) -> ConfigLevel {
        self.level
    }

    fn load(&self) -> ConfigResult<ConfigFile> {
        Ok(self.config.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_provider_set() {
        let provider = MemoryConfigProvider::new(ConfigLevel::Workspace);
        assert!(provider.load().unwrap().defaults.model.is_none());

        let mut config = ConfigFile::default();
        config.defaults.model = Some("gpt-4o-mini".to_string());
        provider.set(config);

        assert_eq!(
            provider.load().unwrap().defaults.model.as_deref(),
            Some("gpt-4o-mini")
        );
        assert_eq!(provider.level(), ConfigLevel::Workspace);
    }
}
