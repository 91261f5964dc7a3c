//! File-based configuration provider (YAML)
//!
//! Supports user-level (~/.config/webprobe/config.yaml) and workspace-level (.config/webprobe/config.yaml) config.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::traits::{ConfigProvider, ConfigResult};

/// Configuration file structure
///
/// ```yaml
/// defaults:
///   provider: openai
///   model: gpt-4o
///   max_iterations: 30
/// mcp:
///   browsers_path: /opt/ms-playwright
///   exclude_tools: [browser_install]
/// output_dir: e2e
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    /// LLM and loop defaults
    #[serde(default)]
    pub defaults: DefaultSettings,

    /// External tool server settings
    #[serde(default)]
    pub mcp: McpSettings,

    /// Directory generated tests are written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

/// Default settings for the config
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultSettings {
    /// Default provider name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Default model name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Custom API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Conversation loop bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}

/// Settings for the MCP tool server
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct McpSettings {
    /// Run with local tools only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<bool>,
    /// Connect over streamable HTTP instead of spawning a child process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// npm package spec of the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Explicit launcher program, bypassing discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,
    /// Browser binaries cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browsers_path: Option<PathBuf>,
    /// Only expose these server tools (empty = all)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_tools: Vec<String>,
    /// Never expose these server tools
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_tools: Vec<String>,
}

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/webprobe/config.yaml)
    User,
    /// Workspace-level config (.config/webprobe/config.yaml in workspace root)
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

/// File-based configuration provider
///
/// Reads configuration from a YAML file, caching the parsed result.
///
/// # Example
///
/// ```no_run
/// use webprobe_core::config::FileConfigProvider;
///
/// // User-level config
/// let user_config = FileConfigProvider::user();
///
/// // Workspace-level config
/// let workspace_config = FileConfigProvider::workspace("/path/to/workspace");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ConfigFile>>,
}

impl FileConfigProvider {
    /// Create a new file config provider for a specific path
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// Create a user-level config provider (~/.config/webprobe/config.yaml)
    pub fn user() -> Self {
        // XDG config directory (~/.config on Linux, ~/Library/Application Support on macOS)
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        let path = config_dir.join("webprobe").join("config.yaml");
        Self::new(path, ConfigLevel::User)
    }

    /// Create a workspace-level config provider (.config/webprobe/config.yaml)
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root
            .as_ref()
            .join(".config")
            .join("webprobe")
            .join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read_file(&self) -> ConfigResult<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ConfigFile> {
        let config = self.read_file()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }
}

impl ConfigProvider for FileConfigProvider {
    fn level(&self) -> ConfigLevel {
        self.level
    }

    fn load(&self) -> ConfigResult<ConfigFile> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }
        self.reload()
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("config.yaml"), ConfigLevel::User);

        assert!(!provider.exists());
        assert_eq!(provider.load().unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_yaml_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "defaults:\n  model: gpt-4o-mini\n  max_iterations: 12\nmcp:\n  skip: true\n  exclude_tools:\n    - browser_install\noutput_dir: e2e\n",
        )
        .unwrap();

        let config = FileConfigProvider::new(&path, ConfigLevel::User).load().unwrap();
        assert_eq!(config.defaults.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.defaults.max_iterations, Some(12));
        assert_eq!(config.mcp.skip, Some(true));
        assert_eq!(config.mcp.exclude_tools, vec!["browser_install".to_string()]);
        assert_eq!(config.output_dir, Some(PathBuf::from("e2e")));
    }

    #[test]
    fn test_cache_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "defaults:\n  model: first\n").unwrap();

        let provider = FileConfigProvider::new(&path, ConfigLevel::Workspace);
        assert_eq!(provider.load().unwrap().defaults.model.as_deref(), Some("first"));

        fs::write(&path, "defaults:\n  model: second\n").unwrap();
        assert_eq!(provider.load().unwrap().defaults.model.as_deref(), Some("first"));
        assert_eq!(provider.reload().unwrap().defaults.model.as_deref(), Some("second"));
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "defaults: [unclosed").unwrap();

        let err = FileConfigProvider::new(&path, ConfigLevel::User).load().unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_workspace_path() {
        let provider = FileConfigProvider::workspace("/tmp/project");
        assert!(provider.path().ends_with(".config/webprobe/config.yaml"));
        assert_eq!(provider.level(), ConfigLevel::Workspace);
    }
}
