//! Resolved agent settings
//!
//! Layers, lowest to highest precedence: built-in defaults, user YAML,
//! workspace YAML, environment.

use std::path::{Path, PathBuf};

use crate::secrets::{EnvSecretStore, SecretStore};

use super::file::{ConfigFile, FileConfigProvider};
use super::traits::{ConfigError, ConfigProvider, ConfigResult};

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_ITERATIONS: usize = 50;
pub const DEFAULT_MCP_PACKAGE: &str = "@playwright/mcp@latest";
pub const DEFAULT_OUTPUT_DIR: &str = "generated-tests";

pub const ENV_PROVIDER: &str = "WEBPROBE_PROVIDER";
pub const ENV_MODEL: &str = "WEBPROBE_MODEL";
pub const ENV_API_BASE: &str = "WEBPROBE_API_BASE";
pub const ENV_MAX_ITERATIONS: &str = "WEBPROBE_MAX_ITERATIONS";
pub const ENV_SKIP_MCP: &str = "WEBPROBE_SKIP_MCP";
pub const ENV_MCP_URL: &str = "WEBPROBE_MCP_URL";
pub const ENV_MCP_PACKAGE: &str = "WEBPROBE_MCP_PACKAGE";
pub const ENV_MCP_PROGRAM: &str = "WEBPROBE_MCP_PROGRAM";
pub const ENV_BROWSERS_PATH: &str = "PLAYWRIGHT_BROWSERS_PATH";
pub const ENV_OUTPUT_DIR: &str = "WEBPROBE_OUTPUT_DIR";

/// Everything a run needs to know, after layering
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub provider: String,
    pub model: String,
    pub api_base: Option<String>,
    /// LLM credential; a run without one fails before the first LLM call
    pub api_key: Option<String>,
    pub max_iterations: usize,
    pub skip_mcp: bool,
    pub mcp_url: Option<String>,
    pub mcp_package: String,
    pub mcp_program: Option<PathBuf>,
    pub browsers_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub include_tools: Vec<String>,
    pub exclude_tools: Vec<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_base: None,
            api_key: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            skip_mcp: false,
            mcp_url: None,
            mcp_package: DEFAULT_MCP_PACKAGE.to_string(),
            mcp_program: None,
            browsers_path: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            include_tools: Vec::new(),
            exclude_tools: Vec::new(),
        }
    }
}

impl AgentSettings {
    /// Resolve settings from config layers and an environment store
    ///
    /// `layers` are applied in order, so later entries win. The credential is
    /// looked up in `env` under the provider name (`openai` -> `OPENAI_API_KEY`
    /// for the process environment).
    pub fn resolve(env: &dyn SecretStore, layers: &[&dyn ConfigProvider]) -> ConfigResult<Self> {
        let mut settings = Self::default();
        for layer in layers {
            settings.apply_file(layer.load()?);
        }
        settings.apply_env(env)?;
        settings.api_key = env.get(&settings.provider);
        Ok(settings)
    }

    /// Resolve from the process environment plus the user and (optional)
    /// workspace YAML files
    pub fn from_environment(workspace: Option<&Path>) -> ConfigResult<Self> {
        let user = FileConfigProvider::user();
        let env = EnvSecretStore::new();
        match workspace {
            Some(root) => {
                let ws = FileConfigProvider::workspace(root);
                Self::resolve(&env, &[&user, &ws])
            }
            None => Self::resolve(&env, &[&user]),
        }
    }

    /// Arguments passed to the launcher to start the tool server
    pub fn mcp_args(&self) -> Vec<String> {
        vec![self.mcp_package.clone(), "--headless".to_string()]
    }

    fn apply_file(&mut self, file: ConfigFile) {
        let ConfigFile {
            defaults,
            mcp,
            output_dir,
        } = file;

        if let Some(provider) = defaults.provider {
            self.provider = provider;
        }
        if let Some(model) = defaults.model {
            self.model = model;
        }
        if defaults.api_base.is_some() {
            self.api_base = defaults.api_base;
        }
        if let Some(max) = defaults.max_iterations {
            self.max_iterations = max;
        }
        if let Some(skip) = mcp.skip {
            self.skip_mcp = skip;
        }
        if mcp.url.is_some() {
            self.mcp_url = mcp.url;
        }
        if let Some(package) = mcp.package {
            self.mcp_package = package;
        }
        if mcp.program.is_some() {
            self.mcp_program = mcp.program;
        }
        if mcp.browsers_path.is_some() {
            self.browsers_path = mcp.browsers_path;
        }
        if !mcp.include_tools.is_empty() {
            self.include_tools = mcp.include_tools;
        }
        if !mcp.exclude_tools.is_empty() {
            self.exclude_tools = mcp.exclude_tools;
        }
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
    }

    fn apply_env(&mut self, env: &dyn SecretStore) -> ConfigResult<()> {
        if let Some(provider) = env.get(ENV_PROVIDER) {
            self.provider = provider;
        }
        if let Some(model) = env.get(ENV_MODEL) {
            self.model = model;
        }
        if let Some(base) = env.get(ENV_API_BASE) {
            self.api_base = Some(base);
        }
        if let Some(raw) = env.get(ENV_MAX_ITERATIONS) {
            self.max_iterations = parse_iterations(&raw)?;
        }
        if let Some(raw) = env.get(ENV_SKIP_MCP) {
            self.skip_mcp = parse_flag(ENV_SKIP_MCP, &raw)?;
        }
        if let Some(url) = env.get(ENV_MCP_URL) {
            self.mcp_url = Some(url);
        }
        if let Some(package) = env.get(ENV_MCP_PACKAGE) {
            self.mcp_package = package;
        }
        if let Some(program) = env.get(ENV_MCP_PROGRAM) {
            self.mcp_program = Some(PathBuf::from(program));
        }
        if let Some(path) = env.get(ENV_BROWSERS_PATH) {
            self.browsers_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = env.get(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }
}

/// Parse a positive loop bound
pub fn parse_iterations(raw: &str) -> ConfigResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::invalid(ENV_MAX_ITERATIONS, raw)),
    }
}

fn parse_flag(key: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLevel, MemoryConfigProvider};
    use crate::secrets::MemorySecretStore;

    fn layer(level: ConfigLevel, yaml: &str) -> MemoryConfigProvider {
        MemoryConfigProvider::with_config(level, serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_defaults() {
        let settings = AgentSettings::resolve(&MemorySecretStore::new(), &[]).unwrap();
        assert_eq!(settings.provider, "openai");
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.max_iterations, 50);
        assert!(!settings.skip_mcp);
        assert!(settings.api_key.is_none());
        assert_eq!(settings.output_dir, PathBuf::from("generated-tests"));
        assert_eq!(settings.mcp_args()[0], "@playwright/mcp@latest");
    }

    #[test]
    fn test_precedence() {
        let user = layer(
            ConfigLevel::User,
            "defaults:\n  model: user-model\n  max_iterations: 10\noutput_dir: user-out\n",
        );
        let workspace = layer(ConfigLevel::Workspace, "defaults:\n  model: ws-model\n");
        let env = MemorySecretStore::with_values([(ENV_MAX_ITERATIONS, "7")]);

        let settings = AgentSettings::resolve(&env, &[&user, &workspace]).unwrap();
        assert_eq!(settings.model, "ws-model");
        assert_eq!(settings.max_iterations, 7);
        assert_eq!(settings.output_dir, PathBuf::from("user-out"));
    }

    #[test]
    fn test_credential_follows_provider() {
        let env = MemorySecretStore::with_values([
            (ENV_PROVIDER, "anthropic"),
            ("anthropic", "sk-ant"),
            ("openai", "sk-openai"),
        ]);
        let settings = AgentSettings::resolve(&env, &[]).unwrap();
        assert_eq!(settings.provider, "anthropic");
        assert_eq!(settings.api_key.as_deref(), Some("sk-ant"));
    }

    #[test]
    fn test_invalid_numbers() {
        for raw in ["zero", "0", "-3"] {
            let env = MemorySecretStore::with_values([(ENV_MAX_ITERATIONS, raw)]);
            let err = AgentSettings::resolve(&env, &[]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{raw}");
        }
    }

    #[test]
    fn test_skip_flag() {
        let env = MemorySecretStore::with_values([(ENV_SKIP_MCP, "Yes")]);
        assert!(AgentSettings::resolve(&env, &[]).unwrap().skip_mcp);

        let env = MemorySecretStore::with_values([(ENV_SKIP_MCP, "maybe")]);
        assert!(AgentSettings::resolve(&env, &[]).is_err());
    }

    #[test]
    fn test_tool_lists_from_yaml() {
        let ws = layer(
            ConfigLevel::Workspace,
            "mcp:\n  exclude_tools: [browser_install]\n  browsers_path: /opt/pw\n",
        );
        let settings = AgentSettings::resolve(&MemorySecretStore::new(), &[&ws]).unwrap();
        assert_eq!(settings.exclude_tools, vec!["browser_install".to_string()]);
        assert_eq!(settings.browsers_path, Some(PathBuf::from("/opt/pw")));
    }
}
