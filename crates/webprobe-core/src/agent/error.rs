//! Agent error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::providers::ProviderError;

/// Errors that end or interrupt a run
#[derive(Error, Debug)]
pub enum AgentError {
    /// No LLM credential; raised before any LLM call
    #[error("No API key configured for provider {provider}")]
    MissingCredential { provider: String },

    /// A server tool was called while no session is active
    #[error("External tool client is not initialized")]
    ClientNotInitialized,

    #[error("tool \"{name}\" failed: {detail}")]
    ToolExecutionFailed { name: String, detail: String },

    #[error("Reached the maximum of {0} iterations without a final answer")]
    MaxIterationsExceeded(usize),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

impl AgentError {
    pub fn missing_credential(provider: impl Into<String>) -> Self {
        Self::MissingCredential {
            provider: provider.into(),
        }
    }

    pub fn tool_failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ToolExecutionFailed {
            name: name.into(),
            detail: detail.into(),
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
