//! webprobe core
//!
//! An agent that drives an LLM to explore a web application through a
//! browser tool server, write Playwright tests and run them.
//!
//! ## Agent loop
//!
//! The `agent` module owns the conversation: it sends the transcript and
//! the merged tool list to a `Provider`, dispatches the tool calls it gets
//! back and stops on a final JSON report or the iteration bound.
//!
//! ```rust,ignore
//! use webprobe_core::{Agent, AgentSettings, ConsoleLogger};
//! use std::sync::Arc;
//!
//! let settings = AgentSettings::from_environment(Some(Path::new(".")))?;
//! let agent = Agent::from_settings(settings, Arc::new(ConsoleLogger::new()));
//!
//! let outcome = agent.run("https://example.com", None).await;
//! agent.shutdown().await;
//! ```
//!
//! ## Tools
//!
//! - `mcp`: the external browser tool session (rmcp)
//! - `tools`: local tools (`save_test_file`, `run_tests`, `list_test_files`)
//!   and the registry merging both sets

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;
pub mod mcp;
pub mod tools;
pub mod agent;

// Re-export commonly used types
pub use types::{ChatMessage, MessageRole, Tool, ToolCall, ToolResult};

pub use secrets::{
    SecretStore, SecretStoreError, SecretStoreResult,
    EnvSecretStore, MemorySecretStore, ChainSecretStore,
};

pub use logging::{ConsoleLogger, LogEvent, LogKind, Logger, NoOpLogger, ObserverLogger};

pub use config::{AgentSettings, ConfigError, ConfigProvider, FileConfigProvider, MemoryConfigProvider};

pub use providers::{create_provider, ChatOptions, GenaiProvider, MockProvider, Provider, ProviderError};

pub use mcp::{ExternalToolClient, McpClient, McpError, McpResult};

pub use tools::{GeneratedFiles, LocalTool, LocalToolTable, ToolFilter, ToolRegistry};

pub use agent::{Agent, AgentError, FinalReport, RunOutcome};
