//! Configuration
//!
//! Layered sources:
//! - `FileConfigProvider`: YAML file-based (user/workspace level)
//! - `MemoryConfigProvider`: In-memory for testing
//!
//! `AgentSettings::resolve` folds the layers together with the environment.

mod traits;
mod memory;
mod file;
mod settings;

pub use traits::{ConfigProvider, ConfigError, ConfigResult};
pub use memory::MemoryConfigProvider;
pub use file::{FileConfigProvider, ConfigFile, ConfigLevel, DefaultSettings, McpSettings};
pub use settings::*;
