//! Built-in tools that run in-process
//!
//! These are the tools the model uses to persist and execute the tests it
//! writes. They always take priority over same-named server tools.

mod files;
mod list_files;
mod save_file;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::types::Tool;

pub use files::GeneratedFiles;
pub use list_files::ListTestFilesTool;
pub use run_tests::RunTestsTool;
pub use save_file::SaveTestFileTool;

/// Errors raised by local tools
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Command timed out after {0}s")]
    Timeout(u64),

    #[error("Failed to start command: {0}")]
    Spawn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type ToolOutput = Result<Value, ToolError>;

/// A tool executed inside this process
#[async_trait]
pub trait LocalTool: Send + Sync {
    /// Unique name the LLM uses to call this tool
    fn name(&self) -> &str;

    /// Description shown to the LLM
    fn description(&self) -> &str;

    /// JSON Schema describing the input object
    fn schema(&self) -> Value;

    /// Execute with already-parsed arguments (always a JSON object)
    async fn execute(&self, arguments: Value) -> ToolOutput;

    /// Descriptor sent to the LLM
    fn definition(&self) -> Tool {
        Tool::new(self.name(), self.description()).with_schema(self.schema())
    }
}

/// Ordered set of local tools, looked up by name
#[derive(Clone, Default)]
pub struct LocalToolTable {
    tools: Vec<Arc<dyn LocalTool>>,
}

impl LocalToolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard tools, all rooted at `files`
    pub fn builtins(files: GeneratedFiles, npx_program: Option<PathBuf>) -> Self {
        let mut table = Self::new();
        table.register(Arc::new(SaveTestFileTool::new(files.clone())));
        table.register(Arc::new(RunTestsTool::new(files.clone(), npx_program)));
        table.register(Arc::new(ListTestFilesTool::new(files)));
        table
    }

    /// Register a tool; a later tool with an existing name replaces it
    pub fn register(&mut self, tool: Arc<dyn LocalTool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn LocalTool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Descriptors in registration order
    pub fn definitions(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for LocalToolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalToolTable")
            .field("tools", &self.names())
            .finish()
    }
}
