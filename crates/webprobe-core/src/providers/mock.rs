//! Mock provider for testing
//!
//! Provides deterministic, scripted assistant turns without network
//! dependencies, and records every request it receives.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatOptions, Provider, ProviderModelConfig};
use crate::logging::Logger;
use crate::types::{ChatMessage, MessageRole, ToolCall};

/// Mock response mode
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Echo back the last user message
    Echo,
    /// Return a fixed text response (no tool calls)
    Fixed(String),
    /// Return these assistant messages in order, repeating the last one
    Script(Vec<ChatMessage>),
    /// Always request the same tool call
    AlwaysToolCall { name: String, arguments: String },
    /// Fail every request
    Error(String),
}

impl Default for MockMode {
    fn default() -> Self {
        MockMode::Echo
    }
}

/// What the mock saw on one request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tool_names: Vec<String>,
}

/// Mock LLM provider for testing
pub struct MockProvider {
    mode: MockMode,
    calls: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    /// Create a mock provider with a given mode
    pub fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Create an echo provider (echoes back user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Echo, logger)
    }

    /// Create a fixed response provider
    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    /// Create a scripted provider
    pub fn script(turns: Vec<ChatMessage>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Script(turns), logger)
    }

    /// Create a provider that never stops calling `name`
    pub fn always_tool_call(
        name: impl Into<String>,
        arguments: impl Into<String>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self::with_mode(
            MockMode::AlwaysToolCall {
                name: name.into(),
                arguments: arguments.into(),
            },
            logger,
        )
    }

    /// Create an error-producing provider
    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Error(message.into()), logger)
    }

    /// Number of chat requests served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Extract last user message content
    fn last_user_message(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User && !m.content.is_empty())
            .map(|m| m.content.clone())
            .unwrap_or_else(|| "Hello from MockProvider!".to_string())
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        _model: ProviderModelConfig,
        options: ChatOptions,
    ) -> ProviderResult<ChatMessage> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.logger
            .debug(&format!("[MockProvider] chat call #{}", index + 1));

        let reply = match &self.mode {
            MockMode::Echo => {
                ChatMessage::assistant(format!("Echo: {}", Self::last_user_message(&messages)))
            }
            MockMode::Fixed(text) => ChatMessage::assistant(text.clone()),
            MockMode::Script(turns) => match turns.get(index).or_else(|| turns.last()) {
                Some(turn) => turn.clone(),
                None => return Err(ProviderError::Other("Mock script is empty".to_string())),
            },
            MockMode::AlwaysToolCall { name, arguments } => ChatMessage::assistant_with_tools(
                "",
                vec![ToolCall::new(format!("call_{}", index + 1), name.clone(), arguments.clone())],
            ),
            MockMode::Error(message) => {
                return Err(ProviderError::Other(format!("Mock error: {}", message)))
            }
        };

        self.requests.lock().push(RecordedRequest {
            messages,
            tool_names: options.tools.iter().map(|t| t.name.clone()).collect(),
        });

        Ok(reply)
    }
}
