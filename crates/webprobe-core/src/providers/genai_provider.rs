//! GenaiProvider - Unified provider using the genai crate
//!
//! This provider handles all genai-supported providers (OpenAI, Anthropic, Gemini, etc.)
//! as well as OpenAI-compatible providers (Azure, OpenRouter, Mistral) via
//! the ServiceTargetResolver.

use async_trait::async_trait;
use std::sync::Arc;

use genai::chat::ChatRequest;

use crate::{log_debug, log_error};
use crate::logging::Logger;
use crate::types::ChatMessage;

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_response, is_genai_supported, to_genai_messages,
    to_genai_tools, ProviderConfig,
};
use super::traits::{ChatOptions, Provider, ProviderModelConfig};

/// Unified provider using genai for all supported LLM APIs
pub struct GenaiProvider {
    /// Provider identifier
    provider_id: String,
    /// Logger for debug output
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    /// Create a new GenaiProvider
    pub fn new(provider_id: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider_id: provider_id.into(),
            logger,
        }
    }

    /// Check if this provider can handle the given provider ID
    pub fn supports(provider_id: &str) -> bool {
        is_genai_supported(provider_id)
    }

    /// Extract model name from a model string (e.g., "openai/gpt-4" -> "gpt-4")
    pub fn extract_model_name(model: &str) -> &str {
        model.split('/').nth(1).unwrap_or(model)
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        model_config: ProviderModelConfig,
        options: ChatOptions,
    ) -> ProviderResult<ChatMessage> {
        let model_name = Self::extract_model_name(&model_config.model);
        log_debug!(
            self.logger,
            "[GenaiProvider] chat: provider={}, model={}, messages={}, tools={}",
            self.provider_id,
            model_name,
            messages.len(),
            options.tools.len()
        );

        let client = create_client(&ProviderConfig::new(&self.provider_id, &model_config));

        let mut chat_req = ChatRequest::new(to_genai_messages(messages)?);
        if !options.tools.is_empty() {
            chat_req = chat_req.with_tools(to_genai_tools(options.tools.clone()));
        }
        let response = client
            .exec_chat(model_name, chat_req, None)
            .await
            .map_err(|e| {
                log_error!(self.logger, "[GenaiProvider] Request failed: {}", e);
                ProviderError::api_error(&self.provider_id, e.to_string())
            })?;

        let message = from_genai_response(&response);
        log_debug!(
            self.logger,
            "[GenaiProvider] Response: {} chars, {} tool calls",
            message.content.len(),
            message.tool_calls.len()
        );
        Ok(message)
    }
}
