//! Adapter between webprobe-core types and genai types
//!
//! Auth comes from the explicit key in the model config when present, and
//! otherwise from the process environment via `EnvSecretStore`, so the
//! provider -> variable mapping is the same one settings resolution uses.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatResponse, Tool as GenaiTool,
    ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::{json, Value};

use crate::secrets::{EnvSecretStore, SecretStore};
use crate::types::{ChatMessage, MessageRole, Tool, ToolCall};

use super::error::ProviderResult;
use super::traits::ProviderModelConfig;

// ============================================================================
// Message Conversion: webprobe -> genai
// ============================================================================

/// Convert a transcript to genai messages
///
/// An assistant turn with tool calls becomes its text (if any) followed by a
/// tool-call message; tool messages become tool responses keyed by call id.
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> ProviderResult<Vec<GenaiMessage>> {
    let mut out = Vec::with_capacity(messages.len());

    for msg in messages {
        match msg.role {
            MessageRole::System => out.push(GenaiMessage::system(msg.content)),
            MessageRole::User => out.push(GenaiMessage::user(msg.content)),
            MessageRole::Assistant if msg.has_tool_calls() => {
                if !msg.content.trim().is_empty() {
                    out.push(GenaiMessage::assistant(msg.content));
                }
                let calls = msg
                    .tool_calls
                    .iter()
                    .map(to_genai_tool_call)
                    .collect::<ProviderResult<Vec<_>>>()?;
                out.push(GenaiMessage::from(calls));
            }
            MessageRole::Assistant => out.push(GenaiMessage::assistant(msg.content)),
            MessageRole::Tool => {
                let call_id = msg.tool_call_id.unwrap_or_default();
                out.push(GenaiMessage::from(GenaiToolResponse::new(call_id, msg.content)));
            }
        }
    }

    Ok(out)
}

/// Convert a recorded tool call back into genai's shape
pub fn to_genai_tool_call(call: &ToolCall) -> ProviderResult<GenaiToolCall> {
    let value = json!({
        "call_id": call.id,
        "fn_name": call.name,
        "fn_arguments": call.parse_arguments(),
    });
    Ok(serde_json::from_value(value)?)
}

// ============================================================================
// Tool Conversion: webprobe -> genai
// ============================================================================

/// Convert a webprobe Tool to a genai Tool
pub fn to_genai_tool(tool: Tool) -> GenaiTool {
    GenaiTool::new(tool.name)
        .with_description(tool.description)
        .with_schema(tool.input_schema)
}

pub fn to_genai_tools(tools: Vec<Tool>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

// ============================================================================
// Response Conversion: genai -> webprobe
// ============================================================================

/// Convert a genai ToolCall to a webprobe ToolCall
///
/// Arguments are kept as raw text; a string payload is passed through as-is
/// so malformed JSON from the model reaches the defensive parser untouched.
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    let arguments = match &tc.fn_arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    };
    ToolCall::new(tc.call_id.clone(), tc.fn_name.clone(), arguments)
}

/// Convert a genai response into one assistant message
pub fn from_genai_response(response: &ChatResponse) -> ChatMessage {
    let text = response.first_text().unwrap_or_default().to_string();
    let calls: Vec<ToolCall> = response
        .tool_calls()
        .into_iter()
        .map(from_genai_tool_call)
        .collect();

    ChatMessage::assistant_with_tools(text, calls)
}

// ============================================================================
// Provider Resolution
// ============================================================================

/// Provider configuration for routing
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier (e.g., "openai", "azure", "openrouter")
    pub provider: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl ProviderConfig {
    pub fn new(provider: impl Into<String>, model: &ProviderModelConfig) -> Self {
        Self {
            provider: provider.into(),
            api_key: model.api_key.clone(),
            api_base: model.api_base.clone(),
        }
    }
}

fn endpoint_from_base(base: &str) -> Endpoint {
    let mut url = base.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    Endpoint::from_owned(url)
}

// ============================================================================
// Client Creation with Custom Auth
// ============================================================================

/// Create a genai Client with custom auth and endpoint resolution
pub fn create_client(config: &ProviderConfig) -> Client {
    let auth_provider = config.provider.clone();
    let auth_explicit_key = config.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let provider = auth_provider.clone();
            let explicit_key = auth_explicit_key.clone();

            Box::pin(async move {
                if let Some(key) = explicit_key {
                    return Ok(Some(AuthData::from_single(key)));
                }

                // None lets keyless providers (ollama) through
                Ok(EnvSecretStore::new().get(&provider).map(AuthData::from_single))
            })
        },
    );

    let target_provider = config.provider.to_lowercase();
    let target_api_base = config.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { ref model, .. } = target;
            let native = is_genai_native(&target_provider);

            let (endpoint, adapter_kind) = match (target_provider.as_str(), target_api_base.as_deref()) {
                // OpenAI-compatible endpoints
                (_, Some(base)) if !native => (endpoint_from_base(base), AdapterKind::OpenAI),
                ("openrouter", None) => (
                    Endpoint::from_static("https://openrouter.ai/api/v1/"),
                    AdapterKind::OpenAI,
                ),
                ("mistral", None) => (
                    Endpoint::from_static("https://api.mistral.ai/v1/"),
                    AdapterKind::OpenAI,
                ),
                // Native provider behind a proxy
                (_, Some(base)) => (endpoint_from_base(base), model.adapter_kind),
                // Native genai providers - let it resolve normally
                _ => return Ok(target),
            };

            let resolved_model = ModelIden::new(adapter_kind, model.model_name.clone());

            Ok(ServiceTarget {
                endpoint,
                auth: target.auth,
                model: resolved_model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

/// Check if a provider is natively supported by genai
pub fn is_genai_native(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai"
            | "anthropic"
            | "gemini"
            | "ollama"
            | "groq"
            | "xai"
            | "deepseek"
            | "cohere"
            | "fireworks"
            | "together"
    )
}

/// Check if a provider can be handled by genai (native or via OpenAI-compat)
pub fn is_genai_supported(provider: &str) -> bool {
    is_genai_native(provider)
        || matches!(
            provider.to_lowercase().as_str(),
            "azure" | "openrouter" | "mistral"
        )
}
