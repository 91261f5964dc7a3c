//! LLM Provider implementations
//!
//! ## Architecture
//!
//! All real providers go through the `genai` crate, which handles:
//! - Provider-specific protocols (OpenAI, Anthropic, Gemini, etc.)
//! - Tool calling
//! - Error handling
//!
//! Providers not natively in genai (Azure, OpenRouter, Mistral, or any
//! provider with a custom `api_base`) are handled via genai's
//! `ServiceTargetResolver` using OpenAI-compatible protocols.
//!
//! The `MockProvider` is kept for testing purposes.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

// Core traits and types
pub use traits::{ChatOptions, Provider, ProviderModelConfig};
pub use error::{ProviderError, ProviderResult};

// The main provider - handles all LLM providers via genai
pub use genai_provider::GenaiProvider;
pub use genai_adapter::{is_genai_native, is_genai_supported, ProviderConfig};

// Mock provider for testing
pub use mock::{MockMode, MockProvider, RecordedRequest};

use crate::logging::Logger;
use std::sync::Arc;

/// Create a provider for the given provider ID
///
/// `mock` yields an echoing `MockProvider`; everything else goes through
/// `GenaiProvider`, with unknown IDs treated as OpenAI-compatible endpoints.
pub fn create_provider(provider_id: &str, logger: Arc<dyn Logger>) -> Arc<dyn Provider> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Arc::new(MockProvider::echo(logger)),
        _ => Arc::new(GenaiProvider::new(provider_id, logger)),
    }
}
