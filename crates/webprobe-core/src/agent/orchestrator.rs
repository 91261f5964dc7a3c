//! The conversation loop

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{log_error, log_info, log_warn};
use crate::config::AgentSettings;
use crate::logging::Logger;
use crate::mcp::ExternalToolClient;
use crate::providers::{create_provider, ChatOptions, Provider, ProviderModelConfig};
use crate::tools::{GeneratedFiles, LocalToolTable, ToolFilter, ToolRegistry};
use crate::types::{ChatMessage, Tool, ToolCall, ToolResult};

use super::dispatcher::ToolDispatcher;
use super::error::{AgentError, AgentResult};
use super::guard::NavigationGuard;
use super::prompt::{initial_user_message, SYSTEM_PROMPT};
use super::report::FinalReport;

/// What a run hands back to its caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// LLM calls made
    pub iterations: usize,
}

impl RunOutcome {
    fn completed(message: String, test_files: Vec<String>, iterations: usize) -> Self {
        Self {
            success: true,
            message: Some(message),
            test_files: Some(test_files),
            error: None,
            iterations,
        }
    }

    fn failed(error: &AgentError, iterations: usize) -> Self {
        Self {
            success: false,
            message: None,
            test_files: None,
            error: Some(error.to_string()),
            iterations,
        }
    }
}

/// Per-run counters, zeroed at the start of every run
#[derive(Debug, Default)]
pub struct LoopState {
    pub iteration: usize,
    pub guard: NavigationGuard,
}

impl LoopState {
    pub fn consecutive_guarded(&self) -> usize {
        self.guard.consecutive()
    }
}

/// Drives the model until it produces a final report or runs out of turns
pub struct Agent {
    settings: AgentSettings,
    provider: Arc<dyn Provider>,
    client: Arc<ExternalToolClient>,
    registry: ToolRegistry,
    dispatcher: ToolDispatcher,
    files: GeneratedFiles,
    logger: Arc<dyn Logger>,
}

impl Agent {
    /// Build an agent around an existing provider and external client
    ///
    /// The built-in local tools are rooted at `settings.output_dir`.
    pub fn new(
        settings: AgentSettings,
        provider: Arc<dyn Provider>,
        client: Arc<ExternalToolClient>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let files = GeneratedFiles::new(&settings.output_dir);
        let local = LocalToolTable::builtins(files.clone(), settings.mcp_program.clone());
        let registry = ToolRegistry::new(Arc::clone(&client), local, Arc::clone(&logger))
            .with_filter(ToolFilter::from_settings(&settings));
        let dispatcher = ToolDispatcher::new(Arc::clone(&client), Arc::clone(&logger));

        Self {
            settings,
            provider,
            client,
            registry,
            dispatcher,
            files,
            logger,
        }
    }

    /// Provider, external client and tools all derived from `settings`
    pub fn from_settings(settings: AgentSettings, logger: Arc<dyn Logger>) -> Self {
        let provider = create_provider(&settings.provider, Arc::clone(&logger));
        let client = Arc::new(ExternalToolClient::from_settings(&settings, Arc::clone(&logger)));
        Self::new(settings, provider, client, logger)
    }

    /// Replace the local tool table
    pub fn with_local_tools(mut self, local: LocalToolTable) -> Self {
        self.registry = ToolRegistry::new(Arc::clone(&self.client), local, Arc::clone(&self.logger))
            .with_filter(ToolFilter::from_settings(&self.settings));
        self
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn client(&self) -> &Arc<ExternalToolClient> {
        &self.client
    }

    /// Run against `target`, optionally guided by a schema description
    ///
    /// Never returns an error: every failure ends up in the outcome.
    pub async fn run(&self, target: &str, schema: Option<&str>) -> RunOutcome {
        log_info!(self.logger, "[Agent] Starting run against {}", target);
        let mut state = LoopState::default();

        match self.run_loop(target, schema, &mut state).await {
            Ok((report, test_files)) => {
                self.logger.success(&format!(
                    "[Agent] Finished after {} iteration(s), {} test file(s)",
                    state.iteration,
                    test_files.len()
                ));
                RunOutcome::completed(report.format_summary(), test_files, state.iteration)
            }
            Err(e) => {
                log_error!(self.logger, "[Agent] Run failed: {}", e);
                RunOutcome::failed(&e, state.iteration)
            }
        }
    }

    /// Close the external session
    pub async fn shutdown(&self) {
        self.client.shutdown().await;
    }

    async fn run_loop(
        &self,
        target: &str,
        schema: Option<&str>,
        state: &mut LoopState,
    ) -> AgentResult<(FinalReport, Vec<String>)> {
        let api_key = self
            .settings
            .api_key
            .clone()
            .ok_or_else(|| AgentError::missing_credential(&self.settings.provider))?;

        self.client.initialize().await;
        let (tools, local) = self.registry.get_all_tools().await;
        let model = self.model_config(api_key);

        let mut transcript = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(initial_user_message(target, schema)),
        ];

        let max = self.settings.max_iterations;
        while state.iteration < max {
            if self.dispatcher.take_reconnect_request() {
                self.logger.info("[Agent] Reconnecting to external tool server");
                self.client.initialize().await;
            }

            log_info!(self.logger, "[Agent] Iteration {}/{}", state.iteration + 1, max);

            let reply = self
                .provider
                .chat(transcript.clone(), model.clone(), self.chat_options(&tools))
                .await?;
            state.iteration += 1;

            if let Some(text) = reply.text() {
                self.logger.agent(text);
            }

            if !reply.has_tool_calls() {
                let report = FinalReport::from_text(&reply.content);
                transcript.push(reply);
                return Ok((report, self.files.list()));
            }

            let calls = reply.tool_calls.clone();
            transcript.push(reply);

            for call in &calls {
                let result = self.handle_call(call, &local, state).await;
                transcript.push(ChatMessage::tool(&call.id, result.to_transcript_text()));
            }
        }

        Err(AgentError::MaxIterationsExceeded(max))
    }

    async fn handle_call(
        &self,
        call: &ToolCall,
        local: &LocalToolTable,
        state: &mut LoopState,
    ) -> ToolResult {
        if let Some(blocked) = state.guard.check(&call.name) {
            log_warn!(
                self.logger,
                "[Agent] Blocked {} after {} consecutive calls",
                call.name,
                state.consecutive_guarded()
            );
            return blocked;
        }

        log_info!(self.logger, "[Agent] Tool call: {}", call.name);
        match self
            .dispatcher
            .execute_tool(&call.name, call.parse_arguments(), local)
            .await
        {
            Ok(result) => {
                if let Some(message) = &result.error_message {
                    self.logger
                        .warn(&format!("[Agent] {} returned an error: {}", call.name, message));
                }
                result
            }
            Err(e) => {
                log_warn!(self.logger, "[Agent] {}", e);
                ToolResult::failure(e.to_string())
            }
        }
    }

    fn model_config(&self, api_key: String) -> ProviderModelConfig {
        let config = ProviderModelConfig::new(&self.settings.model).with_api_key(api_key);
        match &self.settings.api_base {
            Some(base) => config.with_api_base(base),
            None => config,
        }
    }

    fn chat_options(&self, tools: &[Tool]) -> ChatOptions {
        ChatOptions::new().with_tools(tools.to_vec())
    }
}
