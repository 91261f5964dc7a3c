//! Routing of tool calls to local tools or the external session

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::log_debug;
use crate::logging::Logger;
use crate::mcp::ExternalToolClient;
use crate::tools::LocalToolTable;
use crate::types::ToolResult;

use super::error::{AgentError, AgentResult};
use super::outcome::RawToolOutcome;
use super::recovery::{classify_failure, reconnecting_payload, timeout_payload, FailureClass};

/// Executes one tool call and normalizes its result
pub struct ToolDispatcher {
    client: Arc<ExternalToolClient>,
    reconnect_requested: AtomicBool,
    logger: Arc<dyn Logger>,
}

impl ToolDispatcher {
    pub fn new(client: Arc<ExternalToolClient>, logger: Arc<dyn Logger>) -> Self {
        Self {
            client,
            reconnect_requested: AtomicBool::new(false),
            logger,
        }
    }

    /// Whether a lost connection was seen since the last call; clears the flag
    pub fn take_reconnect_request(&self) -> bool {
        self.reconnect_requested.swap(false, Ordering::SeqCst)
    }

    /// Run `name` with `arguments`
    ///
    /// Local tools win over server tools of the same name. A failed session
    /// call that looks like connection loss or a timeout comes back as a
    /// successful informational result so the model can retry. Error content
    /// returned by the server is passed through as a failure.
    pub async fn execute_tool(
        &self,
        name: &str,
        arguments: Value,
        local_tools: &LocalToolTable,
    ) -> AgentResult<ToolResult> {
        if let Some(tool) = local_tools.get(name) {
            log_debug!(self.logger, "[ToolDispatcher] Local tool: {}", name);
            return Ok(match tool.execute(arguments).await {
                Ok(value) => RawToolOutcome::LocalSuccess(value).normalize(),
                Err(e) => ToolResult::failure(e.to_string()),
            });
        }

        let session = self.client.session().ok_or(AgentError::ClientNotInitialized)?;
        log_debug!(self.logger, "[ToolDispatcher] Server tool: {}", name);

        match session.call_tool(name, arguments).await {
            Ok(raw) => Ok(RawToolOutcome::classify_external(raw).normalize()),
            Err(e) => match classify_failure(&e) {
                FailureClass::Fatal => Err(AgentError::tool_failed(name, e.to_string())),
                class => {
                    self.logger
                        .warn(&format!("[ToolDispatcher] {} failed transiently: {}", name, e));
                    Ok(self.recover(name, class))
                }
            },
        }
    }

    fn recover(&self, name: &str, class: FailureClass) -> ToolResult {
        match class {
            FailureClass::TransientConnectionLoss => {
                self.client.clear();
                self.reconnect_requested.store(true, Ordering::SeqCst);
                ToolResult::success(reconnecting_payload(name))
            }
            _ => ToolResult::success(timeout_payload(name)),
        }
    }
}
