//! Lifecycle of the external tool session
//!
//! `ExternalToolClient` owns at most one live `ToolSession`. It is started
//! lazily, shared by the tool registry and the dispatcher, cleared when the
//! connection is found dead, and closed explicitly at the end of a run.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::log_warn;
use crate::config::AgentSettings;
use crate::logging::Logger;
use crate::types::Tool;

use super::client::{McpClient, McpError, McpResult};
use super::launcher::resolve_launch_spec;

const PREPARE_TIMEOUT: Duration = Duration::from_secs(600);

/// A connected tool server
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Tools the server currently offers
    async fn list_tools(&self) -> McpResult<Vec<Tool>>;

    /// Invoke a tool; the raw result is returned as JSON
    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<Value>;

    /// Close the session and release its transport
    async fn close(&self) -> McpResult<()>;
}

/// Creates sessions
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Best-effort environment setup before connecting
    async fn prepare(&self) -> McpResult<()> {
        Ok(())
    }

    /// Start (or reach) the server and complete the handshake
    async fn connect(&self) -> McpResult<Arc<dyn ToolSession>>;
}

/// Connector for the Playwright MCP server
///
/// Spawns the server through the package runner, or connects over HTTP when
/// a URL is configured.
pub struct ProcessConnector {
    url: Option<String>,
    program: Option<PathBuf>,
    args: Vec<String>,
    browsers_path: Option<PathBuf>,
    logger: Arc<dyn Logger>,
}

impl ProcessConnector {
    pub fn new(args: Vec<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            url: None,
            program: None,
            args,
            browsers_path: None,
            logger,
        }
    }

    pub fn from_settings(settings: &AgentSettings, logger: Arc<dyn Logger>) -> Self {
        Self {
            url: settings.mcp_url.clone(),
            program: settings.mcp_program.clone(),
            args: settings.mcp_args(),
            browsers_path: settings.browsers_path.clone(),
            logger,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_browsers_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.browsers_path = Some(path.into());
        self
    }

    fn apply_env(&self, cmd: &mut tokio::process::Command) {
        if let Some(path) = &self.browsers_path {
            cmd.env("PLAYWRIGHT_BROWSERS_PATH", path);
        }
    }
}

#[async_trait]
impl SessionConnector for ProcessConnector {
    /// Install the browser binaries into the configured cache
    async fn prepare(&self) -> McpResult<()> {
        if self.url.is_some() {
            return Ok(());
        }

        let args: Vec<String> = ["playwright", "install", "chromium"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let spec = resolve_launch_spec(self.program.as_deref(), &args);
        self.logger
            .info(&format!("[McpClient] Preparing browsers: {}", spec.describe()));

        let mut cmd = spec.to_command();
        self.apply_env(&mut cmd);
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        let output = tokio::time::timeout(PREPARE_TIMEOUT, cmd.output())
            .await
            .map_err(|_| McpError::Timeout(format!("browser install exceeded {:?}", PREPARE_TIMEOUT)))??;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(McpError::Preparation(format!(
                "exit {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )))
        }
    }

    async fn connect(&self) -> McpResult<Arc<dyn ToolSession>> {
        let client = match &self.url {
            Some(url) => McpClient::connect_http(url, Arc::clone(&self.logger)).await?,
            None => {
                let spec = resolve_launch_spec(self.program.as_deref(), &self.args);
                if spec.is_shell_fallback() {
                    self.logger
                        .warn("[McpClient] npx not found on PATH, falling back to the shell");
                }
                let mut cmd = spec.to_command();
                self.apply_env(&mut cmd);
                McpClient::connect_process(cmd, Arc::clone(&self.logger)).await?
            }
        };
        Ok(Arc::new(client))
    }
}

/// Owner of the (optional) external tool session
pub struct ExternalToolClient {
    connector: Arc<dyn SessionConnector>,
    session: RwLock<Option<Arc<dyn ToolSession>>>,
    init_lock: tokio::sync::Mutex<()>,
    skip: bool,
    logger: Arc<dyn Logger>,
}

impl ExternalToolClient {
    pub fn new(connector: Arc<dyn SessionConnector>, logger: Arc<dyn Logger>) -> Self {
        Self {
            connector,
            session: RwLock::new(None),
            init_lock: tokio::sync::Mutex::new(()),
            skip: false,
            logger,
        }
    }

    /// Run with local tools only; `initialize` becomes a no-op
    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn from_settings(settings: &AgentSettings, logger: Arc<dyn Logger>) -> Self {
        let connector = ProcessConnector::from_settings(settings, Arc::clone(&logger));
        Self::new(Arc::new(connector), logger).with_skip(settings.skip_mcp)
    }

    /// Start and connect the session if not already connected
    ///
    /// Failures are logged and leave the client unset; the run continues
    /// with local tools.
    pub async fn initialize(&self) {
        let _guard = self.init_lock.lock().await;

        if self.is_connected() {
            return;
        }
        if self.skip {
            self.logger
                .info("[McpClient] External tools disabled, using local tools only");
            return;
        }

        if let Err(e) = self.connector.prepare().await {
            self.logger
                .warn(&format!("[McpClient] Browser preparation failed: {}", e));
        }

        match self.connector.connect().await {
            Ok(session) => {
                *self.session.write() = Some(session);
                self.logger.success("[McpClient] External tool server connected");
            }
            Err(e) => {
                log_warn!(
                    self.logger,
                    "[McpClient] Could not start external tool server, continuing with local tools: {}",
                    e
                );
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.read().is_some()
    }

    /// Current session handle, if any
    pub fn session(&self) -> Option<Arc<dyn ToolSession>> {
        self.session.read().clone()
    }

    /// List server tools; a failing session is dropped and yields nothing
    pub async fn list_tools(&self) -> Vec<Tool> {
        let Some(session) = self.session() else {
            return Vec::new();
        };

        match session.list_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                self.logger
                    .warn(&format!("[McpClient] Listing tools failed: {}", e));
                self.clear();
                Vec::new()
            }
        }
    }

    /// Forget the current session without closing it
    pub fn clear(&self) {
        *self.session.write() = None;
    }

    /// Close the session if present
    pub async fn shutdown(&self) {
        let taken = self.session.write().take();
        if let Some(session) = taken {
            if let Err(e) = session.close().await {
                self.logger
                    .warn(&format!("[McpClient] Error while closing session: {}", e));
            }
        }
    }
}
