//! MCP Client using the official rmcp SDK
//!
//! Connects to an MCP server over a child-process stdio pipe or HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParams, ClientCapabilities, ClientInfo, Implementation},
    service::{RunningService, ServiceError},
    transport::TokioChildProcess,
    RoleClient, ServiceExt,
};
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;

use crate::{log_debug, log_info};
use crate::logging::Logger;
use crate::types::{Tool, empty_object_schema};

use super::session::ToolSession;

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Not connected")]
    NotConnected,

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("Environment preparation failed: {0}")]
    Preparation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl McpError {
    fn from_service(err: ServiceError, wrap: fn(String) -> McpError) -> Self {
        match err {
            ServiceError::TransportClosed => McpError::ConnectionClosed,
            ServiceError::Timeout { timeout } => McpError::Timeout(format!("{:?}", timeout)),
            other => wrap(other.to_string()),
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "webprobe-core".to_string(),
            title: Some("webprobe".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

/// rmcp-backed tool session
///
/// The running service owns the transport (and the child process, when
/// spawned); closing the session cancels it.
pub struct McpClient {
    /// The underlying rmcp running service, `None` once closed
    client: Mutex<Option<RunningService<RoleClient, ClientInfo>>>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl McpClient {
    /// Spawn a server process and connect over its stdio
    pub async fn connect_process(command: Command, logger: Arc<dyn Logger>) -> McpResult<Self> {
        log_info!(
            logger,
            "[McpClient] Spawning server: {:?}",
            command.as_std().get_program()
        );

        let transport = TokioChildProcess::new(command)
            .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info("[McpClient] Connected and initialized successfully");

        Ok(Self::from_service(client, logger))
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(url: &str, logger: Arc<dyn Logger>) -> McpResult<Self> {
        use rmcp::transport::StreamableHttpClientTransport;

        log_info!(logger, "[McpClient] Connecting to HTTP: {}", url);

        let transport = StreamableHttpClientTransport::from_uri(url);

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info("[McpClient] Connected and initialized successfully");

        Ok(Self::from_service(client, logger))
    }

    fn from_service(client: RunningService<RoleClient, ClientInfo>, logger: Arc<dyn Logger>) -> Self {
        Self {
            client: Mutex::new(Some(client)),
            logger,
        }
    }
}

/// Convert an rmcp tool descriptor into ours
pub fn to_tool(tool: rmcp::model::Tool) -> Tool {
    let schema = serde_json::to_value(tool.input_schema.as_ref())
        .unwrap_or_else(|_| empty_object_schema());
    Tool {
        name: tool.name.to_string(),
        description: tool.description.map(|s| s.to_string()).unwrap_or_default(),
        input_schema: schema,
    }
}

#[async_trait]
impl ToolSession for McpClient {
    async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        let guard = self.client.lock().await;
        let client = guard.as_ref().ok_or(McpError::NotConnected)?;

        let result = client
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::from_service(e, McpError::Protocol))?;

        log_info!(
            self.logger,
            "[McpClient] Listed {} tools",
            result.tools.len()
        );

        Ok(result.tools.into_iter().map(to_tool).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<Value> {
        log_debug!(self.logger, "[McpClient] Calling tool: {}", name);

        let guard = self.client.lock().await;
        let client = guard.as_ref().ok_or(McpError::NotConnected)?;

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        let result = client
            .call_tool(params)
            .await
            .map_err(|e| McpError::from_service(e, McpError::ToolCallFailed))?;

        serde_json::to_value(&result).map_err(|e| McpError::Protocol(e.to_string()))
    }

    async fn close(&self) -> McpResult<()> {
        let taken = self.client.lock().await.take();
        if let Some(client) = taken {
            self.logger.info("[McpClient] Closing connection");
            client
                .cancel()
                .await
                .map_err(|e| McpError::Protocol(e.to_string()))?;
        }
        Ok(())
    }
}
