//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to talk to the browser automation server.
//! Supports child-process (stdio) and HTTP transports.
//!
//! # Example
//!
//! ```rust,ignore
//! use webprobe_core::mcp::{ExternalToolClient, ProcessConnector};
//! use std::sync::Arc;
//!
//! let connector = ProcessConnector::new(vec!["@playwright/mcp@latest".into()], logger.clone());
//! let client = ExternalToolClient::new(Arc::new(connector), logger);
//!
//! client.initialize().await;
//! let tools = client.list_tools().await;
//! client.shutdown().await;
//! ```

mod client;
pub mod launcher;
mod session;

pub use client::{to_tool, McpClient, McpError, McpResult};
pub use launcher::{resolve_launch_spec, LaunchSpec};
pub use session::{ExternalToolClient, ProcessConnector, SessionConnector, ToolSession};

#[cfg(test)]
pub(crate) use session::testing;
