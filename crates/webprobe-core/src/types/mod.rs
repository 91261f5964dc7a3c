//! Core types for LLM interactions
//!
//! This module contains the transcript and tool types shared by the
//! providers, the MCP client and the agent loop.

mod message;
mod tool;

pub use message::{ChatMessage, MessageRole};
pub use tool::{Tool, ToolCall, ToolResult};
pub(crate) use tool::empty_object_schema;
