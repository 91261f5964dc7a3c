//! Classification of tool-session failures
//!
//! Applies to errors raised by a session call, never to result content the
//! server returns. Structured `McpError` variants are checked first, then
//! message patterns (case-insensitive).

use serde_json::{json, Value};

use crate::mcp::McpError;

const CONNECTION_LOSS_PATTERNS: &[&str] = &["connection closed", "not connected", "transport closed"];
const TIMEOUT_PATTERNS: &[&str] = &["timed out", "timeout"];

/// How a failed tool call should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The session is gone; drop it and reconnect
    TransientConnectionLoss,
    /// The call took too long; the session is still usable
    TransientTimeout,
    /// Report as a tool failure
    Fatal,
}

pub fn classify_failure(err: &McpError) -> FailureClass {
    match err {
        McpError::ConnectionClosed | McpError::NotConnected => FailureClass::TransientConnectionLoss,
        McpError::Timeout(_) => FailureClass::TransientTimeout,
        other => classify_message(&other.to_string()),
    }
}

fn classify_message(message: &str) -> FailureClass {
    let lower = message.to_lowercase();
    if CONNECTION_LOSS_PATTERNS.iter().any(|p| lower.contains(p)) {
        FailureClass::TransientConnectionLoss
    } else if TIMEOUT_PATTERNS.iter().any(|p| lower.contains(p)) {
        FailureClass::TransientTimeout
    } else {
        FailureClass::Fatal
    }
}

/// Payload returned to the model after a lost connection
pub fn reconnecting_payload(tool: &str) -> Value {
    json!({
        "status": "reconnecting",
        "message": format!(
            "The connection to the browser tool server was lost and will be re-established. Retry the \"{}\" call.",
            tool
        ),
    })
}

/// Payload returned to the model after a timeout
pub fn timeout_payload(tool: &str) -> Value {
    json!({
        "status": "timeout",
        "message": format!(
            "The \"{}\" call timed out. The page may still be loading; retry or take a snapshot first.",
            tool
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_variants() {
        assert_eq!(
            classify_failure(&McpError::ConnectionClosed),
            FailureClass::TransientConnectionLoss
        );
        assert_eq!(
            classify_failure(&McpError::NotConnected),
            FailureClass::TransientConnectionLoss
        );
        assert_eq!(
            classify_failure(&McpError::Timeout("60s".into())),
            FailureClass::TransientTimeout
        );
    }

    #[test]
    fn test_message_patterns() {
        assert_eq!(
            classify_failure(&McpError::ToolCallFailed("Transport closed".into())),
            FailureClass::TransientConnectionLoss
        );
        assert_eq!(
            classify_message("page.goto: TIMEOUT 30000ms exceeded"),
            FailureClass::TransientTimeout
        );
        assert_eq!(classify_message("request Timed Out"), FailureClass::TransientTimeout);
        assert_eq!(classify_message("element not found"), FailureClass::Fatal);
    }

    #[test]
    fn test_payloads_name_the_tool() {
        let payload = reconnecting_payload("browser_click");
        assert_eq!(payload["status"], "reconnecting");
        assert!(payload["message"].as_str().unwrap().contains("browser_click"));
        assert_eq!(timeout_payload("browser_wait_for")["status"], "timeout");
    }
}
