//! Normalization of raw tool results
//!
//! Every source of tool output is first tagged as a `RawToolOutcome`, then
//! turned into a `ToolResult` by one function.

use serde_json::Value;

use crate::types::ToolResult;

pub const GENERIC_TOOL_ERROR: &str = "Tool reported an error without details";

/// A tool result before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawToolOutcome {
    /// A local tool returned a value
    LocalSuccess(Value),
    /// A server result with no error signal
    ExternalStructured(Value),
    /// A server result with `isError: true`
    ExternalErrorFlagged { message: String },
    /// A server result whose text content reports an error
    ExternalTextError { message: String },
}

impl RawToolOutcome {
    /// Tag a raw server result (a serialized `CallToolResult`)
    pub fn classify_external(raw: Value) -> Self {
        let texts = text_items(&raw);

        if raw.get("isError").and_then(Value::as_bool) == Some(true) {
            let joined = texts.join("\n");
            let message = strip_error_prefix(&joined);
            return RawToolOutcome::ExternalErrorFlagged {
                message: if message.is_empty() {
                    GENERIC_TOOL_ERROR.to_string()
                } else {
                    message
                },
            };
        }

        let flagged = texts.iter().find(|text| {
            let lower = text.to_lowercase();
            lower.contains("error:") || lower.contains("unknown error")
        });

        match flagged {
            Some(text) => {
                let message = strip_error_prefix(text);
                RawToolOutcome::ExternalTextError {
                    message: if message.is_empty() {
                        GENERIC_TOOL_ERROR.to_string()
                    } else {
                        message
                    },
                }
            }
            None => RawToolOutcome::ExternalStructured(raw),
        }
    }

    pub fn normalize(self) -> ToolResult {
        match self {
            RawToolOutcome::LocalSuccess(value) | RawToolOutcome::ExternalStructured(value) => {
                ToolResult::success(value)
            }
            RawToolOutcome::ExternalErrorFlagged { message }
            | RawToolOutcome::ExternalTextError { message } => ToolResult::failure(message),
        }
    }
}

fn text_items(raw: &Value) -> Vec<String> {
    raw.get("content")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|item| item.get("text").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Trim and drop one leading "Error:" (any case)
fn strip_error_prefix(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.get(..6) {
        Some(head) if head.eq_ignore_ascii_case("error:") => trimmed[6..].trim().to_string(),
        _ => trimmed.to_string(),
    }
}
