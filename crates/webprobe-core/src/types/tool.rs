//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Tool descriptor exposed to the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (function name), unique across the aggregated set
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", default = "empty_object_schema")]
    pub input_schema: Value,
}

pub(crate) fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

impl Tool {
    /// Create a new tool descriptor with an empty object schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: empty_object_schema(),
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

/// Tool call requested by the LLM
///
/// `arguments` is raw, model-authored text. Use [`ToolCall::parse_arguments`]
/// rather than trusting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Raw argument text
    pub arguments: String,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the raw arguments into a JSON object.
    ///
    /// Anything that is not a JSON object (bad syntax, arrays, scalars,
    /// empty text) yields an empty object.
    pub fn parse_arguments(&self) -> Value {
        match serde_json::from_str::<Value>(&self.arguments) {
            Ok(value @ Value::Object(_)) => value,
            _ => Value::Object(Map::new()),
        }
    }
}

/// Canonical result of one tool call, whatever its source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the call succeeded
    pub success: bool,
    /// Structured payload (raw tool output on success)
    #[serde(default)]
    pub payload: Value,
    /// Failure description
    #[serde(rename = "errorMessage", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(payload: Value) -> Self {
        Self {
            success: true,
            payload,
            error_message: None,
        }
    }

    /// Create a failed tool result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: Value::Null,
            error_message: Some(message.into()),
        }
    }

    /// Render the result as transcript text.
    ///
    /// String payloads are passed through, other payloads are serialized as
    /// JSON, and failures become `{"error": "<message>"}`.
    pub fn to_transcript_text(&self) -> String {
        if !self.success {
            let message = self.error_message.as_deref().unwrap_or("Unknown error");
            return json!({ "error": message }).to_string();
        }
        match &self.payload {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_creation() {
        let tool = Tool::new("save_test_file", "Save a test file").with_schema(json!({
            "type": "object",
            "properties": { "filename": { "type": "string" } },
            "required": ["filename"]
        }));

        assert_eq!(tool.name, "save_test_file");
        assert_eq!(tool.input_schema["required"][0], "filename");
    }

    #[test]
    fn test_tool_default_schema_is_object() {
        let tool = Tool::new("list_test_files", "List files");
        assert_eq!(tool.input_schema["type"], "object");
    }

    #[test]
    fn test_parse_arguments_object() {
        let call = ToolCall::new("c1", "browser_navigate", r#"{"url":"https://example.com"}"#);
        assert_eq!(call.parse_arguments()["url"], "https://example.com");
    }

    #[test]
    fn test_parse_arguments_falls_back_to_empty_object() {
        for raw in ["", "{not json", "[1,2]", "42", "\"text\""] {
            let call = ToolCall::new("c1", "t", raw);
            assert_eq!(call.parse_arguments(), json!({}), "raw = {raw:?}");
        }
    }

    #[test]
    fn test_tool_result_transcript_text() {
        let text = ToolResult::success(json!("plain")).to_transcript_text();
        assert_eq!(text, "plain");

        let structured = ToolResult::success(json!({"files": ["a.spec.ts"]})).to_transcript_text();
        assert_eq!(structured, r#"{"files":["a.spec.ts"]}"#);

        let failed = ToolResult::failure("boom").to_transcript_text();
        assert_eq!(failed, r#"{"error":"boom"}"#);
    }
}
