use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use super::*;
use crate::config::AgentSettings;
use crate::logging::{LogKind, Logger, NoOpLogger, RecordingLogger};
use crate::mcp::testing::{StubConnector, StubSession};
use crate::mcp::{ExternalToolClient, McpError};
use crate::providers::{MockProvider, Provider};
use crate::types::{ChatMessage, MessageRole, ToolCall};

const FINAL_JSON: &str = r#"{"summary":"ok","generatedFiles":["a.spec.ts"],"commandsRun":["npx playwright test"],"results":{"status":"passed","details":"all green"},"nextSteps":[]}"#;

struct Harness {
    dir: TempDir,
    connector: Arc<StubConnector>,
    provider: Arc<MockProvider>,
    logger: Arc<RecordingLogger>,
    agent: Agent,
}

fn harness_with(provider: MockProvider, session: StubSession, configure: impl FnOnce(&mut AgentSettings)) -> Harness {
    let dir = TempDir::new().unwrap();
    let mut settings = AgentSettings {
        api_key: Some("test-key".to_string()),
        output_dir: dir.path().to_path_buf(),
        ..AgentSettings::default()
    };
    configure(&mut settings);

    let logger = Arc::new(RecordingLogger::new());
    let shared: Arc<dyn Logger> = logger.clone();
    let connector = Arc::new(StubConnector::new(session));
    let client = Arc::new(ExternalToolClient::new(connector.clone(), shared.clone()));
    let provider = Arc::new(provider);
    let agent = Agent::new(settings, provider.clone() as Arc<dyn Provider>, client, shared);

    Harness {
        dir,
        connector,
        provider,
        logger,
        agent,
    }
}

fn harness(provider: MockProvider, session: StubSession) -> Harness {
    harness_with(provider, session, |_| {})
}

fn quiet() -> Arc<dyn Logger> {
    Arc::new(NoOpLogger::new())
}

fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall::new(id, name, arguments)
}

fn tool_turn(calls: Vec<ToolCall>) -> ChatMessage {
    ChatMessage::assistant_with_tools("", calls)
}

/// Tool messages the provider saw on its last request
fn last_tool_messages(provider: &MockProvider) -> Vec<ChatMessage> {
    let requests = provider.requests();
    let last = requests.last().expect("at least one request");
    last.messages
        .iter()
        .filter(|m| m.role == MessageRole::Tool)
        .cloned()
        .collect()
}

#[tokio::test]
async fn test_missing_credential_fails_before_llm() {
    let h = harness_with(
        MockProvider::fixed(FINAL_JSON, quiet()),
        StubSession::default(),
        |s| s.api_key = None,
    );

    let outcome = h.agent.run("https://example.com", None).await;

    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("openai"));
    assert_eq!(h.provider.call_count(), 0);
    assert_eq!(h.connector.connect_count(), 0);
}

#[tokio::test]
async fn test_final_answer_after_one_call() {
    let h = harness(MockProvider::fixed(FINAL_JSON, quiet()), StubSession::default());
    std::fs::write(h.dir.path().join("a.spec.ts"), "test").unwrap();

    let outcome = h.agent.run("https://example.com", Some("type Query { users: [User] }")).await;

    assert!(outcome.success);
    assert_eq!(outcome.iterations, 1);
    assert_eq!(h.provider.call_count(), 1);

    let message = outcome.message.unwrap();
    assert!(message.contains("Summary: ok"));
    assert!(message.contains("GeneratedFiles: a.spec.ts"));
    assert!(message.contains("Results: passed - all green"));
    assert!(message.contains("NextSteps: none"));
    assert_eq!(outcome.test_files, Some(vec!["a.spec.ts".to_string()]));
    assert!(outcome.error.is_none());

    let request = &h.provider.requests()[0];
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, MessageRole::System);
    assert!(request.messages[1].content.contains("https://example.com"));
    assert!(request.messages[1].content.contains("type Query"));

    assert!(h
        .logger
        .messages(LogKind::Success)
        .iter()
        .any(|m| m.starts_with("[Agent] Finished after 1 iteration(s), 1 test file(s)")));
}

#[tokio::test]
async fn test_plain_text_answer_becomes_summary() {
    let h = harness(MockProvider::fixed("All done, nothing to report", quiet()), StubSession::default());

    let outcome = h.agent.run("https://example.com", None).await;

    assert!(outcome.success);
    let message = outcome.message.unwrap();
    assert!(message.starts_with("Summary: All done, nothing to report"));
    assert!(message.contains("Results: unknown - none"));
    assert_eq!(outcome.test_files, Some(Vec::new()));
}

#[tokio::test]
async fn test_iteration_bound() {
    let h = harness_with(
        MockProvider::always_tool_call("browser_snapshot", "{}", quiet()),
        StubSession::with_tools(&["browser_snapshot"]),
        |s| s.max_iterations = 3,
    );

    let outcome = h.agent.run("https://example.com", None).await;

    assert!(!outcome.success);
    assert_eq!(h.provider.call_count(), 3);
    assert_eq!(outcome.iterations, 3);
    assert!(outcome.error.unwrap().contains('3'));
    assert_eq!(h.connector.session.call_names().len(), 3);
    assert_eq!(h.logger.messages(LogKind::Error).len(), 1);
}

#[tokio::test]
async fn test_every_call_gets_one_tool_message() {
    let h = harness(
        MockProvider::script(
            vec![
                tool_turn(vec![
                    call("c1", "browser_navigate", r#"{"url":"https://example.com"}"#),
                    call("c2", "browser_snapshot", "{}"),
                ]),
                ChatMessage::assistant(FINAL_JSON),
            ],
            quiet(),
        ),
        StubSession::with_tools(&["browser_navigate", "browser_snapshot"]),
    );

    let outcome = h.agent.run("https://example.com", None).await;
    assert!(outcome.success);

    let messages = &h.provider.requests()[1].messages;
    assert_eq!(messages.len(), 5);
    assert!(messages[2].has_tool_calls());
    assert_eq!(messages[3].tool_call_id.as_deref(), Some("c1"));
    assert_eq!(messages[4].tool_call_id.as_deref(), Some("c2"));

    let calls = h.connector.session.calls.lock().clone();
    assert_eq!(calls[0], ("browser_navigate".to_string(), json!({ "url": "https://example.com" })));
}

#[tokio::test]
async fn test_navigation_guard_blocks_third_back() {
    let back = |id: &str| call(id, "browser_navigate_back", "{}");
    let h = harness(
        MockProvider::script(
            vec![
                tool_turn(vec![back("b1"), back("b2"), back("b3"), back("b4")]),
                ChatMessage::assistant(FINAL_JSON),
            ],
            quiet(),
        ),
        StubSession::with_tools(&["browser_navigate_back"]),
    );

    let outcome = h.agent.run("https://example.com", None).await;
    assert!(outcome.success);

    assert_eq!(h.connector.session.call_names().len(), 2);

    let tool_messages = last_tool_messages(&h.provider);
    assert_eq!(tool_messages.len(), 4);
    assert!(!tool_messages[1].content.contains("explicit URL"));
    assert!(tool_messages[2].content.contains("explicit URL"));
    assert!(tool_messages[3].content.contains("explicit URL"));
}

#[tokio::test]
async fn test_guard_resets_across_turns() {
    let back = |id: &str| call(id, "browser_navigate_back", "{}");
    let h = harness(
        MockProvider::script(
            vec![
                tool_turn(vec![back("b1"), back("b2")]),
                tool_turn(vec![call("s1", "browser_snapshot", "{}")]),
                tool_turn(vec![back("b3"), back("b4")]),
                ChatMessage::assistant(FINAL_JSON),
            ],
            quiet(),
        ),
        StubSession::with_tools(&["browser_navigate_back", "browser_snapshot"]),
    );

    assert!(h.agent.run("https://example.com", None).await.success);
    assert_eq!(h.connector.session.call_names().len(), 5);
}

#[tokio::test]
async fn test_local_tool_takes_priority() {
    let h = harness(
        MockProvider::script(
            vec![
                tool_turn(vec![call(
                    "c1",
                    "save_test_file",
                    r#"{"filename":"login.spec.ts","content":"test('login', async () => {});"}"#,
                )]),
                ChatMessage::assistant(FINAL_JSON),
            ],
            quiet(),
        ),
        StubSession::with_tools(&["save_test_file", "browser_click"]),
    );

    let outcome = h.agent.run("https://example.com", None).await;

    assert!(outcome.success);
    assert!(h.connector.session.call_names().is_empty());
    assert!(h.dir.path().join("login.spec.ts").exists());
    assert_eq!(outcome.test_files, Some(vec!["login.spec.ts".to_string()]));

    let names = &h.provider.requests()[0].tool_names;
    assert_eq!(names.iter().filter(|n| *n == "save_test_file").count(), 1);
    assert_eq!(names[0], "browser_click");
}

#[tokio::test]
async fn test_malformed_arguments_become_empty_object() {
    let h = harness(
        MockProvider::script(
            vec![
                tool_turn(vec![call("c1", "browser_snapshot", "{not json")]),
                ChatMessage::assistant(FINAL_JSON),
            ],
            quiet(),
        ),
        StubSession::with_tools(&["browser_snapshot"]),
    );

    assert!(h.agent.run("https://example.com", None).await.success);
    let calls = h.connector.session.calls.lock().clone();
    assert_eq!(calls[0].1, json!({}));
}

#[tokio::test]
async fn test_connection_loss_reconnects() {
    let session = StubSession::with_tools(&["browser_snapshot"]).respond(Err(McpError::ConnectionClosed));
    let h = harness(
        MockProvider::script(
            vec![
                tool_turn(vec![call("c1", "browser_snapshot", "{}")]),
                tool_turn(vec![call("c2", "browser_snapshot", "{}")]),
                ChatMessage::assistant(FINAL_JSON),
            ],
            quiet(),
        ),
        session,
    );

    let outcome = h.agent.run("https://example.com", None).await;

    assert!(outcome.success);
    assert_eq!(h.connector.connect_count(), 2);
    assert_eq!(h.connector.session.call_names().len(), 2);

    let first = &h.provider.requests()[1].messages[3];
    let payload: Value = serde_json::from_str(&first.content).unwrap();
    assert_eq!(payload["status"], "reconnecting");
}

#[tokio::test]
async fn test_fatal_tool_error_is_reported_to_model() {
    let session = StubSession::with_tools(&["browser_click"])
        .respond(Err(McpError::ToolCallFailed("element not found".into())));
    let h = harness(
        MockProvider::script(
            vec![
                tool_turn(vec![call("c1", "browser_click", r#"{"ref":"e4"}"#)]),
                ChatMessage::assistant(FINAL_JSON),
            ],
            quiet(),
        ),
        session,
    );

    assert!(h.agent.run("https://example.com", None).await.success);

    let tool_messages = last_tool_messages(&h.provider);
    let payload: Value = serde_json::from_str(&tool_messages[0].content).unwrap();
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .starts_with("tool \"browser_click\" failed:"));
}

#[tokio::test]
async fn test_connect_failure_runs_with_local_tools() {
    let dir = TempDir::new().unwrap();
    let settings = AgentSettings {
        api_key: Some("test-key".to_string()),
        output_dir: dir.path().to_path_buf(),
        ..AgentSettings::default()
    };
    let mut connector = StubConnector::new(StubSession::with_tools(&["browser_snapshot"]));
    connector.fail_connect = true;
    let client = Arc::new(ExternalToolClient::new(Arc::new(connector), quiet()));
    let provider = Arc::new(MockProvider::script(
        vec![
            tool_turn(vec![call("c1", "browser_snapshot", "{}")]),
            ChatMessage::assistant(FINAL_JSON),
        ],
        quiet(),
    ));
    let agent = Agent::new(settings, provider.clone() as Arc<dyn Provider>, client, quiet());

    let outcome = agent.run("https://example.com", None).await;
    assert!(outcome.success);

    let names = &provider.requests()[0].tool_names;
    assert_eq!(
        names,
        &vec!["save_test_file".to_string(), "run_tests".to_string(), "list_test_files".to_string()]
    );

    let tool_messages = last_tool_messages(&provider);
    assert!(tool_messages[0].content.contains("not initialized"));
}

#[tokio::test]
async fn test_custom_local_tools() {
    let h = harness(MockProvider::fixed(FINAL_JSON, quiet()), StubSession::with_tools(&["browser_click"]));
    let agent = h.agent.with_local_tools(crate::tools::LocalToolTable::new());

    assert!(agent.run("https://example.com", None).await.success);
    assert_eq!(h.provider.requests()[0].tool_names, vec!["browser_click".to_string()]);
}

#[tokio::test]
async fn test_provider_error_is_failure_outcome() {
    let h = harness(MockProvider::error("rate limited", quiet()), StubSession::default());

    let outcome = h.agent.run("https://example.com", None).await;

    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("rate limited"));
    assert_eq!(outcome.iterations, 0);
    assert_eq!(h.provider.call_count(), 1);
}

#[tokio::test]
async fn test_shutdown_closes_session() {
    let h = harness(MockProvider::fixed(FINAL_JSON, quiet()), StubSession::default());

    h.agent.run("https://example.com", None).await;
    assert!(h.agent.client().is_connected());

    h.agent.shutdown().await;
    assert!(!h.agent.client().is_connected());
    assert_eq!(
        h.connector.session.closed.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[test]
fn test_outcome_serialization() {
    let outcome = RunOutcome {
        success: false,
        error: Some("boom".to_string()),
        ..RunOutcome::default()
    };

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value, json!({ "success": false, "error": "boom", "iterations": 0 }));

    let done = RunOutcome {
        success: true,
        test_files: Some(vec!["a.spec.ts".to_string()]),
        ..RunOutcome::default()
    };
    assert_eq!(serde_json::to_value(&done).unwrap()["testFiles"], json!(["a.spec.ts"]));
}
