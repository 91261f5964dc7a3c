//! Fixed instructions given to the model

pub const SYSTEM_PROMPT: &str = r#"You are an autonomous QA engineer. You explore a web application with browser tools, decide which user flows are worth covering, write Playwright tests in TypeScript, run them and fix them until they pass or you understand why they fail.

Workflow:
1. Open the target URL with browser_navigate and inspect pages with browser_snapshot.
2. Explore the main flows. Prefer navigating to explicit URLs over going back repeatedly.
3. Save each test with save_test_file (file names ending in .spec.ts).
4. Run them with run_tests, read the output and fix failing tests.
5. Use list_test_files to check what has been saved.

When you are finished, reply WITHOUT calling any tool, with only this JSON object:
{
  "summary": "<what was tested>",
  "generatedFiles": ["<file>", ...],
  "commandsRun": ["<command>", ...],
  "results": { "status": "passed" | "failed" | "unknown", "details": "<short explanation>" },
  "nextSteps": ["<suggestion>", ...]
}"#;

/// First user message of a run
pub fn initial_user_message(target: &str, schema: Option<&str>) -> String {
    let mut message = format!("Target application: {}\n\nExplore it and generate end-to-end tests.", target.trim());

    if let Some(schema) = schema.map(str::trim).filter(|s| !s.is_empty()) {
        message.push_str("\n\nUse this description of the application and its data to guide the scenarios:\n");
        message.push_str(schema);
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let plain = initial_user_message(" https://example.com ", None);
        assert!(plain.starts_with("Target application: https://example.com\n"));
        assert!(!plain.contains("description of the application"));

        let with_schema = initial_user_message("https://example.com", Some("type User { id: ID! }"));
        assert!(with_schema.ends_with("type User { id: ID! }"));

        assert_eq!(initial_user_message("u", Some("   ")), initial_user_message("u", None));
    }
}
