//! The model's final report and its text rendering

use serde::{Deserialize, Serialize};
use serde_json::Value;

const KNOWN_KEYS: &[&str] = &["summary", "generatedFiles", "commandsRun", "results", "nextSteps"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestStatus::Passed => write!(f, "passed"),
            TestStatus::Failed => write!(f, "failed"),
            TestStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    #[serde(default)]
    pub status: TestStatus,
    #[serde(default)]
    pub details: String,
}

/// Structured answer the model ends a run with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub generated_files: Vec<String>,
    #[serde(default)]
    pub commands_run: Vec<String>,
    #[serde(default)]
    pub results: TestResults,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

impl FinalReport {
    /// Parse a report out of model text
    ///
    /// Accepts bare JSON, a fenced code block, or JSON surrounded by prose.
    pub fn parse(text: &str) -> Option<Self> {
        candidates(text).into_iter().find_map(parse_candidate)
    }

    /// Parse, falling back to the raw text as the summary
    pub fn from_text(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|| Self {
            summary: text.trim().to_string(),
            ..Self::default()
        })
    }

    pub fn format_summary(&self) -> String {
        let details = if self.results.details.trim().is_empty() {
            "none"
        } else {
            self.results.details.trim()
        };

        [
            format!("Summary: {}", self.summary.trim()),
            format!("GeneratedFiles: {}", join_or_none(&self.generated_files)),
            format!("CommandsRun: {}", join_or_none(&self.commands_run)),
            format!("Results: {} - {}", self.results.status, details),
            format!("NextSteps: {}", join_or_none(&self.next_steps)),
        ]
        .join("\n")
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn candidates(text: &str) -> Vec<&str> {
    let mut out = Vec::new();

    if let Some(fenced) = fenced_block(text) {
        out.push(fenced);
    }
    out.push(text.trim());
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            out.push(&text[start..=end]);
        }
    }
    out
}

/// Contents of the first ``` block, with an optional language tag removed
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

fn parse_candidate(candidate: &str) -> Option<FinalReport> {
    let value: Value = serde_json::from_str(candidate).ok()?;
    let object = value.as_object()?;
    if !KNOWN_KEYS.iter().any(|k| object.contains_key(*k)) {
        return None;
    }
    serde_json::from_value(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"summary":"ok","generatedFiles":["a.spec.ts"],"commandsRun":[],"results":{"status":"passed","details":"all green"},"nextSteps":[]}"#;

    #[test]
    fn test_sample_format() {
        let report = FinalReport::parse(SAMPLE).unwrap();
        let text = report.format_summary();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Summary: ok");
        assert_eq!(lines[1], "GeneratedFiles: a.spec.ts");
        assert_eq!(lines[2], "CommandsRun: none");
        assert_eq!(lines[3], "Results: passed - all green");
        assert_eq!(lines[4], "NextSteps: none");
    }

    #[test]
    fn test_fenced_with_prose() {
        let text = format!("All done. Here is the report:\n```json\n{}\n```\nThanks!", SAMPLE);
        assert_eq!(FinalReport::parse(&text).unwrap().summary, "ok");
    }

    #[test]
    fn test_embedded_without_fence() {
        let text = format!("Report follows {} end", SAMPLE);
        assert_eq!(
            FinalReport::parse(&text).unwrap().results.status,
            TestStatus::Passed
        );
    }

    #[test]
    fn test_unknown_status_and_missing_fields() {
        let report = FinalReport::parse(r#"{"summary":"partial","results":{"status":"flaky"}}"#).unwrap();
        assert_eq!(report.results.status, TestStatus::Unknown);
        assert!(report.generated_files.is_empty());
    }

    #[test]
    fn test_fallback_to_raw_text() {
        let report = FinalReport::from_text("  I could not reach the site.  ");
        assert_eq!(report.summary, "I could not reach the site.");
        assert!(report.format_summary().contains("Results: unknown - none"));
    }

    #[test]
    fn test_unrelated_json_is_not_a_report() {
        assert!(FinalReport::parse(r#"{"foo": 1}"#).is_none());
        assert!(FinalReport::parse("[1, 2]").is_none());
    }
}
