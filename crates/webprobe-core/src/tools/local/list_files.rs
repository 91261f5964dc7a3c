//! list_test_files: enumerate what has been generated so far

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{GeneratedFiles, LocalTool, ToolOutput};

pub struct ListTestFilesTool {
    files: GeneratedFiles,
}

impl ListTestFilesTool {
    pub fn new(files: GeneratedFiles) -> Self {
        Self { files }
    }
}

#[async_trait]
impl LocalTool for ListTestFilesTool {
    fn name(&self) -> &str {
        "list_test_files"
    }

    fn description(&self) -> &str {
        "List the test files saved in the generated tests directory."
    }

    fn schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: Value) -> ToolOutput {
        Ok(json!({ "files": self.files.list() }))
    }
}
