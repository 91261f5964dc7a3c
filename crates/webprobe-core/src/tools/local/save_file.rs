//! save_test_file: write a generated test into the output directory

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{GeneratedFiles, LocalTool, ToolOutput};

pub struct SaveTestFileTool {
    files: GeneratedFiles,
}

impl SaveTestFileTool {
    pub fn new(files: GeneratedFiles) -> Self {
        Self { files }
    }
}

#[derive(Deserialize)]
struct SaveInput {
    filename: String,
    content: String,
}

#[async_trait]
impl LocalTool for SaveTestFileTool {
    fn name(&self) -> &str {
        "save_test_file"
    }

    fn description(&self) -> &str {
        "Save a Playwright test file into the generated tests directory. Overwrites an existing file with the same name."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "File name relative to the tests directory, e.g. login.spec.ts"
                },
                "content": {
                    "type": "string",
                    "description": "Complete file contents"
                }
            },
            "required": ["filename", "content"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolOutput {
        let input: SaveInput = serde_json::from_value(arguments)?;
        let path = self.files.resolve(&input.filename)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, input.content.as_bytes()).await?;

        Ok(json!({
            "saved": true,
            "path": input.filename.trim(),
            "bytes": input.content.len(),
        }))
    }
}
