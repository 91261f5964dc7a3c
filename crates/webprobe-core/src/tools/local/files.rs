//! The directory generated tests live in

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::ToolError;

const SHELL_METACHARACTERS: &[char] = &[
    '$', '`', ';', '|', '&', '<', '>', '(', ')', '{', '}', '!', '*', '?', '"', '\'', '%', '^',
];

/// Output directory for generated test files
///
/// All tool-supplied names are relative to this root and may not leave it.
#[derive(Debug, Clone)]
pub struct GeneratedFiles {
    root: PathBuf,
}

impl GeneratedFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the output directory if missing
    pub fn ensure_root(&self) -> Result<(), ToolError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Map a relative file name into the output directory
    ///
    /// Absolute paths, drive prefixes, `..` components and shell
    /// metacharacters are rejected.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, ToolError> {
        let trimmed = filename.trim();
        if trimmed.is_empty() {
            return Err(ToolError::invalid_path(filename, "empty file name"));
        }
        if trimmed.chars().any(|c| SHELL_METACHARACTERS.contains(&c) || c.is_control()) {
            return Err(ToolError::invalid_path(filename, "unsupported character in file name"));
        }

        let path = Path::new(trimmed);
        if path.is_absolute() || path.has_root() {
            return Err(ToolError::invalid_path(filename, "absolute paths are not allowed"));
        }

        let mut resolved = self.root.clone();
        for component in path.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(ToolError::invalid_path(filename, "path escapes the output directory"))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(ToolError::invalid_path(filename, "absolute paths are not allowed"))
                }
            }
        }

        if resolved == self.root {
            return Err(ToolError::invalid_path(filename, "not a file name"));
        }
        Ok(resolved)
    }

    /// Files under the output directory, relative, `/`-separated and sorted
    ///
    /// A missing directory lists as empty.
    pub fn list(&self) -> Vec<String> {
        let mut files = Vec::new();
        collect_files(&self.root, &self.root, &mut files);
        files.sort();
        files
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            let name = entry.file_name();
            // Skip dependency and report folders playwright creates
            if matches!(
                name.to_str(),
                Some("node_modules" | "test-results" | "playwright-report")
            ) {
                continue;
            }
            collect_files(root, &path, out);
        } else if file_type.is_file() {
            if let Ok(relative) = path.strip_prefix(root) {
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                out.push(parts.join("/"));
            }
        }
    }
}
