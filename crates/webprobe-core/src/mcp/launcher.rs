//! Locating the Node package runner used to start the tool server
//!
//! Resolution never fails: when nothing is found on disk the command is
//! handed to the platform shell and left to its own PATH lookup.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use which::which;

/// How to start a package-runner command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchSpec {
    /// Run a resolved executable directly
    Direct { program: PathBuf, args: Vec<String> },
    /// Hand a command line to the platform shell
    Shell {
        shell: String,
        flag: String,
        command_line: String,
    },
}

impl LaunchSpec {
    /// Build a process command for this spec
    pub fn to_command(&self) -> Command {
        match self {
            LaunchSpec::Direct { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            LaunchSpec::Shell {
                shell,
                flag,
                command_line,
            } => {
                let mut cmd = Command::new(shell);
                cmd.arg(flag).arg(command_line);
                cmd
            }
        }
    }

    /// Human-readable form for logs
    pub fn describe(&self) -> String {
        match self {
            LaunchSpec::Direct { program, args } => {
                format!("{} {}", program.display(), args.join(" "))
            }
            LaunchSpec::Shell {
                shell,
                flag,
                command_line,
            } => format!("{} {} \"{}\"", shell, flag, command_line),
        }
    }

    /// Whether discovery fell through to the shell
    pub fn is_shell_fallback(&self) -> bool {
        matches!(self, LaunchSpec::Shell { .. })
    }
}

/// Resolve how to run `npx <args>`
///
/// Order: explicit program override, `npx` on PATH, `npx` next to the
/// `node` on PATH, well-known install locations, then the shell.
pub fn resolve_launch_spec(program_override: Option<&Path>, args: &[String]) -> LaunchSpec {
    let direct = |program: PathBuf| LaunchSpec::Direct {
        program,
        args: args.to_vec(),
    };

    if let Some(program) = program_override.filter(|p| !p.as_os_str().is_empty()) {
        return direct(program.to_path_buf());
    }

    if let Some(program) = detect_npx() {
        return direct(program);
    }

    shell_fallback(args)
}

fn detect_npx() -> Option<PathBuf> {
    if let Ok(path) = which(npx_name()) {
        return Some(path);
    }

    if let Ok(node) = which(node_name()) {
        if let Some(candidate) = node.parent().map(|dir| dir.join(npx_name())) {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    os_specific_npx_paths().into_iter().find(|p| p.exists())
}

fn shell_fallback(args: &[String]) -> LaunchSpec {
    #[cfg(target_os = "windows")]
    {
        LaunchSpec::Shell {
            shell: "cmd".to_string(),
            flag: "/C".to_string(),
            command_line: command_line(args, quote_cmd),
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        LaunchSpec::Shell {
            shell: "sh".to_string(),
            flag: "-c".to_string(),
            command_line: command_line(args, quote_posix),
        }
    }
}

fn command_line(args: &[String], quote: fn(&str) -> String) -> String {
    let mut parts = vec!["npx".to_string()];
    parts.extend(args.iter().map(|a| quote(a)));
    parts.join(" ")
}

/// Single-quote for `sh -c`; nothing inside is expanded
#[cfg_attr(target_os = "windows", allow(dead_code))]
fn quote_posix(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Caret-escape `cmd /C` metacharacters
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn quote_cmd(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len());
    for c in arg.chars() {
        if matches!(c, '^' | '&' | '|' | '<' | '>' | '(' | ')' | '%' | '!' | '"' | ' ' | '\t') {
            quoted.push('^');
        }
        quoted.push(c);
    }
    quoted
}

fn npx_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "npx.cmd"
    } else {
        "npx"
    }
}

fn node_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "node.exe"
    } else {
        "node"
    }
}

fn os_specific_npx_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        ["ProgramFiles", "ProgramFiles(x86)"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|root| PathBuf::from(root).join("nodejs").join("npx.cmd"))
            .collect()
    }

    #[cfg(not(target_os = "windows"))]
    {
        let mut paths = vec![
            PathBuf::from("/usr/local/bin/npx"),
            PathBuf::from("/opt/homebrew/bin/npx"),
            PathBuf::from("/usr/bin/npx"),
        ];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".volta").join("bin").join("npx"));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Vec<String> {
        vec!["@playwright/mcp@latest".to_string(), "--headless".to_string()]
    }

    #[test]
    fn test_override_wins() {
        let spec = resolve_launch_spec(Some(Path::new("/custom/npx")), &args());
        assert_eq!(
            spec,
            LaunchSpec::Direct {
                program: PathBuf::from("/custom/npx"),
                args: args(),
            }
        );
    }

    #[test]
    fn test_empty_override_ignored() {
        let spec = resolve_launch_spec(Some(Path::new("")), &args());
        if let LaunchSpec::Direct { program, .. } = spec {
            assert!(!program.as_os_str().is_empty());
        }
    }

    #[test]
    fn test_never_fails() {
        let spec = resolve_launch_spec(None, &args());
        match &spec {
            LaunchSpec::Direct { args: a, .. } => assert_eq!(a, &args()),
            LaunchSpec::Shell { command_line, .. } => {
                assert!(command_line.starts_with("npx "));
                assert!(command_line.contains("@playwright/mcp@latest"));
            }
        }
        assert!(!spec.describe().is_empty());
    }

    #[test]
    fn test_shell_fallback_is_a_shell() {
        let spec = shell_fallback(&["test".to_string()]);
        assert!(spec.is_shell_fallback());
    }

    #[test]
    fn test_posix_quoting() {
        let line = command_line(
            &["test".to_string(), "my spec.ts".to_string(), "it's.ts".to_string()],
            quote_posix,
        );
        assert_eq!(line, r"npx 'test' 'my spec.ts' 'it'\''s.ts'");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_posix_quoting_blocks_substitution() {
        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("marker");
        let arg = format!("$(touch {}).spec.ts", marker.display());

        let line = format!("printf %s {}", quote_posix(&arg));
        let output = Command::new("sh").arg("-c").arg(&line).output().await.unwrap();

        assert_eq!(String::from_utf8_lossy(&output.stdout), arg);
        assert!(!marker.exists());
    }

    #[test]
    fn test_cmd_quoting() {
        assert_eq!(quote_cmd("a.spec.ts"), "a.spec.ts");
        assert_eq!(quote_cmd("a&calc|x"), "a^&calc^|x");
        assert_eq!(quote_cmd("%PATH%"), "^%PATH^%");
        assert_eq!(quote_cmd("my spec.ts"), "my^ spec.ts");
    }
}
