//! Command-line entry point for webprobe.
//!
//! Loads `.env`, resolves settings (flags > environment > workspace YAML >
//! user YAML > defaults), runs the agent against one URL and prints the
//! outcome.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use webprobe_core::config::{
    AgentSettings, FileConfigProvider, ENV_MAX_ITERATIONS, ENV_MCP_URL, ENV_MODEL, ENV_OUTPUT_DIR,
    ENV_PROVIDER, ENV_SKIP_MCP,
};
use webprobe_core::logging::{ConsoleLogger, LogEvent, LogKind, Logger, ObserverLogger};
use webprobe_core::secrets::{ChainSecretStore, MemorySecretStore, SecretStore};
use webprobe_core::{Agent, RunOutcome};

/// Explore a web application and generate Playwright tests for it
#[derive(Parser, Debug)]
#[command(name = "webprobe", version, about)]
struct Cli {
    /// URL of the application to test
    url: String,

    /// File describing the application (API schema, data model, notes)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// LLM provider (openai, anthropic, gemini, ...)
    #[arg(short, long)]
    provider: Option<String>,

    /// Model name
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum LLM calls before giving up
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Run without the browser tool server
    #[arg(long)]
    skip_mcp: bool,

    /// Connect to an already running tool server instead of spawning one
    #[arg(long)]
    mcp_url: Option<String>,

    /// Directory the generated tests are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// API key for the provider (defaults to the provider's environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Workspace root for `.config/webprobe/config.yaml`
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    /// Print events as JSON lines
    #[arg(long, conflicts_with = "plain")]
    json: bool,

    /// Print events without colors
    #[arg(long)]
    plain: bool,

    /// Include debug messages
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Flag values laid over the process environment
    fn overrides(&self) -> MemorySecretStore {
        let store = MemorySecretStore::new();
        let set = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                // MemorySecretStore never refuses writes
                let _ = store.store(key, &value);
            }
        };

        set(ENV_PROVIDER, self.provider.clone());
        set(ENV_MODEL, self.model.clone());
        set(ENV_MAX_ITERATIONS, self.max_iterations.map(|n| n.to_string()));
        set(ENV_SKIP_MCP, self.skip_mcp.then(|| "true".to_string()));
        set(ENV_MCP_URL, self.mcp_url.clone());
        set(
            ENV_OUTPUT_DIR,
            self.output_dir.as_ref().map(|p| p.display().to_string()),
        );
        store
    }

    fn settings(&self) -> Result<AgentSettings> {
        let env = ChainSecretStore::overrides_then_env(Arc::new(self.overrides()));
        let user = FileConfigProvider::user();
        let workspace = FileConfigProvider::workspace(&self.workspace);

        let mut settings =
            AgentSettings::resolve(&env, &[&user, &workspace]).context("Invalid configuration")?;
        if let Some(key) = &self.api_key {
            settings.api_key = Some(key.clone());
        }
        Ok(settings)
    }

    fn logger(&self) -> Arc<dyn Logger> {
        if self.plain {
            return Arc::new(ConsoleLogger::new().verbose(self.verbose));
        }
        let json = self.json;
        Arc::new(
            ObserverLogger::from_fn(move |event| {
                if json {
                    if let Ok(line) = serde_json::to_string(&event) {
                        println!("{}", line);
                    }
                } else {
                    print_event(&event);
                }
            })
            .with_debug(self.verbose),
        )
    }
}

fn print_event(event: &LogEvent) {
    let time = event.timestamp.format("%H:%M:%S").to_string().dimmed();
    match event.kind {
        LogKind::Info => println!("{} {}", time, event.message),
        LogKind::Warning => eprintln!("{} {}", time, event.message.yellow()),
        LogKind::Error => eprintln!("{} {}", time, event.message.red().bold()),
        LogKind::Success => println!("{} {}", time, event.message.green()),
        LogKind::Agent => println!("{} {} {}", time, "agent>".cyan().bold(), event.message),
    }
}

fn print_outcome(outcome: &RunOutcome, json: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(outcome) {
            println!("{}", line);
        }
        return;
    }

    println!();
    if outcome.success {
        println!("{}", "Run completed".green().bold());
        if let Some(message) = &outcome.message {
            println!("{}", message);
        }
        if let Some(files) = &outcome.test_files {
            println!("{} {}", "Test files:".bold(), files.len());
            for file in files {
                println!("  {}", file);
            }
        }
    } else {
        println!("{}", "Run failed".red().bold());
        if let Some(error) = &outcome.error {
            println!("{}", error);
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let settings = cli.settings()?;
    let schema = match &cli.schema {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read schema file {}", path.display()))?,
        ),
        None => None,
    };

    let agent = Agent::from_settings(settings, cli.logger());
    let outcome = agent.run(&cli.url, schema.as_deref()).await;
    agent.shutdown().await;

    print_outcome(&outcome, cli.json);
    Ok(outcome.success)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}
