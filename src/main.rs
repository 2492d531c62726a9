// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! mcp-router entry point - CLI and interactive session.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::{debug, info};

use mcp_router::agent::{Agent, AgentConfig};
use mcp_router::mcp::{ConnectionManager, McpConfig, ToolBackend};
use mcp_router::providers::{api_key_from_env, create_provider, DEFAULT_MODEL};
use mcp_router::providers::openai::{DEFAULT_TIMEOUT_SECS, OPENAI_BASE_URL};
use mcp_router::repl::{run_session, run_until_interrupted};
use mcp_router::telemetry::{init_telemetry, TelemetryConfig};
use mcp_router::types::ProviderConfig;

/// Version string.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Route chat requests to tools on MCP servers.
#[derive(Parser)]
#[command(name = "mcp-router")]
#[command(author, version, about = "Route chat requests to tools on MCP servers", long_about = None)]
struct Cli {
    /// MCP server configuration file
    #[arg(short, long, env = "MCP_ROUTER_CONFIG", default_value = mcp_router::mcp::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Model to use
    #[arg(short, long, env = "MCP_ROUTER_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL for the API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = OPENAI_BASE_URL)]
    base_url: String,

    /// Model request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Show debug output
    #[arg(long, conflicts_with = "quiet")]
    debug: bool,

    /// Only show warnings and errors
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover and list the tools offered to the model
    Tools {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show version information
    Version,
}

/// Output format for the tools listing.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let telemetry = if cli.debug {
        TelemetryConfig::development()
    } else if cli.quiet {
        TelemetryConfig::quiet()
    } else {
        TelemetryConfig::default()
    };
    init_telemetry(&telemetry)?;

    match cli.command {
        Some(Commands::Version) => {
            println!("mcp-router {}", VERSION);
            Ok(())
        }
        Some(Commands::Tools { format }) => list_tools(&cli.config, format).await,
        None => run_chat(&cli).await,
    }
}

fn load_config(path: &Path) -> anyhow::Result<McpConfig> {
    let config = McpConfig::load_from_file(path)
        .with_context(|| format!("Failed to load MCP config from {}", path.display()))?;
    debug!(path = %path.display(), servers = config.servers.len(), "Loaded MCP config");
    Ok(config)
}

async fn list_tools(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let mut manager = ConnectionManager::new(load_config(path)?);
    manager.initialize().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(manager.functions())?);
        }
        OutputFormat::Text => {
            let catalog = manager.catalog();
            for server in catalog.server_names() {
                println!("{}", server.bright_blue().bold());
                let tools = catalog.server_tools(server).into_iter().flat_map(|t| t.values());
                let mut any = false;
                for tool in tools {
                    any = true;
                    println!("  {:<24} {}", tool.name.green(), tool.description.dimmed());
                }
                if !any {
                    println!("  {}", "(no tools)".dimmed());
                }
            }
        }
    }

    Ok(())
}

async fn run_chat(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.config)?;
    let api_key = api_key_from_env()?;

    let provider_config = ProviderConfig::new(api_key, cli.model.as_str())
        .with_base_url(cli.base_url.as_str())
        .with_timeout_ms(cli.timeout_secs.saturating_mul(1000));
    let provider = create_provider(provider_config)?;
    info!(provider = %provider.name(), model = %provider.model(), "Using model");

    let mut manager = ConnectionManager::new(config);
    manager.initialize().await;

    let agent = Agent::new(provider, AgentConfig::default());
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    let session = run_session(&agent, &manager, stdin, &mut stdout);
    if run_until_interrupted(session, tokio::signal::ctrl_c())
        .await?
        .is_none()
    {
        println!();
        info!("Interrupted");
        // Tool servers of the aborted turn are already killed; the pending
        // stdin read would otherwise hold the runtime open.
        std::process::exit(130);
    }

    Ok(())
}
