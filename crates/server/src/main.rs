// notion-mcp: MCP tool server over stdio.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use notion_mcp_server::config::{ServerConfig, DEFAULT_LOG_FILTER, LOG_FILTER_VAR};
use notion_mcp_server::runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "notion-mcp", version, about = "MCP server for Notion pages and databases")]
struct Args {
    /// Config file (defaults to `<config_dir>/notion-mcp/config.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter directive; overrides NOTION_MCP_LOG_FILTER.
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,

    /// Validate the API key and exit.
    #[arg(long)]
    check: bool,
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = ServerConfig::load(args.config.as_deref());

    let filter = args
        .log_filter
        .clone()
        .or_else(|| config.as_ref().ok().map(|config| config.log_filter.clone()))
        .or_else(|| std::env::var(LOG_FILTER_VAR).ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    init_tracing(&filter);

    let config = config.context("failed to load configuration")?;

    if args.check {
        let valid = runtime::check(&config).await?;
        if valid {
            eprintln!("notion api key is valid");
            return Ok(ExitCode::SUCCESS);
        }
        eprintln!("notion api key was rejected or the api is unreachable");
        return Ok(ExitCode::FAILURE);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "starting notion-mcp");
    runtime::run(config).await.context("notion-mcp terminated unexpectedly")?;
    Ok(ExitCode::SUCCESS)
}
