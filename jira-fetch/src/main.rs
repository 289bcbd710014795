//! jira-fetch - JIRA issue fetcher for AI-assisted analysis
//!
//! Two CLI entry modes (fetch-and-save, priority-sorted print) plus an MCP
//! stdio tool-server mode for AI-agent hosts.

use clap::{Parser, Subcommand};
use jira_fetch::config::JiraConfig;
use jira_fetch::pipeline::{run_pipeline, OutputMode};
use jira_fetch::JiraFetchServer;
use pulseengine_mcp_server::builder_trait::McpServerBuilder;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "jira-fetch",
    version,
    about = "Fetch JIRA issues and format them for AI analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch issues and save a markdown report plus a raw JSON snapshot
    Fetch,
    /// Print issues to stdout, sorted Blocker > High > Medium > Low
    Blockers,
    /// Run the MCP tool server on stdio
    Serve,
}

#[tokio::main]
async fn main() {
    // Credentials usually live in a .env file next to the tool
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Fetch => run_cli_mode(OutputMode::SaveToFile).await,
        Command::Blockers => run_cli_mode(OutputMode::PrintSorted).await,
        Command::Serve => run_server().await,
    }
}

/// Run a CLI pipeline mode; exit 0 on success or zero results, 1 otherwise
async fn run_cli_mode(mode: OutputMode) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    println!("🎯 JIRA Issues Fetcher for Claude Code\n");

    let config = match JiraConfig::load_for_fetch() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            eprintln!("\n💡 Copy .env.example to .env and fill in your values");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_pipeline(&config, mode).await {
        eprintln!("❌ Error fetching issues:");
        eprintln!("{e}");

        match e.http_status() {
            Some(401) => {
                eprintln!("\n💡 Authentication failed. Check your email and API token.");
                eprintln!("   Generate a new API token at: https://id.atlassian.com/manage-profile/security/api-tokens");
            }
            Some(403) => {
                eprintln!("\n💡 Access denied. Check your project permissions.");
            }
            _ => {}
        }

        std::process::exit(1);
    }
}

/// Run the MCP tool server over stdio
async fn run_server() {
    // Logging must stay off stdout to keep the MCP protocol stream clean
    JiraFetchServer::configure_stdio_logging();

    info!("Starting JIRA Fetch MCP Server...");

    let server = match JiraFetchServer::new() {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create JIRA Fetch MCP Server: {}", e);
            eprintln!("❌ Failed to start JIRA Fetch MCP Server: {e}");
            eprintln!("\nPlease check:");
            eprintln!("  - JIRA_DOMAIN, JIRA_EMAIL, and JIRA_API_TOKEN are set");
            eprintln!("  - The JIRA instance is accessible");
            std::process::exit(1);
        }
    };

    if let Err(e) = serve(server).await {
        error!("Server failed: {}", e);
        eprintln!("❌ Server failed: {e}");
        std::process::exit(1);
    }
}

async fn serve(server: JiraFetchServer) -> Result<(), Box<dyn std::error::Error>> {
    let mut running = server.serve_stdio().await?;
    info!("🚀 JIRA Fetch MCP Server is running and ready to serve requests");
    running.run().await?;
    Ok(())
}
