//! Civic Assistant CLI
//!
//! Main entry point for the civic command-line tool.
//! Answers residents' questions from each city's own documents, behind a
//! per-city access gate.

mod commands;

use clap::{Parser, Subcommand};
use civic_core::logging::{self, LogFormat};
use civic_core::{config::AppConfig, AppResult};
use commands::{AskCommand, CiteCommand, SearchCommand, TenantsCommand};
use std::path::PathBuf;

/// Civic Assistant - grounded answers from city documents
#[derive(Parser, Debug)]
#[command(name = "civic")]
#[command(about = "Grounded answers from city documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "CIVIC_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "CIVIC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (ollama, openai)
    #[arg(short, long, global = true, env = "CIVIC_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "CIVIC_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a city's assistant a question
    Ask(AskCommand),

    /// Rank a city's documents for a query without generating an answer
    Search(SearchCommand),

    /// Rewrite [file.txt] citations into article labels
    Cite(CiteCommand),

    /// List configured cities
    Tenants(TenantsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from the file and environment
    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.log_format,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.log_format, config.no_color)?;

    // Log startup
    tracing::info!("Civic Assistant CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    // Emit command span
    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Search(_) => "search",
        Commands::Cite(_) => "cite",
        Commands::Tenants(_) => "tenants",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config),
        Commands::Cite(cmd) => cmd.execute(&config),
        Commands::Tenants(cmd) => cmd.execute(&config),
    };

    // Log completion
    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from([
            "civic",
            "--log-format",
            "json",
            "ask",
            "--city",
            "springfield",
            "--token",
            "t",
            "Where can I park?",
        ])
        .unwrap();

        assert_eq!(cli.log_format, Some(LogFormat::Json));
        match cli.command {
            Commands::Ask(cmd) => {
                assert_eq!(cmd.city, "springfield");
                assert_eq!(cmd.token.as_deref(), Some("t"));
                assert_eq!(cmd.question, "Where can I park?");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ask_requires_city() {
        assert!(Cli::try_parse_from(["civic", "ask", "question"]).is_err());
    }

    #[test]
    fn test_parse_search_with_time() {
        let cli = Cli::try_parse_from([
            "civic",
            "search",
            "--city",
            "springfield",
            "--at",
            "2026-03-01T12:00:00Z",
            "--context",
            "parking district",
        ])
        .unwrap();

        match cli.command {
            Commands::Search(cmd) => {
                assert!(cmd.context);
                assert!(cmd.at.is_some());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
