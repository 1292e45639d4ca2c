//! Cheato CLI - command-line client for the Cheato pipeline API.
//!
//! Each pipeline stage has its own subcommand; `workflow` chains them all.

mod client;
mod commands;
mod output;
mod wire;

use anyhow::Result;
use clap::{Parser, Subcommand};

use client::ApiError;
use commands::{config, health, history, intent, model, prompt, run, workflow};
use output::OutputFormat;

const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Cheato - LLM workflow pipeline CLI
#[derive(Parser)]
#[command(
    name = "cheato",
    version,
    about = "Cheato - LLM workflow pipeline",
    long_about = "Classify a request, pick a model, engineer the prompt, run it and track usage.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// API server URL
    #[arg(long, global = true, env = "CHEATO_API_URL")]
    api_url: Option<String>,

    /// User id sent with history requests
    #[arg(long, global = true, env = "CHEATO_USER_ID")]
    user_id: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Intent classification
    #[command(subcommand)]
    Intent(intent::IntentCommands),

    /// Model recommendation
    #[command(subcommand)]
    Model(model::ModelCommands),

    /// Prompt generation and refinement
    #[command(subcommand)]
    Prompt(prompt::PromptCommands),

    /// Run prompts against a model
    #[command(subcommand)]
    Run(run::RunCommands),

    /// Interaction history and analytics
    #[command(subcommand)]
    History(history::HistoryCommands),

    /// Run the full pipeline for one input
    Workflow(workflow::WorkflowArgs),

    /// Check system health
    Health(health::HealthArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let api_url = cli
        .api_url
        .clone()
        .or_else(|| config::load_value(config::API_URL_KEY))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let user_id = cli
        .user_id
        .clone()
        .or_else(|| config::load_value(config::USER_ID_KEY));

    let client = client::ApiClient::new(&api_url, user_id)?;
    let format = cli.output;

    let result = match cli.command {
        Commands::Intent(cmd) => intent::execute(cmd, &client, format).await,
        Commands::Model(cmd) => model::execute(cmd, &client, format).await,
        Commands::Prompt(cmd) => prompt::execute(cmd, &client, format).await,
        Commands::Run(cmd) => run::execute(cmd, &client, format).await,
        Commands::History(cmd) => history::execute(cmd, &client, format).await,
        Commands::Workflow(args) => workflow::execute(args, &client, format).await,
        Commands::Health(args) => health::execute(args, &client, format).await,
        Commands::Config(cmd) => config::execute(cmd, format).await,
    };

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e));
        if let Some(ApiError::Server {
            internal: Some(detail),
            ..
        }) = e.downcast_ref::<ApiError>()
        {
            output::print_info(&format!("Server detail: {}", detail));
        }
        std::process::exit(1);
    }

    Ok(())
}
