//! Command-line interface for the Callsight LLM completion client

use callsight_connector_openai::OpenAiClient;
use clap::Parser;
use std::process;
use tracing::{error, info, Level};

mod cli;
mod commands;
mod config;
mod error;
mod output;

use cli::*;
use config::LlmctlConfig;
use error::CtlError;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match LlmctlConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Override config with CLI args
    let config = config.with_overrides(&args);

    let client = match OpenAiClient::with_overrides(config.llm.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create LLM client: {}", e);
            process::exit(1);
        }
    };

    info!(
        "Starting llmctl with endpoint {} (model {})",
        client.config().base_url,
        client.config().model
    );

    // Execute command
    let result = match args.command {
        Commands::Chat(prompt) => {
            commands::chat::handle_chat_command(prompt, &client, &config).await
        }
        Commands::Stream(prompt) => commands::chat::handle_stream_command(prompt, &client).await,
        Commands::Classify { text, categories } => {
            commands::tasks::handle_classify_command(text, categories, &client, &config).await
        }
        Commands::Sentiment { text } => {
            commands::tasks::handle_sentiment_command(text, &client, &config).await
        }
        Commands::Models => commands::health::handle_models_command(&client, &config).await,
        Commands::Health => commands::health::handle_health_command(&client).await,
    };

    match result {
        Ok(_) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            if let CtlError::Llm(ref llm) = e {
                if llm.is_transient() {
                    info!("The failure looks transient; retrying may help");
                }
            }
            process::exit(1);
        }
    }
}
