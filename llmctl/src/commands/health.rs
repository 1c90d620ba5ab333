//! Models and health command implementations

use crate::config::LlmctlConfig;
use crate::output;
use crate::CtlError;
use callsight_connector_openai::OpenAiClient;
use colored::*;
use tracing::info;

/// Handle the models command
pub async fn handle_models_command(
    client: &OpenAiClient,
    config: &LlmctlConfig,
) -> Result<(), CtlError> {
    info!("Listing models at {}", client.config().base_url);

    let models = client.get_models().await?;
    output::display_models(&models, &config.default_format)
}

/// Handle health check command
pub async fn handle_health_command(client: &OpenAiClient) -> Result<(), CtlError> {
    info!("Checking LLM endpoint health at {}", client.config().base_url);

    if client.health_check().await {
        println!("{}", "✓ LLM endpoint is healthy".green().bold());
        Ok(())
    } else {
        println!("{}", "✗ LLM endpoint health check failed".red().bold());
        Err(CtlError::Unhealthy(client.config().base_url.clone()))
    }
}
