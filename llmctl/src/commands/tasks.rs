//! Classify and sentiment command implementations

use crate::config::LlmctlConfig;
use crate::output;
use crate::CtlError;
use callsight_connector_openai::OpenAiClient;
use tracing::info;

/// Handle the classify command
pub async fn handle_classify_command(
    text: String,
    categories: Vec<String>,
    client: &OpenAiClient,
    config: &LlmctlConfig,
) -> Result<(), CtlError> {
    let categories = config.categories(&categories)?;
    info!("Classifying into {} categories", categories.len());

    let result = client.classify_intent(&text, &categories).await?;
    output::display_classification(&result, &config.default_format)
}

/// Handle the sentiment command
pub async fn handle_sentiment_command(
    text: String,
    client: &OpenAiClient,
    config: &LlmctlConfig,
) -> Result<(), CtlError> {
    info!("Analyzing sentiment of {} characters", text.len());

    let result = client.analyze_sentiment(&text).await?;
    output::display_sentiment(&result, &config.default_format)
}
