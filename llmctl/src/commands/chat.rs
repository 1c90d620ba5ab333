//! Chat and stream command implementations

use crate::cli::PromptArgs;
use crate::config::LlmctlConfig;
use crate::output;
use crate::CtlError;
use callsight_connector_openai::OpenAiClient;
use callsight_core::prelude::*;
use futures_util::StreamExt;
use std::io::Write;
use tracing::info;

/// Messages and per-call options for one prompt
pub fn prompt_request(args: &PromptArgs) -> (Vec<ChatMessage>, CompletionOptions) {
    let mut messages = Vec::new();
    if let Some(ref system) = args.system {
        messages.push(ChatMessage::system(system.clone()));
    }
    messages.push(ChatMessage::user(args.prompt.clone()));

    let options = CompletionOptions {
        model: None,
        max_tokens: args.max_tokens,
        temperature: args.temperature,
        top_p: args.top_p,
    };
    (messages, options)
}

/// Handle the chat command
pub async fn handle_chat_command(
    args: PromptArgs,
    client: &OpenAiClient,
    config: &LlmctlConfig,
) -> Result<(), CtlError> {
    let (messages, options) = prompt_request(&args);
    info!("Sending chat completion to {}", client.config().base_url);

    let response = client.chat(messages, options).await?;
    output::display_completion(&response, &config.default_format)
}

/// Handle the stream command, copying body bytes to stdout as they arrive
pub async fn handle_stream_command(
    args: PromptArgs,
    client: &OpenAiClient,
) -> Result<(), CtlError> {
    stream_to(args, client, &mut std::io::stdout()).await
}

/// Copy a streaming completion body to `out`, flushing after each chunk
pub async fn stream_to<W: Write>(
    args: PromptArgs,
    client: &OpenAiClient,
    out: &mut W,
) -> Result<(), CtlError> {
    let (messages, options) = prompt_request(&args);
    info!("Sending streaming completion to {}", client.config().base_url);

    let mut stream = client.chat_stream(messages, options).await?;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        out.write_all(&chunk)
            .and_then(|_| out.flush())
            .map_err(|e| CtlError::Output(format!("Failed to write stream: {}", e)))?;
    }
    Ok(())
}
