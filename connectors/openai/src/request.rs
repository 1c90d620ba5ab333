//! Building wire requests from messages, per-call options and client defaults

use crate::config::ClientConfig;
use callsight_core::types::{ChatMessage, CompletionOptions, CompletionRequest};

/// Merge per-call options over the client defaults.
///
/// `max_tokens` and `temperature` always resolve to a number; `top_p` stays
/// absent unless the call sets it. Values are not range-checked here.
pub fn build_request(
    config: &ClientConfig,
    messages: Vec<ChatMessage>,
    options: CompletionOptions,
    stream: bool,
) -> CompletionRequest {
    CompletionRequest {
        model: options.model.unwrap_or_else(|| config.model.clone()),
        messages,
        max_tokens: options.max_tokens.unwrap_or(config.default_max_tokens),
        temperature: options.temperature.unwrap_or(config.default_temperature),
        top_p: options.top_p,
        stream,
    }
}
