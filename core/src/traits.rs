//! Core traits at the seams between callers and LLM providers

use crate::errors::LlmError;
use crate::types::{ChatMessage, CompletionOptions, CompletionResponse};
use async_trait::async_trait;
use tracing::warn;

/// A provider that can answer one non-streaming chat completion
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Issue exactly one completion request and return the decoded response
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, LlmError>;
}

/// A provider that can enumerate its models
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    /// Identifiers of the models the provider currently serves
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;

    /// True iff the model list is reachable and non-empty. Never fails.
    async fn health_check(&self) -> bool {
        match self.list_models().await {
            Ok(models) => !models.is_empty(),
            Err(e) => {
                warn!("Health check failed: {}", e);
                false
            }
        }
    }
}
