//! # Callsight Core
//!
//! Provider-independent pieces of the Callsight LLM completion client: the
//! chat data model, the error taxonomy, response text extraction and the
//! structured tasks (intent classification, sentiment analysis) that run on
//! top of any [`CompletionTransport`].

pub mod errors;
pub mod extract;
pub mod tasks;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use errors::{LlmError, LlmResult, StructuredOutputError};
pub use extract::extract_text;
pub use traits::{CompletionTransport, ModelCatalog};
pub use types::{ChatMessage, CompletionOptions, CompletionRequest, CompletionResponse, Role};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::extract::extract_text;
    pub use crate::tasks::*;
    pub use crate::traits::*;
    pub use crate::types::*;
    pub use async_trait::async_trait;
}
