//! Error type for llmctl

use callsight_core::errors::LlmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CtlError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Output error: {0}")]
    Output(String),

    #[error("LLM endpoint at {0} is not healthy")]
    Unhealthy(String),
}
