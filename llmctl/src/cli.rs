//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "llmctl")]
#[command(about = "Callsight LLM completion client")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL of the OpenAI-compatible endpoint
    #[arg(short = 'u', long, global = true)]
    pub base_url: Option<String>,

    /// Default model identifier
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Deadline for non-streaming calls in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one prompt and print the reply
    Chat(PromptArgs),
    /// Send one prompt and print the raw streamed body as it arrives
    Stream(PromptArgs),
    /// Classify text into one of the given categories
    Classify {
        /// Text to classify
        text: String,
        /// Candidate categories (repeat or comma-separate)
        #[arg(short = 'C', long = "category", value_delimiter = ',')]
        categories: Vec<String>,
    },
    /// Analyze the sentiment of text
    Sentiment {
        /// Text to analyze
        text: String,
    },
    /// List models served by the endpoint
    Models,
    /// Health check
    Health,
}

#[derive(Args, Clone, Debug)]
pub struct PromptArgs {
    /// Prompt text
    pub prompt: String,
    /// System prompt placed before the user prompt
    #[arg(short, long)]
    pub system: Option<String>,
    /// Sampling temperature for this call
    #[arg(short, long)]
    pub temperature: Option<f32>,
    /// Maximum tokens for this call
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling for this call
    #[arg(long)]
    pub top_p: Option<f32>,
}

#[derive(clap::ValueEnum, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
