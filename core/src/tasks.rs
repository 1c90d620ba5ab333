//! Structured tasks: ask the model for a JSON reply, fall back on bad output
//!
//! Transport failures propagate to the caller. Only a reply that cannot be
//! read as the task's output type is absorbed, by returning the task's
//! fixed fallback value.

use crate::errors::{LlmError, StructuredOutputError};
use crate::extract::extract_text;
use crate::traits::CompletionTransport;
use crate::types::{ChatMessage, ClassificationResult, CompletionOptions, SentimentResult};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Sampling temperature used for every structured task
pub const TASK_TEMPERATURE: f32 = 0.1;

/// Token budget used for every structured task
pub const TASK_MAX_TOKENS: u32 = 100;

/// A request for a JSON-shaped answer about some input text
pub trait StructuredTask: Send + Sync {
    type Output: DeserializeOwned + Send;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Instructions describing the JSON shape the model must reply with
    fn system_prompt(&self) -> String;

    /// The caller's text
    fn input(&self) -> &str;

    /// Value returned when the reply cannot be accepted
    fn fallback(&self) -> Self::Output;

    /// Turn the raw reply into the output type.
    ///
    /// The default only requires valid JSON that maps onto `Output`; the
    /// built-in tasks keep any such reply as-is. Override to tighten
    /// validation for one task.
    fn accept(&self, reply: &str) -> Result<Self::Output, StructuredOutputError> {
        parse_reply(reply)
    }
}

/// Parse a model reply as JSON, then map it onto `T`
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T, StructuredOutputError> {
    let value: serde_json::Value = serde_json::from_str(reply)?;
    serde_json::from_value(value)
        .map_err(|e| StructuredOutputError::UnexpectedShape(e.to_string()))
}

/// Run one structured task over a transport
pub async fn run_task<T, S>(transport: &T, task: &S) -> Result<S::Output, LlmError>
where
    T: CompletionTransport + ?Sized,
    S: StructuredTask,
{
    let messages = vec![
        ChatMessage::system(task.system_prompt()),
        ChatMessage::user(task.input()),
    ];
    let options = CompletionOptions::new()
        .with_temperature(TASK_TEMPERATURE)
        .with_max_tokens(TASK_MAX_TOKENS);

    let response = transport.complete(messages, options).await?;
    let reply = extract_text(&response);
    debug!("{} reply: {}", task.name(), reply);

    Ok(task.accept(&reply).unwrap_or_else(|e| {
        warn!("{} returned unusable output, using fallback: {}", task.name(), e);
        task.fallback()
    }))
}

/// Map text onto one of a caller-supplied set of categories
#[derive(Debug, Clone)]
pub struct IntentClassification {
    pub text: String,
    pub categories: Vec<String>,
}

impl IntentClassification {
    pub fn new<S: AsRef<str>>(text: impl Into<String>, categories: &[S]) -> Self {
        Self {
            text: text.into(),
            categories: categories.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }
}

impl StructuredTask for IntentClassification {
    type Output = ClassificationResult;

    fn name(&self) -> &'static str {
        "intent classification"
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are an intent classifier. Classify the user's message into exactly one \
             of these categories: {}.\n\
             Respond with only a JSON object of the form \
             {{\"intent\": \"<category>\", \"confidence\": <number between 0 and 1>}} \
             and nothing else.",
            self.categories.join(", ")
        )
    }

    fn input(&self) -> &str {
        &self.text
    }

    fn fallback(&self) -> ClassificationResult {
        ClassificationResult::fallback()
    }
}

/// Label the sentiment of text
#[derive(Debug, Clone)]
pub struct SentimentAnalysis {
    pub text: String,
}

impl SentimentAnalysis {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl StructuredTask for SentimentAnalysis {
    type Output = SentimentResult;

    fn name(&self) -> &'static str {
        "sentiment analysis"
    }

    fn system_prompt(&self) -> String {
        "You are a sentiment analyzer. Determine the sentiment of the user's message.\n\
         Respond with only a JSON object of the form \
         {\"sentiment\": \"positive|negative|neutral\", \"score\": <number between -1 and 1>} \
         and nothing else."
            .to_string()
    }

    fn input(&self) -> &str {
        &self.text
    }

    fn fallback(&self) -> SentimentResult {
        SentimentResult::fallback()
    }
}

/// Classify `text` into one of `categories`
pub async fn classify_intent<T, S>(
    transport: &T,
    text: &str,
    categories: &[S],
) -> Result<ClassificationResult, LlmError>
where
    T: CompletionTransport + ?Sized,
    S: AsRef<str>,
{
    run_task(transport, &IntentClassification::new(text, categories)).await
}

/// Analyze the sentiment of `text`
pub async fn analyze_sentiment<T>(transport: &T, text: &str) -> Result<SentimentResult, LlmError>
where
    T: CompletionTransport + ?Sized,
{
    run_task(transport, &SentimentAnalysis::new(text)).await
}
