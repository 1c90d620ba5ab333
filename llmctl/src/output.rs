//! Output formatting utilities for llmctl

use crate::cli::OutputFormat;
use crate::CtlError;
use callsight_core::prelude::*;
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ModelTableRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Model")]
    id: String,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CtlError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CtlError::Output(format!("Failed to serialize to JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Display a completion reply
pub fn display_completion(
    response: &CompletionResponse,
    format: &OutputFormat,
) -> Result<(), CtlError> {
    match format {
        OutputFormat::Table => {
            let text = extract_text(response);
            if text.is_empty() {
                println!("{}", "(empty reply)".dimmed());
            } else {
                println!("{}", text);
            }
            println!(
                "{}",
                format!(
                    "[{} | {} prompt + {} completion tokens]",
                    if response.model.is_empty() { "-" } else { response.model.as_str() },
                    response.usage.prompt_tokens,
                    response.usage.completion_tokens
                )
                .dimmed()
            );
            Ok(())
        }
        OutputFormat::Json => print_json(response),
    }
}

/// Display an intent classification
pub fn display_classification(
    result: &ClassificationResult,
    format: &OutputFormat,
) -> Result<(), CtlError> {
    match format {
        OutputFormat::Table => {
            println!("{:<12} {}", "Intent:".bold(), result.intent().unwrap_or("-").green());
            match result.confidence() {
                Some(confidence) => println!("{:<12} {:.2}", "Confidence:".bold(), confidence),
                None => println!("{:<12} -", "Confidence:".bold()),
            }
            Ok(())
        }
        OutputFormat::Json => print_json(result),
    }
}

/// Display a sentiment analysis
pub fn display_sentiment(result: &SentimentResult, format: &OutputFormat) -> Result<(), CtlError> {
    match format {
        OutputFormat::Table => {
            let label = match result.sentiment() {
                Some(Sentiment::Positive) => "positive".green(),
                Some(Sentiment::Negative) => "negative".red(),
                Some(other) => other.to_string().normal(),
                None => "-".normal(),
            };
            println!("{:<12} {}", "Sentiment:".bold(), label);
            match result.score() {
                Some(score) => println!("{:<12} {:+.2}", "Score:".bold(), score),
                None => println!("{:<12} -", "Score:".bold()),
            }
            Ok(())
        }
        OutputFormat::Json => print_json(result),
    }
}

/// Display the model list
pub fn display_models(models: &[String], format: &OutputFormat) -> Result<(), CtlError> {
    match format {
        OutputFormat::Table => {
            if models.is_empty() {
                println!("No models found");
                return Ok(());
            }

            let rows: Vec<ModelTableRow> = models
                .iter()
                .enumerate()
                .map(|(i, id)| ModelTableRow {
                    index: i + 1,
                    id: id.clone(),
                })
                .collect();
            println!("{}", Table::new(rows));
            Ok(())
        }
        OutputFormat::Json => print_json(models),
    }
}
