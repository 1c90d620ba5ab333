//! Configuration management for llmctl

use crate::cli::{Cli, OutputFormat};
use crate::CtlError;
use callsight_connector_openai::ConfigOverrides;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the llmctl CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmctlConfig {
    /// Client settings; unset fields fall through to `LLM_*` variables
    #[serde(default)]
    pub llm: ConfigOverrides,
    /// Default output format
    #[serde(default)]
    pub default_format: OutputFormat,
    /// Categories used by `classify` when none are given
    #[serde(default)]
    pub default_categories: Vec<String>,
}

impl LlmctlConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: &Option<std::path::PathBuf>) -> Result<Self, CtlError> {
        let mut figment = Figment::new();

        let default_config_paths = ["llmctl.yaml", "llmctl.yml", ".llmctl.yaml", ".llmctl.yml"];

        for path in &default_config_paths {
            if Path::new(path).exists() {
                figment = figment.merge(Yaml::file(path));
                break;
            }
        }

        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Yaml::file(path));
            } else {
                return Err(CtlError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }

        // LLMCTL_LLM__MODEL=... reaches llm.model
        figment = figment.merge(Env::prefixed("LLMCTL_").split("__"));

        figment
            .extract()
            .map_err(|e| CtlError::Config(format!("Failed to parse configuration: {}", e)))
    }

    /// Apply CLI argument overrides to the configuration
    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if let Some(ref base_url) = args.base_url {
            self.llm.base_url = Some(base_url.clone());
        }

        if let Some(ref model) = args.model {
            self.llm.model = Some(model.clone());
        }

        if let Some(timeout_ms) = args.timeout_ms {
            self.llm.timeout_ms = Some(timeout_ms);
        }

        if let Some(ref format) = args.format {
            self.default_format = format.clone();
        }

        self
    }

    /// Categories to classify against
    pub fn categories(&self, requested: &[String]) -> Result<Vec<String>, CtlError> {
        let categories = if requested.is_empty() {
            &self.default_categories
        } else {
            requested
        };

        if categories.is_empty() {
            return Err(CtlError::Config(
                "No categories given. Use --category or set default_categories in config"
                    .to_string(),
            ));
        }
        Ok(categories.to_vec())
    }
}
