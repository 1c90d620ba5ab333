//! Configuration for the OpenAI-compatible client

use callsight_core::errors::LlmError;
use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Prefix for environment variables read during resolution
pub const ENV_PREFIX: &str = "LLM_";

/// Resolved client configuration, fixed for the lifetime of a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL, e.g. `http://localhost:1234/v1`
    #[serde(deserialize_with = "string_like")]
    pub base_url: String,
    /// Model used when a call does not name one
    #[serde(deserialize_with = "string_like")]
    pub model: String,
    /// Bearer token, for hosted providers
    #[serde(
        default,
        deserialize_with = "opt_string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<String>,
    /// Deadline for non-streaming calls in milliseconds
    pub timeout_ms: u64,
    /// Temperature used when a call does not set one
    pub default_temperature: f32,
    /// Token budget used when a call does not set one
    pub default_max_tokens: u32,
    /// Optional bound on the time until a streaming response starts.
    /// Streams are unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234/v1".to_string(),
            model: "local-model".to_string(),
            api_key: None,
            timeout_ms: 20_000,
            default_temperature: 0.7,
            default_max_tokens: 1000,
            stream_timeout_ms: None,
        }
    }
}

/// Explicit constructor arguments; each set field beats the environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(
        default,
        deserialize_with = "opt_string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub model: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_timeout_ms: Option<u64>,
}

// Env providers type `LLM_MODEL=7` as a number; text fields take it as written.
struct StringLike;

impl<'de> de::Visitor<'de> for StringLike {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_char<E: de::Error>(self, v: char) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }
}

fn string_like<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(StringLike)
}

fn opt_string_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OptStringLike;

    impl<'de> de::Visitor<'de> for OptStringLike {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an optional string, number or boolean")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            string_like(d).map(Some)
        }
    }

    deserializer.deserialize_option(OptStringLike)
}

impl ClientConfig {
    /// Resolve overrides, then `LLM_*` environment variables, then fallbacks
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, LlmError> {
        Self::figment(overrides)
            .extract()
            .map_err(|e| {
                LlmError::ConfigError(format!("Failed to resolve client configuration: {}", e))
            })
    }

    /// Resolve from the environment and fallbacks only
    pub fn from_env() -> Result<Self, LlmError> {
        Self::resolve(ConfigOverrides::default())
    }

    /// Layered configuration sources, lowest precedence first
    pub fn figment(overrides: ConfigOverrides) -> Figment {
        Figment::from(Serialized::defaults(ClientConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the non-streaming deadline
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the default temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = temperature;
        self
    }

    /// Set the default token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    /// Bound the time until a streaming response starts
    pub fn with_stream_timeout(mut self, stream_timeout_ms: u64) -> Self {
        self.stream_timeout_ms = Some(stream_timeout_ms);
        self
    }

    /// Full URL for an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.default_max_tokens, 1000);
        assert!(config.api_key.is_none());
        assert!(config.stream_timeout_ms.is_none());
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let config = ClientConfig::default().with_base_url("http://example.com/v1/");
        assert_eq!(config.endpoint("models"), "http://example.com/v1/models");
        assert_eq!(
            config.endpoint("/chat/completions"),
            "http://example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_environment_beats_fallback() {
        Jail::expect_with(|jail| {
            jail.set_env("LLM_MODEL", "env-model");
            jail.set_env("LLM_TIMEOUT_MS", "5000");
            jail.set_env("LLM_DEFAULT_TEMPERATURE", "0.25");

            let config = ClientConfig::from_env().unwrap();
            assert_eq!(config.model, "env-model");
            assert_eq!(config.timeout_ms, 5000);
            assert_eq!(config.default_temperature, 0.25);
            assert_eq!(config.base_url, "http://localhost:1234/v1");
            Ok(())
        });
    }

    #[test]
    fn test_overrides_beat_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("LLM_MODEL", "env-model");
            jail.set_env("LLM_DEFAULT_MAX_TOKENS", "64");

            let overrides = ConfigOverrides {
                model: Some("explicit-model".to_string()),
                ..Default::default()
            };
            let config = ClientConfig::resolve(overrides).unwrap();
            assert_eq!(config.model, "explicit-model");
            assert_eq!(config.default_max_tokens, 64);
            Ok(())
        });
    }

    #[test]
    fn test_numeric_environment_text_fields() {
        Jail::expect_with(|jail| {
            jail.set_env("LLM_MODEL", "7");
            jail.set_env("LLM_API_KEY", "12345");

            let config = ClientConfig::from_env().unwrap();
            assert_eq!(config.model, "7");
            assert_eq!(config.api_key.as_deref(), Some("12345"));
            Ok(())
        });
    }

    #[test]
    fn test_overrides_accept_numeric_text() {
        let overrides: ConfigOverrides = serde_json::from_value(serde_json::json!({
            "model": 42,
            "api_key": true,
            "base_url": null
        }))
        .unwrap();
        assert_eq!(overrides.model.as_deref(), Some("42"));
        assert_eq!(overrides.api_key.as_deref(), Some("true"));
        assert!(overrides.base_url.is_none());
    }

    #[test]
    fn test_malformed_environment_is_a_config_error() {
        Jail::expect_with(|jail| {
            jail.set_env("LLM_TIMEOUT_MS", "soon");

            let err = ClientConfig::from_env().unwrap_err();
            assert!(matches!(err, LlmError::ConfigError(_)));
            Ok(())
        });
    }
}
