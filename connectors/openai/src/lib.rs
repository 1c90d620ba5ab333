//! OpenAI-compatible chat completion client for Callsight

use async_trait::async_trait;
use bytes::Bytes;
use callsight_core::prelude::*;
use futures_util::{Stream, StreamExt};
use reqwest::{Client, Response, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

mod config;
mod models;
mod request;

pub use config::{ClientConfig, ConfigOverrides, ENV_PREFIX};
pub use models::model_ids;
pub use request::build_request;

/// Raw, unbuffered body of a streaming completion
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, LlmError>> + Send>>;

/// Client for one OpenAI-compatible endpoint.
///
/// Holds no per-call state; share one instance behind an `Arc` for
/// concurrent callers, or build separate instances for separate endpoints.
pub struct OpenAiClient {
    client: Client,
    config: ClientConfig,
}

impl OpenAiClient {
    /// Create a client from a resolved configuration
    pub fn new(config: ClientConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a client from explicit overrides layered over `LLM_*` variables
    pub fn with_overrides(overrides: ConfigOverrides) -> Result<Self, LlmError> {
        Self::new(ClientConfig::resolve(overrides)?)
    }

    /// Create a client from `LLM_*` variables and fallbacks
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// One non-streaming completion, bounded by `timeout_ms`
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.chat_with_cancel(messages, options, CancellationToken::new())
            .await
    }

    /// One non-streaming completion that also stops when `cancel` fires
    pub async fn chat_with_cancel(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
        cancel: CancellationToken,
    ) -> Result<CompletionResponse, LlmError> {
        let request = build_request(&self.config, messages, options, false);
        debug!(
            "POST {} (model {}, {} messages)",
            self.config.endpoint("chat/completions"),
            request.model,
            request.messages.len()
        );
        let start_time = Instant::now();

        let response = self
            .with_deadline(&cancel, self.send_completion(&request))
            .await?;

        info!(
            "Completion from {} finished in {}ms ({} prompt / {} completion tokens)",
            request.model,
            start_time.elapsed().as_millis(),
            response.usage.prompt_tokens,
            response.usage.completion_tokens
        );

        Ok(response)
    }

    /// One streaming completion; the body is handed back unread.
    ///
    /// No deadline applies unless `stream_timeout_ms` is configured, and even
    /// then it only bounds the wait for response headers.
    pub async fn chat_stream(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<ByteStream, LlmError> {
        let request = build_request(&self.config, messages, options, true);
        let url = self.config.endpoint("chat/completions");
        debug!("POST {} (stream, model {})", url, request.model);

        let send = self.authorized(self.client.post(&url)).json(&request).send();
        let response = match self.config.stream_timeout_ms {
            Some(timeout_ms) => tokio::time::timeout(Duration::from_millis(timeout_ms), send)
                .await
                .map_err(|_| {
                    warn!("Streaming completion did not start within {}ms", timeout_ms);
                    LlmError::Timeout { timeout_ms }
                })?,
            None => send.await,
        }
        .map_err(network_error)?;

        let response = check_status(response).await?;
        if response.status() == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            error!("Streaming completion from {} returned no body", request.model);
            return Err(LlmError::EmptyBody);
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| LlmError::NetworkError(format!("Stream interrupted: {}", e)))
        })))
    }

    /// Model identifiers served by the endpoint
    pub async fn get_models(&self) -> Result<Vec<String>, LlmError> {
        let url = self.config.endpoint("models");
        debug!("GET {}", url);

        let fetch = async {
            let response = self
                .authorized(self.client.get(&url))
                .send()
                .await
                .map_err(network_error)?;
            let response = check_status(response).await?;
            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| {
                    LlmError::ResponseParseError(format!("Failed to parse model list: {}", e))
                })
        };
        let payload = self.with_deadline(&CancellationToken::new(), fetch).await?;

        let models = model_ids(&payload);
        if models.is_empty() {
            warn!("Model listing at {} returned no usable entries", url);
        }
        Ok(models)
    }

    /// True iff the model list is reachable and non-empty
    pub async fn health_check(&self) -> bool {
        ModelCatalog::health_check(self).await
    }

    /// Classify `text` into one of `categories`; unparseable replies become
    /// `{intent: "other", confidence: 0.5}`
    pub async fn classify_intent<S: AsRef<str>>(
        &self,
        text: &str,
        categories: &[S],
    ) -> Result<ClassificationResult, LlmError> {
        classify_intent(self, text, categories).await
    }

    /// Analyze the sentiment of `text`; unparseable replies become
    /// `{sentiment: neutral, score: 0}`
    pub async fn analyze_sentiment(&self, text: &str) -> Result<SentimentResult, LlmError> {
        analyze_sentiment(self, text).await
    }

    /// Race `call` against the configured deadline and the caller's token.
    /// The losing futures, the deadline timer included, are dropped on return.
    async fn with_deadline<T>(
        &self,
        cancel: &CancellationToken,
        call: impl Future<Output = Result<T, LlmError>>,
    ) -> Result<T, LlmError> {
        let timeout_ms = self.config.timeout_ms;
        tokio::select! {
            result = call => result,
            _ = tokio::time::sleep(Duration::from_millis(timeout_ms)) => {
                warn!("LLM call exceeded {}ms deadline", timeout_ms);
                Err(LlmError::Timeout { timeout_ms })
            }
            _ = cancel.cancelled() => {
                debug!("LLM call cancelled by caller");
                Err(LlmError::Cancelled)
            }
        }
    }

    async fn send_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let response = self
            .authorized(self.client.post(self.config.endpoint("chat/completions")))
            .json(request)
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status(response).await?;
        response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| LlmError::ResponseParseError(format!("Failed to parse response: {}", e)))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

/// Pass 2xx responses through; turn anything else into a `RemoteError`
async fn check_status(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let status_text = status.canonical_reason().unwrap_or("").to_string();
    let body = response.text().await.unwrap_or_default();
    error!("LLM provider error {} {}: {}", status.as_u16(), status_text, body);
    Err(LlmError::remote(status.as_u16(), status_text, body))
}

fn network_error(e: reqwest::Error) -> LlmError {
    LlmError::NetworkError(format!("HTTP request failed: {}", e))
}

#[async_trait]
impl CompletionTransport for OpenAiClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.chat(messages, options).await
    }
}

#[async_trait]
impl ModelCatalog for OpenAiClient {
    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        self.get_models().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "test-model",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        })
    }

    fn client_for(server: &MockServer) -> OpenAiClient {
        let config = ClientConfig::default()
            .with_base_url(format!("{}/v1", server.uri()))
            .with_model("test-model")
            .with_temperature(0.5)
            .with_max_tokens(64);
        OpenAiClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_chat_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "max_tokens": 64,
                "temperature": 0.5,
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("hello")))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .chat(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .unwrap();

        assert_eq!(extract_text(&response), "hello");
        assert_eq!(response.usage.total_tokens, 7);
    }

    #[tokio::test]
    async fn test_top_p_absent_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .chat(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("top_p").is_none());
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[tokio::test]
    async fn test_remote_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(502).set_body_string("detailed error"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .chat(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("Bad Gateway"));
        assert!(msg.contains("detailed error"));
        assert!(matches!(err, LlmError::RemoteError { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = client_for(&server).config().clone().with_timeout(100);
        let client = OpenAiClient::new(config).unwrap();

        let start = Instant::now();
        let err = client
            .chat(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Timeout { timeout_ms: 100 }));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_caller_cancellation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .chat_with_cancel(vec![ChatMessage::user("hi")], CompletionOptions::default(), cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Cancelled));
    }

    #[tokio::test]
    async fn test_repeated_calls_are_independent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("again")))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let messages = vec![ChatMessage::user("same")];
        let first = client
            .chat(messages.clone(), CompletionOptions::default())
            .await
            .unwrap();
        let second = client
            .chat(messages, CompletionOptions::default())
            .await
            .unwrap();

        assert_eq!(first, second);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_api_key_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let config = client_for(&server).config().clone().with_api_key("sk-test");
        let client = OpenAiClient::new(config).unwrap();
        client
            .chat(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stream_returns_raw_body() {
        let server = MockServer::start().await;
        let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n";
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut stream = client
            .chat_stream(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .unwrap();

        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(String::from_utf8(body).unwrap(), sse);
    }

    #[tokio::test]
    async fn test_stream_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .chat_stream(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::EmptyBody));
    }

    #[tokio::test]
    async fn test_stream_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .chat_stream(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::RemoteError { status: 503, .. }));
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_stream_ignores_sync_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("data: [DONE]\n\n", "text/event-stream")
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let config = client_for(&server).config().clone().with_timeout(50);
        let client = OpenAiClient::new(config).unwrap();
        assert!(client
            .chat_stream(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_opt_in_stream_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("data: [DONE]\n\n", "text/event-stream")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = client_for(&server).config().clone().with_stream_timeout(100);
        let client = OpenAiClient::new(config).unwrap();
        let err = client
            .chat_stream(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::Timeout { timeout_ms: 100 }));
    }

    #[tokio::test]
    async fn test_get_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "model-1"}, {"id": "model-2"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.get_models().await.unwrap(), vec!["model-1", "model-2"]);
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_get_models_malformed_shapes() {
        for payload in [json!({}), json!({"data": "not an array"})] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/models"))
                .respond_with(ResponseTemplate::new(200).set_body_json(payload))
                .mount(&server)
                .await;

            let client = client_for(&server);
            assert!(client.get_models().await.unwrap().is_empty());
            assert!(!client.health_check().await);
        }
    }

    #[tokio::test]
    async fn test_health_false_on_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.get_models().await.is_err());
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_false_when_unreachable() {
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:1/v1")
            .with_timeout(2_000);
        let client = OpenAiClient::new(config).unwrap();

        assert!(client.get_models().await.is_err());
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_classify_intent_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"temperature": 0.1, "max_tokens": 100})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                r#"{"intent":"billing","confidence":0.88}"#,
            )))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.classify_intent("pay", &["billing", "sales"]).await.unwrap();
        assert_eq!(result, ClassificationResult::new("billing", 0.88));
    }

    #[tokio::test]
    async fn test_analyze_sentiment_fallback_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("Sounds fine to me!")),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.analyze_sentiment("whatever").await.unwrap();
        assert_eq!(result, SentimentResult::fallback());
    }

    #[tokio::test]
    async fn test_structured_task_propagates_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("{}"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = client_for(&server).config().clone().with_timeout(100);
        let client = OpenAiClient::new(config).unwrap();
        let err = client.analyze_sentiment("slow").await.unwrap_err();
        assert!(err.is_transient());
    }
}
