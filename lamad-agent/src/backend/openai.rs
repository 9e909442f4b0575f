//! OpenAI-compatible LLM backend.
//!
//! Works with any OpenAI-compatible API including:
//! - vLLM
//! - Ollama
//! - OpenAI API
//! - LocalAI

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::*;

/// OpenAI-compatible backend.
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    capabilities: ModelCapabilities,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            capabilities: ModelCapabilities {
                context_window: 128_000,
                max_output_tokens: 4096,
                supports_json_mode: true,
            },
        })
    }

    /// Create a backend pointing to local vLLM server.
    pub fn vllm(port: u16, model: &str) -> Result<Self, LlmError> {
        Self::new(format!("http://localhost:{}/v1", port), model, None)
    }

    /// Create a backend pointing to Ollama.
    pub fn ollama(model: &str) -> Result<Self, LlmError> {
        Self::new("http://localhost:11434/v1", model, None)
    }

    /// Create a backend for OpenAI API.
    pub fn openai(model: &str, api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::new("https://api.openai.com/v1", model, Some(api_key.into()))
    }

    /// Set custom capabilities.
    pub fn with_capabilities(mut self, capabilities: ModelCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn auth_header(&self) -> Option<String> {
        self.api_key.as_ref().map(|k| format!("Bearer {}", k))
    }

    /// Build the wire body.
    ///
    /// JSON mode is only requested from models that advertise it; the
    /// prompt itself still asks for JSON either way.
    fn chat_request(&self, request: &CompletionRequest) -> ChatRequest {
        let mut messages: Vec<ChatMessage> = Vec::new();

        if let Some(system) = &request.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        for msg in &request.messages {
            messages.push(ChatMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            });
        }

        let response_format = request
            .response_format
            .filter(|rf| *rf != ResponseFormatType::Json || self.capabilities.supports_json_mode)
            .map(|rf| ResponseFormatRequest {
                format_type: match rf {
                    ResponseFormatType::Json => "json_object",
                    ResponseFormatType::Text => "text",
                }
                .to_string(),
            });

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop: request.stop_sequences.clone(),
            response_format,
            stream: false,
        }
    }
}

/// OpenAI chat completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatRequest>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormatRequest {
    #[serde(rename = "type")]
    format_type: String,
}

/// OpenAI chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    usage: Option<UsageResponse>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let chat_request = self.chat_request(&request);

        let mut http_request = self.client.post(self.chat_completions_url());

        if let Some(auth) = self.auth_header() {
            http_request = http_request.header(header::AUTHORIZATION, auth);
        }

        debug!(model = %self.model, json = request.wants_json(), "Sending chat completion");

        let response = http_request
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after_ms = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(|secs| secs * 1000);
                return Err(LlmError::RateLimited { retry_after_ms });
            }

            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let model_id = chat_response
            .model
            .clone()
            .unwrap_or_else(|| self.model.clone());

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ParseError("No choices in response".to_string()))?;

        let content = choice.message.content.unwrap_or_default();

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let usage = chat_response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            model_id,
            finish_reason,
            usage,
        })
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "model": "coach-7b",
            "choices": [{
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4}
        })
    }

    #[test]
    fn test_vllm_creation() {
        let backend = OpenAiBackend::vllm(8000, "llama-3.3-70b").unwrap();
        assert_eq!(backend.id(), "llama-3.3-70b");
        assert!(backend.capabilities().supports_json_mode);
    }

    #[test]
    fn test_chat_request_respects_capabilities() {
        let request = CompletionRequest::user("frame this")
            .with_system("You are a coach")
            .with_max_tokens(300)
            .with_json_output();

        let capable = OpenAiBackend::ollama("coach").unwrap();
        let body = serde_json::to_value(capable.chat_request(&request)).unwrap();
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");

        let plain = OpenAiBackend::ollama("coach")
            .unwrap()
            .with_capabilities(ModelCapabilities::default());
        let body = serde_json::to_value(plain.chat_request(&request)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("{\"ok\":true}")))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(
            format!("{}/v1", server.uri()),
            "coach",
            Some("secret".to_string()),
        )
        .unwrap();

        let response = backend
            .complete(CompletionRequest::user("hi").with_json_output())
            .await
            .unwrap();

        assert_eq!(response.content, "{\"ok\":true}");
        assert_eq!(response.model_id, "coach-7b");
        assert_eq!(response.usage.total(), 14);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(server.uri(), "coach", None).unwrap();
        let err = backend
            .complete(CompletionRequest::user("hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::RequestFailed(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(server.uri(), "coach", None).unwrap();
        let err = backend
            .complete(CompletionRequest::user("hi"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            LlmError::RateLimited {
                retry_after_ms: Some(2000)
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(server.uri(), "coach", None).unwrap();
        let err = backend
            .complete(CompletionRequest::user("hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_no_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(server.uri(), "coach", None).unwrap();
        let err = backend
            .complete(CompletionRequest::user("hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::ParseError(_)));
    }
}
