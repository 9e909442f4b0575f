//! Mock LLM backend for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::traits::*;

/// Mock backend for testing.
///
/// Responses are served from a script queue first, then the fixed
/// response. Failures and latency can be injected.
pub struct MockBackend {
    model_id: String,
    available: AtomicBool,
    capabilities: ModelCapabilities,
    response_content: String,
    scripted: Mutex<VecDeque<Result<String, LlmError>>>,
    delay: Option<Duration>,
    call_count: AtomicU32,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            available: AtomicBool::new(true),
            capabilities: ModelCapabilities {
                supports_json_mode: true,
                ..ModelCapabilities::default()
            },
            response_content: "Mock response".to_string(),
            scripted: Mutex::new(VecDeque::new()),
            delay: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Set the response content.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.response_content = content.into();
        self
    }

    /// Queue a response served before the fixed one.
    pub fn then_respond(self, content: impl Into<String>) -> Self {
        self.push_script(Ok(content.into()));
        self
    }

    /// Queue a failure served before the fixed response.
    pub fn then_fail(self, error: LlmError) -> Self {
        self.push_script(Err(error));
        self
    }

    /// Set availability. An unavailable mock fails every call.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Delay every call (for timeout tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times complete was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request seen by the mock.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }

    fn push_script(&self, entry: Result<String, LlmError>) {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.push_back(entry);
        }
    }

    fn next_scripted(&self) -> Option<Result<String, LlmError>> {
        self.scripted.lock().ok().and_then(|mut s| s.pop_front())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        // Estimate token counts
        let prompt_tokens: u32 = request
            .messages
            .iter()
            .map(|m| m.content.len() as u32 / 4)
            .sum();

        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if !self.available.load(Ordering::SeqCst) {
            return Err(LlmError::Unavailable("Mock backend disabled".to_string()));
        }

        let content = match self.next_scripted() {
            Some(entry) => entry?,
            None => self.response_content.clone(),
        };

        let completion_tokens = content.len() as u32 / 4;

        Ok(CompletionResponse {
            content,
            model_id: self.model_id.clone(),
            finish_reason: FinishReason::Stop,
            usage: Usage {
                prompt_tokens,
                completion_tokens,
            },
        })
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }
}
