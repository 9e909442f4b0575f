//! CompletionService - the single entry point for completion tasks.
//!
//! Every call is one bounded attempt against the primary backend. A
//! timeout or backend error is returned immediately; callers own the
//! fallback.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::backend::traits::{LlmBackend, LlmError};
use crate::request::TaskRequest;
use crate::response::TaskResponse;

/// Error types for the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No backend configured
    #[error("No LLM backend available")]
    NoBackendAvailable,

    /// Backend error
    #[error("Backend error: {0}")]
    BackendError(#[from] LlmError),

    /// Call exceeded its time budget
    #[error("Completion timed out after {0}ms")]
    Timeout(u64),

    /// Request validation error
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Configuration for the CompletionService.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Default timeout for requests (ms)
    pub default_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 10_000,
        }
    }
}

/// Runs completion tasks against the configured backend.
pub struct CompletionService {
    /// Configuration
    config: ServiceConfig,
    /// Backends in preference order; only the first is called
    backends: Vec<Arc<dyn LlmBackend>>,
}

impl CompletionService {
    /// Create a new service with the given backends.
    pub fn new(backends: Vec<Arc<dyn LlmBackend>>) -> Self {
        Self {
            config: ServiceConfig::default(),
            backends,
        }
    }

    /// Create a service over a single backend.
    pub fn single(backend: Arc<dyn LlmBackend>) -> Self {
        Self::new(vec![backend])
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one task. Never retries.
    pub async fn run(&self, request: TaskRequest) -> Result<TaskResponse, ServiceError> {
        if request.prompt.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("empty prompt".to_string()));
        }

        let backend = self
            .backends
            .first()
            .ok_or(ServiceError::NoBackendAvailable)?;

        let timeout_ms = request
            .options
            .timeout_ms
            .unwrap_or(self.config.default_timeout_ms);

        debug!(
            task = request.task_type.as_str(),
            backend = backend.id(),
            timeout_ms,
            "Dispatching completion task"
        );

        let start = Instant::now();
        let outcome = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            backend.complete(request.to_completion().fit_to(backend.capabilities())),
        )
        .await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let completion = match outcome {
            Err(_) => {
                warn!(task = request.task_type.as_str(), elapsed_ms, "Completion timed out");
                return Err(ServiceError::Timeout(timeout_ms));
            }
            Ok(Err(e)) => {
                warn!(task = request.task_type.as_str(), elapsed_ms, error = %e, "Completion failed");
                return Err(e.into());
            }
            Ok(Ok(completion)) => completion,
        };

        if completion.content.trim().is_empty() {
            warn!(task = request.task_type.as_str(), "Completion returned no content");
            return Err(LlmError::EmptyResponse(completion.model_id).into());
        }

        Ok(TaskResponse {
            task_type: request.task_type,
            content: completion.content,
            model_id: completion.model_id,
            usage: completion.usage,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::request::CompletionOptions;
    use crate::task::CompletionTask;

    #[tokio::test]
    async fn test_service_run() {
        let backend = Arc::new(MockBackend::new("coach-mini").with_response(r#"{"ok": true}"#));
        let service = CompletionService::single(backend.clone());

        let request = TaskRequest::new(CompletionTask::QueryInterpretation, "armbar from mount")
            .with_options(CompletionOptions::json(500, 0.2));
        let response = service.run(request).await.unwrap();

        assert_eq!(response.model_id, "coach-mini");
        assert_eq!(response.text(), r#"{"ok": true}"#);
        assert_eq!(backend.call_count(), 1);
        assert!(backend.last_request().unwrap().wants_json());
    }

    #[tokio::test]
    async fn test_output_budget_fits_backend() {
        let backend = Arc::new(MockBackend::new("coach-mini").with_response("ok"));
        let service = CompletionService::single(backend.clone());

        let request = TaskRequest::new(CompletionTask::PathFraming, "frame")
            .with_options(CompletionOptions::json(5000, 0.7));
        service.run(request).await.unwrap();

        assert_eq!(backend.last_request().unwrap().max_tokens, Some(1024));
    }

    #[tokio::test]
    async fn test_failure_is_not_retried() {
        let backend = Arc::new(MockBackend::default().with_available(false));
        let standby: Arc<dyn LlmBackend> = Arc::new(MockBackend::default());
        let primary: Arc<dyn LlmBackend> = backend.clone();
        let service = CompletionService::new(vec![primary, standby]);

        let result = service
            .run(TaskRequest::new(CompletionTask::PathFraming, "frame"))
            .await;

        assert!(matches!(result, Err(ServiceError::BackendError(LlmError::Unavailable(_)))));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_timeout() {
        let backend = Arc::new(MockBackend::default().with_delay(Duration::from_millis(200)));
        let service = CompletionService::single(backend);

        let request = TaskRequest::new(CompletionTask::PathFraming, "frame")
            .with_options(CompletionOptions::text(100, 0.7).with_timeout_ms(20));
        let result = service.run(request).await;

        assert!(matches!(result, Err(ServiceError::Timeout(20))));
    }

    #[tokio::test]
    async fn test_empty_content_is_an_error() {
        let service = CompletionService::single(Arc::new(MockBackend::default().with_response("   ")));
        let result = service
            .run(TaskRequest::new(CompletionTask::PathFraming, "frame"))
            .await;

        assert!(matches!(result, Err(ServiceError::BackendError(LlmError::EmptyResponse(_)))));
    }

    #[tokio::test]
    async fn test_no_backend() {
        let service = CompletionService::new(vec![]);
        let result = service
            .run(TaskRequest::new(CompletionTask::PathFraming, "frame"))
            .await;
        assert!(matches!(result, Err(ServiceError::NoBackendAvailable)));
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let service = CompletionService::single(Arc::new(MockBackend::default()));
        let result = service
            .run(TaskRequest::new(CompletionTask::PathFraming, "  "))
            .await;
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }
}
