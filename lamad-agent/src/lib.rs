//! Lamad Agent - text-completion capability
//!
//! Provides the completion infrastructure the learning coach calls out to:
//! - Trait-based LLM backends (vLLM/OpenAI-compatible, mock)
//! - A task catalogue (`taskType`) with per-task system prompts
//! - A service that bounds every call with a timeout and never retries
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         CompletionService               │
//! │  (TaskRequest -> TaskResponse)          │
//! └────────────────┬────────────────────────┘
//!                  │ one attempt, bounded
//!                  ▼
//!           ┌─────────────┐
//!           │ LlmBackend  │
//!           │ (OpenAI/    │
//!           │  Mock)      │
//!           └─────────────┘
//! ```

pub mod backend;
pub mod request;
pub mod response;
pub mod service;
pub mod task;

// Re-export main types for convenience
pub use backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
pub use backend::{MockBackend, OpenAiBackend};
pub use request::{CompletionOptions, TaskRequest};
pub use response::TaskResponse;
pub use service::{CompletionService, ServiceConfig, ServiceError};
pub use task::CompletionTask;
