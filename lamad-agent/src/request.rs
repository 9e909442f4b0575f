//! Task request types.

use serde::{Deserialize, Serialize};

use crate::backend::CompletionRequest;
use crate::task::CompletionTask;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Generation options for a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    /// Bias the model towards a single JSON object
    pub json_mode: bool,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature (0.0-2.0)
    pub temperature: f32,
    /// Per-request timeout; the service default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            json_mode: false,
            max_tokens: 512,
            temperature: 0.7,
            timeout_ms: None,
        }
    }
}

impl CompletionOptions {
    /// Options for a JSON-biased analytical call.
    pub fn json(max_tokens: u32, temperature: f32) -> Self {
        Self {
            json_mode: true,
            max_tokens,
            temperature: temperature.clamp(0.0, 2.0),
            timeout_ms: None,
        }
    }

    /// Options for free text.
    pub fn text(max_tokens: u32, temperature: f32) -> Self {
        Self {
            json_mode: false,
            max_tokens,
            temperature: temperature.clamp(0.0, 2.0),
            timeout_ms: None,
        }
    }

    /// Set the timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// Request to run one completion task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    /// Which task is being requested
    pub task_type: CompletionTask,
    /// User prompt for the model
    pub prompt: String,
    /// Generation options
    pub options: CompletionOptions,
}

impl TaskRequest {
    /// Create a new request with default options.
    pub fn new(task_type: CompletionTask, prompt: impl Into<String>) -> Self {
        Self {
            task_type,
            prompt: prompt.into(),
            options: CompletionOptions::default(),
        }
    }

    /// Set options.
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Lower into a backend completion request.
    pub fn to_completion(&self) -> CompletionRequest {
        let request = CompletionRequest::user(&self.prompt)
            .with_system(self.task_type.system_prompt())
            .with_max_tokens(self.options.max_tokens)
            .with_temperature(self.options.temperature);

        if self.options.json_mode {
            request.with_json_output()
        } else {
            request
        }
    }
}
