//! Task response types.

use serde::{Deserialize, Serialize};

use crate::backend::Usage;
use crate::task::CompletionTask;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Result of one completion task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Task this answers
    pub task_type: CompletionTask,
    /// Generated content, untrimmed
    pub content: String,
    /// Model that produced the content
    pub model_id: String,
    /// Token usage
    pub usage: Usage,
    /// Wall-clock time of the backend call
    pub elapsed_ms: u64,
}

impl TaskResponse {
    /// Content with surrounding whitespace removed.
    pub fn text(&self) -> &str {
        self.content.trim()
    }
}
