//! Completion task catalogue.
//!
//! Each task is one kind of text the coach asks a model to produce. The
//! task selects the system prompt the model sees.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Kinds of completion the coach requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum CompletionTask {
    /// Multi-layer analysis of a learner's free-text question
    QueryInterpretation,
    /// Short contextual blurb introducing a recommended item
    PathFraming,
}

impl CompletionTask {
    /// System prompt that frames the task for the model.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::QueryInterpretation => {
                "You are an expert Brazilian Jiu-Jitsu coach and learning analyst. \
                 Read a student's question and infer what they actually need: the \
                 explicit request, the underlying problem, the student's state and \
                 the learning path that gets them there. Respond with a single JSON \
                 object and nothing else."
            }
            Self::PathFraming => {
                "You are a supportive Brazilian Jiu-Jitsu coach. Write two or three \
                 warm, specific sentences that explain why the recommended video \
                 answers the student's question. Plain text only."
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryInterpretation => "query-interpretation",
            Self::PathFraming => "path-framing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serialization() {
        let task = CompletionTask::QueryInterpretation;
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(json, "\"query-interpretation\"");

        let parsed: CompletionTask = serde_json::from_str("\"path-framing\"").unwrap();
        assert_eq!(parsed, CompletionTask::PathFraming);
        assert_eq!(parsed.as_str(), "path-framing");
    }

    #[test]
    fn test_interpretation_prompt_demands_json() {
        assert!(CompletionTask::QueryInterpretation
            .system_prompt()
            .contains("JSON"));
    }
}
