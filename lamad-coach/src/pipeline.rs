//! End-to-end coach pipeline.
//!
//! Runs understanding, matching and synthesis in sequence for one
//! request. All per-request state lives on the stack of `run`; the
//! pipeline itself is shared read-only across concurrent requests.

use std::fmt;
use std::sync::Arc;

use lamad_agent::CompletionService;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::CoachConfig;
use crate::matching::Matcher;
use crate::models::{LearningPathResponse, ScoredCandidate, Understanding};
use crate::store::{load_user_context, ContentStore, PersistenceSink, ProfileStore};
use crate::synthesis::{SynthesisRequest, Synthesizer};
use crate::types::{CoachError, Result};
use crate::understanding::Interpreter;

/// Caller-allocated identifier of one query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(String);

impl QueryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for callers that do not allocate their own.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutcome {
    pub understanding: Understanding,
    pub response: LearningPathResponse,
    /// Ranked candidates, for telemetry
    pub ranked: Vec<ScoredCandidate>,
}

/// The three coach stages wired to shared collaborators.
pub struct CoachPipeline {
    interpreter: Interpreter,
    matcher: Matcher,
    synthesizer: Synthesizer,
    profiles: Arc<dyn ProfileStore>,
    config: CoachConfig,
}

impl CoachPipeline {
    pub fn new(
        completion: Arc<CompletionService>,
        content: Arc<dyn ContentStore>,
        profiles: Arc<dyn ProfileStore>,
        sink: Arc<dyn PersistenceSink>,
    ) -> Self {
        Self {
            interpreter: Interpreter::new(completion.clone(), profiles.clone(), sink.clone()),
            matcher: Matcher::new(content, profiles.clone()),
            synthesizer: Synthesizer::new(completion, sink),
            profiles,
            config: CoachConfig::default(),
        }
    }

    /// Replace the default configuration.
    pub fn with_config(mut self, config: CoachConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    /// Answer one learner question.
    ///
    /// Fails only on an empty query; every collaborator failure degrades
    /// inside the stage that hit it.
    pub async fn run(&self, user_id: &str, query: &str, query_id: &QueryId) -> Result<PipelineOutcome> {
        if query.trim().is_empty() {
            return Err(CoachError::InvalidQuery("query text is empty".to_string()));
        }

        let user = load_user_context(self.profiles.as_ref(), user_id).await;

        let understanding = self
            .interpreter
            .interpret_with_context(&user, query, query_id.as_str(), &self.config)
            .await?;

        let ranked = self
            .matcher
            .match_candidates(
                &understanding,
                &user,
                self.config.matching.max_results,
                &self.config,
            )
            .await;

        let response = self
            .synthesizer
            .synthesize(
                SynthesisRequest {
                    user_id,
                    query_id: query_id.as_str(),
                    query,
                    understanding: &understanding,
                    ranked: &ranked,
                },
                &self.config,
            )
            .await;

        info!(
            query_id = %query_id,
            user_id,
            model_id = %understanding.model_id,
            results = ranked.len(),
            "Coach pipeline finished"
        );

        Ok(PipelineOutcome {
            understanding,
            response,
            ranked,
        })
    }
}
