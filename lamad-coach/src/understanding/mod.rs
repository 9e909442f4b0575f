//! Query Understanding stage.
//!
//! Turns a raw learner question plus the stored profile into a
//! multi-layer [`Understanding`]. One bounded completion call is made;
//! any failure falls back to a deterministic keyword interpretation, so
//! the stage only ever fails on an empty query.

pub mod fallback;
pub mod prompt;

use std::sync::Arc;

use chrono::Utc;
use lamad_agent::{CompletionOptions, CompletionService, CompletionTask, TaskRequest};
use tracing::{debug, info, warn};

use crate::config::CoachConfig;
use crate::models::{Understanding, UserContext};
use crate::store::{load_user_context, PersistenceSink, ProfileStore, UnderstandingRecord};
use crate::types::{CoachError, Result};

/// Model id recorded on fallback interpretations.
pub const FALLBACK_MODEL_ID: &str = "fallback";

/// Confidence assigned to fallback interpretations.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Interprets learner questions.
pub struct Interpreter {
    completion: Arc<CompletionService>,
    profiles: Arc<dyn ProfileStore>,
    sink: Arc<dyn PersistenceSink>,
}

impl Interpreter {
    pub fn new(
        completion: Arc<CompletionService>,
        profiles: Arc<dyn ProfileStore>,
        sink: Arc<dyn PersistenceSink>,
    ) -> Self {
        Self {
            completion,
            profiles,
            sink,
        }
    }

    /// Interpret a question for a user, loading their context first.
    pub async fn interpret(
        &self,
        user_id: &str,
        query: &str,
        query_id: &str,
        config: &CoachConfig,
    ) -> Result<Understanding> {
        if query.trim().is_empty() {
            return Err(CoachError::InvalidQuery("query text is empty".to_string()));
        }

        let user = load_user_context(self.profiles.as_ref(), user_id).await;
        self.interpret_with_context(&user, query, query_id, config)
            .await
    }

    /// Interpret a question against an already loaded user context.
    pub async fn interpret_with_context(
        &self,
        user: &UserContext,
        query: &str,
        query_id: &str,
        config: &CoachConfig,
    ) -> Result<Understanding> {
        if query.trim().is_empty() {
            return Err(CoachError::InvalidQuery("query text is empty".to_string()));
        }

        let understanding = match self.analyse(user, query, config).await {
            Ok(understanding) => understanding,
            Err(e) => {
                warn!(
                    query_id,
                    user_id = %user.user_id,
                    error = %e,
                    "Interpretation failed, using keyword fallback"
                );
                fallback::understand(query, &config.vocabulary)
            }
        };

        info!(
            query_id,
            user_id = %user.user_id,
            model_id = %understanding.model_id,
            question_type = understanding.explicit.question_type.as_str(),
            confidence = understanding.confidence,
            "Query interpreted"
        );

        self.persist(user, query, query_id, &understanding).await;
        Ok(understanding)
    }

    async fn analyse(
        &self,
        user: &UserContext,
        query: &str,
        config: &CoachConfig,
    ) -> Result<Understanding> {
        let settings = &config.completion;
        let request = TaskRequest::new(
            CompletionTask::QueryInterpretation,
            prompt::interpretation_prompt(query, user),
        )
        .with_options(
            CompletionOptions::json(
                settings.interpretation_max_tokens,
                settings.interpretation_temperature,
            )
            .with_timeout_ms(settings.interpretation_timeout_ms),
        );

        let response = self.completion.run(request).await?;
        debug!(
            model_id = %response.model_id,
            elapsed_ms = response.elapsed_ms,
            "Interpretation completed"
        );

        Understanding::from_completion(response.text(), response.model_id.clone())
    }

    async fn persist(
        &self,
        user: &UserContext,
        query: &str,
        query_id: &str,
        understanding: &Understanding,
    ) {
        let record = UnderstandingRecord {
            user_id: user.user_id.clone(),
            query_id: query_id.to_string(),
            raw_query: query.to_string(),
            model_id: understanding.model_id.clone(),
            understanding: understanding.clone(),
            recorded_at: Utc::now(),
        };

        if let Err(e) = self.sink.save_understanding(record).await {
            let e = CoachError::PersistenceError(e);
            warn!(query_id, user_id = %user.user_id, error = %e, "Understanding not persisted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmotionalState, LearnerProfile, QuestionType, SkillLevel};
    use crate::store::{InMemoryProfileStore, InMemorySink};
    use lamad_agent::{LlmBackend, LlmError, MockBackend};

    const VALID: &str = r#"{
        "explicit": {"technique": "Triangle", "position": "closed guard",
                     "questionType": "how-to", "keywords": ["triangle", "finish"]},
        "intent": {"rootProblem": "loose finish", "likelyMistakes": ["no angle"],
                   "learningNeed": "finishing details", "skillGap": "angle"},
        "profile": {"skillLevel": "advanced", "learningStyle": "visual",
                    "emotionalState": "excited", "urgency": "high"},
        "learningPath": {"immediateNeed": "finish", "foundationalConcepts": [],
                         "followUpConcepts": ["armbar"],
                         "prerequisiteCheck": {"needs_fundamentals": false, "ready_for_advanced": true}},
        "strategy": {"primary": "demo", "secondary": "drill", "tertiary": "spar",
                     "presentationStyle": "visual"},
        "confidence": 0.9
    }"#;

    fn interpreter(backend: Arc<dyn LlmBackend>, sink: Arc<InMemorySink>) -> Interpreter {
        let profiles = InMemoryProfileStore::new()
            .with_profile(LearnerProfile::new("u1").with_belt("purple"));
        Interpreter::new(
            Arc::new(CompletionService::single(backend)),
            Arc::new(profiles),
            sink,
        )
    }

    #[tokio::test]
    async fn test_interpret_parses_completion() {
        let backend = Arc::new(MockBackend::new("coach-7b").with_response(VALID));
        let sink = Arc::new(InMemorySink::new());
        let interpreter = interpreter(backend.clone(), sink.clone());

        let understanding = interpreter
            .interpret("u1", "how do I finish the triangle", "q1", &CoachConfig::default())
            .await
            .unwrap();

        assert_eq!(understanding.model_id, "coach-7b");
        assert_eq!(understanding.explicit.technique.as_deref(), Some("triangle"));
        assert_eq!(understanding.profile.skill_level, SkillLevel::Advanced);
        assert_eq!(backend.call_count(), 1);

        let request = backend.last_request().unwrap();
        assert!(request.wants_json());
        assert!(request.messages[0].content.contains("Belt: purple"));

        let record = sink.understanding("u1", "q1").unwrap();
        assert_eq!(record.raw_query, "how do I finish the triangle");
        assert_eq!(record.model_id, "coach-7b");
    }

    #[tokio::test]
    async fn test_invalid_json_falls_back() {
        let backend = Arc::new(MockBackend::new("m").with_response("not json at all"));
        let sink = Arc::new(InMemorySink::new());
        let interpreter = interpreter(backend, sink.clone());

        let understanding = interpreter
            .interpret("u1", "I keep losing my guard when people pass", "q2", &CoachConfig::default())
            .await
            .unwrap();

        assert!(understanding.is_fallback());
        assert_eq!(understanding.explicit.question_type, QuestionType::Troubleshooting);
        assert_eq!(understanding.profile.emotional_state, EmotionalState::Frustrated);
        assert_eq!(sink.understanding("u1", "q2").unwrap().model_id, "fallback");
    }

    #[tokio::test]
    async fn test_unreachable_capability_is_deterministic() {
        let backend = Arc::new(MockBackend::new("m").with_available(false));
        let interpreter = interpreter(backend.clone(), Arc::new(InMemorySink::new()));
        let config = CoachConfig::default();
        let query = "why does my kimura keep slipping";

        let first = interpreter.interpret("u1", query, "q1", &config).await.unwrap();
        let second = interpreter.interpret("u1", query, "q2", &config).await.unwrap();

        assert_eq!(first.confidence, 0.3);
        assert_eq!(second.confidence, 0.3);
        assert_eq!(first.explicit.question_type, second.explicit.question_type);
        assert_eq!(first, second);
        // one attempt per call
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_backend_error_falls_back() {
        let backend = Arc::new(
            MockBackend::new("m")
                .then_fail(LlmError::RequestFailed("HTTP 500".into()))
                .with_response(VALID),
        );
        let interpreter = interpreter(backend.clone(), Arc::new(InMemorySink::new()));

        let understanding = interpreter
            .interpret("u1", "show me an armbar", "q1", &CoachConfig::default())
            .await
            .unwrap();

        assert!(understanding.is_fallback());
        assert_eq!(understanding.explicit.technique.as_deref(), Some("armbar"));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let backend = Arc::new(MockBackend::new("m").with_response(VALID));
        let sink = Arc::new(InMemorySink::new());
        let interpreter = interpreter(backend.clone(), sink.clone());

        let result = interpreter
            .interpret("u1", "   ", "q1", &CoachConfig::default())
            .await;

        assert!(matches!(result, Err(CoachError::InvalidQuery(_))));
        assert_eq!(backend.call_count(), 0);
        assert_eq!(sink.understanding_count(), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_swallowed() {
        let backend = Arc::new(MockBackend::new("m").with_response(VALID));
        let sink = Arc::new(InMemorySink::new().offline());
        let interpreter = interpreter(backend, sink.clone());

        let understanding = interpreter
            .interpret("u1", "how do I finish the triangle", "q1", &CoachConfig::default())
            .await;

        assert!(understanding.is_ok());
        assert_eq!(sink.understanding_count(), 0);
    }
}
