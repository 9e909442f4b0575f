//! Learning Path Synthesis stage.
//!
//! Arranges ranked candidates into a primary pick plus foundation,
//! troubleshooting and progression roles, picks a playback offset and
//! attaches framing, encouragement, a metacognitive tip and a success
//! metric. Only the framing comes from the completion capability; every
//! other field is deterministic for a given input.

pub mod messaging;
pub mod offset;
pub mod roles;

use std::sync::Arc;

use chrono::Utc;
use lamad_agent::{CompletionOptions, CompletionService, CompletionTask, TaskRequest};
use tracing::{debug, info, warn};

use crate::config::CoachConfig;
use crate::models::{
    EmotionalState, LearningPathResponse, PrimaryPick, ResponseTone, ScoredCandidate,
    Understanding,
};
use crate::store::{LearningPathRecord, PersistenceSink};
use crate::types::CoachError;
use crate::vocabulary;

/// Everything synthesis needs about one request.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    pub user_id: &'a str,
    pub query_id: &'a str,
    pub query: &'a str,
    pub understanding: &'a Understanding,
    pub ranked: &'a [ScoredCandidate],
}

/// Builds and persists learning paths.
pub struct Synthesizer {
    completion: Arc<CompletionService>,
    sink: Arc<dyn PersistenceSink>,
}

impl Synthesizer {
    pub fn new(completion: Arc<CompletionService>, sink: Arc<dyn PersistenceSink>) -> Self {
        Self { completion, sink }
    }

    /// Build the learning path and persist it. Never fails.
    pub async fn synthesize(
        &self,
        request: SynthesisRequest<'_>,
        config: &CoachConfig,
    ) -> LearningPathResponse {
        let response = match request.ranked.first() {
            None => {
                debug!(query_id = request.query_id, "No candidates, using no-match path");
                no_match_response(request.query, request.understanding)
            }
            Some(primary) => {
                let framing = self.framing(&request, primary, config).await;
                assemble(&request, primary, framing)
            }
        };

        info!(
            query_id = request.query_id,
            user_id = request.user_id,
            primary = response.primary.as_ref().map(|p| p.id.as_str()).unwrap_or("none"),
            foundation = response.foundation.len(),
            troubleshooting = response.troubleshooting.len(),
            progression = response.progression.len(),
            "Learning path synthesized"
        );

        self.persist(&request, &response).await;
        response
    }

    async fn framing(
        &self,
        request: &SynthesisRequest<'_>,
        primary: &ScoredCandidate,
        config: &CoachConfig,
    ) -> String {
        let settings = &config.completion;
        let task = TaskRequest::new(
            CompletionTask::PathFraming,
            framing_prompt(request.query, request.understanding, primary),
        )
        .with_options(
            CompletionOptions::text(settings.framing_max_tokens, settings.framing_temperature)
                .with_timeout_ms(settings.framing_timeout_ms),
        );

        match self.completion.run(task).await {
            Ok(response) => response.text().to_string(),
            Err(e) => {
                let e = CoachError::from(e);
                warn!(query_id = request.query_id, error = %e, "Framing failed, using generic framing");
                messaging::GENERIC_FRAMING.to_string()
            }
        }
    }

    async fn persist(&self, request: &SynthesisRequest<'_>, response: &LearningPathResponse) {
        let record = LearningPathRecord {
            user_id: request.user_id.to_string(),
            query_id: request.query_id.to_string(),
            raw_query: request.query.to_string(),
            response: response.clone(),
            recorded_at: Utc::now(),
        };

        if let Err(e) = self.sink.save_learning_path(record).await {
            let e = CoachError::PersistenceError(e);
            warn!(
                query_id = request.query_id,
                user_id = request.user_id,
                error = %e,
                "Learning path not persisted"
            );
        }
    }
}

/// Prompt for the framing task.
pub fn framing_prompt(query: &str, understanding: &Understanding, primary: &ScoredCandidate) -> String {
    format!(
        "STUDENT QUESTION: \"{}\"\n\
         Student state: {}, {} level\n\
         Recommended video: \"{}\" by {}\n\
         Why it was picked: {}\n\n\
         Write 2-3 sentences introducing this video to the student.",
        query.trim(),
        understanding.profile.emotional_state.as_str(),
        understanding.profile.skill_level.as_str(),
        primary.item.title,
        primary.item.instructor,
        primary.score.rationale,
    )
}

fn tone_for(state: EmotionalState) -> ResponseTone {
    match state {
        EmotionalState::Frustrated | EmotionalState::Confused => ResponseTone::Empathetic,
        EmotionalState::Curious | EmotionalState::Excited => ResponseTone::Encouraging,
    }
}

fn presentation_style(understanding: &Understanding) -> String {
    let style = understanding.strategy.presentation_style.trim();
    if style.is_empty() {
        understanding.profile.learning_style.as_str().to_string()
    } else {
        style.to_string()
    }
}

/// Deterministic part of a learning path around a given framing.
pub fn assemble(
    request: &SynthesisRequest<'_>,
    primary: &ScoredCandidate,
    framing: String,
) -> LearningPathResponse {
    let understanding = request.understanding;
    let keywords = vocabulary::keywords(request.query);

    LearningPathResponse {
        primary: Some(PrimaryPick {
            id: primary.item.id.clone(),
            title: primary.item.title.clone(),
            chosen_offset_secs: offset::optimal_offset(&primary.item.timestamp_index, &keywords),
            rationale: primary.score.rationale.clone(),
        }),
        foundation: roles::foundation(request.ranked, understanding),
        troubleshooting: roles::troubleshooting(request.ranked, understanding),
        progression: roles::progression(request.ranked, understanding),
        framing,
        encouragement: messaging::encouragement(understanding.profile.emotional_state).to_string(),
        metacognitive_tip: messaging::metacognitive_tip(understanding, &primary.item).to_string(),
        success_metric: messaging::success_metric(understanding),
        presentation_style: presentation_style(understanding),
        tone: tone_for(understanding.profile.emotional_state),
    }
}

/// Response for a query with no candidates.
pub fn no_match_response(query: &str, understanding: &Understanding) -> LearningPathResponse {
    LearningPathResponse {
        primary: None,
        foundation: Vec::new(),
        troubleshooting: Vec::new(),
        progression: Vec::new(),
        framing: messaging::no_match_framing(query),
        encouragement: messaging::encouragement(understanding.profile.emotional_state).to_string(),
        metacognitive_tip: messaging::GENERIC_TIP.to_string(),
        success_metric: messaging::GENERIC_METRIC.to_string(),
        presentation_style: presentation_style(understanding),
        tone: ResponseTone::Empathetic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{rank, ScoringContext};
    use crate::models::{CandidateItem, TimestampEntry, UserContext, MAX_ROLE_ITEMS};
    use crate::store::InMemorySink;
    use crate::understanding::fallback;
    use lamad_agent::{LlmBackend, MockBackend};

    fn synthesizer(backend: Arc<dyn LlmBackend>, sink: Arc<InMemorySink>) -> Synthesizer {
        Synthesizer::new(Arc::new(CompletionService::single(backend)), sink)
    }

    fn ranked_for(query: &str, items: Vec<CandidateItem>) -> (Understanding, Vec<ScoredCandidate>) {
        let config = CoachConfig::default();
        let understanding = fallback::understand(query, &config.vocabulary);
        let user = UserContext::anonymous("u1");
        let ctx = ScoringContext::new(&understanding, &user, &config.matching);
        let ranked = rank(items, &ctx, config.matching.max_results);
        (understanding, ranked)
    }

    fn guard_pool() -> Vec<CandidateItem> {
        vec![
            CandidateItem::new("g1", "Guard Retention Fixes", "A", "guard retention")
                .covering_mistakes()
                .with_clarity(18.0),
            CandidateItem::new("g2", "Guard Recovery Drills", "B", "guard retention").with_drilling(),
            CandidateItem::new("g3", "Losing Guard Mistakes", "C", "guard retention").covering_mistakes(),
            CandidateItem::new("g4", "Retaining Guard Live", "D", "guard retention").covering_mistakes(),
            CandidateItem::new("g5", "Guard Recovery Concepts", "E", "guard retention").covering_mistakes(),
        ]
    }

    #[tokio::test]
    async fn test_synthesize_uses_framing_and_persists() {
        let backend = Arc::new(MockBackend::new("m").with_response("  Watch this one first.  "));
        let sink = Arc::new(InMemorySink::new());
        let synth = synthesizer(backend.clone(), sink.clone());

        let index = vec![
            TimestampEntry::new(0, "Intro"),
            TimestampEntry::new(180, "Finishing the triangle"),
        ];
        let (understanding, ranked) = ranked_for(
            "how do I finish the triangle from closed guard",
            vec![CandidateItem::new("t1", "Closed Guard Triangle", "R", "triangle").with_timestamps(index)],
        );

        let response = synth
            .synthesize(
                SynthesisRequest {
                    user_id: "u1",
                    query_id: "q1",
                    query: "how do I finish the triangle from closed guard",
                    understanding: &understanding,
                    ranked: &ranked,
                },
                &CoachConfig::default(),
            )
            .await;

        let primary = response.primary.as_ref().unwrap();
        assert_eq!(primary.id, "t1");
        assert_eq!(primary.chosen_offset_secs, Some(180));
        assert_eq!(response.framing, "Watch this one first.");
        assert_eq!(response.tone, ResponseTone::Encouraging);
        assert_eq!(response.presentation_style, "step-by-step");
        assert_eq!(backend.call_count(), 1);
        assert!(!backend.last_request().unwrap().wants_json());
        assert_eq!(sink.learning_path("u1", "q1").unwrap().response, response);
    }

    #[tokio::test]
    async fn test_framing_failure_uses_generic() {
        let backend = Arc::new(MockBackend::new("m").with_available(false));
        let synth = synthesizer(backend, Arc::new(InMemorySink::new()));
        let (understanding, ranked) = ranked_for("armbar", vec![CandidateItem::new("a", "Armbar", "I", "armbar")]);

        let response = synth
            .synthesize(
                SynthesisRequest {
                    user_id: "u1",
                    query_id: "q1",
                    query: "armbar",
                    understanding: &understanding,
                    ranked: &ranked,
                },
                &CoachConfig::default(),
            )
            .await;

        assert_eq!(response.framing, messaging::GENERIC_FRAMING);
        assert!(response.primary.is_some());
    }

    #[tokio::test]
    async fn test_empty_ranking_fallback() {
        let backend = Arc::new(MockBackend::new("m"));
        let sink = Arc::new(InMemorySink::new());
        let synth = synthesizer(backend.clone(), sink.clone());
        let query = "show me the de la riva guard";
        let understanding = fallback::understand(query, &CoachConfig::default().vocabulary);

        let response = synth
            .synthesize(
                SynthesisRequest {
                    user_id: "u1",
                    query_id: "q1",
                    query,
                    understanding: &understanding,
                    ranked: &[],
                },
                &CoachConfig::default(),
            )
            .await;

        assert!(response.is_empty());
        assert!(response.framing.contains(query));
        assert!(response.foundation.is_empty());
        assert!(response.troubleshooting.is_empty());
        assert!(response.progression.is_empty());
        assert_eq!(response.tone, ResponseTone::Empathetic);
        assert_eq!(response.metacognitive_tip, messaging::GENERIC_TIP);
        assert_eq!(backend.call_count(), 0);
        assert!(sink.learning_path("u1", "q1").is_some());
    }

    #[test]
    fn test_troubleshooting_roles_bounded() {
        let query = "I keep losing my guard when people pass";
        let (understanding, ranked) = ranked_for(query, guard_pool());
        let request = SynthesisRequest {
            user_id: "u1",
            query_id: "q1",
            query,
            understanding: &understanding,
            ranked: &ranked,
        };
        let response = assemble(&request, &ranked[0], String::new());

        assert_eq!(response.troubleshooting.len(), MAX_ROLE_ITEMS);
        assert!(response.foundation.len() <= MAX_ROLE_ITEMS);
        assert!(response.progression.len() <= MAX_ROLE_ITEMS);
        let primary_id = response.primary.as_ref().unwrap().id.clone();
        for role in &response.progression {
            assert_ne!(role.id, primary_id);
        }
        for role in &response.troubleshooting {
            assert_ne!(role.id, primary_id);
            let item = ranked.iter().find(|c| c.id() == role.id).unwrap();
            assert!(item.item.mistake_covering);
        }
        assert_eq!(response.tone, ResponseTone::Empathetic);
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let query = "I keep losing my guard when people pass";
        let (understanding, ranked) = ranked_for(query, guard_pool());
        let request = SynthesisRequest {
            user_id: "u1",
            query_id: "q1",
            query,
            understanding: &understanding,
            ranked: &ranked,
        };

        let first = assemble(&request, &ranked[0], "one".into());
        let second = assemble(&request, &ranked[0], "two".into());

        assert_eq!(first.recommended_ids(), second.recommended_ids());
        assert_eq!(first.metacognitive_tip, second.metacognitive_tip);
    }
}
