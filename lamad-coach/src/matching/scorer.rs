//! Six-factor candidate scorer.
//!
//! Every sub-score starts at a base of 50, adds fixed bonuses and is
//! capped at 100. Each is a pure function of the candidate and a shared
//! [`ScoringContext`], so candidates can be scored in any order.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{DurationBands, MatchingConfig};
use crate::models::{
    finite_or_zero, CandidateItem, EmotionalState, LearningStyle, QuestionType, SkillLevel,
    SubScores, Understanding, UserContext, NEEDS_FUNDAMENTALS, READY_FOR_ADVANCED,
};

/// Starting value of every sub-score.
pub const BASE_SCORE: f64 = 50.0;
/// Upper bound of every sub-score and of the combined score.
pub const MAX_SCORE: f64 = 100.0;

/// Weights for the six scoring factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub relevance: f64,
    pub pedagogical_fit: f64,
    pub engagement_probability: f64,
    pub learning_efficiency: f64,
    pub retention_likelihood: f64,
    pub progression_value: f64,
}

/// Default weight vector. Sums to 1.0.
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    relevance: 0.30,
    pedagogical_fit: 0.20,
    engagement_probability: 0.15,
    learning_efficiency: 0.15,
    retention_likelihood: 0.10,
    progression_value: 0.10,
};

impl Default for ScoringWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl ScoringWeights {
    /// Weights in fixed factor order.
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.relevance,
            self.pedagogical_fit,
            self.engagement_probability,
            self.learning_efficiency,
            self.retention_likelihood,
            self.progression_value,
        ]
    }

    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Weighted sum of the sub-scores, clamped to [0, 100].
    pub fn combine(&self, scores: &SubScores) -> f64 {
        let sum: f64 = self
            .as_array()
            .iter()
            .zip(scores.as_array())
            .map(|(w, s)| w * s)
            .sum();
        finite_or_zero(sum).clamp(0.0, MAX_SCORE)
    }
}

/// Everything the scorer reads besides the candidate itself.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub understanding: &'a Understanding,
    pub user: &'a UserContext,
    pub config: &'a MatchingConfig,
    pub now: DateTime<Utc>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(
        understanding: &'a Understanding,
        user: &'a UserContext,
        config: &'a MatchingConfig,
    ) -> Self {
        Self {
            understanding,
            user,
            config,
            now: Utc::now(),
        }
    }

    /// Pin the clock (tests).
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Recorded belt level, else the level inferred from the question.
    pub fn learner_level(&self) -> SkillLevel {
        self.user
            .skill_level
            .unwrap_or(self.understanding.profile.skill_level)
    }
}

fn bounded(bonus: f64) -> f64 {
    (BASE_SCORE + finite_or_zero(bonus)).clamp(0.0, MAX_SCORE)
}

fn bonus_if(condition: bool, bonus: f64) -> f64 {
    if condition {
        bonus
    } else {
        0.0
    }
}

/// How directly the item answers what was asked.
pub fn relevance(item: &CandidateItem, ctx: &ScoringContext<'_>) -> f64 {
    let explicit = &ctx.understanding.explicit;
    let mut bonus = 0.0;

    if let Some(technique) = explicit.technique.as_deref() {
        bonus += bonus_if(item.title_contains(technique), 30.0);
    }
    if let Some(position) = explicit.position.as_deref() {
        bonus += bonus_if(item.title_contains(position), 20.0);
    }
    bonus += bonus_if(
        explicit.question_type == QuestionType::Troubleshooting && item.mistake_covering,
        10.0,
    );
    bonus += bonus_if(item.timestamp_index.len() > 5, 10.0);

    bounded(bonus)
}

/// How well the teaching suits this learner right now.
pub fn pedagogical_fit(item: &CandidateItem, ctx: &ScoringContext<'_>) -> f64 {
    let profile = &ctx.understanding.profile;
    let learner = ctx.learner_level();
    let mut bonus = 0.0;

    bonus += bonus_if(
        profile.emotional_state == EmotionalState::Frustrated && item.teaching_clarity_score > 15.0,
        25.0,
    );
    bonus += bonus_if(
        profile.emotional_state == EmotionalState::Curious && learner == SkillLevel::Advanced,
        15.0,
    );
    bonus += bonus_if(
        profile.learning_style == LearningStyle::StepByStep && item.timestamp_index.len() > 8,
        20.0,
    );

    let proximity = ctx
        .config
        .belt_proximity
        .factor(item.skill_level.distance(learner));
    bonus += 25.0 * proximity;

    bounded(bonus)
}

/// Multiplier for how well the item's length fits the learner's habits.
pub fn duration_factor(duration_secs: u32, avg_watch_secs: Option<f64>, bands: &DurationBands) -> f64 {
    match avg_watch_secs.filter(|avg| *avg > 0.0) {
        Some(avg) => {
            let gap = (f64::from(duration_secs) - avg).abs();
            if gap <= bands.close_secs {
                bands.close_factor
            } else if gap <= bands.near_secs {
                bands.near_factor
            } else {
                bands.far_factor
            }
        }
        None => {
            if (bands.preferred_min_secs..=bands.preferred_max_secs).contains(&duration_secs) {
                bands.preferred_factor
            } else {
                bands.outside_preferred_factor
            }
        }
    }
}

/// Likelihood the learner actually watches the item.
pub fn engagement_probability(item: &CandidateItem, ctx: &ScoringContext<'_>) -> f64 {
    let history = &ctx.user.history;
    let mut bonus = 0.0;

    bonus += 30.0 * history.instructor_completion(&item.instructor);
    bonus += bonus_if(item.production_quality_score > 7.0, 15.0);
    bonus += 15.0
        * duration_factor(
            item.duration_secs,
            history.avg_watch_duration_secs,
            &ctx.config.duration,
        );

    let recent = item
        .published_at
        .map(|at| ctx.now - at <= Duration::days(ctx.config.recency_days))
        .unwrap_or(false);
    bonus += bonus_if(recent, 10.0);

    bounded(bonus)
}

/// How much the learner gains per minute watched.
pub fn learning_efficiency(item: &CandidateItem, ctx: &ScoringContext<'_>) -> f64 {
    let path = &ctx.understanding.learning_path;
    let mut bonus = 0.0;

    let fundamentals = path.flag(NEEDS_FUNDAMENTALS)
        && (item.skill_level == SkillLevel::Beginner || item.mistake_covering);
    let advanced = path.flag(READY_FOR_ADVANCED) && item.skill_level == SkillLevel::Advanced;
    bonus += bonus_if(fundamentals || advanced, 30.0);

    bonus += finite_or_zero(item.teaching_clarity_score).clamp(0.0, 20.0);
    bonus += bonus_if(item.timestamp_index.len() >= 10, 15.0);

    bounded(bonus)
}

/// How likely the material is to stick.
pub fn retention_likelihood(item: &CandidateItem, _ctx: &ScoringContext<'_>) -> f64 {
    let mut bonus = 0.0;

    bonus += bonus_if(item.mistake_covering, 25.0);
    bonus += bonus_if(item.shows_live_application, 20.0);
    bonus += bonus_if(item.includes_drilling, 15.0);
    bonus += bonus_if(item.teaching_clarity_score > 15.0, 15.0);

    bounded(bonus)
}

/// How far the item moves the learner along.
pub fn progression_value(item: &CandidateItem, ctx: &ScoringContext<'_>) -> f64 {
    let mut bonus = 0.0;

    bonus += bonus_if(!ctx.user.history.has_viewed(&item.id), 30.0);
    bonus += bonus_if(matches_follow_up(item, ctx.understanding), 25.0);
    bonus += bonus_if(item.credibility_score > 25.0, 15.0);

    bounded(bonus)
}

/// Whether the item's title names one of the follow-up concepts.
pub fn matches_follow_up(item: &CandidateItem, understanding: &Understanding) -> bool {
    understanding
        .learning_path
        .follow_up_concepts
        .iter()
        .any(|concept| item.title_contains(concept.trim()))
}

/// All six sub-scores for one candidate.
pub fn score(item: &CandidateItem, ctx: &ScoringContext<'_>) -> SubScores {
    SubScores {
        relevance: relevance(item, ctx),
        pedagogical_fit: pedagogical_fit(item, ctx),
        engagement_probability: engagement_probability(item, ctx),
        learning_efficiency: learning_efficiency(item, ctx),
        retention_likelihood: retention_likelihood(item, ctx),
        progression_value: progression_value(item, ctx),
    }
}
