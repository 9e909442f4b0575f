//! Role assignment for supporting recommendations.
//!
//! Each role holds at most [`MAX_ROLE_ITEMS`] entries, in ranked order.

use crate::matching::scorer::matches_follow_up;
use crate::models::{
    QuestionType, RoleItem, ScoredCandidate, SkillLevel, Understanding, MAX_ROLE_ITEMS,
    NEEDS_FUNDAMENTALS,
};

/// Sub-score above which a factor alone qualifies an item for a role.
const ROLE_THRESHOLD: f64 = 70.0;

fn role_item(candidate: &ScoredCandidate, rationale: &str) -> RoleItem {
    RoleItem {
        id: candidate.item.id.clone(),
        title: candidate.item.title.clone(),
        rationale: rationale.to_string(),
    }
}

/// Groundwork for learners flagged as needing fundamentals.
pub fn foundation(ranked: &[ScoredCandidate], understanding: &Understanding) -> Vec<RoleItem> {
    if !understanding.learning_path.flag(NEEDS_FUNDAMENTALS) {
        return Vec::new();
    }

    ranked
        .iter()
        .filter(|c| {
            c.item.skill_level == SkillLevel::Beginner
                || c.item.mistake_covering
                || c.score.scores.learning_efficiency > ROLE_THRESHOLD
        })
        .take(MAX_ROLE_ITEMS)
        .map(|c| role_item(c, "builds the fundamentals this technique depends on"))
        .collect()
}

/// Fixes for troubleshooting questions. Never repeats the primary pick.
pub fn troubleshooting(ranked: &[ScoredCandidate], understanding: &Understanding) -> Vec<RoleItem> {
    if understanding.explicit.question_type != QuestionType::Troubleshooting {
        return Vec::new();
    }

    ranked
        .iter()
        .skip(1)
        .filter(|c| c.item.mistake_covering || c.item.shows_live_application)
        .take(MAX_ROLE_ITEMS)
        .map(|c| {
            let rationale = if c.item.mistake_covering {
                "covers the common mistakes behind this problem"
            } else {
                "shows the fix working against resistance"
            };
            role_item(c, rationale)
        })
        .collect()
}

/// Next steps after the primary pick. Never repeats the primary pick.
pub fn progression(ranked: &[ScoredCandidate], understanding: &Understanding) -> Vec<RoleItem> {
    ranked
        .iter()
        .skip(1)
        .filter(|c| {
            matches_follow_up(&c.item, understanding)
                || c.score.scores.progression_value > ROLE_THRESHOLD
        })
        .take(MAX_ROLE_ITEMS)
        .map(|c| role_item(c, "a natural next step once this clicks"))
        .collect()
}
