//! Learner profile and interaction history.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::understanding::{LearningStyle, SkillLevel};

/// Persisted learner profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub user_id: String,
    /// Belt colour as recorded ("white", "blue", ...)
    #[serde(default)]
    pub belt: Option<String>,
    #[serde(default)]
    pub style_prefs: Vec<LearningStyle>,
}

impl LearnerProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            belt: None,
            style_prefs: Vec::new(),
        }
    }

    pub fn with_belt(mut self, belt: impl Into<String>) -> Self {
        self.belt = Some(belt.into());
        self
    }

    pub fn with_style(mut self, style: LearningStyle) -> Self {
        self.style_prefs.push(style);
        self
    }

    pub fn skill_level(&self) -> Option<SkillLevel> {
        self.belt.as_deref().and_then(SkillLevel::from_belt)
    }
}

/// Interaction history used for engagement and novelty scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionHistory {
    #[serde(default)]
    pub viewed_ids: Vec<String>,
    #[serde(default)]
    pub saved_ids: Vec<String>,
    /// Average watch duration in seconds; `None` without history
    #[serde(default)]
    pub avg_watch_duration_secs: Option<f64>,
    /// Overall completion rate (0.0 - 1.0)
    #[serde(default)]
    pub completion_rate: f64,
    /// Completion rate per instructor (0.0 - 1.0)
    #[serde(default)]
    pub per_instructor_completion: HashMap<String, f64>,
}

impl InteractionHistory {
    pub fn has_viewed(&self, item_id: &str) -> bool {
        self.viewed_ids.iter().any(|id| id == item_id)
    }

    pub fn instructor_completion(&self, instructor: &str) -> f64 {
        self.per_instructor_completion
            .get(instructor)
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }
}

/// Read-only per-request view of the learner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserContext {
    pub user_id: String,
    pub belt: Option<String>,
    /// Recorded skill level; `None` for anonymous or unranked learners
    pub skill_level: Option<SkillLevel>,
    pub style_prefs: Vec<LearningStyle>,
    pub history: InteractionHistory,
}

impl UserContext {
    /// Context for a learner with no stored profile or history.
    pub fn anonymous(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn from_parts(
        user_id: impl Into<String>,
        profile: Option<&LearnerProfile>,
        history: InteractionHistory,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            belt: profile.and_then(|p| p.belt.clone()),
            skill_level: profile.and_then(LearnerProfile::skill_level),
            style_prefs: profile.map(|p| p.style_prefs.clone()).unwrap_or_default(),
            history,
        }
    }

    pub fn with_history(mut self, history: InteractionHistory) -> Self {
        self.history = history;
        self
    }

    pub fn with_skill_level(mut self, level: SkillLevel) -> Self {
        self.skill_level = Some(level);
        self
    }

    /// Whether anything is known about the learner.
    pub fn is_anonymous(&self) -> bool {
        self.belt.is_none()
            && self.style_prefs.is_empty()
            && self.history == InteractionHistory::default()
    }
}
