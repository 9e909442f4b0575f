//! Structured understanding of a learner question.
//!
//! The JSON shape here is the schema the interpretation task must answer
//! with. Parsing is strict: a missing layer, an unknown enum value or an
//! out-of-range confidence rejects the whole payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CoachError, Result};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Prerequisite flag: learner needs fundamentals before the asked technique.
pub const NEEDS_FUNDAMENTALS: &str = "needs_fundamentals";
/// Prerequisite flag: learner is ready for advanced material.
pub const READY_FOR_ADVANCED: &str = "ready_for_advanced";

/// What kind of question was asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    HowTo,
    Troubleshooting,
    Conceptual,
    Comparison,
    Other,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HowTo => "how-to",
            Self::Troubleshooting => "troubleshooting",
            Self::Conceptual => "conceptual",
            Self::Comparison => "comparison",
            Self::Other => "other",
        }
    }
}

/// Learner skill level, ordered from least to most experienced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl SkillLevel {
    fn ordinal(self) -> i8 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Advanced => 2,
        }
    }

    /// Number of levels between two skill levels.
    pub fn distance(self, other: SkillLevel) -> u8 {
        (self.ordinal() - other.ordinal()).unsigned_abs()
    }

    /// Map a belt colour to a skill level.
    pub fn from_belt(belt: &str) -> Option<Self> {
        match belt.trim().to_lowercase().as_str() {
            "white" => Some(Self::Beginner),
            "blue" => Some(Self::Intermediate),
            "purple" | "brown" | "black" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// How the learner prefers to take in material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum LearningStyle {
    Visual,
    #[default]
    StepByStep,
    Conceptual,
    ProblemSolving,
}

impl LearningStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::StepByStep => "step-by-step",
            Self::Conceptual => "conceptual",
            Self::ProblemSolving => "problem-solving",
        }
    }
}

/// Emotional state inferred from the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum EmotionalState {
    #[default]
    Curious,
    Frustrated,
    Confused,
    Excited,
}

impl EmotionalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Curious => "curious",
            Self::Frustrated => "frustrated",
            Self::Confused => "confused",
            Self::Excited => "excited",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

/// What the learner literally asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ExplicitLayer {
    #[serde(default)]
    pub technique: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    pub question_type: QuestionType,
    pub keywords: Vec<String>,
}

/// What the learner actually needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct IntentLayer {
    pub root_problem: String,
    pub likely_mistakes: Vec<String>,
    pub learning_need: String,
    pub skill_gap: String,
}

/// Who is asking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ProfileLayer {
    pub skill_level: SkillLevel,
    pub learning_style: LearningStyle,
    pub emotional_state: EmotionalState,
    pub urgency: Urgency,
}

/// Where the question sits in a progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct LearningPathLayer {
    pub immediate_need: String,
    pub foundational_concepts: Vec<String>,
    pub follow_up_concepts: Vec<String>,
    pub prerequisite_check: BTreeMap<String, bool>,
}

impl LearningPathLayer {
    /// Whether a prerequisite flag is set. Missing flags read as false.
    pub fn flag(&self, name: &str) -> bool {
        self.prerequisite_check.get(name).copied().unwrap_or(false)
    }
}

/// Recommendation strategy chosen for the question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
    pub presentation_style: String,
}

/// Wire payload expected from the interpretation task.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisPayload {
    explicit: ExplicitLayer,
    intent: IntentLayer,
    profile: ProfileLayer,
    learning_path: LearningPathLayer,
    strategy: Strategy,
    confidence: f64,
}

/// Multi-layer understanding of one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Understanding {
    pub explicit: ExplicitLayer,
    pub intent: IntentLayer,
    pub profile: ProfileLayer,
    pub learning_path: LearningPathLayer,
    pub strategy: Strategy,
    /// Confidence in the analysis (0.0 - 1.0)
    pub confidence: f64,
    /// Model that produced the analysis, or "fallback"
    pub model_id: String,
}

impl Understanding {
    /// Parse and validate a completion payload.
    pub fn from_completion(content: &str, model_id: impl Into<String>) -> Result<Self> {
        let payload: AnalysisPayload = serde_json::from_str(content.trim())?;

        if !(0.0..=1.0).contains(&payload.confidence) || payload.confidence.is_nan() {
            return Err(CoachError::CapabilityError(format!(
                "confidence {} outside [0, 1]",
                payload.confidence
            )));
        }

        let mut explicit = payload.explicit;
        explicit.technique = normalize_term(explicit.technique);
        explicit.position = normalize_term(explicit.position);
        explicit.keywords.retain(|k| !k.trim().is_empty());

        Ok(Self {
            explicit,
            intent: payload.intent,
            profile: payload.profile,
            learning_path: payload.learning_path,
            strategy: payload.strategy,
            confidence: payload.confidence,
            model_id: model_id.into(),
        })
    }

    pub fn is_fallback(&self) -> bool {
        self.model_id == crate::understanding::FALLBACK_MODEL_ID
    }
}

fn normalize_term(term: Option<String>) -> Option<String> {
    term.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty())
}
