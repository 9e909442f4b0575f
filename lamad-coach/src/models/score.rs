//! Request-scoped ranking output. Never persisted.

use serde::{Deserialize, Serialize};

use super::candidate::CandidateItem;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Non-finite store or history values count as zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// The six bounded sub-scores, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    pub relevance: f64,
    pub pedagogical_fit: f64,
    pub engagement_probability: f64,
    pub learning_efficiency: f64,
    pub retention_likelihood: f64,
    pub progression_value: f64,
}

impl SubScores {
    /// Sub-scores in fixed factor order.
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
}

/// Score card for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct VideoScore {
    pub candidate_id: String,
    pub scores: SubScores,
    /// Weighted combination in [0, 100]
    pub combined_score: f64,
    /// 1-based position after sorting
    pub rank: usize,
    pub rationale: String,
}

/// A candidate together with its score card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub item: CandidateItem,
    pub score: VideoScore,
}

impl ScoredCandidate {
    pub fn id(&self) -> &str {
        &self.item.id
    }
}
