//! Learning path response returned to the learner.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Maximum entries in each supporting role.
pub const MAX_ROLE_ITEMS: usize = 2;

/// The item the learner should watch first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PrimaryPick {
    pub id: String,
    pub title: String,
    /// Where to start playback, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_offset_secs: Option<u32>,
    pub rationale: String,
}

/// A supporting recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct RoleItem {
    pub id: String,
    pub title: String,
    pub rationale: String,
}

/// Tone the response is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ResponseTone {
    Encouraging,
    Empathetic,
}

/// Structured multi-role recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct LearningPathResponse {
    /// `None` only when nothing matched the query
    pub primary: Option<PrimaryPick>,
    pub foundation: Vec<RoleItem>,
    pub troubleshooting: Vec<RoleItem>,
    pub progression: Vec<RoleItem>,
    pub framing: String,
    pub encouragement: String,
    pub metacognitive_tip: String,
    pub success_metric: String,
    pub presentation_style: String,
    pub tone: ResponseTone,
}

impl LearningPathResponse {
    /// Ids of every recommended item, primary first.
    pub fn recommended_ids(&self) -> Vec<&str> {
        self.primary
            .iter()
            .map(|p| p.id.as_str())
            .chain(self.foundation.iter().map(|r| r.id.as_str()))
            .chain(self.troubleshooting.iter().map(|r| r.id.as_str()))
            .chain(self.progression.iter().map(|r| r.id.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none()
    }
}
