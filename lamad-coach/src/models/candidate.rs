//! Instructional items eligible for recommendation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::understanding::SkillLevel;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// One chapter marker inside an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct TimestampEntry {
    /// Offset from the start of the item in seconds
    pub offset_secs: u32,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl TimestampEntry {
    pub fn new(offset_secs: u32, description: impl Into<String>) -> Self {
        Self {
            offset_secs,
            description: description.into(),
            keywords: Vec::new(),
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

/// A piece of instructional content. Read-only to the coach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    pub instructor: String,
    pub technique_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub skill_level: SkillLevel,
    /// Curation score the store orders results by
    pub quality_score: f64,
    /// Production quality (0 - 10)
    pub production_quality_score: f64,
    /// Teaching clarity (0 - 20)
    pub teaching_clarity_score: f64,
    pub mistake_covering: bool,
    pub shows_live_application: bool,
    pub includes_drilling: bool,
    pub duration_secs: u32,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub credibility_score: f64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub timestamp_index: Vec<TimestampEntry>,
}

fn default_active() -> bool {
    true
}

impl CandidateItem {
    /// Create an item with neutral attributes.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        instructor: impl Into<String>,
        technique_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            instructor: instructor.into(),
            technique_name: technique_name.into(),
            tags: Vec::new(),
            skill_level: SkillLevel::Intermediate,
            quality_score: 50.0,
            production_quality_score: 5.0,
            teaching_clarity_score: 10.0,
            mistake_covering: false,
            shows_live_application: false,
            includes_drilling: false,
            duration_secs: 900,
            published_at: None,
            credibility_score: 10.0,
            active: true,
            timestamp_index: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skill_level(mut self, level: SkillLevel) -> Self {
        self.skill_level = level;
        self
    }

    pub fn with_quality(mut self, score: f64) -> Self {
        self.quality_score = score;
        self
    }

    pub fn with_production_quality(mut self, score: f64) -> Self {
        self.production_quality_score = score;
        self
    }

    pub fn with_clarity(mut self, score: f64) -> Self {
        self.teaching_clarity_score = score;
        self
    }

    pub fn covering_mistakes(mut self) -> Self {
        self.mistake_covering = true;
        self
    }

    pub fn with_live_application(mut self) -> Self {
        self.shows_live_application = true;
        self
    }

    pub fn with_drilling(mut self) -> Self {
        self.includes_drilling = true;
        self
    }

    pub fn with_duration_secs(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    pub fn with_credibility(mut self, score: f64) -> Self {
        self.credibility_score = score;
        self
    }

    pub fn with_timestamps(mut self, entries: Vec<TimestampEntry>) -> Self {
        self.timestamp_index = entries;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Lowercased fields searched for technique lookups, one per field.
    ///
    /// Fields are kept apart so a term never matches across a boundary.
    pub fn searchable_fields(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(&self.title)
            .chain(std::iter::once(&self.technique_name))
            .chain(&self.tags)
            .map(|field| field.to_lowercase())
    }

    pub fn title_contains(&self, needle: &str) -> bool {
        !needle.is_empty() && self.title.to_lowercase().contains(&needle.to_lowercase())
    }
}
