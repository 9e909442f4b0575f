//! Store seams: content, learner profiles, and the persistence sink.
//!
//! The coach only reads content and profiles, and only upserts records
//! keyed by (user, query).

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{
    CandidateItem, InteractionHistory, LearnerProfile, LearningPathResponse, Understanding,
    UserContext,
};

pub use memory::{InMemoryContentStore, InMemoryProfileStore, InMemorySink};

/// Store error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Backing store cannot be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Store refused the write
    #[error("Write rejected: {0}")]
    Rejected(String),
}

/// Which fields a content search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// Title, technique name and tags
    TitleTechniqueTags,
    /// Title only
    Title,
}

/// A case-insensitive substring query over active items.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentQuery {
    /// Match when any term is a substring of a searched field
    pub terms: Vec<String>,
    pub scope: SearchScope,
    pub limit: usize,
}

impl ContentQuery {
    pub fn new(terms: Vec<String>, scope: SearchScope, limit: usize) -> Self {
        Self {
            terms: terms.into_iter().map(|t| t.to_lowercase()).collect(),
            scope,
            limit,
        }
    }

    /// Whether an item satisfies the query (activity not considered).
    pub fn matches(&self, item: &CandidateItem) -> bool {
        let fields: Vec<String> = match self.scope {
            SearchScope::TitleTechniqueTags => item.searchable_fields().collect(),
            SearchScope::Title => vec![item.title.to_lowercase()],
        };
        self.terms.iter().any(|t| {
            !t.is_empty() && fields.iter().any(|field| field.contains(t.as_str()))
        })
    }
}

/// Read-only instructional content.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Active items matching the query, by descending quality score.
    async fn search(&self, query: &ContentQuery) -> Result<Vec<CandidateItem>, StoreError>;
}

/// Learner profiles and interaction history.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Stored profile, `None` for unknown learners.
    async fn profile(&self, user_id: &str) -> Result<Option<LearnerProfile>, StoreError>;

    /// Interaction history; empty for learners without any.
    async fn history(&self, user_id: &str) -> Result<InteractionHistory, StoreError>;
}

/// Load the learner view, degrading to neutral defaults on store errors.
///
/// Profile and history are read concurrently.
pub async fn load_user_context(profiles: &dyn ProfileStore, user_id: &str) -> UserContext {
    let (profile, history) = futures::join!(profiles.profile(user_id), profiles.history(user_id));

    let profile = profile.unwrap_or_else(|e| {
        warn!(user_id, error = %e, "Profile load failed, using anonymous defaults");
        None
    });
    let history = history.unwrap_or_else(|e| {
        warn!(user_id, error = %e, "History load failed, using neutral history");
        InteractionHistory::default()
    });

    UserContext::from_parts(user_id, profile.as_ref(), history)
}

/// Persisted understanding of one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderstandingRecord {
    pub user_id: String,
    pub query_id: String,
    pub raw_query: String,
    pub model_id: String,
    pub understanding: Understanding,
    pub recorded_at: DateTime<Utc>,
}

/// Persisted learning path for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathRecord {
    pub user_id: String,
    pub query_id: String,
    pub raw_query: String,
    pub response: LearningPathResponse,
    pub recorded_at: DateTime<Utc>,
}

/// Upsert-only sink for pipeline results. Last write wins per key.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn save_understanding(&self, record: UnderstandingRecord) -> Result<(), StoreError>;

    async fn save_learning_path(&self, record: LearningPathRecord) -> Result<(), StoreError>;
}
