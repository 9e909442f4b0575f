//! In-memory store implementations.
//!
//! Used for tests and for callers that hand the coach a prepared
//! candidate pool. Each store can be switched offline to exercise the
//! degraded paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::*;
use crate::models::finite_or_zero;

fn check_online(online: &AtomicBool, name: &str) -> Result<(), StoreError> {
    if online.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err(StoreError::Unavailable(format!("{} offline", name)))
    }
}

/// Content store over a fixed pool of items.
pub struct InMemoryContentStore {
    items: Vec<CandidateItem>,
    online: AtomicBool,
    search_count: AtomicUsize,
}

impl InMemoryContentStore {
    pub fn new(items: Vec<CandidateItem>) -> Self {
        Self {
            items,
            online: AtomicBool::new(true),
            search_count: AtomicUsize::new(0),
        }
    }

    /// Make every search fail with `Unavailable`.
    pub fn offline(self) -> Self {
        self.online.store(false, Ordering::SeqCst);
        self
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn search_count(&self) -> usize {
        self.search_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn search(&self, query: &ContentQuery) -> Result<Vec<CandidateItem>, StoreError> {
        self.search_count.fetch_add(1, Ordering::SeqCst);
        check_online(&self.online, "content store")?;

        let mut hits: Vec<CandidateItem> = self
            .items
            .iter()
            .filter(|item| item.active && query.matches(item))
            .cloned()
            .collect();

        // Stable: equal quality keeps pool order
        hits.sort_by(|a, b| {
            finite_or_zero(b.quality_score).total_cmp(&finite_or_zero(a.quality_score))
        });
        hits.truncate(query.limit);

        Ok(hits)
    }
}

/// Profile store keyed by user id.
pub struct InMemoryProfileStore {
    profiles: DashMap<String, LearnerProfile>,
    histories: DashMap<String, InteractionHistory>,
    online: AtomicBool,
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
            histories: DashMap::new(),
            online: AtomicBool::new(true),
        }
    }

    pub fn with_profile(self, profile: LearnerProfile) -> Self {
        self.profiles.insert(profile.user_id.clone(), profile);
        self
    }

    pub fn with_history(self, user_id: impl Into<String>, history: InteractionHistory) -> Self {
        self.histories.insert(user_id.into(), history);
        self
    }

    pub fn offline(self) -> Self {
        self.online.store(false, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn profile(&self, user_id: &str) -> Result<Option<LearnerProfile>, StoreError> {
        check_online(&self.online, "profile store")?;
        Ok(self.profiles.get(user_id).map(|p| p.value().clone()))
    }

    async fn history(&self, user_id: &str) -> Result<InteractionHistory, StoreError> {
        check_online(&self.online, "profile store")?;
        Ok(self
            .histories
            .get(user_id)
            .map(|h| h.value().clone())
            .unwrap_or_default())
    }
}

type RecordKey = (String, String);

/// Upsert sink keyed by (user, query).
pub struct InMemorySink {
    understandings: DashMap<RecordKey, UnderstandingRecord>,
    paths: DashMap<RecordKey, LearningPathRecord>,
    online: AtomicBool,
    writes: AtomicUsize,
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySink {
    pub fn new() -> Self {
        Self {
            understandings: DashMap::new(),
            paths: DashMap::new(),
            online: AtomicBool::new(true),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn offline(self) -> Self {
        self.online.store(false, Ordering::SeqCst);
        self
    }

    pub fn understanding(&self, user_id: &str, query_id: &str) -> Option<UnderstandingRecord> {
        self.understandings
            .get(&(user_id.to_string(), query_id.to_string()))
            .map(|r| r.value().clone())
    }

    pub fn learning_path(&self, user_id: &str, query_id: &str) -> Option<LearningPathRecord> {
        self.paths
            .get(&(user_id.to_string(), query_id.to_string()))
            .map(|r| r.value().clone())
    }

    pub fn understanding_count(&self) -> usize {
        self.understandings.len()
    }

    pub fn learning_path_count(&self) -> usize {
        self.paths.len()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Rejected("sink offline".to_string()))
        }
    }

    /// Successful writes, including overwrites.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersistenceSink for InMemorySink {
    async fn save_understanding(&self, record: UnderstandingRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        let key = (record.user_id.clone(), record.query_id.clone());
        self.understandings.insert(key, record);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn save_learning_path(&self, record: LearningPathRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        let key = (record.user_id.clone(), record.query_id.clone());
        self.paths.insert(key, record);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
