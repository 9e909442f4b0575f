//! Strict candidate retrieval.
//!
//! Branches are tried in order and the first applicable one decides the
//! result, even when it finds nothing. A named technique with no lexical
//! hits yields an empty set and never falls through to position or
//! keyword search.

use tracing::debug;

use crate::models::{CandidateItem, ExplicitLayer};
use crate::store::{ContentQuery, ContentStore, SearchScope, StoreError};
use crate::vocabulary::AliasTable;

/// Which retrieval branch produced the hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalBranch {
    /// Technique and its aliases over title, technique name and tags
    Technique,
    /// Position phrase in title
    Position,
    /// First keyword in title
    Keyword,
    /// Nothing to search for
    Nothing,
}

impl RetrievalBranch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technique => "technique",
            Self::Position => "position",
            Self::Keyword => "keyword",
            Self::Nothing => "nothing",
        }
    }
}

/// Store query for the first applicable branch.
pub fn plan(
    explicit: &ExplicitLayer,
    aliases: &AliasTable,
    cap: usize,
) -> (RetrievalBranch, Option<ContentQuery>) {
    if let Some(technique) = explicit.technique.as_deref().filter(|t| !t.trim().is_empty()) {
        let terms = aliases.expand(technique);
        return (
            RetrievalBranch::Technique,
            Some(ContentQuery::new(terms, SearchScope::TitleTechniqueTags, cap)),
        );
    }

    if let Some(position) = explicit.position.as_deref().filter(|p| !p.trim().is_empty()) {
        return (
            RetrievalBranch::Position,
            Some(ContentQuery::new(
                vec![position.trim().to_string()],
                SearchScope::Title,
                cap,
            )),
        );
    }

    if let Some(keyword) = explicit.keywords.iter().find(|k| !k.trim().is_empty()) {
        return (
            RetrievalBranch::Keyword,
            Some(ContentQuery::new(
                vec![keyword.trim().to_string()],
                SearchScope::Title,
                cap,
            )),
        );
    }

    (RetrievalBranch::Nothing, None)
}

/// Fetch raw hits, ordered by store quality and capped.
pub async fn retrieve(
    store: &dyn ContentStore,
    explicit: &ExplicitLayer,
    aliases: &AliasTable,
    cap: usize,
) -> Result<(RetrievalBranch, Vec<CandidateItem>), StoreError> {
    let (branch, query) = plan(explicit, aliases, cap);
    let Some(query) = query else {
        debug!("Nothing to retrieve on");
        return Ok((branch, Vec::new()));
    };

    let mut hits = store.search(&query).await?;
    hits.truncate(cap);

    debug!(
        branch = branch.as_str(),
        terms = query.terms.len(),
        hits = hits.len(),
        "Retrieved candidates"
    );
    Ok((branch, hits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;
    use crate::store::InMemoryContentStore;

    fn explicit(technique: Option<&str>, position: Option<&str>, keywords: &[&str]) -> ExplicitLayer {
        ExplicitLayer {
            technique: technique.map(String::from),
            position: position.map(String::from),
            question_type: QuestionType::HowTo,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn pool() -> Vec<CandidateItem> {
        vec![
            CandidateItem::new("t1", "Triangle From Closed Guard", "A", "triangle").with_quality(70.0),
            CandidateItem::new("t2", "Sankaku Entries", "B", "leg entanglement").with_quality(90.0),
            CandidateItem::new("g1", "Closed Guard Sweeps", "C", "sweep").with_quality(80.0),
            CandidateItem::new("k1", "Posture Fundamentals", "D", "posture").with_quality(60.0),
        ]
    }

    #[tokio::test]
    async fn test_technique_branch_uses_aliases() {
        let store = InMemoryContentStore::new(pool());
        let (branch, hits) = retrieve(
            &store,
            &explicit(Some("triangle"), Some("closed guard"), &[]),
            &AliasTable::builtin(),
            20,
        )
        .await
        .unwrap();

        let ids: Vec<&str> = hits.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(branch, RetrievalBranch::Technique);
        assert_eq!(ids, vec!["t2", "t1"]);
    }

    #[tokio::test]
    async fn test_unmatched_technique_never_substitutes() {
        let store = InMemoryContentStore::new(pool());
        let (branch, hits) = retrieve(
            &store,
            &explicit(Some("de la riva"), Some("closed guard"), &["posture"]),
            &AliasTable::builtin(),
            20,
        )
        .await
        .unwrap();

        assert_eq!(branch, RetrievalBranch::Technique);
        assert!(hits.is_empty());
        assert_eq!(store.search_count(), 1);
    }

    #[tokio::test]
    async fn test_position_branch() {
        let store = InMemoryContentStore::new(pool());
        let (branch, hits) = retrieve(
            &store,
            &explicit(None, Some("closed guard"), &["posture"]),
            &AliasTable::builtin(),
            20,
        )
        .await
        .unwrap();

        let ids: Vec<&str> = hits.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(branch, RetrievalBranch::Position);
        assert_eq!(ids, vec!["g1", "t1"]);
    }

    #[tokio::test]
    async fn test_first_keyword_only() {
        let store = InMemoryContentStore::new(pool());
        let (branch, hits) = retrieve(
            &store,
            &explicit(None, None, &["posture", "sweeps"]),
            &AliasTable::builtin(),
            20,
        )
        .await
        .unwrap();

        assert_eq!(branch, RetrievalBranch::Keyword);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "k1");
    }

    #[tokio::test]
    async fn test_nothing_to_search() {
        let store = InMemoryContentStore::new(pool());
        let (branch, hits) = retrieve(&store, &explicit(None, None, &[]), &AliasTable::builtin(), 20)
            .await
            .unwrap();

        assert_eq!(branch, RetrievalBranch::Nothing);
        assert!(hits.is_empty());
        assert_eq!(store.search_count(), 0);
    }

    #[tokio::test]
    async fn test_cap() {
        let items: Vec<CandidateItem> = (0..30)
            .map(|i| CandidateItem::new(format!("v{}", i), format!("Armbar {}", i), "I", "armbar"))
            .collect();
        let store = InMemoryContentStore::new(items);
        let (_, hits) = retrieve(
            &store,
            &explicit(Some("armbar"), None, &[]),
            &AliasTable::builtin(),
            20,
        )
        .await
        .unwrap();

        assert_eq!(hits.len(), 20);
    }
}
