//! Candidate Retrieval & Scoring stage.
//!
//! ```text
//! Understanding ──► retrieval (strict, capped) ──► scorer (6 factors)
//!                                                      │
//!            ranked Vec<ScoredCandidate> ◄── stable sort, rank, truncate
//! ```
//!
//! Store failures degrade to an empty ranking. An empty ranking for a
//! named technique is a valid result, not an error.

pub mod rationale;
pub mod retrieval;
pub mod scorer;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::CoachConfig;
use crate::models::{CandidateItem, ScoredCandidate, Understanding, UserContext, VideoScore};
use crate::store::{load_user_context, ContentStore, ProfileStore};
use crate::types::CoachError;

pub use retrieval::RetrievalBranch;
pub use scorer::{ScoringContext, ScoringWeights, DEFAULT_WEIGHTS};

/// Retrieves and ranks candidates for an understanding.
pub struct Matcher {
    content: Arc<dyn ContentStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl Matcher {
    pub fn new(content: Arc<dyn ContentStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { content, profiles }
    }

    /// Rank candidates for a user, loading their history first.
    pub async fn match_for_user(
        &self,
        understanding: &Understanding,
        user_id: &str,
        max_results: usize,
        config: &CoachConfig,
    ) -> Vec<ScoredCandidate> {
        let user = load_user_context(self.profiles.as_ref(), user_id).await;
        self.match_candidates(understanding, &user, max_results, config)
            .await
    }

    /// Rank candidates against a loaded user context.
    pub async fn match_candidates(
        &self,
        understanding: &Understanding,
        user: &UserContext,
        max_results: usize,
        config: &CoachConfig,
    ) -> Vec<ScoredCandidate> {
        let hits = match retrieval::retrieve(
            self.content.as_ref(),
            &understanding.explicit,
            &config.vocabulary.aliases,
            config.matching.retrieval_cap,
        )
        .await
        {
            Ok((branch, hits)) => {
                if hits.is_empty() && branch == RetrievalBranch::Technique {
                    debug!(
                        technique = understanding.explicit.technique.as_deref().unwrap_or_default(),
                        "No lexical match for technique, returning empty"
                    );
                }
                hits
            }
            Err(e) => {
                let e = CoachError::RetrievalError(e);
                warn!(user_id = %user.user_id, error = %e, "Retrieval failed, returning no candidates");
                Vec::new()
            }
        };

        let ctx = ScoringContext::new(understanding, user, &config.matching);
        let ranked = rank(hits, &ctx, max_results);

        info!(
            user_id = %user.user_id,
            results = ranked.len(),
            top_score = ranked.first().map(|c| c.score.combined_score).unwrap_or(0.0),
            "Candidates ranked"
        );
        ranked
    }
}

/// Score, sort, rank and truncate retrieved candidates.
///
/// The sort is stable so equal scores keep retrieval order. Ranks are
/// assigned 1..N after sorting.
pub fn rank(
    candidates: Vec<CandidateItem>,
    ctx: &ScoringContext<'_>,
    max_results: usize,
) -> Vec<ScoredCandidate> {
    let weights = &ctx.config.weights;

    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|item| {
            let scores = scorer::score(&item, ctx);
            let score = VideoScore {
                candidate_id: item.id.clone(),
                combined_score: weights.combine(&scores),
                rationale: rationale::explain(&scores),
                scores,
                rank: 0,
            };
            ScoredCandidate { item, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.combined_score.total_cmp(&a.score.combined_score));
    scored.truncate(max_results);

    for (index, candidate) in scored.iter_mut().enumerate() {
        candidate.score.rank = index + 1;
    }

    scored
}
