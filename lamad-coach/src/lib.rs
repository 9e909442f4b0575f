//! Lamad Coach - BJJ learning coach pipeline
//!
//! Answers a learner's free-text question with a structured learning path:
//! - Query understanding: completion call with a deterministic keyword fallback
//! - Candidate matching: strict no-substitution retrieval, six-factor scoring
//! - Learning path synthesis: primary pick, supporting roles, framing and tips
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      CoachPipeline                       │
//! │   (user, query, query id) -> PipelineOutcome             │
//! └──────┬──────────────────┬──────────────────┬─────────────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ Interpreter │───►│   Matcher   │───►│ Synthesizer │
//! │ (+fallback) │    │ (retrieve,  │    │ (roles,     │
//! │             │    │  score)     │    │  framing)   │
//! └──────┬──────┘    └──────┬──────┘    └──────┬──────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//!  CompletionService   ContentStore     PersistenceSink
//! ```
//!
//! Every collaborator failure degrades inside its stage. The only error a
//! caller sees is [`CoachError::InvalidQuery`].

pub mod config;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod synthesis;
pub mod types;
pub mod understanding;
pub mod vocabulary;

// Re-export main types for convenience
pub use config::{BeltProximity, CoachConfig, CompletionSettings, DurationBands, MatchingConfig};
pub use matching::{Matcher, ScoringWeights, DEFAULT_WEIGHTS};
pub use models::{
    CandidateItem, InteractionHistory, LearnerProfile, LearningPathResponse, ScoredCandidate,
    Understanding, UserContext, VideoScore,
};
pub use pipeline::{CoachPipeline, PipelineOutcome, QueryId};
pub use store::{
    ContentStore, InMemoryContentStore, InMemoryProfileStore, InMemorySink, PersistenceSink,
    ProfileStore, StoreError,
};
pub use synthesis::{SynthesisRequest, Synthesizer};
pub use types::{CoachError, Result};
pub use understanding::{Interpreter, FALLBACK_CONFIDENCE, FALLBACK_MODEL_ID};
pub use vocabulary::{AliasTable, TechniqueFamily, Vocabulary};
