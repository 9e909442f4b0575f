//! Domain models shared by the pipeline stages.

pub mod candidate;
pub mod learner;
pub mod path;
pub mod score;
pub mod understanding;

pub use candidate::{CandidateItem, TimestampEntry};
pub use learner::{InteractionHistory, LearnerProfile, UserContext};
pub use path::{LearningPathResponse, PrimaryPick, ResponseTone, RoleItem, MAX_ROLE_ITEMS};
pub use score::{finite_or_zero, ScoredCandidate, SubScores, VideoScore};
pub use understanding::{
    EmotionalState, ExplicitLayer, IntentLayer, LearningPathLayer, LearningStyle, ProfileLayer,
    QuestionType, SkillLevel, Strategy, Understanding, Urgency, NEEDS_FUNDAMENTALS,
    READY_FOR_ADVANCED,
};
