//! Configuration for the coach pipeline.
//!
//! A `CoachConfig` is an immutable value handed to each stage. Defaults
//! come from `Default` impls and named constants.

use serde::{Deserialize, Serialize};

use crate::matching::scorer::{ScoringWeights, DEFAULT_WEIGHTS};
use crate::types::Result;
use crate::vocabulary::Vocabulary;

/// Top-level coach configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    /// Completion call budgets
    pub completion: CompletionSettings,
    /// Retrieval and scoring parameters
    pub matching: MatchingConfig,
    /// Technique aliases and positions
    pub vocabulary: Vocabulary,
}

impl CoachConfig {
    /// Load config from YAML. Missing sections keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Budgets for the two completion calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub interpretation_timeout_ms: u64,
    pub interpretation_max_tokens: u32,
    pub interpretation_temperature: f32,
    pub framing_timeout_ms: u64,
    pub framing_max_tokens: u32,
    pub framing_temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            interpretation_timeout_ms: 8_000,
            interpretation_max_tokens: 1_500,
            interpretation_temperature: 0.3,
            framing_timeout_ms: 4_000,
            framing_max_tokens: 200,
            framing_temperature: 0.7,
        }
    }
}

/// Retrieval and scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Results returned after ranking
    pub max_results: usize,
    /// Raw hits kept per retrieval branch before scoring
    pub retrieval_cap: usize,
    /// Weight vector for the combined score
    pub weights: ScoringWeights,
    /// Duration-closeness bands
    pub duration: DurationBands,
    /// Belt proximity multipliers
    pub belt_proximity: BeltProximity,
    /// Items published within this many days get the recency bonus
    pub recency_days: i64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            retrieval_cap: 20,
            weights: DEFAULT_WEIGHTS,
            duration: DurationBands::default(),
            belt_proximity: BeltProximity::default(),
            recency_days: 90,
        }
    }
}

/// How closely an item's duration fits the learner's viewing habits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationBands {
    /// Within this many seconds of the average counts as close
    pub close_secs: f64,
    /// Within this many seconds counts as near
    pub near_secs: f64,
    pub close_factor: f64,
    pub near_factor: f64,
    pub far_factor: f64,
    /// Preferred window when there is no watch history
    pub preferred_min_secs: u32,
    pub preferred_max_secs: u32,
    pub preferred_factor: f64,
    pub outside_preferred_factor: f64,
}

impl Default for DurationBands {
    fn default() -> Self {
        Self {
            close_secs: 300.0,
            near_secs: 600.0,
            close_factor: 1.0,
            near_factor: 0.7,
            far_factor: 0.3,
            preferred_min_secs: 600,
            preferred_max_secs: 1_200,
            preferred_factor: 1.0,
            outside_preferred_factor: 0.5,
        }
    }
}

/// Multipliers by distance between item and learner skill level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltProximity {
    pub exact: f64,
    pub adjacent: f64,
    pub distant: f64,
}

impl Default for BeltProximity {
    fn default() -> Self {
        Self {
            exact: 1.0,
            adjacent: 0.7,
            distant: 0.3,
        }
    }
}

impl BeltProximity {
    pub fn factor(&self, distance: u8) -> f64 {
        match distance {
            0 => self.exact,
            1 => self.adjacent,
            _ => self.distant,
        }
    }
}
