//! Short human-readable reason for a score card.

use crate::models::SubScores;

/// Sub-scores above this are worth mentioning.
pub const STRONG_FACTOR: f64 = 70.0;

/// Factors named in a rationale at most.
pub const MAX_REASONS: usize = 3;

/// Used when no factor stands out.
pub const DEFAULT_RATIONALE: &str = "good overall match";

/// Phrase per factor, in fixed factor order.
const FACTOR_PHRASES: [&str; 6] = [
    "directly addresses your question",
    "suits how you learn",
    "fits your viewing habits",
    "efficient for your level",
    "built to make the technique stick",
    "moves your game forward",
];

/// Join the phrases of up to three strong factors.
pub fn explain(scores: &SubScores) -> String {
    let reasons: Vec<&str> = scores
        .as_array()
        .iter()
        .zip(FACTOR_PHRASES)
        .filter(|(score, _)| **score > STRONG_FACTOR)
        .map(|(_, phrase)| phrase)
        .take(MAX_REASONS)
        .collect();

    if reasons.is_empty() {
        DEFAULT_RATIONALE.to_string()
    } else {
        reasons.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: [f64; 6]) -> SubScores {
        SubScores {
            relevance: values[0],
            pedagogical_fit: values[1],
            engagement_probability: values[2],
            learning_efficiency: values[3],
            retention_likelihood: values[4],
            progression_value: values[5],
        }
    }

    #[test]
    fn test_no_strong_factor() {
        assert_eq!(explain(&scores([70.0; 6])), "good overall match");
    }

    #[test]
    fn test_at_most_three_in_order() {
        let text = explain(&scores([90.0, 50.0, 80.0, 75.0, 71.0, 99.0]));
        assert_eq!(
            text,
            "directly addresses your question, fits your viewing habits, efficient for your level"
        );
    }

    #[test]
    fn test_single_factor() {
        let text = explain(&scores([50.0, 50.0, 50.0, 50.0, 85.0, 50.0]));
        assert_eq!(text, "built to make the technique stick");
    }
}
