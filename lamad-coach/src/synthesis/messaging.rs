//! Deterministic learner-facing text.

use crate::models::{CandidateItem, EmotionalState, QuestionType, SkillLevel, Understanding};

/// Framing used when the framing call fails.
pub const GENERIC_FRAMING: &str =
    "This video is a strong place to start. Watch it through once, then pick one detail to take to your next session.";

/// Tip used when nothing matched.
pub const GENERIC_TIP: &str =
    "Before your next search, write down the exact moment in a roll where things go wrong. Specific questions find specific answers.";

/// Metric used when nothing matched.
pub const GENERIC_METRIC: &str =
    "Next session: notice one situation where this problem shows up and describe it in a single sentence.";

/// Apologetic framing that names the raw query.
pub fn no_match_framing(query: &str) -> String {
    format!(
        "Sorry, I couldn't find a video that covers \"{}\" yet. Try naming the technique or position another way, or ask about a closely related technique.",
        query.trim()
    )
}

/// Fixed encouragement per emotional state.
pub fn encouragement(state: EmotionalState) -> &'static str {
    match state {
        EmotionalState::Frustrated => {
            "Getting stuck here is part of the process. Every black belt fought through this exact problem."
        }
        EmotionalState::Confused => {
            "Confusion means you're at the edge of what you know. Break it down and it will click."
        }
        EmotionalState::Excited => "Love the energy. Channel it into precise reps and this will be yours.",
        EmotionalState::Curious => "Great question. Curiosity is how good grapplers become great ones.",
    }
}

/// Metacognitive tip by cascade: troubleshooting, beginner, mistakes, default.
pub fn metacognitive_tip(understanding: &Understanding, primary: &CandidateItem) -> &'static str {
    if understanding.explicit.question_type == QuestionType::Troubleshooting {
        "Focus on one detail at a time. Pick the single fix that matters most and drill only that until it is automatic."
    } else if understanding.profile.skill_level == SkillLevel::Beginner {
        "Rewatch the video at least twice. The first pass shows the shape of the move, the second shows the details."
    } else if primary.mistake_covering {
        "Pay close attention to the mistakes section. Knowing what not to do is as valuable as knowing what to do."
    } else {
        "Drill the technique with a cooperative partner before you try it live. Reps first, resistance second."
    }
}

fn subject(understanding: &Understanding) -> String {
    understanding
        .explicit
        .technique
        .clone()
        .or_else(|| understanding.explicit.position.clone())
        .unwrap_or_else(|| "this technique".to_string())
}

/// Measurable goal for the next sessions.
pub fn success_metric(understanding: &Understanding) -> String {
    let subject = subject(understanding);
    let reps = match understanding.profile.skill_level {
        SkillLevel::Beginner => 5,
        SkillLevel::Intermediate => 7,
        SkillLevel::Advanced => 9,
    };

    match understanding.explicit.question_type {
        QuestionType::HowTo => format!(
            "Hit the {} cleanly in {} out of 10 drilling reps this week.",
            subject, reps
        ),
        QuestionType::Troubleshooting => format!(
            "Go three rounds in a row without the {} problem costing you position.",
            subject
        ),
        QuestionType::Conceptual => format!(
            "Explain the key principle behind {} to a training partner in under a minute.",
            subject
        ),
        QuestionType::Comparison => format!(
            "Try both options around {} in positional sparring and note which works {} times out of 10.",
            subject, reps
        ),
        QuestionType::Other => format!(
            "Attempt {} at least {} times during live rolls this week.",
            subject, reps
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::understanding::fallback;
    use crate::vocabulary::Vocabulary;

    fn understanding(query: &str) -> Understanding {
        fallback::understand(query, &Vocabulary::default())
    }

    #[test]
    fn test_no_match_framing_references_query() {
        let text = no_match_framing("  show me the de la riva guard ");
        assert!(text.contains("\"show me the de la riva guard\""));
        assert!(text.starts_with("Sorry"));
    }

    #[test]
    fn test_tip_cascade() {
        let item = CandidateItem::new("a", "Armbar", "I", "armbar");
        let mistakes = item.clone().covering_mistakes();

        let troubleshooting = understanding("I keep losing my armbar");
        assert!(metacognitive_tip(&troubleshooting, &mistakes).starts_with("Focus on one detail"));

        let mut beginner = understanding("how do I armbar");
        beginner.profile.skill_level = SkillLevel::Beginner;
        assert!(metacognitive_tip(&beginner, &mistakes).starts_with("Rewatch"));

        let how_to = understanding("how do I armbar");
        assert!(metacognitive_tip(&how_to, &mistakes).starts_with("Pay close attention"));
        assert!(metacognitive_tip(&how_to, &item).starts_with("Drill the technique"));
    }

    #[test]
    fn test_success_metric_template() {
        let metric = success_metric(&understanding("how do I finish the triangle"));
        assert_eq!(metric, "Hit the triangle cleanly in 7 out of 10 drilling reps this week.");

        let mut u = understanding("why does posture matter");
        u.profile.skill_level = SkillLevel::Advanced;
        assert!(success_metric(&u).contains("this technique"));
    }

    #[test]
    fn test_encouragement_lookup() {
        assert!(encouragement(EmotionalState::Frustrated).contains("stuck"));
        assert_ne!(
            encouragement(EmotionalState::Curious),
            encouragement(EmotionalState::Excited)
        );
    }
}
