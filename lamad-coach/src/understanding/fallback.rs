//! Deterministic keyword interpretation used when the completion call fails.

use std::collections::BTreeMap;

use crate::models::{
    EmotionalState, ExplicitLayer, IntentLayer, LearningPathLayer, LearningStyle, ProfileLayer,
    QuestionType, SkillLevel, Strategy, Understanding, Urgency, NEEDS_FUNDAMENTALS,
    READY_FOR_ADVANCED,
};
use crate::vocabulary::{self, Vocabulary};

use super::{FALLBACK_CONFIDENCE, FALLBACK_MODEL_ID};

/// Question type markers, checked in order.
const QUESTION_MARKERS: &[(QuestionType, &[&str])] = &[
    (QuestionType::HowTo, &["how", "show me"]),
    (QuestionType::Troubleshooting, &["keep", "can't", "losing"]),
    (QuestionType::Conceptual, &["why", "what is"]),
    (QuestionType::Comparison, &["vs", "better"]),
];

/// Markers of frustration in a question.
const FRUSTRATION_MARKERS: &[&str] = &["keep", "can't"];

fn fold(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Classify a question by substring markers.
pub fn classify_question(query: &str) -> QuestionType {
    let text = fold(query);
    QUESTION_MARKERS
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| text.contains(m)))
        .map(|(question_type, _)| *question_type)
        .unwrap_or(QuestionType::Other)
}

/// Frustrated when a frustration marker is present, otherwise curious.
pub fn detect_emotion(query: &str) -> EmotionalState {
    let text = fold(query);
    if FRUSTRATION_MARKERS.iter().any(|m| text.contains(m)) {
        EmotionalState::Frustrated
    } else {
        EmotionalState::Curious
    }
}

fn strategy_for(question_type: QuestionType) -> Strategy {
    let primary = match question_type {
        QuestionType::HowTo => "step-by-step demonstration",
        QuestionType::Troubleshooting => "mistake correction",
        QuestionType::Conceptual => "concept explanation",
        QuestionType::Comparison => "side-by-side comparison",
        QuestionType::Other => "general instruction",
    };

    Strategy {
        primary: primary.to_string(),
        secondary: "guided drilling".to_string(),
        tertiary: "live application".to_string(),
        presentation_style: LearningStyle::StepByStep.as_str().to_string(),
    }
}

fn learning_need_for(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::HowTo => "clear technical instruction",
        QuestionType::Troubleshooting => "diagnosis of a recurring problem",
        QuestionType::Conceptual => "understanding of underlying principles",
        QuestionType::Comparison => "criteria to choose between options",
        QuestionType::Other => "general guidance",
    }
}

/// Build the fallback understanding for a query.
pub fn understand(query: &str, vocabulary: &Vocabulary) -> Understanding {
    let query = query.trim();
    let question_type = classify_question(query);
    let technique = vocabulary.aliases.detect(query);
    let position = vocabulary.detect_position(query);

    let mut prerequisite_check = BTreeMap::new();
    prerequisite_check.insert(NEEDS_FUNDAMENTALS.to_string(), false);
    prerequisite_check.insert(READY_FOR_ADVANCED.to_string(), false);

    let immediate_need = technique
        .clone()
        .or_else(|| position.clone())
        .unwrap_or_else(|| query.to_string());

    Understanding {
        explicit: ExplicitLayer {
            technique,
            position,
            question_type,
            keywords: vocabulary::keywords(query),
        },
        intent: IntentLayer {
            root_problem: query.to_string(),
            likely_mistakes: Vec::new(),
            learning_need: learning_need_for(question_type).to_string(),
            skill_gap: "unknown".to_string(),
        },
        profile: ProfileLayer {
            skill_level: SkillLevel::Intermediate,
            learning_style: LearningStyle::StepByStep,
            emotional_state: detect_emotion(query),
            urgency: Urgency::Medium,
        },
        learning_path: LearningPathLayer {
            immediate_need,
            foundational_concepts: Vec::new(),
            follow_up_concepts: Vec::new(),
            prerequisite_check,
        },
        strategy: strategy_for(question_type),
        confidence: FALLBACK_CONFIDENCE,
        model_id: FALLBACK_MODEL_ID.to_string(),
    }
}
