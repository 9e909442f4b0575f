//! Prompt assembly for the interpretation task.

use crate::models::UserContext;

/// Describe the learner for the model.
pub fn context_block(user: &UserContext) -> String {
    if user.is_anonymous() {
        return "STUDENT PROFILE:\n- Anonymous student, no recorded belt or history \
                (assume intermediate unless the question says otherwise)\n"
            .to_string();
    }

    let mut block = String::from("STUDENT PROFILE:\n");

    match (&user.belt, user.skill_level) {
        (Some(belt), Some(level)) => {
            block.push_str(&format!("- Belt: {} ({})\n", belt, level.as_str()));
        }
        (Some(belt), None) => block.push_str(&format!("- Belt: {}\n", belt)),
        _ => block.push_str("- Belt: unknown\n"),
    }

    if !user.style_prefs.is_empty() {
        let styles: Vec<&str> = user.style_prefs.iter().map(|s| s.as_str()).collect();
        block.push_str(&format!("- Preferred learning styles: {}\n", styles.join(", ")));
    }

    let history = &user.history;
    block.push_str(&format!(
        "- Videos viewed: {}, saved: {}\n",
        history.viewed_ids.len(),
        history.saved_ids.len()
    ));
    block.push_str(&format!(
        "- Completion rate: {:.0}%\n",
        history.completion_rate.clamp(0.0, 1.0) * 100.0
    ));
    if let Some(avg) = history.avg_watch_duration_secs {
        block.push_str(&format!("- Average watch time: {:.0} minutes\n", avg / 60.0));
    }

    block
}

/// Full user prompt for the interpretation task.
pub fn interpretation_prompt(query: &str, user: &UserContext) -> String {
    let mut prompt = context_block(user);

    prompt.push_str(&format!("\nSTUDENT QUESTION: \"{}\"\n\n", query.trim()));
    prompt.push_str(
        "Analyse the question in four layers plus a strategy. Answer with exactly this JSON shape:\n\
         {\n\
         \x20 \"explicit\": {\"technique\": string|null, \"position\": string|null, \
         \"questionType\": \"how-to\"|\"troubleshooting\"|\"conceptual\"|\"comparison\"|\"other\", \
         \"keywords\": [string]},\n\
         \x20 \"intent\": {\"rootProblem\": string, \"likelyMistakes\": [string], \
         \"learningNeed\": string, \"skillGap\": string},\n\
         \x20 \"profile\": {\"skillLevel\": \"beginner\"|\"intermediate\"|\"advanced\", \
         \"learningStyle\": \"visual\"|\"step-by-step\"|\"conceptual\"|\"problem-solving\", \
         \"emotionalState\": \"curious\"|\"frustrated\"|\"confused\"|\"excited\", \
         \"urgency\": \"low\"|\"medium\"|\"high\"},\n\
         \x20 \"learningPath\": {\"immediateNeed\": string, \"foundationalConcepts\": [string], \
         \"followUpConcepts\": [string], \"prerequisiteCheck\": \
         {\"needs_fundamentals\": bool, \"ready_for_advanced\": bool}},\n\
         \x20 \"strategy\": {\"primary\": string, \"secondary\": string, \"tertiary\": string, \
         \"presentationStyle\": string},\n\
         \x20 \"confidence\": number between 0 and 1\n\
         }\n",
    );

    prompt
}
