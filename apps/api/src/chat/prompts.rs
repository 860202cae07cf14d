// Prompt text for the follow-up chat.

use crate::llm_client::prompts::{or_placeholder, COUNSELOR_ROLE, NOT_SPECIFIED};
use crate::models::evaluation::EvaluationResult;
use crate::models::profile::UserProfile;

/// Chat system instruction template.
/// Replace: {role}, {name}, {university}, {program}, {cgpa}, {scale}, {major},
///          {match_strength}, {assessment}, {strengths}, {improvements}
const CHAT_SYSTEM_TEMPLATE: &str = r#"You are GradPath AI, {role}.
The user, {name}, has just received a **direct and realistic** evaluation of their academic profile.
Key Profile Details:
- Target University: {university}
- Target Program: {program}
- CGPA: {cgpa} out of {scale}
- Major: {major}

Initial Evaluation Summary:
- Match Strength: {match_strength}
- Overall Assessment: {assessment}
- Key Strengths: {strengths}
- Areas for Improvement: {improvements}

Your role now is to continue the conversation by answering the user's follow-up questions. Maintain the **blunt, realistic, yet supportive** tone. Provide specific, actionable advice. Refer to their profile and the previous evaluation details when relevant. Keep your responses concise and focused on the user's questions. Do not refer to yourself as an AI language model; maintain your persona as GradPath AI."#;

const NAME_FALLBACK: &str = "the student";
const NONE_SPECIFIED: &str = "None specified";

/// Grounds the chat in the profile and the evaluation it follows.
pub fn build_chat_system_instruction(profile: &UserProfile, evaluation: &EvaluationResult) -> String {
    let strengths = if evaluation.strengths.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        evaluation.strengths.join(", ")
    };

    let improvements = if evaluation.areas_for_improvement.is_empty() {
        NONE_SPECIFIED.to_string()
    } else {
        evaluation
            .areas_for_improvement
            .iter()
            .map(|a| format!("{}: {}", a.area, a.suggestion))
            .collect::<Vec<_>>()
            .join("; ")
    };

    CHAT_SYSTEM_TEMPLATE
        .replace("{role}", COUNSELOR_ROLE)
        .replace("{name}", or_placeholder(&profile.full_name, NAME_FALLBACK))
        .replace("{university}", &profile.target_university)
        .replace("{program}", &profile.target_program)
        .replace("{cgpa}", &profile.cgpa)
        .replace("{scale}", profile.cgpa_scale.as_str())
        .replace("{major}", &profile.major)
        .replace("{match_strength}", &evaluation.match_strength)
        .replace("{assessment}", &evaluation.overall_assessment)
        .replace("{strengths}", &strengths)
        .replace("{improvements}", &improvements)
}
