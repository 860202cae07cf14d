// All LLM prompt text for the Evaluation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{or_placeholder, COUNSELOR_ROLE, NOT_SPECIFIED};
use crate::models::evaluation::MatchStrength;
use crate::models::profile::UserProfile;

/// Evaluation system instruction template.
/// Replace: {role}, {university}, {program}, {tiers}
const EVALUATION_SYSTEM_TEMPLATE: &str = r#"You are {role}. Your task is to provide a **blunt, realistic, and deeply analytical** evaluation of a student's profile against their chosen university and program.
**Crucially, your evaluation must reflect the specific expectations, typical selectivity, academic rigor, and vision of {university} for the {program}.** Use your knowledge to infer these standards.
Do not sugarcoat your feedback. The student needs an honest understanding of their standing. Clearly differentiate between excellent, good, average (mid), and poor profiles *relative to the specified institution*.

If the profile is genuinely exceptional for {university}, 'areasForImprovement' can be minimal or focus on maintaining excellence.
If the profile is weak for {university}, be very direct about the gap and necessary improvements.
Ensure all suggestions are actionable and highly relevant to the student's major and their target program at {university}.
Be concise, constructive, but above all, **realistic and direct**.
The 'overallAssessment' should be a direct summary of their chances. Detailed points should be in 'strengths' and 'areasForImprovement'.
Limit 'strengths' to 3-4 highly relevant points.
Limit 'areasForImprovement' to 3-4 critical areas.
Limit 'alternativeUniversities' to 2-3 well-justified suggestions.
For 'matchStrength', use one of the following: {tiers}.
"#;

/// Evaluation user prompt template.
/// Replace: {cgpa}, {scale}, {major}, {achievements}, {awards}, {tests},
///          {extracurriculars}, {university}, {program}
const EVALUATION_PROMPT_TEMPLATE: &str = r#"Here is the student's profile for evaluation:
Student Profile:
- CGPA: {cgpa} out of {scale}
- Intended Major: {major}
- Academic Achievements: {achievements}
- Awards and Honors: {awards}
- Standardized Test Scores: {tests}
- Extracurricular Activities: {extracurriculars}

Target University:
- Name: {university}
- Program: {program}

Please evaluate this profile based on the system instructions and return the result in the specified JSON format.
"#;

/// Builds the system instruction, calibrated to the named university and program.
pub fn build_system_instruction(profile: &UserProfile) -> String {
    let tiers = MatchStrength::ALL
        .iter()
        .map(|t| format!("'{}'", t.label()))
        .collect::<Vec<_>>()
        .join(", ");

    EVALUATION_SYSTEM_TEMPLATE
        .replace("{role}", COUNSELOR_ROLE)
        .replace("{university}", &profile.target_university)
        .replace("{program}", &profile.target_program)
        .replace("{tiers}", &tiers)
}

/// Serializes every evaluated field into a labeled block.
/// The student's name is deliberately not part of the evaluation input.
pub fn build_user_prompt(profile: &UserProfile) -> String {
    EVALUATION_PROMPT_TEMPLATE
        .replace("{cgpa}", &profile.cgpa)
        .replace("{scale}", profile.cgpa_scale.as_str())
        .replace("{major}", &profile.major)
        .replace(
            "{achievements}",
            or_placeholder(&profile.academic_achievements, NOT_SPECIFIED),
        )
        .replace("{awards}", or_placeholder(&profile.awards_and_honors, NOT_SPECIFIED))
        .replace("{tests}", or_placeholder(&profile.test_scores, NOT_SPECIFIED))
        .replace(
            "{extracurriculars}",
            or_placeholder(&profile.extracurricular_activities, NOT_SPECIFIED),
        )
        .replace("{university}", &profile.target_university)
        .replace("{program}", &profile.target_program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::CgpaScale;

    fn profile() -> UserProfile {
        UserProfile {
            full_name: "Jane Doe".to_string(),
            cgpa: "3.8".to_string(),
            cgpa_scale: CgpaScale::Four,
            major: "CS".to_string(),
            test_scores: "GRE 325".to_string(),
            target_university: "MIT".to_string(),
            target_program: "MS CS".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_system_instruction_names_target_and_all_tiers() {
        let s = build_system_instruction(&profile());
        assert!(s.contains("vision of MIT for the MS CS"));
        assert!(s.starts_with("You are an expert university admissions counselor."));
        for tier in MatchStrength::ALL {
            assert!(s.contains(tier.label()), "missing tier {}", tier.label());
        }
        assert!(!s.contains('{'), "unreplaced placeholder in: {s}");
    }

    #[test]
    fn test_user_prompt_labels_every_field() {
        let p = build_user_prompt(&profile());
        assert!(p.contains("- CGPA: 3.8 out of 4.0"));
        assert!(p.contains("- Intended Major: CS"));
        assert!(p.contains("- Standardized Test Scores: GRE 325"));
        assert!(p.contains("- Name: MIT"));
        assert!(p.contains("- Program: MS CS"));
    }

    #[test]
    fn test_user_prompt_marks_blank_optional_fields() {
        let p = build_user_prompt(&profile());
        assert!(p.contains("- Academic Achievements: Not specified"));
        assert!(p.contains("- Awards and Honors: Not specified"));
        assert!(p.contains("- Extracurricular Activities: Not specified"));
    }

    #[test]
    fn test_user_prompt_omits_student_name() {
        assert!(!build_user_prompt(&profile()).contains("Jane"));
    }
}
