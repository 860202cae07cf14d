// Shared prompt fragments and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Placeholder substituted for optional profile fields left blank.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Persona shared by the evaluator and the chat assistant.
pub const COUNSELOR_ROLE: &str = "an expert university admissions counselor";

/// Returns `value`, or `fallback` when it is blank.
pub fn or_placeholder<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
