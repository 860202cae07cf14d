//! Evaluation Service: turns a profile into a structured admissions-fit
//! evaluation via the LLM client.
//!
//! `Evaluator` is the seam the controller depends on; `GeminiEvaluator` is the
//! production backend. Tests swap in fakes without touching the controller.

pub mod prompts;
pub mod schema;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use crate::evaluation::prompts::{build_system_instruction, build_user_prompt};
use crate::evaluation::schema::evaluation_schema;
use crate::llm_client::{strip_json_fences, Content, GenerationConfig, LlmClient, LlmError};
use crate::models::evaluation::EvaluationResult;
use crate::models::profile::UserProfile;

const TEMPERATURE: f32 = 0.3;
const TOP_P: f32 = 0.8;
const TOP_K: u32 = 30;
/// Characters of raw model output quoted in a malformed-response error.
const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Invalid API Key. Please check your API key configuration.")]
    InvalidApiKey,

    #[error("The AI's response was not in the expected format. Please try again. Raw response: {excerpt}...")]
    MalformedResponse { excerpt: String },

    #[error("An error occurred while communicating with the AI evaluation service.")]
    Provider(#[source] LlmError),
}

impl From<LlmError> for EvaluationError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::InvalidApiKey(_) => EvaluationError::InvalidApiKey,
            other => EvaluationError::Provider(other),
        }
    }
}

/// Produces an evaluation for a profile. Carried by the controller as `Arc<dyn Evaluator>`.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, profile: &UserProfile) -> Result<EvaluationResult, EvaluationError>;
}

pub struct GeminiEvaluator {
    llm: LlmClient,
}

impl GeminiEvaluator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Evaluator for GeminiEvaluator {
    async fn evaluate(&self, profile: &UserProfile) -> Result<EvaluationResult, EvaluationError> {
        let system = build_system_instruction(profile);
        let contents = [Content::user(build_user_prompt(profile))];

        info!(
            "Requesting evaluation for {} / {}",
            profile.target_university, profile.target_program
        );
        let raw = self
            .llm
            .call_text(&contents, &system, &generation_config())
            .await
            .map_err(|e| {
                error!("Error calling LLM for evaluation: {e}");
                EvaluationError::from(e)
            })?;

        let result = parse_evaluation(&raw)?;
        info!("Evaluation received: match_strength={:?}", result.match_strength);
        Ok(result)
    }
}

fn generation_config() -> GenerationConfig {
    GenerationConfig {
        temperature: Some(TEMPERATURE),
        top_p: Some(TOP_P),
        top_k: Some(TOP_K),
        response_mime_type: Some("application/json".to_string()),
        response_schema: Some(evaluation_schema()),
    }
}

/// Parses raw model output into an `EvaluationResult`.
///
/// `matchStrength` and `overallAssessment` must be present and non-blank.
/// Nothing is defaulted in their place.
pub fn parse_evaluation(raw: &str) -> Result<EvaluationResult, EvaluationError> {
    let text = strip_json_fences(raw);

    let malformed = || EvaluationError::MalformedResponse {
        excerpt: text.chars().take(EXCERPT_CHARS).collect(),
    };

    let result: EvaluationResult = serde_json::from_str(text).map_err(|e| {
        error!("Failed to parse evaluation JSON: {e}. Raw response: {text}");
        malformed()
    })?;

    if result.match_strength.trim().is_empty() || result.overall_assessment.trim().is_empty() {
        error!("Evaluation response missing essential fields. Raw response: {text}");
        return Err(malformed());
    }

    Ok(result)
}
