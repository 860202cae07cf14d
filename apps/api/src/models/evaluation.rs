use serde::{Deserialize, Serialize};

/// The seven-tier vocabulary the evaluator is asked to choose from, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrength {
    ExceptionalFit,
    StrongCandidate,
    CompetitiveApplicant,
    AverageApplicant,
    BelowAverage,
    SignificantMismatch,
    PoorFit,
}

impl MatchStrength {
    pub const ALL: [MatchStrength; 7] = [
        MatchStrength::ExceptionalFit,
        MatchStrength::StrongCandidate,
        MatchStrength::CompetitiveApplicant,
        MatchStrength::AverageApplicant,
        MatchStrength::BelowAverage,
        MatchStrength::SignificantMismatch,
        MatchStrength::PoorFit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MatchStrength::ExceptionalFit => "Exceptional Fit (Likely Admission)",
            MatchStrength::StrongCandidate => "Strong Candidate (High Chance)",
            MatchStrength::CompetitiveApplicant => "Competitive Applicant (Good Chance)",
            MatchStrength::AverageApplicant => "Average Applicant (Fair Chance)",
            MatchStrength::BelowAverage => "Below Average (Uphill Battle)",
            MatchStrength::SignificantMismatch => "Significant Mismatch (Very Low Chance)",
            MatchStrength::PoorFit => "Poor Fit (Unlikely Admission)",
        }
    }

    /// Matches a free-text value against the vocabulary, case-insensitively,
    /// either the full label or the part before the parenthesis.
    pub fn classify(text: &str) -> Option<Self> {
        let text = text.trim().to_lowercase();
        Self::ALL.into_iter().find(|tier| {
            let label = tier.label().to_lowercase();
            let short = label.split(" (").next().unwrap_or(label.as_str());
            text == label || text == short
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementArea {
    pub area: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeUniversity {
    pub name: String,
    pub program: String,
    pub reasoning: String,
}

/// Structured result of one evaluation call.
///
/// `match_strength` is kept exactly as the model wrote it; see
/// [`EvaluationResult::match_tier`] for the advisory classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    #[serde(default)]
    pub match_strength: String,
    #[serde(default)]
    pub overall_assessment: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<ImprovementArea>,
    #[serde(default)]
    pub alternative_universities: Vec<AlternativeUniversity>,
    #[serde(default)]
    pub scholarship_outlook: String,
}

impl EvaluationResult {
    pub fn match_tier(&self) -> Option<MatchStrength> {
        MatchStrength::classify(&self.match_strength)
    }
}
