//! Result rendering. Turns an `EvaluationResult` into ordered, collapsible
//! sections plus a markdown rendering of the same structure.
//!
//! Sections with nothing to show are omitted. Strengths and improvement areas
//! start expanded; alternatives and scholarship outlook start collapsed.

use std::fmt::Write as _;

use serde::Serialize;

use crate::models::evaluation::{
    AlternativeUniversity, EvaluationResult, ImprovementArea, MatchStrength,
};

/// Colour band for the headline, derived from keywords in the match strength text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Moderate,
    Caution,
    Critical,
}

impl Tone {
    pub fn for_match_strength(text: &str) -> Self {
        let s = text.to_lowercase();
        if s.contains("excellent") || s.contains("strong") {
            Tone::Positive
        } else if s.contains("good") || s.contains("fair") {
            Tone::Moderate
        } else if s.contains("competitive") || s.contains("reach") {
            Tone::Caution
        } else {
            Tone::Critical
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Headline {
    pub match_strength: String,
    pub tier: Option<MatchStrength>,
    pub tone: Tone,
    pub overall_assessment: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum SectionContent {
    Bullets(Vec<String>),
    Improvements(Vec<ImprovementArea>),
    Alternatives(Vec<AlternativeUniversity>),
    Paragraph(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultSection {
    pub title: &'static str,
    pub initially_open: bool,
    pub content: SectionContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultReport {
    pub headline: Headline,
    pub sections: Vec<ResultSection>,
}

impl ResultReport {
    pub fn from_evaluation(result: &EvaluationResult) -> Self {
        let mut sections = Vec::new();

        if !result.strengths.is_empty() {
            sections.push(ResultSection {
                title: "Key Strengths",
                initially_open: true,
                content: SectionContent::Bullets(result.strengths.clone()),
            });
        }
        if !result.areas_for_improvement.is_empty() {
            sections.push(ResultSection {
                title: "Areas for Improvement",
                initially_open: true,
                content: SectionContent::Improvements(result.areas_for_improvement.clone()),
            });
        }
        if !result.alternative_universities.is_empty() {
            sections.push(ResultSection {
                title: "Alternative University Suggestions",
                initially_open: false,
                content: SectionContent::Alternatives(result.alternative_universities.clone()),
            });
        }
        if !result.scholarship_outlook.trim().is_empty() {
            sections.push(ResultSection {
                title: "Scholarship Outlook",
                initially_open: false,
                content: SectionContent::Paragraph(result.scholarship_outlook.clone()),
            });
        }

        Self {
            headline: Headline {
                match_strength: result.match_strength.clone(),
                tier: result.match_tier(),
                tone: Tone::for_match_strength(&result.match_strength),
                overall_assessment: result.overall_assessment.clone(),
            },
            sections,
        }
    }

    /// Collapsed sections render inside `<details>` so markdown viewers keep them folded.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Your Profile Evaluation\n");
        let _ = writeln!(
            out,
            "## Overall Match Strength: {}\n",
            self.headline.match_strength
        );
        let _ = writeln!(out, "{}\n", self.headline.overall_assessment);

        for section in &self.sections {
            if section.initially_open {
                let _ = writeln!(out, "## {}\n", section.title);
            } else {
                let _ = writeln!(out, "<details>\n<summary>{}</summary>\n", section.title);
            }

            match &section.content {
                SectionContent::Bullets(items) => {
                    for item in items {
                        let _ = writeln!(out, "- {item}");
                    }
                }
                SectionContent::Improvements(items) => {
                    for item in items {
                        let _ = writeln!(out, "- **{}**: {}", item.area, item.suggestion);
                    }
                }
                SectionContent::Alternatives(items) => {
                    for uni in items {
                        let _ = writeln!(out, "- **{} - {}**: {}", uni.name, uni.program, uni.reasoning);
                    }
                }
                SectionContent::Paragraph(text) => {
                    let _ = writeln!(out, "{text}");
                }
            }

            if section.initially_open {
                out.push('\n');
            } else {
                out.push_str("\n</details>\n\n");
            }
        }

        out.trim_end().to_string()
    }
}
