//! Response schema handed to the provider so it constrains generation to the
//! `EvaluationResult` shape.

use serde_json::{json, Value};

/// Top-level keys the provider must always emit.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "matchStrength",
    "overallAssessment",
    "strengths",
    "areasForImprovement",
    "alternativeUniversities",
    "scholarshipOutlook",
];

pub fn evaluation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "matchStrength": {
                "type": "STRING",
                "description": "The student's match strength, e.g., 'Exceptional Fit (Likely Admission)', 'Strong Candidate (High Chance)', etc."
            },
            "overallAssessment": {
                "type": "STRING",
                "description": "Detailed, candid explanation of the match strength, justifying the rating based on the university's inferred standards. Max 3-4 sentences."
            },
            "strengths": {
                "type": "ARRAY",
                "description": "List of key strengths that align with what the target university likely values for the target program. Limit to 3-4 points.",
                "items": { "type": "STRING" }
            },
            "areasForImprovement": {
                "type": "ARRAY",
                "description": "List of critical areas for improvement. Limit to 3-4 points.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "area": {
                            "type": "STRING",
                            "description": "The area needing improvement, e.g., 'CGPA for Tier-1 Program', 'Lack of Specialized Research'."
                        },
                        "suggestion": {
                            "type": "STRING",
                            "description": "Specific, actionable, and critical advice for improvement."
                        }
                    },
                    "required": ["area", "suggestion"]
                }
            },
            "alternativeUniversities": {
                "type": "ARRAY",
                "description": "List of 2-3 well-justified alternative university suggestions.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "University Name" },
                        "program": { "type": "STRING", "description": "Suggested Program" },
                        "reasoning": {
                            "type": "STRING",
                            "description": "Why this university/program is a more realistic or better fit."
                        }
                    },
                    "required": ["name", "program", "reasoning"]
                }
            },
            "scholarshipOutlook": {
                "type": "STRING",
                "description": "Honest assessment of scholarship prospects at the target university and advice for improvement."
            }
        },
        "required": REQUIRED_FIELDS
    })
}
