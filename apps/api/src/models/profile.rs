use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Grading scale the CGPA is expressed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CgpaScale {
    #[default]
    #[serde(rename = "4.0")]
    Four,
    #[serde(rename = "4.33")]
    FourThirtyThree,
    #[serde(rename = "5.0")]
    Five,
    #[serde(rename = "10.0")]
    Ten,
    #[serde(rename = "100")]
    Percentage,
}

impl CgpaScale {
    pub const ALL: [CgpaScale; 5] = [
        CgpaScale::Four,
        CgpaScale::FourThirtyThree,
        CgpaScale::Five,
        CgpaScale::Ten,
        CgpaScale::Percentage,
    ];

    /// Wire value, also what users see in validation messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            CgpaScale::Four => "4.0",
            CgpaScale::FourThirtyThree => "4.33",
            CgpaScale::Five => "5.0",
            CgpaScale::Ten => "10.0",
            CgpaScale::Percentage => "100",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CgpaScale::Four => "4.0 Scale",
            CgpaScale::FourThirtyThree => "4.33 Scale",
            CgpaScale::Five => "5.0 Scale",
            CgpaScale::Ten => "10.0 Scale (e.g., India)",
            CgpaScale::Percentage => "Percentage (e.g. 0-100%)",
        }
    }

    pub fn max(&self) -> f64 {
        match self {
            CgpaScale::Four => 4.0,
            CgpaScale::FourThirtyThree => 4.33,
            CgpaScale::Five => 5.0,
            CgpaScale::Ten => 10.0,
            CgpaScale::Percentage => 100.0,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for CgpaScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A student's academic profile as entered on the form.
///
/// Everything except `cgpa_scale` is free text; `cgpa` stays a string so a
/// half-typed draft can be held without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub full_name: String,
    pub cgpa: String,
    pub cgpa_scale: CgpaScale,
    pub major: String,
    pub academic_achievements: String,
    pub awards_and_honors: String,
    pub test_scores: String,
    pub extracurricular_activities: String,
    pub target_university: String,
    pub target_program: String,
}

/// Addressable attributes of [`UserProfile`], for field-by-field edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    FullName,
    Cgpa,
    CgpaScale,
    Major,
    AcademicAchievements,
    AwardsAndHonors,
    TestScores,
    ExtracurricularActivities,
    TargetUniversity,
    TargetProgram,
}

impl UserProfile {
    /// Sets one attribute. Only `cgpaScale` can reject its value.
    pub fn set(&mut self, field: ProfileField, value: String) -> Result<(), ValidationError> {
        match field {
            ProfileField::FullName => self.full_name = value,
            ProfileField::Cgpa => self.cgpa = value,
            ProfileField::CgpaScale => {
                self.cgpa_scale =
                    CgpaScale::parse(&value).ok_or(ValidationError::UnknownScale(value))?;
            }
            ProfileField::Major => self.major = value,
            ProfileField::AcademicAchievements => self.academic_achievements = value,
            ProfileField::AwardsAndHonors => self.awards_and_honors = value,
            ProfileField::TestScores => self.test_scores = value,
            ProfileField::ExtracurricularActivities => self.extracurricular_activities = value,
            ProfileField::TargetUniversity => self.target_university = value,
            ProfileField::TargetProgram => self.target_program = value,
        }
        Ok(())
    }

    /// Guard run before an evaluation is requested.
    ///
    /// Required: cgpa, major, target university, target program.
    /// The cgpa must parse as a finite number within `[0, scale]`.
    pub fn validate_for_submission(&self) -> Result<(), ValidationError> {
        let missing = [
            &self.cgpa,
            &self.major,
            &self.target_university,
            &self.target_program,
        ]
        .iter()
        .any(|v| v.trim().is_empty());
        if missing {
            return Err(ValidationError::MissingRequired);
        }

        self.validate_cgpa()
    }

    /// Per-field inline errors, in form order. Empty when the profile is submittable.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let required = [
            (ProfileField::Cgpa, &self.cgpa),
            (ProfileField::Major, &self.major),
            (ProfileField::TargetUniversity, &self.target_university),
            (ProfileField::TargetProgram, &self.target_program),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(FieldError {
                    field,
                    message: format!("{} is required.", field_spec(field).label),
                });
            } else if field == ProfileField::Cgpa {
                if let Err(e) = self.validate_cgpa() {
                    errors.push(FieldError {
                        field,
                        message: e.to_string(),
                    });
                }
            }
        }
        errors
    }

    fn validate_cgpa(&self) -> Result<(), ValidationError> {
        match self.cgpa.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && (0.0..=self.cgpa_scale.max()).contains(&v) => Ok(()),
            _ => Err(ValidationError::CgpaOutOfRange(self.cgpa_scale)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: ProfileField,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScaleOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Rendering hints for one form input.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub field: ProfileField,
    pub label: &'static str,
    pub required: bool,
    pub multiline: bool,
    pub placeholder: Option<&'static str>,
    pub info: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ScaleOption>,
}

const FORM_ORDER: [ProfileField; 10] = [
    ProfileField::FullName,
    ProfileField::Cgpa,
    ProfileField::CgpaScale,
    ProfileField::Major,
    ProfileField::AcademicAchievements,
    ProfileField::AwardsAndHonors,
    ProfileField::TestScores,
    ProfileField::ExtracurricularActivities,
    ProfileField::TargetUniversity,
    ProfileField::TargetProgram,
];

pub fn field_specs() -> Vec<FieldSpec> {
    FORM_ORDER.into_iter().map(field_spec).collect()
}

pub fn field_spec(field: ProfileField) -> FieldSpec {
    let text = |label: &'static str,
                required: bool,
                placeholder: &'static str,
                info: Option<&'static str>| FieldSpec {
        field,
        label,
        required,
        multiline: false,
        placeholder: Some(placeholder),
        info,
        options: vec![],
    };
    let area = |label: &'static str, placeholder: &'static str, info: Option<&'static str>| FieldSpec {
        multiline: true,
        ..text(label, false, placeholder, info)
    };

    match field {
        ProfileField::FullName => text("Full Name (Optional)", false, "e.g., Jane Doe", None),
        ProfileField::Cgpa => text(
            "CGPA / Grade",
            true,
            "e.g., 3.8",
            Some("Your Cumulative Grade Point Average or equivalent."),
        ),
        ProfileField::CgpaScale => FieldSpec {
            field,
            label: "CGPA Scale",
            required: true,
            multiline: false,
            placeholder: None,
            info: None,
            options: CgpaScale::ALL
                .iter()
                .map(|s| ScaleOption {
                    value: s.as_str(),
                    label: s.label(),
                })
                .collect(),
        },
        ProfileField::Major => text(
            "Intended Major/Field of Study",
            true,
            "e.g., Computer Science, Electrical Engineering",
            None,
        ),
        ProfileField::AcademicAchievements => area(
            "Academic Achievements",
            "e.g., Dean's List, publications, key projects. List 2-3 major ones.",
            Some("Describe significant academic accomplishments like research papers, capstone projects, or thesis work."),
        ),
        ProfileField::AwardsAndHonors => area(
            "Awards and Honors",
            "e.g., 'Best Project Award', 'National Merit Scholar'",
            None,
        ),
        ProfileField::TestScores => area(
            "Standardized Test Scores",
            "e.g., GRE: 325 (Q:165, V:160), TOEFL: 108, IELTS: 7.5",
            Some("Include scores for relevant tests like GRE, GMAT, TOEFL, IELTS etc."),
        ),
        ProfileField::ExtracurricularActivities => area(
            "Extracurricular Activities & Leadership",
            "e.g., 'President of Coding Club', 'Volunteer at Local Shelter', 'Varsity Sports'",
            Some("Highlight leadership roles, significant contributions, or unique experiences."),
        ),
        ProfileField::TargetUniversity => text(
            "Target University Name",
            true,
            "e.g., Stanford University, MIT",
            None,
        ),
        ProfileField::TargetProgram => text(
            "Target Program at University",
            true,
            "e.g., MS in Computer Science, PhD in Physics",
            None,
        ),
    }
}
