use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal category of a medical term.
///
/// The fixed categories cover what the clinical dictionary ships with. Any
/// other `Type` value found in a term source becomes a `Custom` bucket so
/// organisations can extend the dictionary without a code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TermCategory {
    Procedure,
    Diagnosis,
    LabTest,
    Medication,
    VitalSign,
    Symptom,
    Anatomy,
    Other,
    Custom(String),
}

/// Provider category label → internal category.
const PROVIDER_CATEGORY_MAP: &[(&str, TermCategory)] = &[
    ("Medication", TermCategory::Medication),
    ("MedicalCondition", TermCategory::Diagnosis),
    ("Symptom", TermCategory::Symptom),
    ("Test", TermCategory::LabTest),
    ("TreatmentName", TermCategory::Procedure),
    ("BodyPart", TermCategory::Anatomy),
    ("Vital", TermCategory::VitalSign),
];

impl TermCategory {
    /// Parse a dictionary `Type` value. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "procedure" => Self::Procedure,
            "diagnosis" => Self::Diagnosis,
            "lab_test" => Self::LabTest,
            "medication" => Self::Medication,
            "vital_sign" => Self::VitalSign,
            "symptom" => Self::Symptom,
            "anatomy" => Self::Anatomy,
            "other" => Self::Other,
            _ => Self::Custom(normalized),
        }
    }

    /// Translate a transcription provider's category label.
    ///
    /// Labels are matched exactly; anything outside the table is `Other`.
    pub fn from_provider(category: &str) -> Self {
        PROVIDER_CATEGORY_MAP
            .iter()
            .find(|(label, _)| *label == category)
            .map(|(_, internal)| internal.clone())
            .unwrap_or(Self::Other)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Procedure => "procedure",
            Self::Diagnosis => "diagnosis",
            Self::LabTest => "lab_test",
            Self::Medication => "medication",
            Self::VitalSign => "vital_sign",
            Self::Symptom => "symptom",
            Self::Anatomy => "anatomy",
            Self::Other => "other",
            Self::Custom(name) => name,
        }
    }

    /// Code assigned to terms of this category that have no dictionary code,
    /// e.g. `UNK-DIA` for `diagnosis`.
    pub fn fallback_code(&self) -> String {
        let prefix: String = self.as_str().chars().take(3).collect();
        format!("UNK-{}", prefix.to_uppercase())
    }
}

impl fmt::Display for TermCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TermCategory {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for TermCategory {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<TermCategory> for String {
    fn from(value: TermCategory) -> Self {
        value.as_str().to_string()
    }
}
