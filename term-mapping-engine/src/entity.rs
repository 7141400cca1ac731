use crate::category::TermCategory;
use crate::confidence::title_case;
use crate::error::{TermError, TermResult};
use serde::{Deserialize, Serialize};

/// Entity as returned by a transcription provider, before validation.
///
/// Every field is optional so that a batch with one bad record still
/// deserializes; [`ProviderEntity::validate`] decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEntity {
    pub category: Option<String>,
    pub text: Option<String>,
    pub offset: Option<i64>,
    pub length: Option<i64>,
    pub confidence_score: Option<f64>,
}

/// Provider entity with every required field present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    pub category: String,
    pub text: String,
    pub offset: i64,
    pub length: i64,
    pub confidence_score: f64,
}

impl ProviderEntity {
    pub fn new(category: &str, text: &str, confidence_score: f64) -> Self {
        Self {
            category: Some(category.to_string()),
            text: Some(text.to_string()),
            offset: Some(0),
            length: i64::try_from(text.chars().count()).ok(),
            confidence_score: Some(confidence_score),
        }
    }

    /// Check required fields. Strings are trimmed and must not be blank; a
    /// missing confidence counts as 0.
    pub fn validate(&self) -> TermResult<RecognizedEntity> {
        let category = required_text(self.category.as_deref(), "category")?;
        let text = required_text(self.text.as_deref(), "text")?;
        let offset = self
            .offset
            .ok_or_else(|| TermError::MalformedRecord("missing field 'offset'".to_string()))?;
        let length = self
            .length
            .ok_or_else(|| TermError::MalformedRecord("missing field 'length'".to_string()))?;

        Ok(RecognizedEntity {
            category,
            text,
            offset,
            length,
            confidence_score: self.confidence_score.unwrap_or(0.0),
        })
    }
}

fn required_text(value: Option<&str>, field: &str) -> TermResult<String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        Some(_) => Err(TermError::MalformedRecord(format!("field '{}' is blank", field))),
        None => Err(TermError::MalformedRecord(format!("missing field '{}'", field))),
    }
}

/// Location of a keyword match, in characters of the lower-cased text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub matched_text: String,
    pub start: usize,
    pub end: usize,
}

/// Medical entity found by keyword extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntity {
    pub text: String,
    #[serde(rename = "type")]
    pub category: TermCategory,
    pub code: Option<String>,
    pub standard_name: Option<String>,
    pub confidence: f64,
    pub span: Option<Span>,
}

impl CandidateEntity {
    /// Convert to the output record, filling a missing code or name with the
    /// category fallback code and the title-cased text.
    pub fn into_mapped(self) -> MappedTerm {
        let code = self
            .code
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| self.category.fallback_code());
        let standard_name = self
            .standard_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| title_case(&self.text));

        MappedTerm {
            text: self.text,
            category: self.category,
            code: Some(code),
            standard_name: Some(standard_name),
            confidence: self.confidence,
        }
    }
}

/// Final output unit handed to the calling layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedTerm {
    pub text: String,
    #[serde(rename = "type")]
    pub category: TermCategory,
    pub code: Option<String>,
    pub standard_name: Option<String>,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_complete_entity() {
        let raw: ProviderEntity = serde_json::from_value(json!({
            "category": "Medication",
            "text": "  Metformin ",
            "offset": 12,
            "length": 9,
            "confidence_score": 0.93,
            "subcategory": "ignored"
        }))
        .unwrap();

        let entity = raw.validate().unwrap();
        assert_eq!(entity.text, "Metformin");
        assert_eq!(entity.offset, 12);
        assert!((entity.confidence_score - 0.93).abs() < 1e-9);
    }

    #[test]
    fn test_missing_confidence_defaults_to_zero() {
        let raw: ProviderEntity = serde_json::from_value(json!({
            "category": "Symptom", "text": "fever", "offset": 0, "length": 5
        }))
        .unwrap();
        assert_eq!(raw.validate().unwrap().confidence_score, 0.0);
    }

    #[test]
    fn test_missing_required_fields_are_malformed() {
        let no_text = ProviderEntity {
            text: None,
            ..ProviderEntity::new("Symptom", "fever", 0.9)
        };
        let blank_category = ProviderEntity::new("  ", "fever", 0.9);
        let no_offset = ProviderEntity {
            offset: None,
            ..ProviderEntity::new("Symptom", "fever", 0.9)
        };

        for raw in [no_text, blank_category, no_offset] {
            assert!(matches!(raw.validate(), Err(TermError::MalformedRecord(_))));
        }
    }

    #[test]
    fn test_candidate_fallbacks() {
        let candidate = CandidateEntity {
            text: "night sweats".to_string(),
            category: TermCategory::Symptom,
            code: None,
            standard_name: None,
            confidence: 0.95,
            span: None,
        };

        let mapped = candidate.into_mapped();
        assert_eq!(mapped.code.as_deref(), Some("UNK-SYM"));
        assert_eq!(mapped.standard_name.as_deref(), Some("Night Sweats"));
        assert_eq!(mapped.confidence, 0.95);
    }

    #[test]
    fn test_mapped_term_wire_format() {
        let term = MappedTerm {
            text: "Diabetes".to_string(),
            category: TermCategory::Diagnosis,
            code: Some("DX002".to_string()),
            standard_name: Some("Diabetes Mellitus Type 2".to_string()),
            confidence: 0.5,
        };

        let value = serde_json::to_value(&term).unwrap();
        assert_eq!(
            value,
            json!({
                "text": "Diabetes",
                "type": "diagnosis",
                "code": "DX002",
                "standard_name": "Diabetes Mellitus Type 2",
                "confidence": 0.5
            })
        );

        let back: MappedTerm = serde_json::from_value(value).unwrap();
        assert_eq!(back, term);
    }
}
