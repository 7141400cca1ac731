use crate::entity::{MappedTerm, ProviderEntity};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output of a transcription provider: the recognized text and, when the
/// provider supports it, the medical entities it recognized.
///
/// Entities stay untyped JSON until mapping so that one malformed record is
/// skipped on its own instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionOutput {
    #[serde(alias = "transcription")]
    pub text: String,
    #[serde(default)]
    pub entities: Option<Vec<Value>>,
}

impl TranscriptionOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entities: None,
        }
    }

    pub fn with_entities(text: impl Into<String>, entities: Vec<ProviderEntity>) -> Self {
        Self {
            text: text.into(),
            entities: Some(
                entities
                    .iter()
                    .filter_map(|entity| serde_json::to_value(entity).ok())
                    .collect(),
            ),
        }
    }

    /// Raw provider entity records, if any were returned.
    pub fn provider_entities(&self) -> Option<&[Value]> {
        self.entities.as_deref().filter(|entities| !entities.is_empty())
    }
}

/// Which path produced the structured data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    Provider,
    KeywordExtractor,
}

/// Transcription with its structured medical terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub transcription: String,
    pub structured_data: Vec<MappedTerm>,
    pub source: MappingSource,
}
