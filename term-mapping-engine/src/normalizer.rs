use crate::config::EngineConfig;
use crate::dictionary::TermDictionary;
use crate::entity::{CandidateEntity, MappedTerm, ProviderEntity};
use crate::extractor::KeywordExtractor;
use crate::mapper::EntityMapper;
use crate::source::source_for_path;
use crate::transcription::{MappingSource, TranscriptionOutput, TranscriptionResponse};
use crate::variations::VariationMap;
use logger_redacted::{ClinicalRedactor, RedactionConfig};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// Turns transcription output into mapped medical terms.
///
/// Provider entities go through the [`EntityMapper`]; when the provider
/// returned none, the [`KeywordExtractor`] scans the text instead. Both share
/// one read-only dictionary, so a normalizer can be wrapped in an `Arc` and
/// used from any number of threads.
pub struct TermNormalizer {
    dictionary: Arc<TermDictionary>,
    extractor: KeywordExtractor,
    mapper: EntityMapper,
}

impl TermNormalizer {
    pub fn new(dictionary: Arc<TermDictionary>, config: &EngineConfig) -> Self {
        let redaction = RedactionConfig {
            enabled: config.redact_logs,
            ..RedactionConfig::default()
        };

        let mut mapper = EntityMapper::new(Arc::clone(&dictionary))
            .with_options(config.match_options())
            .with_redactor(ClinicalRedactor::new(redaction));
        if config.resolve_variations {
            mapper = mapper.with_variations(VariationMap::builtin());
        }

        Self {
            extractor: KeywordExtractor::new(Arc::clone(&dictionary)),
            mapper,
            dictionary,
        }
    }

    /// Build from configuration, loading the configured term source. An
    /// unreadable or unconfigured source yields an empty dictionary.
    pub fn from_config(config: &EngineConfig) -> Self {
        let dictionary = match &config.terms_path {
            Some(path) => match source_for_path(path) {
                Ok(source) => TermDictionary::load(source.as_ref()),
                Err(e) => {
                    warn!(error = %e, "Failed to load medical terms, continuing with an empty dictionary");
                    TermDictionary::new()
                }
            },
            None => {
                warn!("No medical terms source configured, continuing with an empty dictionary");
                TermDictionary::new()
            }
        };

        Self::new(Arc::new(dictionary), config)
    }

    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    pub fn extract(&self, text: &str) -> Vec<CandidateEntity> {
        self.extractor.extract(text)
    }

    pub fn map(&self, entities: &[ProviderEntity]) -> Vec<MappedTerm> {
        self.mapper.map(entities)
    }

    pub fn map_values(&self, values: &[Value]) -> Vec<MappedTerm> {
        self.mapper.map_values(values)
    }

    pub fn normalize(&self, output: &TranscriptionOutput) -> TranscriptionResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!("normalize_terms", request_id = %request_id);
        let _guard = span.enter();

        let (structured_data, source) = match output.provider_entities() {
            Some(entities) => (self.mapper.map_values(entities), MappingSource::Provider),
            None => (
                self.extractor.extract_mapped(&output.text),
                MappingSource::KeywordExtractor,
            ),
        };

        info!(
            source = ?source,
            terms = structured_data.len(),
            "Normalized transcription"
        );

        TranscriptionResponse {
            transcription: output.text.clone(),
            structured_data,
            source,
        }
    }
}
