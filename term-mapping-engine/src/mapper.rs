use crate::category::TermCategory;
use crate::confidence::{title_case, MatchKind};
use crate::dictionary::{normalize_key, TermBucket, TermDictionary, TermEntry};
use crate::entity::{MappedTerm, ProviderEntity, RecognizedEntity};
use crate::similarity::{close_matches, SequenceRatio, Similarity};
use crate::variations::VariationMap;
use logger_redacted::ClinicalRedactor;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fuzzy lookup parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Minimum similarity for a fuzzy hit.
    pub fuzzy_cutoff: f64,
    /// How many close matches to rank before taking the best.
    pub max_candidates: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            fuzzy_cutoff: 0.8,
            max_candidates: 3,
        }
    }
}

/// Resolves provider-recognized entities to dictionary terms.
pub struct EntityMapper {
    dictionary: Arc<TermDictionary>,
    options: MatchOptions,
    similarity: Box<dyn Similarity>,
    variations: Option<VariationMap>,
    redactor: ClinicalRedactor,
}

struct Resolution {
    category: TermCategory,
    code: String,
    standard_name: String,
    kind: MatchKind,
}

impl EntityMapper {
    pub fn new(dictionary: Arc<TermDictionary>) -> Self {
        Self {
            dictionary,
            options: MatchOptions::default(),
            similarity: Box::new(SequenceRatio),
            variations: None,
            redactor: ClinicalRedactor::default(),
        }
    }

    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_similarity(mut self, similarity: Box<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    /// Resolve known phrasing variations to their base term after an exact miss.
    pub fn with_variations(mut self, variations: VariationMap) -> Self {
        self.variations = Some(variations);
        self
    }

    pub fn with_redactor(mut self, redactor: ClinicalRedactor) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    /// Map a batch of provider entities, one output per valid entity, in
    /// input order. Invalid entities are skipped.
    pub fn map(&self, entities: &[ProviderEntity]) -> Vec<MappedTerm> {
        entities
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| match raw.validate() {
                Ok(entity) => Some(self.map_entity(&entity)),
                Err(e) => {
                    warn!(index, error = %self.rejection_message(&e), "Invalid provider entity skipped");
                    None
                }
            })
            .collect()
    }

    /// Same as [`map`](Self::map) for untyped JSON records; values that are
    /// not entity objects are skipped.
    pub fn map_values(&self, values: &[Value]) -> Vec<MappedTerm> {
        let entities: Vec<ProviderEntity> = values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| {
                match serde_json::from_value::<ProviderEntity>(value.clone()) {
                    Ok(entity) => Some(entity),
                    Err(e) => {
                        warn!(index, error = %self.rejection_message(&e), "Unparseable provider entity skipped");
                        None
                    }
                }
            })
            .collect();
        self.map(&entities)
    }

    pub fn map_entity(&self, entity: &RecognizedEntity) -> MappedTerm {
        let resolution = self.resolve(entity);
        let confidence = resolution.kind.confidence(entity.confidence_score);

        debug!(
            text = %self.redactor.fingerprint(&entity.text),
            provider_category = %entity.category,
            category = %resolution.category,
            code = %resolution.code,
            match_kind = ?resolution.kind,
            confidence,
            "Mapped provider entity"
        );

        MappedTerm {
            text: entity.text.clone(),
            category: resolution.category,
            code: Some(resolution.code),
            standard_name: Some(resolution.standard_name),
            confidence,
        }
    }

    /// Parse errors quote the offending value, which may carry identifiers.
    fn rejection_message(&self, error: &dyn std::fmt::Display) -> String {
        self.redactor.redact(&error.to_string())
    }

    fn resolve(&self, entity: &RecognizedEntity) -> Resolution {
        let category = TermCategory::from_provider(&entity.category);
        let Some(bucket) = self.dictionary.bucket(&category) else {
            return Resolution {
                code: TermCategory::Other.fallback_code(),
                category: TermCategory::Other,
                standard_name: title_case(&entity.text),
                kind: MatchKind::UnrecognizedCategory,
            };
        };

        let key = normalize_key(&entity.text);
        let found = bucket
            .get(&key)
            .or_else(|| self.variation_hit(bucket, &key))
            .map(|entry| (entry, MatchKind::ProviderExact))
            .or_else(|| {
                self.fuzzy_hit(bucket, &key)
                    .map(|entry| (entry, MatchKind::ProviderFuzzy))
            });

        match found {
            Some((entry, kind)) => Resolution {
                category,
                code: entry.code.clone(),
                standard_name: entry.standard_name.clone(),
                kind,
            },
            None => Resolution {
                code: category.fallback_code(),
                category,
                standard_name: title_case(&entity.text),
                kind: MatchKind::KnownCategoryUnmatched,
            },
        }
    }

    fn variation_hit<'b>(&self, bucket: &'b TermBucket, key: &str) -> Option<&'b TermEntry> {
        let base = self.variations.as_ref()?.canonical(key)?;
        bucket.get(&normalize_key(base))
    }

    fn fuzzy_hit<'b>(&self, bucket: &'b TermBucket, key: &str) -> Option<&'b TermEntry> {
        let matches = close_matches(
            key,
            bucket.keys().map(String::as_str),
            self.options.max_candidates,
            self.options.fuzzy_cutoff,
            self.similarity.as_ref(),
        );
        let (best, _score) = matches.into_iter().next()?;
        bucket.get(best)
    }
}
