use crate::category::TermCategory;
use crate::confidence::MatchKind;
use crate::dictionary::{TermDictionary, TermEntry};
use crate::entity::{CandidateEntity, MappedTerm, Span};
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

struct KeywordPattern {
    category: TermCategory,
    term: String,
    entry: TermEntry,
    pattern: Regex,
}

/// Finds whole-word dictionary terms in free text.
///
/// Patterns are compiled once per dictionary term at construction; every
/// matching term yields its own candidate, overlaps included.
pub struct KeywordExtractor {
    dictionary: Arc<TermDictionary>,
    patterns: Vec<KeywordPattern>,
}

impl KeywordExtractor {
    pub fn new(dictionary: Arc<TermDictionary>) -> Self {
        let patterns = dictionary
            .iter()
            .filter_map(|(category, term, entry)| {
                let source = format!(r"\b{}\b", regex::escape(term));
                match Regex::new(&source) {
                    Ok(pattern) => Some(KeywordPattern {
                        category: category.clone(),
                        term: term.to_string(),
                        entry: entry.clone(),
                        pattern,
                    }),
                    Err(e) => {
                        warn!(category = %category, error = %e, "Skipping dictionary term with unusable pattern");
                        None
                    }
                }
            })
            .collect();

        Self {
            dictionary,
            patterns,
        }
    }

    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    /// One candidate per dictionary term found in `text`, at its first
    /// occurrence. Output follows dictionary order, not text position.
    pub fn extract(&self, text: &str) -> Vec<CandidateEntity> {
        if text.is_empty() {
            return Vec::new();
        }

        let lowered = text.to_lowercase();
        let candidates: Vec<CandidateEntity> = self
            .patterns
            .iter()
            .filter_map(|keyword| {
                let found = keyword.pattern.find(&lowered)?;
                Some(CandidateEntity {
                    text: keyword.term.clone(),
                    category: keyword.category.clone(),
                    code: Some(keyword.entry.code.clone()),
                    standard_name: Some(keyword.entry.standard_name.clone()),
                    confidence: MatchKind::KeywordExact.confidence(1.0),
                    span: Some(Span {
                        matched_text: found.as_str().to_string(),
                        start: char_offset(&lowered, found.start()),
                        end: char_offset(&lowered, found.end()),
                    }),
                })
            })
            .collect();

        debug!(matches = candidates.len(), "Keyword extraction finished");
        candidates
    }

    /// [`extract`](Self::extract) followed by conversion to output records.
    pub fn extract_mapped(&self, text: &str) -> Vec<MappedTerm> {
        self.extract(text)
            .into_iter()
            .map(CandidateEntity::into_mapped)
            .collect()
    }
}

fn char_offset(text: &str, byte_index: usize) -> usize {
    text.get(..byte_index)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(byte_index)
}
