//! Confidence policy shared by the keyword extractor and the entity mapper.
//!
//! | Match | Confidence |
//! |---|---|
//! | keyword, exact dictionary hit | fixed 0.95 |
//! | provider entity, exact hit | `provider * 0.9` |
//! | provider entity, fuzzy hit | `provider * 0.75` |
//! | provider entity, known category, no match | `provider * 0.6` |
//! | provider entity, unrecognized category | `provider * 0.5` |

/// Fixed confidence for dictionary keyword matches found in free text.
pub const KEYWORD_CONFIDENCE: f64 = 0.95;

/// How a term was resolved against the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    KeywordExact,
    ProviderExact,
    ProviderFuzzy,
    KnownCategoryUnmatched,
    UnrecognizedCategory,
}

impl MatchKind {
    /// Multiplier applied to the provider's own confidence.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::KeywordExact => KEYWORD_CONFIDENCE,
            Self::ProviderExact => 0.9,
            Self::ProviderFuzzy => 0.75,
            Self::KnownCategoryUnmatched => 0.6,
            Self::UnrecognizedCategory => 0.5,
        }
    }

    /// Final confidence for this kind of match. Keyword matches ignore the
    /// provider score entirely.
    pub fn confidence(self, provider_confidence: f64) -> f64 {
        match self {
            Self::KeywordExact => KEYWORD_CONFIDENCE,
            _ => clamp_unit(provider_confidence) * self.multiplier(),
        }
    }
}

/// Clamp a provider score into `[0, 1]`; NaN counts as 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Title-case free text: the first letter of every alphabetic run is
/// upper-cased and the remaining letters lower-cased.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }
    result
}
