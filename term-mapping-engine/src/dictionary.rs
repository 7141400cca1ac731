//! Category-partitioned dictionary of known medical terms.
//!
//! Built once from a [`TermSource`] and never mutated afterwards, so a single
//! instance can be shared behind an `Arc` by every extractor and mapper.

use crate::category::TermCategory;
use crate::confidence::title_case;
use crate::error::TermResult;
use crate::source::{TermRow, TermSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Canonical code and name for a known term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub code: String,
    pub standard_name: String,
}

/// A dictionary term together with its category and normalized key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryTerm {
    pub category: TermCategory,
    pub term_key: String,
    pub code: String,
    pub standard_name: String,
}

/// Terms of one category, keyed by normalized surface form.
pub type TermBucket = BTreeMap<String, TermEntry>;

/// Lower-case and trim a surface form into a dictionary key.
pub fn normalize_key(text: &str) -> String {
    text.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    buckets: BTreeMap<TermCategory, TermBucket>,
}

impl TermDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a source, degrading to an empty dictionary when the source
    /// cannot be read.
    pub fn load(source: &dyn TermSource) -> Self {
        match Self::try_load(source) {
            Ok(dictionary) => dictionary,
            Err(e) => {
                warn!(source = %source.name(), error = %e, "Failed to load medical terms, continuing with an empty dictionary");
                Self::new()
            }
        }
    }

    pub fn try_load(source: &dyn TermSource) -> TermResult<Self> {
        let rows = source.read_rows()?;
        let dictionary = Self::from_rows(rows);
        info!(
            source = %source.name(),
            terms = dictionary.len(),
            categories = dictionary.buckets.len(),
            "Loaded medical terms"
        );
        Ok(dictionary)
    }

    /// Build from raw rows. Rows without a type or term are skipped.
    pub fn from_rows(rows: impl IntoIterator<Item = TermRow>) -> Self {
        let mut dictionary = Self::new();

        for (index, row) in rows.into_iter().enumerate() {
            let term_type = row.term_type.as_deref().map(str::trim).unwrap_or_default();
            let term = row.term.as_deref().map(normalize_key).unwrap_or_default();
            if term_type.is_empty() || term.is_empty() {
                warn!(row = index + 1, "Skipping term row without Type or Term");
                continue;
            }

            let category = TermCategory::parse(term_type);
            let code = match row.code.filter(|c| !c.trim().is_empty()) {
                Some(code) => code.trim().to_string(),
                None => {
                    warn!(row = index + 1, category = %category, "Term row has no Code, using fallback code");
                    category.fallback_code()
                }
            };
            let standard_name = row
                .standard_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| title_case(&term));

            dictionary.insert(DictionaryTerm {
                category,
                term_key: term,
                code,
                standard_name,
            });
        }

        dictionary
    }

    /// Insert a term, replacing any earlier entry with the same key in its
    /// category. Only used while building.
    fn insert(&mut self, term: DictionaryTerm) {
        let bucket = self.buckets.entry(term.category.clone()).or_default();
        let previous = bucket.insert(
            term.term_key.clone(),
            TermEntry {
                code: term.code,
                standard_name: term.standard_name,
            },
        );
        if previous.is_some() {
            warn!(category = %term.category, "Duplicate term in category, keeping the last row");
        }
    }

    pub fn lookup(&self, category: &TermCategory, key: &str) -> Option<&TermEntry> {
        self.buckets.get(category)?.get(key)
    }

    pub fn bucket(&self, category: &TermCategory) -> Option<&TermBucket> {
        self.buckets.get(category)
    }

    pub fn contains_category(&self, category: &TermCategory) -> bool {
        self.buckets.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &TermCategory> {
        self.buckets.keys()
    }

    /// Every `(category, key, entry)` triple.
    pub fn iter(&self) -> impl Iterator<Item = (&TermCategory, &str, &TermEntry)> {
        self.buckets.iter().flat_map(|(category, bucket)| {
            bucket
                .iter()
                .map(move |(key, entry)| (category, key.as_str(), entry))
        })
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seed dictionary of common clinical terms.
    pub fn builtin() -> Self {
        Self::from_rows(
            BUILTIN_TERMS
                .iter()
                .map(|(category, term, code, name)| TermRow::new(category, term, code, name)),
        )
    }
}

const BUILTIN_TERMS: &[(&str, &str, &str, &str)] = &[
    ("lab_test", "complete blood count", "LAB023", "Complete Blood Count"),
    ("lab_test", "cbc", "LAB023", "Complete Blood Count"),
    ("lab_test", "blood panel", "LAB024", "Comprehensive Metabolic Panel"),
    ("lab_test", "metabolic panel", "LAB024", "Comprehensive Metabolic Panel"),
    ("lab_test", "thyroid panel", "LAB025", "Thyroid Function Panel"),
    ("lab_test", "hemoglobin a1c", "LAB026", "Hemoglobin A1C"),
    ("lab_test", "a1c", "LAB026", "Hemoglobin A1C"),
    ("procedure", "x-ray", "RAD001", "X-Ray"),
    ("procedure", "chest x-ray", "RAD002", "Chest X-Ray"),
    ("procedure", "mri", "RAD003", "Magnetic Resonance Imaging"),
    ("procedure", "ct scan", "RAD004", "Computed Tomography Scan"),
    ("procedure", "ultrasound", "RAD005", "Ultrasound"),
    ("procedure", "echocardiogram", "RAD006", "Echocardiogram"),
    ("procedure", "ekg", "CAR001", "Electrocardiogram"),
    ("procedure", "electrocardiogram", "CAR001", "Electrocardiogram"),
    ("diagnosis", "hypertension", "DX001", "Essential Hypertension"),
    ("diagnosis", "high blood pressure", "DX001", "Essential Hypertension"),
    ("diagnosis", "diabetes", "DX002", "Diabetes Mellitus Type 2"),
    ("diagnosis", "type 2 diabetes", "DX002", "Diabetes Mellitus Type 2"),
    ("diagnosis", "asthma", "DX003", "Asthma"),
    ("diagnosis", "pneumonia", "DX004", "Pneumonia"),
    ("diagnosis", "bronchitis", "DX005", "Acute Bronchitis"),
    ("medication", "lisinopril", "MED001", "Lisinopril"),
    ("medication", "metformin", "MED002", "Metformin"),
    ("medication", "atorvastatin", "MED003", "Atorvastatin"),
    ("medication", "albuterol", "MED004", "Albuterol"),
    ("medication", "insulin", "MED005", "Insulin"),
    ("medication", "prednisone", "MED006", "Prednisone"),
    ("vital_sign", "blood pressure", "VS001", "Blood Pressure"),
    ("vital_sign", "heart rate", "VS002", "Heart Rate"),
    ("vital_sign", "pulse", "VS002", "Heart Rate"),
    ("vital_sign", "temperature", "VS003", "Body Temperature"),
    ("vital_sign", "respiratory rate", "VS004", "Respiratory Rate"),
    ("vital_sign", "oxygen saturation", "VS005", "Oxygen Saturation"),
    ("vital_sign", "o2 sat", "VS005", "Oxygen Saturation"),
    ("symptom", "pain", "SYM001", "Pain"),
    ("symptom", "chest pain", "SYM002", "Chest Pain"),
    ("symptom", "shortness of breath", "SYM003", "Dyspnea"),
    ("symptom", "sob", "SYM003", "Dyspnea"),
    ("symptom", "nausea", "SYM004", "Nausea"),
    ("symptom", "vomiting", "SYM005", "Vomiting"),
    ("symptom", "dizziness", "SYM006", "Dizziness"),
    ("symptom", "fever", "SYM007", "Fever"),
    ("symptom", "fatigue", "SYM008", "Fatigue"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySource;

    #[test]
    fn test_rows_are_normalized_into_buckets() {
        let dictionary = TermDictionary::from_rows(vec![
            TermRow::new(" Diagnosis ", "  Diabetes ", "DX002", "Diabetes Mellitus Type 2"),
            TermRow::new("Allergy", "Peanuts", "ALG001", "Peanut Allergy"),
        ]);

        let entry = dictionary.lookup(&TermCategory::Diagnosis, "diabetes").unwrap();
        assert_eq!(entry.code, "DX002");
        assert!(dictionary.contains_category(&TermCategory::Custom("allergy".to_string())));
        assert_eq!(dictionary.len(), 2);
    }

    #[test]
    fn test_rows_missing_type_or_term_are_skipped() {
        let dictionary = TermDictionary::from_rows(vec![
            TermRow {
                term_type: None,
                ..TermRow::new("", "asthma", "DX003", "Asthma")
            },
            TermRow {
                term: Some("   ".to_string()),
                ..TermRow::new("diagnosis", "", "DX004", "Pneumonia")
            },
            TermRow::new("diagnosis", "bronchitis", "DX005", "Acute Bronchitis"),
        ]);

        assert_eq!(dictionary.len(), 1);
        assert!(dictionary.lookup(&TermCategory::Diagnosis, "bronchitis").is_some());
    }

    #[test]
    fn test_missing_code_and_name_get_fallbacks() {
        let dictionary = TermDictionary::from_rows(vec![TermRow {
            term_type: Some("symptom".to_string()),
            term: Some("Night Sweats".to_string()),
            code: None,
            standard_name: None,
        }]);

        let entry = dictionary.lookup(&TermCategory::Symptom, "night sweats").unwrap();
        assert_eq!(entry.code, "UNK-SYM");
        assert_eq!(entry.standard_name, "Night Sweats");
    }

    #[test]
    fn test_same_term_in_two_categories() {
        let dictionary = TermDictionary::from_rows(vec![
            TermRow::new("vital_sign", "blood pressure", "VS001", "Blood Pressure"),
            TermRow::new("diagnosis", "blood pressure", "DX009", "Blood Pressure Disorder"),
            TermRow::new("diagnosis", "blood pressure", "DX010", "Abnormal Blood Pressure"),
        ]);

        assert_eq!(dictionary.len(), 2);
        assert_eq!(
            dictionary.lookup(&TermCategory::VitalSign, "blood pressure").unwrap().code,
            "VS001"
        );
        // Last duplicate row within a category wins
        assert_eq!(
            dictionary.lookup(&TermCategory::Diagnosis, "blood pressure").unwrap().code,
            "DX010"
        );
    }

    #[test]
    fn test_load_from_source() {
        let source = InMemorySource::new(vec![TermRow::new("medication", "Metformin", "MED002", "Metformin")]);
        let dictionary = TermDictionary::load(&source);
        assert_eq!(dictionary.iter().count(), 1);
        let (category, key, entry) = dictionary.iter().next().unwrap();
        assert_eq!(category, &TermCategory::Medication);
        assert_eq!(key, "metformin");
        assert_eq!(entry.code, "MED002");
    }

    #[test]
    fn test_builtin_dictionary() {
        let dictionary = TermDictionary::builtin();
        assert!(!dictionary.is_empty());
        assert_eq!(dictionary.categories().count(), 6);
        assert_eq!(
            dictionary.lookup(&TermCategory::Symptom, "sob").unwrap().standard_name,
            "Dyspnea"
        );
    }
}
