use std::collections::HashMap;

/// Clinical phrasing variations mapped to a base term.
#[derive(Debug, Clone, Default)]
pub struct VariationMap {
    variations: HashMap<String, String>,
}

impl VariationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys are normalized (trimmed, lower-cased) on insert.
    pub fn with_variation(mut self, variation: &str, base: &str) -> Self {
        self.variations
            .insert(variation.trim().to_lowercase(), base.trim().to_string());
        self
    }

    /// Base term for an already-normalized surface form.
    pub fn canonical(&self, normalized: &str) -> Option<&str> {
        self.variations.get(normalized).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }

    pub fn builtin() -> Self {
        BUILTIN_VARIATIONS
            .iter()
            .fold(Self::new(), |map, (variation, base)| map.with_variation(variation, base))
    }
}

const BUILTIN_VARIATIONS: &[(&str, &str)] = &[
    // Procedures
    ("mri", "MRI"),
    ("mri scan", "MRI"),
    ("magnetic resonance imaging", "MRI"),
    ("x-ray", "X-ray"),
    ("x ray", "X-ray"),
    ("xray", "X-ray"),
    ("ct scan", "CT scan"),
    ("ct", "CT scan"),
    ("computed tomography", "CT scan"),
    ("ultrasound", "ultrasound"),
    ("sonogram", "ultrasound"),
    ("colonoscopy", "colonoscopy"),
    ("endoscopy", "endoscopy"),
    ("upper endoscopy", "endoscopy"),
    // Diagnoses
    ("pneumonia", "pneumonia"),
    ("diabetes", "diabetes"),
    ("type 1 diabetes", "diabetes"),
    ("type 2 diabetes", "diabetes"),
    ("hypertension", "hypertension"),
    ("high blood pressure", "hypertension"),
    ("htn", "hypertension"),
    ("asthma", "asthma"),
    ("bronchitis", "bronchitis"),
    ("acute bronchitis", "bronchitis"),
    ("copd", "COPD"),
    ("chronic obstructive pulmonary disease", "COPD"),
    // Lab tests
    ("sugar", "blood sugar"),
    ("cbc", "CBC"),
    ("complete blood count", "CBC"),
    ("blood count", "CBC"),
    ("blood glucose", "blood glucose"),
    ("glucose test", "blood glucose"),
    ("glucose", "blood glucose"),
    ("lipid panel", "lipid panel"),
    ("cholesterol test", "lipid panel"),
    ("lipids", "lipid panel"),
    ("urinalysis", "urinalysis"),
    ("urine test", "urinalysis"),
    ("ua", "urinalysis"),
    ("hba1c", "HbA1c"),
    ("a1c", "HbA1c"),
    ("glycated hemoglobin", "HbA1c"),
];
