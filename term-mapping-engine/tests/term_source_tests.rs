//! Integration tests for loading term dictionaries from files

use std::io::Write;
use term_mapping_engine::{
    source_for_path, EngineConfig, ProviderEntity, TermCategory, TermDictionary, TermError,
    TermNormalizer,
};

/// Helper to write a temporary terms file with the given extension
fn terms_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write terms file");
    file
}

#[test]
fn test_csv_file_drives_normalizer() {
    let file = terms_file(
        ".csv",
        "Type,Term,Code,Standard Name\n\
         diagnosis,Hypertension,DX001,Essential Hypertension\n\
         medication,lisinopril,MED001,Lisinopril\n\
         ,orphan,X1,Orphan\n",
    );
    let config = EngineConfig {
        terms_path: Some(file.path().to_path_buf()),
        ..EngineConfig::default()
    };

    let normalizer = TermNormalizer::from_config(&config);
    assert_eq!(normalizer.dictionary().len(), 2);

    let entry = normalizer
        .dictionary()
        .lookup(&TermCategory::Diagnosis, "hypertension")
        .expect("hypertension should be loaded");
    assert_eq!(entry.code, "DX001");

    let candidates = normalizer.extract("Hypertension managed with lisinopril");
    assert_eq!(candidates.len(), 2);
}

#[test]
fn test_tsv_file_with_missing_code() {
    let file = terms_file(
        ".tsv",
        "Type\tTerm\tCode\tStandard Name\n\
         symptom\tshortness of breath\t\t\n",
    );
    let source = source_for_path(file.path()).expect("tsv should be supported");
    let dictionary = TermDictionary::try_load(source.as_ref()).expect("Failed to load tsv");

    let entry = dictionary
        .lookup(&TermCategory::Symptom, "shortness of breath")
        .expect("row should be kept");
    assert_eq!(entry.code, "UNK-SYM");
    assert_eq!(entry.standard_name, "Shortness Of Breath");
}

#[test]
fn test_json_file_with_custom_category() {
    let file = terms_file(
        ".json",
        r#"[
            {"Type": "imaging_protocol", "Term": "Contrast MRI", "Code": 4401, "Standard Name": "MRI With Contrast"},
            {"Type": "medication", "Term": "insulin", "Code": "MED005"}
        ]"#,
    );
    let source = source_for_path(file.path()).expect("json should be supported");
    let dictionary = TermDictionary::try_load(source.as_ref()).expect("Failed to load json");

    let custom = TermCategory::parse("imaging_protocol");
    assert_eq!(custom, TermCategory::Custom("imaging_protocol".to_string()));
    let entry = dictionary
        .lookup(&custom, "contrast mri")
        .expect("custom category should be loaded");
    assert_eq!(entry.code, "4401");

    let insulin = dictionary
        .lookup(&TermCategory::Medication, "insulin")
        .expect("insulin should be loaded");
    assert_eq!(insulin.standard_name, "Insulin");
}

#[test]
fn test_missing_file_degrades_to_empty_dictionary() {
    let config = EngineConfig {
        terms_path: Some("/nonexistent/medical_terms.csv".into()),
        ..EngineConfig::default()
    };

    let normalizer = TermNormalizer::from_config(&config);
    assert!(normalizer.dictionary().is_empty());

    let mapped = normalizer.map(&[ProviderEntity::new("Medication", "metformin", 1.0)]);
    assert_eq!(mapped.len(), 1);
    assert_eq!(mapped[0].code.as_deref(), Some("UNK-OTH"));
}

#[test]
fn test_header_without_required_columns_is_rejected() {
    let file = terms_file(".csv", "Name,Identifier\nmetformin,MED002\n");
    let source = source_for_path(file.path()).expect("csv should be supported");

    let result = TermDictionary::try_load(source.as_ref());
    assert!(matches!(result, Err(TermError::SourceUnavailable { .. })));
    assert!(TermDictionary::load(source.as_ref()).is_empty());
}

#[test]
fn test_workbook_file_drives_normalizer() {
    let file = tempfile::Builder::new()
        .suffix(".xlsx")
        .tempfile()
        .expect("Failed to create temp file");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    let rows = [
        ["Type", "Term", "Code", "Standard Name"],
        ["diagnosis", "pneumonia", "DX004", "Pneumonia"],
        ["procedure", "chest x-ray", "RAD002", "Chest X-Ray"],
    ];
    for (row, cells) in rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            sheet
                .write_string(row as u32, col as u16, *cell)
                .expect("Failed to write cell");
        }
    }
    workbook.save(file.path()).expect("Failed to save workbook");

    let config = EngineConfig {
        terms_path: Some(file.path().to_path_buf()),
        ..EngineConfig::default()
    };
    let normalizer = TermNormalizer::from_config(&config);
    assert_eq!(normalizer.dictionary().len(), 2);

    let mapped = normalizer.map(&[ProviderEntity::new("MedicalCondition", "pneumonia", 1.0)]);
    assert_eq!(mapped[0].code.as_deref(), Some("DX004"));
}

#[test]
fn test_corrupt_workbook_degrades_to_empty_dictionary() {
    let file = terms_file(".xlsx", "not a spreadsheet");
    let source = source_for_path(file.path()).expect("xlsx should be supported");

    assert!(matches!(
        TermDictionary::try_load(source.as_ref()),
        Err(TermError::SourceUnavailable { .. })
    ));
    assert!(TermDictionary::load(source.as_ref()).is_empty());
}

#[test]
fn test_unsupported_extension() {
    let file = terms_file(".docx", "not a term list");
    assert!(source_for_path(file.path()).is_err());
}
