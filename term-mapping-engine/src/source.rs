//! Tabular term sources feeding the dictionary.
//!
//! Spreadsheets (`.xlsx`, `.xls`) are read from their first worksheet;
//! delimited text and JSON arrays are supported as well.
//!
//! Every source yields raw [`TermRow`]s with the columns `Type`, `Term`,
//! `Code` and `StandardName`. Column names are matched case-insensitively and
//! ignoring spaces, underscores and hyphens. Row-level validation happens in
//! the dictionary; a source only fails when it cannot be read at all.

use crate::error::{TermError, TermResult};
use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One raw row as read from a term source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRow {
    pub term_type: Option<String>,
    pub term: Option<String>,
    pub code: Option<String>,
    pub standard_name: Option<String>,
}

impl TermRow {
    pub fn new(term_type: &str, term: &str, code: &str, standard_name: &str) -> Self {
        Self {
            term_type: Some(term_type.to_string()),
            term: Some(term.to_string()),
            code: Some(code.to_string()),
            standard_name: Some(standard_name.to_string()),
        }
    }
}

/// Source of dictionary rows.
pub trait TermSource: Send + Sync {
    /// Human-readable name used in log lines and errors.
    fn name(&self) -> String;

    fn read_rows(&self) -> TermResult<Vec<TermRow>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Type,
    Term,
    Code,
    StandardName,
}

fn column_for(header: &str) -> Option<Column> {
    let normalized: String = header
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect();
    match normalized.as_str() {
        "type" => Some(Column::Type),
        "term" => Some(Column::Term),
        "code" => Some(Column::Code),
        "standardname" => Some(Column::StandardName),
        _ => None,
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn require_schema(source_name: String, columns: &[Option<Column>]) -> TermResult<()> {
    if columns.contains(&Some(Column::Type)) && columns.contains(&Some(Column::Term)) {
        Ok(())
    } else {
        Err(TermError::source_unavailable(
            source_name,
            "header must contain Type and Term columns",
        ))
    }
}

/// Assign cells to columns by position; cells under unknown headers are dropped.
fn row_from_cells<I, S>(columns: &[Option<Column>], cells: I) -> TermRow
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut row = TermRow::default();
    for (column, cell) in columns.iter().zip(cells) {
        let value = non_blank(cell.as_ref());
        match column {
            Some(Column::Type) => row.term_type = value,
            Some(Column::Term) => row.term = value,
            Some(Column::Code) => row.code = value,
            Some(Column::StandardName) => row.standard_name = value,
            None => {}
        }
    }
    row
}

/// Comma- or tab-separated file with a header row.
#[derive(Debug, Clone)]
pub struct CsvTermSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvTermSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    pub fn tab_separated(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b'\t',
        }
    }
}

impl TermSource for CsvTermSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_rows(&self) -> TermResult<Vec<TermRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| TermError::source_unavailable(self.name(), e))?;

        let columns: Vec<Option<Column>> = reader
            .headers()
            .map_err(|e| TermError::source_unavailable(self.name(), e))?
            .iter()
            .map(column_for)
            .collect();

        require_schema(self.name(), &columns)?;

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(source = %self.name(), record = line + 1, error = %e, "Skipping unreadable term row");
                    continue;
                }
            };

            rows.push(row_from_cells(&columns, record.iter()));
        }

        Ok(rows)
    }
}

/// Excel workbook; the first worksheet holds a header row and one term per row.
#[derive(Debug, Clone)]
pub struct XlsxTermSource {
    path: PathBuf,
}

impl XlsxTermSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        // Whole-number codes are stored as floats and print without a fraction
        other => other.to_string(),
    }
}

impl TermSource for XlsxTermSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_rows(&self) -> TermResult<Vec<TermRow>> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| TermError::source_unavailable(self.name(), e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| TermError::source_unavailable(self.name(), "workbook has no worksheets"))?
            .map_err(|e| TermError::source_unavailable(self.name(), e))?;

        let mut sheet_rows = range.rows();
        let columns: Vec<Option<Column>> = sheet_rows
            .next()
            .map(|header| header.iter().map(|cell| column_for(&cell_text(cell))).collect())
            .unwrap_or_default();
        require_schema(self.name(), &columns)?;

        Ok(sheet_rows
            .map(|cells| row_from_cells(&columns, cells.iter().map(cell_text)))
            .collect())
    }
}

/// JSON file holding an array of row objects.
#[derive(Debug, Clone)]
pub struct JsonTermSource {
    path: PathBuf,
}

impl JsonTermSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn row_from_value(value: &Value) -> TermRow {
        let mut row = TermRow::default();
        let Some(object) = value.as_object() else {
            return row;
        };

        for (key, value) in object {
            let text = match value {
                Value::String(s) => non_blank(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            };
            match column_for(key) {
                Some(Column::Type) => row.term_type = text,
                Some(Column::Term) => row.term = text,
                Some(Column::Code) => row.code = text,
                Some(Column::StandardName) => row.standard_name = text,
                None => {}
            }
        }
        row
    }

    fn has_schema(value: &Value) -> bool {
        value.as_object().is_some_and(|object| {
            let columns: Vec<Option<Column>> = object.keys().map(|k| column_for(k)).collect();
            columns.contains(&Some(Column::Type)) && columns.contains(&Some(Column::Term))
        })
    }
}

impl TermSource for JsonTermSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_rows(&self) -> TermResult<Vec<TermRow>> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| TermError::source_unavailable(self.name(), e))?;
        let document: Value = serde_json::from_str(&content)
            .map_err(|e| TermError::source_unavailable(self.name(), e))?;

        let Value::Array(items) = document else {
            return Err(TermError::source_unavailable(
                self.name(),
                "expected a JSON array of term rows",
            ));
        };

        if !items.is_empty() && !items.iter().any(Self::has_schema) {
            return Err(TermError::source_unavailable(
                self.name(),
                "rows must contain Type and Term fields",
            ));
        }

        Ok(items.iter().map(Self::row_from_value).collect())
    }
}

/// Rows supplied directly by the caller.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rows: Vec<TermRow>,
}

impl InMemorySource {
    pub fn new(rows: Vec<TermRow>) -> Self {
        Self { rows }
    }
}

impl TermSource for InMemorySource {
    fn name(&self) -> String {
        "in-memory".to_string()
    }

    fn read_rows(&self) -> TermResult<Vec<TermRow>> {
        Ok(self.rows.clone())
    }
}

/// Pick a source implementation from the file extension.
pub fn source_for_path(path: &Path) -> TermResult<Box<dyn TermSource>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => Ok(Box::new(CsvTermSource::new(path))),
        "tsv" | "tab" => Ok(Box::new(CsvTermSource::tab_separated(path))),
        "json" => Ok(Box::new(JsonTermSource::new(path))),
        "xlsx" | "xlsm" | "xls" => Ok(Box::new(XlsxTermSource::new(path))),
        other => Err(TermError::source_unavailable(
            path.display().to_string(),
            format!("unsupported term source format '{}'", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_header_names_are_flexible() {
        assert_eq!(column_for("StandardName"), Some(Column::StandardName));
        assert_eq!(column_for("Standard Name"), Some(Column::StandardName));
        assert_eq!(column_for("standard_name"), Some(Column::StandardName));
        assert_eq!(column_for("TYPE"), Some(Column::Type));
        assert_eq!(column_for("Notes"), None);
    }

    #[test]
    fn test_csv_rows_with_blank_cells() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Type,Term,Code,Standard Name,Notes").unwrap();
        writeln!(file, "diagnosis, Diabetes ,DX002,Diabetes Mellitus Type 2,seed").unwrap();
        writeln!(file, "procedure,,RAD001,X-Ray,").unwrap();

        let rows = CsvTermSource::new(file.path()).read_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], TermRow::new("diagnosis", "Diabetes", "DX002", "Diabetes Mellitus Type 2"));
        assert_eq!(rows[1].term, None);
    }

    #[test]
    fn test_csv_without_term_column_is_unavailable() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Category,Code").unwrap();
        writeln!(file, "diagnosis,DX001").unwrap();

        let err = CsvTermSource::new(file.path()).read_rows().unwrap_err();
        assert!(matches!(err, TermError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_json_rows_accept_numeric_codes() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"Type": "lab_test", "Term": "CBC", "Code": 23, "StandardName": "Complete Blood Count"}}, 42]"#
        )
        .unwrap();

        let rows = JsonTermSource::new(file.path()).read_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].code.as_deref(), Some("23"));
        assert_eq!(rows[1], TermRow::default());
    }

    #[test]
    fn test_xlsx_rows_from_first_worksheet() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["Type", "Term", "Code", "Standard Name", "Notes"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_string(1, 0, "medication").unwrap();
        sheet.write_string(1, 1, " Metformin ").unwrap();
        sheet.write_string(1, 2, "MED002").unwrap();
        sheet.write_string(1, 3, "Metformin").unwrap();
        sheet.write_string(2, 0, "lab_test").unwrap();
        sheet.write_string(2, 1, "cbc").unwrap();
        sheet.write_number(2, 2, 4401).unwrap();
        workbook.save(file.path()).unwrap();

        let rows = XlsxTermSource::new(file.path()).read_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], TermRow::new("medication", "Metformin", "MED002", "Metformin"));
        assert_eq!(rows[1].code.as_deref(), Some("4401"));
        assert_eq!(rows[1].standard_name, None);
    }

    #[test]
    fn test_unreadable_workbook_is_unavailable() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        write!(file, "not a workbook").unwrap();

        let err = XlsxTermSource::new(file.path()).read_rows().unwrap_err();
        assert!(matches!(err, TermError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_source_for_unknown_extension() {
        assert!(source_for_path(Path::new("terms.docx")).is_err());
        assert!(source_for_path(Path::new("mock_data/medical_terms.xlsx")).is_ok());
        assert!(source_for_path(Path::new("terms.xls")).is_ok());
        assert!(source_for_path(Path::new("terms.CSV")).is_ok());
        assert!(source_for_path(Path::new("terms.json")).is_ok());
    }
}
