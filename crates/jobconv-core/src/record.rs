//! Record types flowing through the conversion pipeline

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Value read from a source record by column name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// The column exists; the cell may still be blank
    Present(&'a str),
    /// The column is not part of the header, or the mapping names no column
    Missing,
}

impl<'a> FieldValue<'a> {
    /// Cell text, or the empty string for a missing column
    pub fn as_str(&self) -> &'a str {
        match self {
            FieldValue::Present(value) => value,
            FieldValue::Missing => "",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Missing, or present with only whitespace
    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

/// Column names of a source table with a name to position index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Header {
    /// Build a header. With duplicate names the first column wins.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(index);
        }
        Self { names, positions }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One data row of the source table
///
/// Rows shorter than the header read as empty cells past their end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    header: Arc<Header>,
    cells: Vec<String>,
}

impl SourceRecord {
    pub fn new(header: Arc<Header>, cells: Vec<String>) -> Self {
        Self { header, cells }
    }

    /// Look a cell up by column name
    pub fn get(&self, column: &str) -> FieldValue<'_> {
        match self.header.position(column) {
            Some(index) => FieldValue::Present(self.cell(index)),
            None => FieldValue::Missing,
        }
    }

    /// Cell at `index`, empty when the row is shorter
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or_default()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// One converted row, aligned to the mapping's declared column order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    values: Vec<String>,
}

impl OutputRecord {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

impl From<Vec<String>> for OutputRecord {
    fn from(values: Vec<String>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cells: &[&str]) -> SourceRecord {
        let header = Arc::new(Header::new(["id", "title", "status"]));
        SourceRecord::new(header, cells.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_get_present_and_missing() {
        let row = record(&["1", "エンジニア", "公開"]);
        assert_eq!(row.get("title"), FieldValue::Present("エンジニア"));
        assert_eq!(row.get("salary"), FieldValue::Missing);
        assert_eq!(row.get("salary").as_str(), "");
    }

    #[test]
    fn test_short_row_reads_empty() {
        let row = record(&["1"]);
        assert_eq!(row.get("status"), FieldValue::Present(""));
        assert!(row.get("status").is_blank());
        assert!(!row.get("status").is_missing());
    }

    #[test]
    fn test_duplicate_header_first_wins() {
        let header = Header::new(["a", "b", "a"]);
        assert_eq!(header.position("a"), Some(0));
        assert_eq!(header.len(), 3);
    }
}
