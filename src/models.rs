//! Core data structures for IDIS extraction.
//!
//! Defines column specifications parsed from the layout header, the
//! in-memory table produced for each input file, and run statistics.

use crate::error::Result;
use polars::prelude::{Column, DataFrame, PlSmallStr};
use std::collections::HashSet;
use std::path::PathBuf;

/// One entry of a layout block: a named, 1-based inclusive character range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub start: usize,
    pub end: usize,
    pub name: String,
}

impl ColumnSpec {
    /// Zero-based half-open character range covered by this column
    pub fn char_range(&self) -> std::ops::Range<usize> {
        (self.start - 1)..self.end
    }
}

/// Result of reading the header and layout block of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub table_name: String,
    pub columns: Vec<ColumnSpec>,
}

/// Assigns unique names by appending `_1`, `_2`, ... to repeats.
///
/// A candidate is checked against every name accepted so far, so
/// `A, A_1, A` resolves to `A, A_1, A_2`.
#[derive(Debug, Default)]
pub struct NameRegistry {
    seen: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name`, or the first free suffixed variant of it
    pub fn claim(&mut self, name: &str) -> String {
        let mut candidate = name.to_string();
        let mut suffix = 1;
        while self.seen.contains(&candidate) {
            candidate = format!("{}_{}", name, suffix);
            suffix += 1;
        }
        self.seen.insert(candidate.clone());
        candidate
    }
}

/// Parsed contents of one fixed-width file.
///
/// Rows are stored positionally against `columns`; the last column is
/// always the table-name column. All cells are text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub source: PathBuf,
    pub table_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Name of the appended table-name column
    pub fn table_name_column(&self) -> &str {
        self.columns.last().map(String::as_str).unwrap_or_default()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell value by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Base name for output files, falling back to the input stem.
    ///
    /// Path separators and other characters file systems reject become
    /// `_`, so the stem is always a single path component. A name made
    /// only of dots is never used.
    pub fn output_stem(&self) -> String {
        let stem: String = self
            .table_name
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        if !stem.is_empty() && !stem.chars().all(|c| c == '.') {
            return stem;
        }
        self.source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "table".to_string())
    }

    /// Build a DataFrame with one string column per table column
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<String> = self.rows.iter().map(|row| row[idx].clone()).collect();
                Column::new(PlSmallStr::from(name.as_str()), values)
            })
            .collect::<Vec<_>>();

        Ok(DataFrame::new(columns)?)
    }
}

/// Counters accumulated while converting a tree
#[derive(Debug, Default)]
pub struct ConversionStats {
    pub files_converted: usize,
    pub files_failed: usize,
    pub files_skipped: usize,
    pub archives_extracted: usize,
    pub total_rows: usize,
    pub outputs: Vec<PathBuf>,
    pub processing_time_ms: u128,
}

impl ConversionStats {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ParsedTable {
        ParsedTable {
            source: PathBuf::from("exports/activity.txt"),
            table_name: "activity_report".to_string(),
            columns: vec![
                "GRANTEE".to_string(),
                "AMOUNT".to_string(),
                "table_name".to_string(),
            ],
            rows: vec![
                vec![
                    "SPRINGFIELD".to_string(),
                    "1200".to_string(),
                    "activity_report".to_string(),
                ],
                vec![
                    "SHELBYVILLE".to_string(),
                    "".to_string(),
                    "activity_report".to_string(),
                ],
            ],
        }
    }

    #[test]
    fn test_name_registry_suffixes() {
        let mut names = NameRegistry::new();
        assert_eq!(names.claim("NAME"), "NAME");
        assert_eq!(names.claim("NAME"), "NAME_1");
        assert_eq!(names.claim("NAME"), "NAME_2");
    }

    #[test]
    fn test_name_registry_skips_taken_suffix() {
        let mut names = NameRegistry::new();
        assert_eq!(names.claim("A"), "A");
        assert_eq!(names.claim("A_1"), "A_1");
        assert_eq!(names.claim("A"), "A_2");
    }

    #[test]
    fn test_column_spec_range() {
        let spec = ColumnSpec {
            start: 1,
            end: 5,
            name: "CODE".to_string(),
        };
        assert_eq!(spec.char_range(), 0..5);
    }

    #[test]
    fn test_table_accessors() {
        let table = sample_table();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.table_name_column(), "table_name");
        assert_eq!(table.get(0, "GRANTEE"), Some("SPRINGFIELD"));
        assert_eq!(table.get(1, "AMOUNT"), Some(""));
        assert_eq!(table.get(2, "AMOUNT"), None);
        assert_eq!(table.get(0, "MISSING"), None);

        assert_eq!(table.get(0, "table_name"), Some("activity_report"));
    }

    #[test]
    fn test_output_stem_falls_back_to_file_name() {
        let mut table = sample_table();
        assert_eq!(table.output_stem(), "activity_report");

        table.table_name.clear();
        assert_eq!(table.output_stem(), "activity");
    }

    #[test]
    fn test_output_stem_is_one_path_component() {
        let mut table = sample_table();
        table.table_name = "cdbg/home_summary".to_string();
        assert_eq!(table.output_stem(), "cdbg_home_summary");

        table.table_name = r"..\..\etc".to_string();
        assert_eq!(table.output_stem(), ".._.._etc");

        table.table_name = "..".to_string();
        assert_eq!(table.output_stem(), "activity");
    }

    #[test]
    fn test_to_dataframe_all_strings() {
        let df = sample_table().to_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 3));
        for column in df.get_columns() {
            assert_eq!(column.dtype(), &polars::prelude::DataType::String);
        }
    }
}
