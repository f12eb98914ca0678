//! Integration tests for the fixed-width parser and tree conversion
//!
//! These tests drive the public API end to end against export files
//! written to temporary directories.

use idis_processor::config::{ExtractorConfig, OutputFormat};
use idis_processor::processor::TreeConverter;
use idis_processor::report::RecordingReporter;
use idis_processor::{
    FixedWidthReader, IdisError, convert_tree, parse_data_rows, parse_file,
    parse_layout_and_header,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// A PR-style export with repeated column names and a declared type column
const GRANTEE_EXPORT: &str = "\
HUD IDIS ONLINE                                   RUN DATE: 01/15/2024
*** CDBG  FINANCIAL SUMMARY ***
-----------------------------------------------------------------
FOR PROGRAM YEAR 2023*
-----------------------------------------------------------------
1-6      GRANTEE_ID    CHAR
7-26     NAME          CHAR
27-34    AMOUNT        NUM
35-42    AMOUNT        NUM
43-44    ST            CHAR

B12345SPRINGFIELD         00012000000045.5IL
B23456SHELBYVILLE         00000100        IN
";

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Parse a realistic export in two explicit steps
#[test]
fn test_two_step_parse() {
    let mut reader = FixedWidthReader::new(GRANTEE_EXPORT.as_bytes(), "pr26.txt");

    let layout = parse_layout_and_header(&mut reader).unwrap();
    assert_eq!(
        layout.table_name,
        "cdbg_financial_summary_for_program_year_2023"
    );
    let names: Vec<_> = layout.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["GRANTEE_ID", "NAME", "AMOUNT", "AMOUNT_1", "ST"]);

    let table = parse_data_rows(&mut reader, &layout, &ExtractorConfig::default()).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.get(0, "GRANTEE_ID"), Some("B12345"));
    assert_eq!(table.get(0, "NAME"), Some("SPRINGFIELD"));
    assert_eq!(table.get(0, "AMOUNT"), Some("00012000"));
    assert_eq!(table.get(0, "AMOUNT_1"), Some("000045.5"));
    assert_eq!(table.get(0, "ST"), Some("IL"));
    assert_eq!(table.get(1, "AMOUNT_1"), Some(""));
    assert_eq!(table.get(1, "ST"), Some("IN"));
    assert_eq!(
        table.get(1, "table_name"),
        Some("cdbg_financial_summary_for_program_year_2023")
    );
}

/// The same file parsed from disk in one call
#[test]
fn test_parse_file_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("PR26.TXT");
    fs::write(&path, GRANTEE_EXPORT).unwrap();

    let table = parse_file(&path, &ExtractorConfig::default()).unwrap();
    assert_eq!(table.source, path);
    assert_eq!(table.columns.len(), 6);
    assert_eq!(table.table_name_column(), "table_name");
}

#[test]
fn test_convert_zipped_tree_to_parquet() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("downloads");
    let output = temp_dir.path().join("warehouse");
    fs::create_dir_all(input.join("2024")).unwrap();
    write_zip(
        &input.join("2024").join("idis_batch.zip"),
        &[("PR26.txt", GRANTEE_EXPORT), ("manifest.xml", "<files/>")],
    );

    let stats = convert_tree(&input, &output, OutputFormat::Parquet).unwrap();

    assert_eq!(stats.files_converted, 1);
    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.archives_extracted, 1);
    assert_eq!(stats.total_rows, 2);
    assert!(!input.join("2024").join("idis_batch.zip").exists());
    assert!(
        output
            .join("cdbg_financial_summary_for_program_year_2023.parquet")
            .exists()
    );
}

#[test]
fn test_missing_root_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let mut converter = TreeConverter::new(
        temp_dir.path().join("out"),
        ExtractorConfig::default(),
        RecordingReporter::default(),
    );

    let result = converter.convert(&temp_dir.path().join("missing"));
    assert!(matches!(result, Err(IdisError::PathNotFound { .. })));
    assert!(converter.into_reporter().events.is_empty());
}
