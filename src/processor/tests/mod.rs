//! Integration tests for the processor module
//!
//! Tests the tree conversion pipeline against small export trees built in
//! temporary directories.


use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;

/// A complete export with a two-line title and three columns
pub fn export_text(title: &str, subtitle: &str, rows: &[&str]) -> String {
    let mut text = format!(
        "U.S. DEPARTMENT OF HOUSING AND URBAN DEVELOPMENT\n\
         {}\n\
         IDIS EXPORT\n\
         {}\n\
         ------------------------------------------\n\
         1-5     GRANTEE   CHAR\n\
         6-15    CITY      CHAR\n\
         16-23   AMOUNT    NUM\n\
         \n",
        title, subtitle
    );
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

pub fn write_export(path: &Path, title: &str, subtitle: &str, rows: &[&str]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, export_text(title, subtitle, rows)).unwrap();
}

pub fn write_zip(path: &Path, entries: &[(&str, String)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Sorted file names in a directory
pub fn list_outputs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
