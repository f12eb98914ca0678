//! Entry classification and read-only tree scanning.
//!
//! Every filesystem entry is classified once into an `EntryKind` and the
//! walkers dispatch on that value.

use super::archive::{entry_names, is_zip_archive};
use crate::error::{IdisError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// What a filesystem entry is, as far as conversion is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Fixed-width export, identified by extension
    TextFile,
    /// Zip archive, identified by signature
    Archive,
    Directory,
    /// Anything else; reported and skipped
    Other,
}

impl EntryKind {
    /// Classify `path`, following symlinks
    pub fn classify(path: &Path, text_extension: &str) -> Result<Self> {
        let metadata = fs::metadata(path)?;
        if metadata.is_dir() {
            return Ok(EntryKind::Directory);
        }
        if !metadata.is_file() {
            return Ok(EntryKind::Other);
        }
        if has_extension(path, text_extension) {
            return Ok(EntryKind::TextFile);
        }
        if is_zip_archive(path)? {
            return Ok(EntryKind::Archive);
        }
        Ok(EntryKind::Other)
    }
}

/// Case-insensitive extension check
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// An archive found by a scan, with the text files it contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub text_entries: usize,
}

/// What a conversion of the same tree would touch
#[derive(Debug, Default)]
pub struct ScanReport {
    pub text_files: Vec<PathBuf>,
    pub archives: Vec<ArchiveSummary>,
    pub skipped: Vec<PathBuf>,
    /// Archives that could not be listed
    pub unreadable: Vec<(PathBuf, String)>,
}

impl ScanReport {
    /// Text files on disk plus text entries inside archives
    pub fn convertible_files(&self) -> usize {
        self.text_files.len() + self.archives.iter().map(|a| a.text_entries).sum::<usize>()
    }
}

/// Walk a tree without extracting or writing anything.
///
/// Archives are listed but not opened recursively, so text files inside
/// archives nested in archives are not counted.
pub fn scan_tree(input: &Path, text_extension: &str) -> Result<ScanReport> {
    if !input.exists() {
        return Err(IdisError::PathNotFound {
            path: input.to_path_buf(),
        });
    }

    let mut report = ScanReport::default();
    for entry in WalkDir::new(input).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();

        match EntryKind::classify(path, text_extension)? {
            EntryKind::Directory => {}
            EntryKind::TextFile => report.text_files.push(path.to_path_buf()),
            EntryKind::Archive => match entry_names(path) {
                Ok(names) => {
                    let text_entries = names
                        .iter()
                        .filter(|name| has_extension(Path::new(name), text_extension))
                        .count();
                    report.archives.push(ArchiveSummary {
                        path: path.to_path_buf(),
                        text_entries,
                    });
                }
                Err(e) => report.unreadable.push((path.to_path_buf(), e.to_string())),
            },
            EntryKind::Other => report.skipped.push(path.to_path_buf()),
        }
    }

    debug!(
        "Scanned {}: {} text files, {} archives, {} skipped",
        input.display(),
        report.text_files.len(),
        report.archives.len(),
        report.skipped.len()
    );
    Ok(report)
}
