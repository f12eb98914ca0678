//! Zip archive detection and expansion.

use crate::error::{IdisError, Result};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// Local file header and empty-archive signatures
const ZIP_SIGNATURES: [[u8; 4]; 2] = [*b"PK\x03\x04", *b"PK\x05\x06"];

/// Check the leading bytes of a file for a zip signature
pub fn is_zip_archive(path: &Path) -> Result<bool> {
    let mut magic = [0u8; 4];
    let mut file = File::open(path)?;
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(ZIP_SIGNATURES.contains(&magic)),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Directory an archive expands into: a sibling named after its stem
pub fn extraction_dir(archive_path: &Path) -> PathBuf {
    let stem = archive_path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "archive".into());
    archive_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(stem)
}

/// Expand an archive next to itself, then delete it.
///
/// Entry paths inside the archive are preserved. The archive is only
/// removed after every entry was written.
pub fn extract_and_remove(archive_path: &Path) -> Result<PathBuf> {
    let target = extraction_dir(archive_path);

    {
        let file = File::open(archive_path)?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|source| IdisError::Archive {
                path: archive_path.to_path_buf(),
                source,
            })?;
        debug!(
            "Extracting {} entries from {} into {}",
            archive.len(),
            archive_path.display(),
            target.display()
        );
        archive
            .extract(&target)
            .map_err(|source| IdisError::Archive {
                path: archive_path.to_path_buf(),
                source,
            })?;
    }

    fs::remove_file(archive_path)?;
    Ok(target)
}

/// Names of entries inside an archive, without extracting anything
pub fn entry_names(archive_path: &Path) -> Result<Vec<String>> {
    let file = File::open(archive_path)?;
    let archive = ZipArchive::new(BufReader::new(file)).map_err(|source| IdisError::Archive {
        path: archive_path.to_path_buf(),
        source,
    })?;
    Ok(archive.file_names().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_detects_zip_signature() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("export.zip");
        write_zip(&zip_path, &[("a.txt", "hello")]);
        let text_path = temp_dir.path().join("notes.md");
        fs::write(&text_path, "PK but not really").unwrap();
        let tiny_path = temp_dir.path().join("tiny");
        fs::write(&tiny_path, "PK").unwrap();

        assert!(is_zip_archive(&zip_path).unwrap());
        assert!(!is_zip_archive(&text_path).unwrap());
        assert!(!is_zip_archive(&tiny_path).unwrap());
    }

    #[test]
    fn test_extraction_dir_is_sibling() {
        assert_eq!(
            extraction_dir(Path::new("/data/in/PR03_2024.zip")),
            PathBuf::from("/data/in/PR03_2024")
        );
    }

    #[test]
    fn test_extract_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("batch.zip");
        write_zip(
            &zip_path,
            &[("top.txt", "one"), ("nested/inner.txt", "two")],
        );

        let target = extract_and_remove(&zip_path).unwrap();

        assert_eq!(target, temp_dir.path().join("batch"));
        assert!(!zip_path.exists());
        assert_eq!(fs::read_to_string(target.join("top.txt")).unwrap(), "one");
        assert_eq!(
            fs::read_to_string(target.join("nested").join("inner.txt")).unwrap(),
            "two"
        );
    }

    #[test]
    fn test_corrupt_archive_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("broken.zip");
        fs::write(&zip_path, b"PK\x03\x04garbage").unwrap();

        let result = extract_and_remove(&zip_path);
        assert!(matches!(result, Err(IdisError::Archive { .. })));
        assert!(zip_path.exists());
    }

    #[test]
    fn test_entry_names() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("list.zip");
        write_zip(&zip_path, &[("a.txt", "1"), ("b.TXT", "2")]);

        let mut names = entry_names(&zip_path).unwrap();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.TXT"]);
        assert!(zip_path.exists());
    }
}
