//! Line reader for IDIS fixed-width exports.
//!
//! Wraps a buffered source with the file path and a running line number
//! so layout and row parsing can report where a file went wrong.

use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::header::parse_layout_and_header;
use crate::models::ParsedTable;
use crate::records::parse_data_rows;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sequential line source over one export file
#[derive(Debug)]
pub struct FixedWidthReader<R> {
    inner: R,
    path: PathBuf,
    line_number: usize,
    buf: Vec<u8>,
}

impl FixedWidthReader<BufReader<File>> {
    /// Open a file for reading from its first line
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> FixedWidthReader<R> {
    pub fn new(inner: R, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Path used in error messages
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1-based number of the last line returned
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next line without its terminator, or `None` at end of file.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        if self.inner.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

/// Parse a complete export file into a table.
///
/// The file handle is released when this returns, on success or error.
pub fn parse_file(path: &Path, config: &ExtractorConfig) -> Result<ParsedTable> {
    let mut reader = FixedWidthReader::open(path)?;
    let layout = parse_layout_and_header(&mut reader)?;
    debug!(
        "Layout for {}: table '{}', {} columns",
        path.display(),
        layout.table_name,
        layout.columns.len()
    );
    parse_data_rows(&mut reader, &layout, config)
}
