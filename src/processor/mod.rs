//! Batch conversion of IDIS export trees.
//!
//! Walks an input tree, expanding zip archives in place, and converts every
//! fixed-width export it finds into one table file in a flat output
//! directory. A failure in one entry is reported and the walk moves on.

pub mod archive;
pub mod discovery;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::discovery::EntryKind;
use self::writer::TableWriter;

use crate::config::{ExtractorConfig, OutputFormat};
use crate::error::{IdisError, Result};
use crate::models::ConversionStats;
use crate::reader::parse_file;
use crate::report::{ConversionEvent, Reporter, TracingReporter};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert every export under `input` into `output` with default settings
pub fn convert_tree(input: &Path, output: &Path, format: OutputFormat) -> Result<ConversionStats> {
    let config = ExtractorConfig::default().with_format(format);
    TreeConverter::new(output.to_path_buf(), config, TracingReporter).convert(input)
}

/// Recursive converter holding the output writer and event reporter
#[derive(Debug)]
pub struct TreeConverter<R: Reporter> {
    config: ExtractorConfig,
    writer: TableWriter,
    reporter: R,
    stats: ConversionStats,
    /// Canonical output directory, set once the directory exists
    output_root: Option<PathBuf>,
}

impl<R: Reporter> TreeConverter<R> {
    pub fn new(output_dir: PathBuf, config: ExtractorConfig, reporter: R) -> Self {
        let writer = TableWriter::new(output_dir, config.format)
            .with_compression(config.compression)
            .with_collisions(config.output_collisions);
        Self {
            config,
            writer,
            reporter,
            stats: ConversionStats::default(),
            output_root: None,
        }
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Give back the reporter, e.g. to inspect recorded events
    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Convert everything under `input`.
    ///
    /// Only a missing root, an invalid configuration or an unusable output
    /// directory fail the call; everything below the root is handled entry
    /// by entry.
    pub fn convert(&mut self, input: &Path) -> Result<ConversionStats> {
        if !input.exists() {
            return Err(IdisError::PathNotFound {
                path: input.to_path_buf(),
            });
        }
        self.config.validate()?;
        fs::create_dir_all(self.writer.output_dir())?;
        self.output_root = Some(fs::canonicalize(self.writer.output_dir())?);

        let start_time = Instant::now();
        info!(
            "Converting {} into {} ({})",
            input.display(),
            self.writer.output_dir().display(),
            self.writer.format()
        );

        match EntryKind::classify(input, self.config.text_extension())? {
            EntryKind::Directory => self.walk_directory(input)?,
            _ => self.visit(input),
        }

        let mut stats = std::mem::take(&mut self.stats);
        stats.processing_time_ms = start_time.elapsed().as_millis();
        info!(
            "Finished: {} converted, {} failed, {} skipped, {} archives extracted",
            stats.files_converted, stats.files_failed, stats.files_skipped, stats.archives_extracted
        );
        Ok(stats)
    }

    fn walk_directory(&mut self, dir: &Path) -> Result<()> {
        debug!("Entering {}", dir.display());
        let entries = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;

        for path in entries {
            if self.is_output_dir(&path) {
                debug!("Skipping output directory {}", path.display());
                continue;
            }
            self.visit(&path);
        }
        Ok(())
    }

    /// Whether `path` is the output directory nested inside the input tree
    fn is_output_dir(&self, path: &Path) -> bool {
        match (&self.output_root, path.is_dir()) {
            (Some(root), true) => fs::canonicalize(path).is_ok_and(|p| &p == root),
            _ => false,
        }
    }

    /// Handle one entry; errors are reported, never returned
    fn visit(&mut self, path: &Path) {
        let kind = match EntryKind::classify(path, self.config.text_extension()) {
            Ok(kind) => kind,
            Err(e) => return self.fail(path, &e),
        };

        match kind {
            EntryKind::TextFile => match self.convert_file(path) {
                Ok((output, rows)) => {
                    self.stats.files_converted += 1;
                    self.stats.total_rows += rows;
                    self.stats.outputs.push(output.clone());
                    self.reporter.report(&ConversionEvent::Converted {
                        source: path.to_path_buf(),
                        output,
                        rows,
                    });
                }
                Err(e) => self.fail(path, &e),
            },
            EntryKind::Archive => match archive::extract_and_remove(path) {
                Ok(directory) => {
                    self.stats.archives_extracted += 1;
                    self.reporter.report(&ConversionEvent::Extracted {
                        archive: path.to_path_buf(),
                        directory: directory.clone(),
                    });
                    if let Err(e) = self.walk_directory(&directory) {
                        self.fail(&directory, &e);
                    }
                }
                Err(e) => self.fail(path, &e),
            },
            EntryKind::Directory => {
                if let Err(e) = self.walk_directory(path) {
                    self.fail(path, &e);
                }
            }
            EntryKind::Other => {
                self.stats.files_skipped += 1;
                self.reporter.report(&ConversionEvent::Skipped {
                    path: path.to_path_buf(),
                });
            }
        }
    }

    fn convert_file(&mut self, path: &Path) -> Result<(PathBuf, usize)> {
        let mut table = parse_file(path, &self.config)?;
        if self.config.sanitize_column_names {
            table.sanitize_column_names();
        }
        let output = self.writer.write(&table)?;
        Ok((output, table.row_count()))
    }

    fn fail(&mut self, path: &Path, error: &IdisError) {
        self.stats.files_failed += 1;
        self.reporter.report(&ConversionEvent::Failed {
            path: path.to_path_buf(),
            reason: error.to_string(),
        });
    }
}
