//! Table output module.
//!
//! Serializes parsed tables to CSV or Parquet in a flat output directory,
//! naming each file after the table it holds.

use crate::config::{CollisionPolicy, CompressionAlgorithm, OutputFormat};
use crate::error::{IdisError, Result};
use crate::models::ParsedTable;

use polars::prelude::{CsvWriter, DataFrame, ParquetWriter, SerWriter};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes tables into one output directory
#[derive(Debug)]
pub struct TableWriter {
    output_dir: PathBuf,
    format: OutputFormat,
    compression: CompressionAlgorithm,
    collisions: CollisionPolicy,
    written: HashSet<PathBuf>,
}

impl TableWriter {
    pub fn new(output_dir: PathBuf, format: OutputFormat) -> Self {
        Self {
            output_dir,
            format,
            compression: CompressionAlgorithm::Snappy,
            collisions: CollisionPolicy::Overwrite,
            written: HashSet::new(),
        }
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_collisions(mut self, collisions: CollisionPolicy) -> Self {
        self.collisions = collisions;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a table and return the path of the new file
    pub fn write(&mut self, table: &ParsedTable) -> Result<PathBuf> {
        let path = self.resolve_output_path(&table.output_stem())?;
        let mut df = table.to_dataframe()?;

        match self.format {
            OutputFormat::Csv => self.write_csv(&path, &mut df)?,
            OutputFormat::Parquet => self.write_parquet(&path, &mut df)?,
        }

        debug!(
            "Wrote {} rows x {} columns to {}",
            df.height(),
            df.width(),
            path.display()
        );
        self.written.insert(path.clone());
        Ok(path)
    }

    /// Pick the output path for `stem`, applying the collision policy
    fn resolve_output_path(&self, stem: &str) -> Result<PathBuf> {
        let extension = self.format.extension();
        let path = self.output_dir.join(format!("{}.{}", stem, extension));
        if !self.written.contains(&path) {
            return Ok(path);
        }

        match self.collisions {
            CollisionPolicy::Overwrite => {
                warn!(
                    "{} was already written during this run, overwriting",
                    path.display()
                );
                Ok(path)
            }
            CollisionPolicy::Error => Err(IdisError::DuplicateOutput { path }),
            CollisionPolicy::Suffix => {
                let mut suffix = 1;
                loop {
                    let candidate = self
                        .output_dir
                        .join(format!("{}_{}.{}", stem, suffix, extension));
                    if !self.written.contains(&candidate) {
                        return Ok(candidate);
                    }
                    suffix += 1;
                }
            }
        }
    }

    fn write_csv(&self, path: &Path, df: &mut DataFrame) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(df)?;
        file.flush()?;
        Ok(())
    }

    fn write_parquet(&self, path: &Path, df: &mut DataFrame) -> Result<()> {
        let file = File::create(path)?;
        ParquetWriter::new(file)
            .with_compression(self.compression.to_polars_compression())
            .finish(df)?;
        Ok(())
    }
}
