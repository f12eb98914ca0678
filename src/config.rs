//! Configuration management for fixed-width extraction.
//!
//! Provides the extractor settings, the policies that resolve ambiguous
//! inputs (short lines, empty tables, output name collisions) and YAML
//! config file loading.

use crate::error::{IdisError, Result};
use clap::ValueEnum;
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Config file looked up relative to the working directory
pub const LOCAL_CONFIG_PATH: &str = "config/config.yaml";

/// Application directory under the user's config dir
pub const APP_CONFIG_DIR: &str = "idis-processor";

/// Output table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated text with a header row
    Csv,
    /// Apache Parquet, every column typed as string
    Parquet,
}

impl OutputFormat {
    /// File extension used for output files
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = IdisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            _ => Err(IdisError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    #[serde(alias = "uncompressed")]
    None,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::None => ParquetCompression::Uncompressed,
        }
    }
}

/// What to do with a data line that ends before a column does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortLinePolicy {
    /// Any column extending past the end of the line is empty
    Empty,
    /// Keep the characters the line does have for that column
    Partial,
}

/// What to do with a file whose layout block is followed by no data rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyTablePolicy {
    /// Fail the file with a truncated file error
    Reject,
    /// Write a header-only table
    Accept,
}

/// What to do when two inputs derive the same output file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Replace the earlier output (logged as a warning)
    Overwrite,
    /// Append `_1`, `_2`, ... to the file stem until the name is free
    Suffix,
    /// Fail the later file
    Error,
}

/// Settings for parsing IDIS exports and writing tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Output table format
    pub format: OutputFormat,

    /// Parquet compression (ignored for CSV)
    pub compression: CompressionAlgorithm,

    /// Extension identifying fixed-width inputs, compared case-insensitively
    pub text_extension: String,

    /// Name of the column holding the derived table name
    pub table_name_column: String,

    /// Strip padding around every cell
    pub trim_cells: bool,

    pub short_lines: ShortLinePolicy,

    pub empty_tables: EmptyTablePolicy,

    pub output_collisions: CollisionPolicy,

    /// Rewrite special characters in column names for warehouse loads
    pub sanitize_column_names: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            compression: CompressionAlgorithm::Snappy,
            text_extension: "txt".to_string(),
            table_name_column: "table_name".to_string(),
            trim_cells: true,
            short_lines: ShortLinePolicy::Empty,
            empty_tables: EmptyTablePolicy::Reject,
            output_collisions: CollisionPolicy::Overwrite,
            sanitize_column_names: false,
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from a YAML file.
    ///
    /// Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| IdisError::Configuration {
            message: format!("cannot open {}: {}", path.display(), e),
        })?;
        let config: Self =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|e| IdisError::Configuration {
                message: format!("invalid config {}: {}", path.display(), e),
            })?;
        config.validate()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the configuration file to use.
    ///
    /// An explicit path must exist. Otherwise `config/config.yaml` in the
    /// working directory, then the user config directory, are tried before
    /// falling back to defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(IdisError::Configuration {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            return Self::load(path);
        }

        match Self::candidate_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_PATH)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(APP_CONFIG_DIR).join("config.yaml"));
        }
        paths
    }

    /// Reject settings that cannot produce usable output
    pub fn validate(&self) -> Result<()> {
        if self.text_extension.trim_start_matches('.').is_empty() {
            return Err(IdisError::Configuration {
                message: "text_extension must not be empty".to_string(),
            });
        }
        if self.table_name_column.trim().is_empty() {
            return Err(IdisError::Configuration {
                message: "table_name_column must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Extension without a leading dot
    pub fn text_extension(&self) -> &str {
        self.text_extension.trim_start_matches('.')
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_short_lines(mut self, policy: ShortLinePolicy) -> Self {
        self.short_lines = policy;
        self
    }

    pub fn with_empty_tables(mut self, policy: EmptyTablePolicy) -> Self {
        self.empty_tables = policy;
        self
    }

    pub fn with_output_collisions(mut self, policy: CollisionPolicy) -> Self {
        self.output_collisions = policy;
        self
    }

    /// Keep cell padding instead of trimming it
    pub fn without_trimming(mut self) -> Self {
        self.trim_cells = false;
        self
    }

    pub fn with_sanitized_column_names(mut self) -> Self {
        self.sanitize_column_names = true;
        self
    }
}
