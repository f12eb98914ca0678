//! IDIS Processor Library
//!
//! A Rust library for converting HUD IDIS fixed-width export files into
//! CSV or Apache Parquet tables.
//!
//! This library provides tools for:
//! - Parsing the layout header embedded in each export into column specifications
//! - Deriving table names from the export title lines
//! - Slicing data rows into all-text tables
//! - Walking export trees, expanding zip archives in place
//! - Writing one CSV or Parquet file per export into a flat output directory

pub mod cli;
pub mod config;
pub mod error;
pub mod header;
pub mod models;
pub mod processor;
pub mod reader;
pub mod records;
pub mod report;
pub mod sanitize;

// Re-export commonly used types
pub use config::{ExtractorConfig, OutputFormat};
pub use error::{IdisError, Result};
pub use header::{derive_table_name, parse_layout_and_header};
pub use models::{ColumnSpec, ConversionStats, Layout, ParsedTable};
pub use processor::{TreeConverter, convert_tree};
pub use reader::{FixedWidthReader, parse_file};
pub use records::parse_data_rows;
