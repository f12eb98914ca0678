//! Data row extraction for IDIS exports.
//!
//! Slices every line after the layout block by the column specifications
//! and appends the derived table name to each row.

use crate::config::{EmptyTablePolicy, ExtractorConfig, ShortLinePolicy};
use crate::error::{IdisError, Result};
use crate::models::{ColumnSpec, Layout, NameRegistry, ParsedTable};
use crate::reader::FixedWidthReader;
use std::io::BufRead;
use tracing::{debug, warn};

/// Read the remaining lines of `reader` as data rows
pub fn parse_data_rows<R: BufRead>(
    reader: &mut FixedWidthReader<R>,
    layout: &Layout,
    config: &ExtractorConfig,
) -> Result<ParsedTable> {
    let mut names = NameRegistry::new();
    let mut columns: Vec<String> = layout
        .columns
        .iter()
        .map(|spec| names.claim(&spec.name))
        .collect();
    let table_name_column = names.claim(&config.table_name_column);
    if table_name_column != config.table_name_column {
        warn!(
            "Layout of {} already has a '{}' column, table name stored as '{}'",
            reader.path().display(),
            config.table_name_column,
            table_name_column
        );
    }
    columns.push(table_name_column);

    let mut rows = Vec::new();
    let mut short_cells = 0usize;
    while let Some(line) = reader.next_line()? {
        if line.trim().is_empty() {
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut row = Vec::with_capacity(columns.len());
        for spec in &layout.columns {
            if chars.len() < spec.end {
                short_cells += 1;
            }
            row.push(slice_cell(&chars, spec, config));
        }
        row.push(layout.table_name.clone());
        rows.push(row);
    }

    if short_cells > 0 {
        debug!(
            "{}: {} cells extended past the end of their line",
            reader.path().display(),
            short_cells
        );
    }

    if rows.is_empty() && config.empty_tables == EmptyTablePolicy::Reject {
        return Err(IdisError::TruncatedFile {
            path: reader.path().to_path_buf(),
        });
    }

    Ok(ParsedTable {
        source: reader.path().to_path_buf(),
        table_name: layout.table_name.clone(),
        columns,
        rows,
    })
}

/// Extract one cell from a line already split into characters
fn slice_cell(chars: &[char], spec: &ColumnSpec, config: &ExtractorConfig) -> String {
    let range = spec.char_range();
    let cell: String = if chars.len() >= range.end {
        chars[range].iter().collect()
    } else {
        match config.short_lines {
            ShortLinePolicy::Empty => String::new(),
            ShortLinePolicy::Partial if chars.len() > range.start => {
                chars[range.start..].iter().collect()
            }
            ShortLinePolicy::Partial => String::new(),
        }
    };

    if config.trim_cells {
        cell.trim().to_string()
    } else {
        cell
    }
}
