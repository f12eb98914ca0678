//! IDIS header and layout block parsing.
//!
//! An export starts with five header lines (lines 2 and 4 carry the report
//! title) followed by one layout line per column, e.g.
//!
//! ```text
//! 1-10    GRANTEE_ID   CHAR
//! 11-40   NAME         CHAR
//! ```
//!
//! The layout block ends at the first blank line.

use crate::error::{IdisError, Result};
use crate::models::{ColumnSpec, Layout, NameRegistry};
use crate::reader::FixedWidthReader;
use regex::Regex;
use std::io::BufRead;
use std::sync::LazyLock;

/// Header lines preceding the layout block
const HEADER_LINES: usize = 5;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Read the header and layout block, leaving the reader at the first data line
pub fn parse_layout_and_header<R: BufRead>(reader: &mut FixedWidthReader<R>) -> Result<Layout> {
    let mut header = Vec::with_capacity(HEADER_LINES);
    for _ in 0..HEADER_LINES {
        match reader.next_line()? {
            Some(line) => header.push(line),
            None => {
                return Err(IdisError::malformed(
                    reader.path(),
                    reader.line_number(),
                    format!(
                        "header ended after {} of {} lines",
                        header.len(),
                        HEADER_LINES
                    ),
                ));
            }
        }
    }
    let table_name = derive_table_name(&header[1], &header[3]);

    let mut names = NameRegistry::new();
    let mut columns = Vec::new();
    while let Some(line) = reader.next_line()? {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let (start, end, name) = parse_layout_line(line)
            .map_err(|reason| IdisError::malformed(reader.path(), reader.line_number(), reason))?;
        columns.push(ColumnSpec {
            start,
            end,
            name: names.claim(name),
        });
    }

    if columns.is_empty() {
        return Err(IdisError::malformed(
            reader.path(),
            reader.line_number(),
            "no layout lines found",
        ));
    }

    Ok(Layout {
        table_name,
        columns,
    })
}

/// Build a table name from the two title fragments.
///
/// `"*ABC  DEF*"` and `"GHI*"` become `abc_def_ghi`.
pub fn derive_table_name(first: &str, second: &str) -> String {
    let joined = format!("{} {}", first, second).replace('*', "");
    WHITESPACE_RUN
        .replace_all(&joined, " ")
        .trim()
        .replace(' ', "_")
        .to_lowercase()
}

/// Split a layout line into its range and name; trailing tokens are ignored
fn parse_layout_line(line: &str) -> std::result::Result<(usize, usize, &str), String> {
    let mut tokens = line.split_whitespace();
    let range = tokens.next().unwrap_or_default();
    let name = tokens
        .next()
        .ok_or_else(|| format!("layout line '{}' has no column name", line))?;

    let (start, end) = range
        .split_once('-')
        .and_then(|(s, e)| Some((s.parse::<usize>().ok()?, e.parse::<usize>().ok()?)))
        .ok_or_else(|| format!("invalid position range '{}'", range))?;

    if start == 0 || start > end {
        return Err(format!(
            "position range '{}' must satisfy 1 <= start <= end",
            range
        ));
    }

    Ok((start, end, name))
}
