//! Column name sanitizing for warehouse loads.
//!
//! Layout names such as `PCT%` or `AMT$` are legal in CSV and Parquet but
//! are rejected by most warehouses. Special characters are spelled out as
//! words and joined with underscores. Underscores are already legal and
//! are kept rather than spelled out as `underscore`.

use crate::models::{NameRegistry, ParsedTable};
use tracing::debug;

/// Word used in place of a special character, `None` if it is kept as is
fn replacement(c: char) -> Option<&'static str> {
    let word = match c {
        '%' => "percent",
        '$' => "dollars",
        '#' => "hash",
        '@' => "at",
        '&' => "and",
        '+' => "plus",
        '-' => "minus",
        '*' => "asterisk",
        '/' => "slash",
        '\\' => "backslash",
        '=' => "equals",
        ':' => "colon",
        ';' => "semicolon",
        '<' => "less_than",
        '>' => "greater_than",
        '(' => "left_parenthesis",
        ')' => "right_parenthesis",
        '[' => "left_bracket",
        ']' => "right_bracket",
        '{' => "left_curly_brace",
        '}' => "right_curly_brace",
        '"' => "double_quote",
        '\'' => "single_quote",
        '`' => "backtick",
        '~' => "tilde",
        '!' => "exclamation",
        '?' => "question",
        ',' => "comma",
        '.' => "period",
        '|' => "pipe",
        '^' => "caret",
        _ => return None,
    };
    Some(word)
}

/// Spell out special characters and join the pieces with `_`.
///
/// `PCT%COMPLETE` becomes `PCT_percent_COMPLETE`.
pub fn sanitize_column_name(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len());
    for c in name.chars() {
        match replacement(c) {
            Some(word) => {
                spaced.push(' ');
                spaced.push_str(word);
                spaced.push(' ');
            }
            None if c.is_whitespace() => spaced.push(' '),
            None => spaced.push(c),
        }
    }
    spaced.split_whitespace().collect::<Vec<_>>().join("_")
}

impl ParsedTable {
    /// Rewrite the layout column names in place.
    ///
    /// Sanitized names are deduplicated again; the table-name column keeps
    /// its name unless a sanitized layout column now shadows it.
    pub fn sanitize_column_names(&mut self) {
        let Some((table_column, layout_columns)) = self.columns.split_last() else {
            return;
        };

        let mut names = NameRegistry::new();
        let mut renamed: Vec<String> = layout_columns
            .iter()
            .map(|name| names.claim(&sanitize_column_name(name)))
            .collect();
        renamed.push(names.claim(table_column));

        for (old, new) in self.columns.iter().zip(&renamed) {
            if old != new {
                debug!("Renamed column '{}' to '{}'", old, new);
            }
        }
        self.columns = renamed;
    }
}
