//! Parsing of data rows and the coercion of their cells.

use std::io::Read;

use enum_map::EnumMap;

use crate::err::IngestError;

use super::conf::NullTokens;
use super::schema::HeaderLayout;
use super::{IdentifierRole, Table};

/// Outcome of coercing a single data cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// A finite number.
    Numeric(f64),
    /// A null token, or a non-finite number.
    Null,
    /// Neither a number nor a null token; the raw text is kept.
    Unparseable(String),
}

/// Coerce the cell `value` into a number, a null value or raw text.
pub fn coerce(value: &str, null_tokens: &NullTokens) -> Coerced {
    let value = value.trim();
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Coerced::Numeric(number),
        Ok(_) => Coerced::Null,
        Err(_) if null_tokens.is_null(value) => Coerced::Null,
        Err(_) => Coerced::Unparseable(value.to_owned()),
    }
}

/// A data row after coercion, before the numeric check.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedRow {
    /// 1-based line of the row in the input.
    pub line: usize,
    /// Trimmed identifier cells, `None` for absent columns and null tokens.
    pub identifiers: EnumMap<IdentifierRole, Option<String>>,
    /// Data cells in the order of `HeaderLayout::data_columns`.
    pub cells: Vec<Coerced>,
}

/// All coerced rows of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedTable {
    pub table: Table,
    pub layout: HeaderLayout,
    pub rows: Vec<CoercedRow>,
}

/// A data row with numeric values only.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// 1-based line of the row in the input.
    pub line: usize,
    /// Identifier cells, see `CoercedRow::identifiers`.
    pub identifiers: EnumMap<IdentifierRole, Option<String>>,
    /// Values in the order of `HeaderLayout::data_columns`.
    pub values: Vec<Option<f64>>,
}

impl ParsedRow {
    /// Identifier for `role`, if any.
    pub fn identifier(&self, role: IdentifierRole) -> Option<&str> {
        self.identifiers[role].as_deref()
    }

    /// Whether all cells, identifiers included, are null.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
            && self.identifiers.values().all(Option::is_none)
    }
}

/// All parsed rows of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub table: Table,
    pub layout: HeaderLayout,
    pub rows: Vec<ParsedRow>,
}

/// Parse all rows after the header from `stream`.
///
/// Fields are split honoring double quotes so that multi-variants may contain
/// commas.  Blank lines are skipped, rows whose field count differs from the
/// header fail with a `RowShape` error.
pub fn parse_rows<R: Read>(
    stream: R,
    layout: HeaderLayout,
    null_tokens: &NullTokens,
) -> Result<CoercedTable, IngestError> {
    let table = layout.table;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quote(b'"')
        .from_reader(stream);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(idx + 2);

        if record.len() == 1 && record[0].trim().is_empty() {
            tracing::trace!("{} data: skipping blank line {}", table, line);
            continue;
        }
        if record.len() != layout.header.len() {
            return Err(IngestError::RowShape {
                table,
                row: line,
                found: record.len(),
                expected: layout.header.len(),
            });
        }

        let identifiers = EnumMap::from_fn(|role| {
            layout.identifiers[role].and_then(|idx| {
                let value = record[idx].trim();
                (!null_tokens.is_null(value)).then(|| value.to_owned())
            })
        });
        let cells = layout
            .data_columns
            .iter()
            .map(|(idx, _)| coerce(&record[*idx], null_tokens))
            .collect();

        rows.push(CoercedRow {
            line,
            identifiers,
            cells,
        });
    }

    tracing::debug!("{} data: parsed {} rows", table, rows.len());
    Ok(CoercedTable {
        table,
        layout,
        rows,
    })
}

/// Remove rows without any identifier or value, returning the number removed.
///
/// A row that has an identifier but only null values is kept and yields a
/// variant with null data.
pub fn drop_empty_rows(table: &mut ParsedTable) -> usize {
    let before = table.rows.len();
    table.rows.retain(|row| !row.is_empty());
    let dropped = before - table.rows.len();
    if dropped > 0 {
        tracing::debug!(
            "{} data: dropped {} rows without identifiers and values",
            table.table,
            dropped
        );
    }
    dropped
}
