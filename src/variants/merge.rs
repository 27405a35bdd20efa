//! Merging of the keyed score and count tables into variant records.

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::err::IngestError;

use super::checks::KeyedTable;
use super::rows::ParsedRow;
use super::{DatasetColumns, IdentifierRole, Table, VariantData, VariantRecord};

/// Values of `row` by column, all null without a row.
fn variant_data(columns: &[String], row: Option<&ParsedRow>) -> VariantData {
    match row {
        Some(row) => columns
            .iter()
            .cloned()
            .zip(row.values.iter().copied())
            .collect(),
        None => columns.iter().map(|column| (column.clone(), None)).collect(),
    }
}

/// Merge `scores` and `counts` over the identifiers in `union`.
///
/// An identifier missing from one table gets null values for each of that
/// table's columns.  Without count data `count_data` stays empty.  Identifier
/// fields are taken from the score data and then the count data.
pub fn merge(
    scores: &KeyedTable,
    counts: Option<&KeyedTable>,
    union: &IndexSet<String>,
) -> IndexMap<String, VariantRecord> {
    let mut records = IndexMap::with_capacity(union.len());
    let mut filled = 0usize;

    for identifier in union {
        let score_row = scores.rows.get(identifier);
        let count_row = counts.and_then(|counts| counts.rows.get(identifier));
        if score_row.is_none() || (counts.is_some() && count_row.is_none()) {
            filled += 1;
        }

        let lookup = |role: IdentifierRole| {
            score_row
                .and_then(|row| row.identifier(role))
                .or_else(|| count_row.and_then(|row| row.identifier(role)))
                .map(str::to_owned)
        };

        let record = VariantRecord {
            hgvs_nt: lookup(IdentifierRole::Nucleotide),
            hgvs_tx: lookup(IdentifierRole::Transcript),
            hgvs_pro: lookup(IdentifierRole::Protein),
            score_data: variant_data(&scores.columns, score_row),
            count_data: counts
                .map(|counts| variant_data(&counts.columns, count_row))
                .unwrap_or_default(),
        };
        records.insert(identifier.clone(), record);
    }

    tracing::debug!(
        "merged {} records, {} of them null-filled",
        records.len(),
        filled
    );
    records
}

/// Fail unless the data keys of `record` equal the finalized `columns`.
pub fn validate_record_columns(
    identifier: &str,
    record: &VariantRecord,
    columns: &DatasetColumns,
) -> Result<(), IngestError> {
    let sides = [
        (Table::Scores, &record.score_data, &columns.score_columns),
        (Table::Counts, &record.count_data, &columns.count_columns),
    ];
    for (table, data, expected) in sides {
        if !data.keys().eq(expected.iter()) {
            return Err(IngestError::schema(
                table,
                format!(
                    "variant {identifier} has columns [{}] instead of [{}]",
                    data.keys().join(", "),
                    expected.join(", ")
                ),
            ));
        }
    }
    if IdentifierRole::iter().all(|role| record.identifier(role).is_none()) {
        return Err(IngestError::schema(
            Table::Scores,
            format!("variant {identifier} has no identifier"),
        ));
    }
    Ok(())
}
