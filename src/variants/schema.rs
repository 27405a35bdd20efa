//! Header level checks and the typed column layout of a table.

use enum_map::EnumMap;
use indexmap::IndexSet;
use itertools::Itertools;

use crate::err::IngestError;

use super::conf::ColumnNames;
use super::rows::{Coerced, CoercedTable, ParsedRow, ParsedTable};
use super::{IdentifierRole, Table};

/// Fail unless `header` contains at least one identifier column.
pub fn require_identifier_column(
    table: Table,
    header: &[String],
    columns: &ColumnNames,
) -> Result<(), IngestError> {
    if header.iter().any(|name| columns.role(name).is_some()) {
        Ok(())
    } else {
        Err(IngestError::schema(
            table,
            format!(
                "header is missing an HGVS column, expected one of {}",
                columns.all().iter().map(|c| format!("'{c}'")).join(", ")
            ),
        ))
    }
}

/// Fail if `header` consists of identifier columns only.
pub fn require_additional_column(
    table: Table,
    header: &[String],
    columns: &ColumnNames,
) -> Result<(), IngestError> {
    if header.iter().any(|name| columns.role(name).is_none()) {
        Ok(())
    } else {
        Err(IngestError::schema(
            table,
            "header must contain at least one column other than the HGVS columns",
        ))
    }
}

/// Fail if any column name is empty.
pub fn reject_blank_columns(table: Table, header: &[String]) -> Result<(), IngestError> {
    if let Some(pos) = header.iter().position(|name| name.trim().is_empty()) {
        Err(IngestError::schema(
            table,
            format!("column {} of the header has an empty name", pos + 1),
        ))
    } else {
        Ok(())
    }
}

/// Fail if a column name occurs more than once.
pub fn reject_duplicate_columns(table: Table, header: &[String]) -> Result<(), IngestError> {
    let mut seen = IndexSet::new();
    for name in header {
        if !seen.insert(name.as_str()) {
            return Err(IngestError::schema(
                table,
                format!("column '{name}' appears more than once in the header"),
            ));
        }
    }
    Ok(())
}

/// Fail if the score data does not provide `required`.
pub fn require_score_column(layout: &HeaderLayout, required: Option<&str>) -> Result<(), IngestError> {
    match required {
        Some(required) if !layout.data_columns.iter().any(|(_, c)| c == required) => {
            Err(IngestError::schema(
                layout.table,
                format!("missing the required column '{required}'"),
            ))
        }
        _ => Ok(()),
    }
}

/// Check every data cell of `table` for numbers and convert it into parsed rows.
///
/// The first cell that is neither numeric nor a null token fails the table with
/// a `NonNumericValue` error naming its row and column.
pub fn require_numeric_columns(table: CoercedTable) -> Result<ParsedTable, IngestError> {
    let CoercedTable {
        table: which,
        layout,
        rows,
    } = table;

    let rows = rows
        .into_iter()
        .map(|row| {
            let values = row
                .cells
                .into_iter()
                .zip(layout.data_columns.iter())
                .map(|(cell, (_, column))| match cell {
                    Coerced::Numeric(value) => Ok(Some(value)),
                    Coerced::Null => Ok(None),
                    Coerced::Unparseable(value) => Err(IngestError::NonNumericValue {
                        table: which,
                        row: row.line,
                        column: column.clone(),
                        value,
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ParsedRow {
                line: row.line,
                identifiers: row.identifiers,
                values,
            })
        })
        .collect::<Result<Vec<_>, IngestError>>()?;

    Ok(ParsedTable {
        table: which,
        layout,
        rows,
    })
}

/// Columns of a header resolved into identifier roles and data columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    /// The table the header belongs to.
    pub table: Table,
    /// The normalized header.
    pub header: Vec<String>,
    /// Index of the column for each identifier role, if present.
    pub identifiers: EnumMap<IdentifierRole, Option<usize>>,
    /// Names of the identifier columns for each role.
    pub names: EnumMap<IdentifierRole, String>,
    /// Role used to key the table.
    pub primary: IdentifierRole,
    /// Index and name of the data columns, in header order.
    pub data_columns: Vec<(usize, String)>,
}

impl HeaderLayout {
    /// Resolve `header` against the configured identifier `columns`.
    ///
    /// The nucleotide column is primary whenever present, the protein column
    /// only without a nucleotide column.  Without either the nucleotide column
    /// is assumed and every row will lack its primary identifier.
    pub fn resolve(table: Table, header: Vec<String>, columns: &ColumnNames) -> Self {
        let mut identifiers: EnumMap<IdentifierRole, Option<usize>> = EnumMap::default();
        let mut data_columns = Vec::new();
        for (idx, name) in header.iter().enumerate() {
            match columns.role(name) {
                Some(role) => identifiers[role] = Some(idx),
                None => data_columns.push((idx, name.clone())),
            }
        }

        let primary = if identifiers[IdentifierRole::Nucleotide].is_some() {
            IdentifierRole::Nucleotide
        } else if identifiers[IdentifierRole::Protein].is_some() {
            IdentifierRole::Protein
        } else {
            IdentifierRole::Nucleotide
        };

        let names = EnumMap::from_fn(|role| columns.name(role).to_owned());

        tracing::debug!(
            "{} data: primary column = {:?}, data columns = {:?}",
            table,
            names[primary],
            data_columns.iter().map(|(_, name)| name).collect::<Vec<_>>()
        );

        Self {
            table,
            header,
            identifiers,
            names,
            primary,
            data_columns,
        }
    }

    /// Whether the header has a column for `role`.
    pub fn defines(&self, role: IdentifierRole) -> bool {
        self.identifiers[role].is_some()
    }

    /// Name of the column for `role`.
    pub fn name(&self, role: IdentifierRole) -> &str {
        &self.names[role]
    }

    /// Names of the data columns.
    pub fn data_column_names(&self) -> Vec<String> {
        self.data_columns
            .iter()
            .map(|(_, name)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use enum_map::enum_map;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::err::ErrorKind;
    use crate::variants::conf::NullTokens;
    use crate::variants::rows::parse_rows;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(&["hgvs_nt", "score"], true)]
    #[case(&["hgvs_pro", "score"], true)]
    #[case(&["hgvs_tx", "score"], true)]
    #[case(&["hgvs", "score"], false)]
    #[case(&[], false)]
    fn identifier_column(#[case] names: &[&str], #[case] ok: bool) {
        let result =
            require_identifier_column(Table::Scores, &header(names), &ColumnNames::default());

        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(err.kind(), ErrorKind::Schema);
        }
    }

    #[test]
    fn identifier_column_message() {
        let err = require_identifier_column(
            Table::Scores,
            &header(&["hgvs", "score"]),
            &ColumnNames::default(),
        )
        .unwrap_err();

        insta::assert_snapshot!(
            err.to_string(),
            @"Score data: header is missing an HGVS column, expected one of 'hgvs_nt', 'hgvs_tx', 'hgvs_pro'"
        );
    }

    #[rstest]
    #[case(&["hgvs_nt", "score"], true)]
    #[case(&["hgvs_nt", "hgvs_pro"], false)]
    #[case(&["hgvs_nt"], false)]
    fn additional_column(#[case] names: &[&str], #[case] ok: bool) {
        let result =
            require_additional_column(Table::Counts, &header(names), &ColumnNames::default());

        assert_eq!(result.is_ok(), ok);
    }

    #[rstest]
    #[case(&["hgvs_nt", "score"], true)]
    #[case(&["hgvs_nt", "", "score"], false)]
    #[case(&["hgvs_nt", "score", " "], false)]
    fn blank_columns(#[case] names: &[&str], #[case] ok: bool) {
        assert_eq!(reject_blank_columns(Table::Scores, &header(names)).is_ok(), ok);
    }

    #[rstest]
    #[case(&["hgvs_nt", "score", "se"], true)]
    #[case(&["hgvs_nt", "score", "score"], false)]
    fn duplicate_columns(#[case] names: &[&str], #[case] ok: bool) {
        assert_eq!(
            reject_duplicate_columns(Table::Scores, &header(names)).is_ok(),
            ok
        );
    }

    #[rstest]
    #[case(&["hgvs_nt", "score"], Some("score"), true)]
    #[case(&["hgvs_nt", "fitness"], Some("score"), false)]
    #[case(&["hgvs_nt", "fitness"], None, true)]
    fn score_column(#[case] names: &[&str], #[case] required: Option<&str>, #[case] ok: bool) {
        let layout = HeaderLayout::resolve(Table::Scores, header(names), &ColumnNames::default());

        assert_eq!(require_score_column(&layout, required).is_ok(), ok);
    }

    #[rstest]
    #[case::nt_only(&["hgvs_nt", "score"], IdentifierRole::Nucleotide)]
    #[case::nt_and_pro(&["hgvs_pro", "hgvs_nt", "score"], IdentifierRole::Nucleotide)]
    #[case::pro_only(&["hgvs_pro", "score"], IdentifierRole::Protein)]
    #[case::tx_only(&["hgvs_tx", "score"], IdentifierRole::Nucleotide)]
    fn layout_primary(#[case] names: &[&str], #[case] expected: IdentifierRole) {
        let layout = HeaderLayout::resolve(Table::Scores, header(names), &ColumnNames::default());

        assert_eq!(layout.primary, expected);
    }

    #[test]
    fn layout_resolve() {
        let layout = HeaderLayout::resolve(
            Table::Scores,
            header(&["hgvs_nt", "score", "hgvs_pro", "se"]),
            &ColumnNames::default(),
        );

        assert_eq!(
            layout.identifiers,
            enum_map! {
                IdentifierRole::Nucleotide => Some(0),
                IdentifierRole::Transcript => None,
                IdentifierRole::Protein => Some(2),
            }
        );
        assert_eq!(
            layout.data_columns,
            vec![(1, "score".to_string()), (3, "se".to_string())]
        );
        assert_eq!(layout.data_column_names(), vec!["score", "se"]);
        assert!(layout.defines(IdentifierRole::Protein));
        assert!(!layout.defines(IdentifierRole::Transcript));
        assert_eq!(layout.name(IdentifierRole::Transcript), "hgvs_tx");
    }

    #[test]
    fn numeric_columns_ok() -> Result<(), anyhow::Error> {
        let layout = HeaderLayout::resolve(
            Table::Scores,
            header(&["hgvs_nt", "score"]),
            &ColumnNames::default(),
        );
        let coerced = parse_rows(
            "hgvs_nt,score\nc.1A>G,1.5\nc.2A>G,NA\n".as_bytes(),
            layout,
            &NullTokens::default(),
        )?;

        let parsed = require_numeric_columns(coerced)?;

        let values: Vec<_> = parsed.rows.iter().map(|r| r.values.clone()).collect();
        assert_eq!(values, vec![vec![Some(1.5)], vec![None]]);
        Ok(())
    }

    #[test]
    fn numeric_columns_fail() -> Result<(), anyhow::Error> {
        let layout = HeaderLayout::resolve(
            Table::Scores,
            header(&["hgvs_nt", "score", "se"]),
            &ColumnNames::default(),
        );
        let coerced = parse_rows(
            "hgvs_nt,score,se\nc.1A>G,1.5,0.1\nc.2A>G,2.0,abc\n".as_bytes(),
            layout,
            &NullTokens::default(),
        )?;

        let err = require_numeric_columns(coerced).unwrap_err();

        insta::assert_snapshot!(
            err.to_string(),
            @r###"Row 3 of the Score data contains the non-numeric value "abc" in column 'se'"###
        );
        Ok(())
    }
}
