//! Identifier rules within a table and the consistency stage across tables.

use indexmap::{IndexMap, IndexSet};

use crate::err::IngestError;

use super::hgvs::{self, Prefix};
use super::rows::{ParsedRow, ParsedTable};
use super::{IdentifierRole, Table};

/// A validated table keyed by its primary identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedTable {
    pub table: Table,
    /// Role of the key column.
    pub primary: IdentifierRole,
    /// Name of the key column.
    pub column: String,
    /// Names of the data columns.
    pub columns: Vec<String>,
    /// Rows by primary identifier, in input order.
    pub rows: IndexMap<String, ParsedRow>,
}

/// Fail if a transcript column is present without a nucleotide column.
pub fn require_nucleotide_with_transcript(table: &ParsedTable) -> Result<(), IngestError> {
    let layout = &table.layout;
    if layout.defines(IdentifierRole::Transcript) && !layout.defines(IdentifierRole::Nucleotide) {
        Err(IngestError::MissingNucleotideColumn {
            table: table.table,
            column_nt: layout.name(IdentifierRole::Nucleotide).to_owned(),
            column_tx: layout.name(IdentifierRole::Transcript).to_owned(),
        })
    } else {
        Ok(())
    }
}

/// Apply the prefix rules to the nucleotide identifiers.
///
/// Genomic and transcript level prefixes must not be mixed, and genomic
/// variants need an accompanying transcript column.
pub fn check_nucleotide_prefixes(table: &ParsedTable) -> Result<(), IngestError> {
    let layout = &table.layout;
    if !layout.defines(IdentifierRole::Nucleotide) {
        return Ok(());
    }

    let prefixes: IndexSet<Prefix> = table
        .rows
        .iter()
        .filter_map(|row| row.identifier(IdentifierRole::Nucleotide))
        .filter_map(hgvs::prefix)
        .collect();
    let has_genomic = prefixes.contains(&Prefix::Genomic);

    if has_genomic && prefixes.iter().any(Prefix::is_transcript) {
        return Err(IngestError::MixedPrefix {
            table: table.table,
            column: layout.name(IdentifierRole::Nucleotide).to_owned(),
        });
    }
    if has_genomic && !layout.defines(IdentifierRole::Transcript) {
        return Err(IngestError::MissingTranscriptColumn {
            table: table.table,
            column_nt: layout.name(IdentifierRole::Nucleotide).to_owned(),
            column_tx: layout.name(IdentifierRole::Transcript).to_owned(),
        });
    }
    Ok(())
}

/// Validate every non-null identifier cell against the HGVS grammar.
///
/// With a transcript column present, nucleotide identifiers must be genomic.
pub fn validate_identifiers(table: &ParsedTable) -> Result<(), IngestError> {
    let layout = &table.layout;
    let tx_present = layout.defines(IdentifierRole::Transcript);

    for row in &table.rows {
        for (role, value) in row.identifiers.iter() {
            let value = match value {
                Some(value) => value,
                None => continue,
            };
            let prefix = hgvs::validate(value, role).map_err(|source| IngestError::InvalidHgvs {
                table: table.table,
                row: row.line,
                column: layout.name(role).to_owned(),
                source,
            })?;

            if role == IdentifierRole::Nucleotide && tx_present {
                if let Some(prefix) = prefix.filter(|p| *p != Prefix::Genomic) {
                    return Err(IngestError::invalid_hgvs(
                        table.table,
                        row.line,
                        layout.name(role),
                        role,
                        value,
                        &format!(
                            "nucleotide variants must use 'g.' instead of '{}' when a '{}' column is present",
                            prefix,
                            layout.name(IdentifierRole::Transcript)
                        ),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Key `table` by its primary identifier.
///
/// Every row must have a primary identifier and no identifier may repeat.
pub fn key_by_primary(table: ParsedTable) -> Result<KeyedTable, IngestError> {
    let ParsedTable {
        table: which,
        layout,
        rows,
    } = table;
    let primary = layout.primary;
    let column = layout.name(primary).to_owned();

    let mut lines: IndexMap<String, Vec<usize>> = IndexMap::new();
    for row in &rows {
        match row.identifier(primary) {
            Some(identifier) => lines
                .entry(identifier.to_owned())
                .or_default()
                .push(row.line),
            None => {
                return Err(IngestError::MissingPrimaryIdentifier {
                    table: which,
                    row: row.line,
                    column,
                })
            }
        }
    }
    if let Some((identifier, rows)) = lines.into_iter().find(|(_, rows)| rows.len() > 1) {
        return Err(IngestError::DuplicateIdentifier {
            table: which,
            column,
            identifier,
            rows,
        });
    }

    let mut keyed = IndexMap::with_capacity(rows.len());
    for row in rows {
        if let Some(identifier) = row.identifier(primary).map(str::to_owned) {
            keyed.insert(identifier, row);
        }
    }

    Ok(KeyedTable {
        table: which,
        primary,
        column,
        columns: layout.data_column_names(),
        rows: keyed,
    })
}

/// Apply all per-table identifier rules and key the table.
pub fn check_table(table: ParsedTable) -> Result<KeyedTable, IngestError> {
    require_nucleotide_with_transcript(&table)?;
    check_nucleotide_prefixes(&table)?;
    validate_identifiers(&table)?;
    key_by_primary(table)
}

/// The consistency stage across both tables.
///
/// Both tables must be keyed by the same identifier role.  Returns the union of
/// identifiers, score data order first.
pub fn check_cross(
    scores: &KeyedTable,
    counts: Option<&KeyedTable>,
) -> Result<IndexSet<String>, IngestError> {
    let mut union: IndexSet<String> = IndexSet::with_capacity(scores.rows.len());
    for keyed in std::iter::once(scores).chain(counts) {
        if keyed.primary != scores.primary {
            return Err(IngestError::schema(
                keyed.table,
                format!(
                    "primary identifier is {} but the {} data uses {} identifiers",
                    keyed.primary, scores.table, scores.primary
                ),
            ));
        }

        if let Some((identifier, row)) = keyed
            .rows
            .iter()
            .find(|(identifier, row)| row.identifier(keyed.primary) != Some(identifier.as_str()))
        {
            return Err(IngestError::DuplicateIdentifier {
                table: keyed.table,
                column: keyed.column.clone(),
                identifier: identifier.clone(),
                rows: vec![row.line],
            });
        }
        union.extend(keyed.rows.keys().cloned());
    }

    tracing::debug!("{} distinct identifiers across tables", union.len());
    Ok(union)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::err::ErrorKind;
    use crate::variants::conf::{ColumnNames, NullTokens};
    use crate::variants::rows::{drop_empty_rows, parse_rows};
    use crate::variants::schema::{require_numeric_columns, HeaderLayout};

    fn parsed(table: Table, content: &str) -> Result<ParsedTable, anyhow::Error> {
        let header = content
            .lines()
            .next()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.to_string())
            .collect();
        let layout = HeaderLayout::resolve(table, header, &ColumnNames::default());
        let coerced = parse_rows(content.as_bytes(), layout, &NullTokens::default())?;
        let mut parsed = require_numeric_columns(coerced)?;
        drop_empty_rows(&mut parsed);
        Ok(parsed)
    }

    #[rstest]
    #[case::ok("hgvs_nt,score\nc.1A>G,1.0\nc.2A>G,2.0\n", None)]
    #[case::genomic_with_tx("hgvs_nt,hgvs_tx,score\ng.1A>G,c.1A>G,1.0\n", None)]
    #[case::pro_only("hgvs_pro,score\np.Met1Val,1.0\n", None)]
    #[case::mixed(
        "hgvs_nt,score\ng.1A>G,1.0\nc.2A>G,2.0\n",
        Some(ErrorKind::MixedPrefix)
    )]
    #[case::genomic_no_tx(
        "hgvs_nt,score\ng.1A>G,1.0\n",
        Some(ErrorKind::MissingTranscriptColumn)
    )]
    #[case::tx_no_nt(
        "hgvs_tx,score\nc.1A>G,1.0\n",
        Some(ErrorKind::MissingNucleotideColumn)
    )]
    #[case::transcript_nt_with_tx(
        "hgvs_nt,hgvs_tx,score\nc.1A>G,c.1A>G,1.0\n",
        Some(ErrorKind::InvalidHgvs)
    )]
    #[case::bad_hgvs("hgvs_nt,score\nc.1A>X,1.0\n", Some(ErrorKind::InvalidHgvs))]
    #[case::bad_pro("hgvs_nt,hgvs_pro,score\nc.1A>G,p.L1V,1.0\n", Some(ErrorKind::InvalidHgvs))]
    #[case::null_primary(
        "hgvs_nt,hgvs_pro,score\nc.1A>G,p.Met1Val,1.0\nNA,p.Met1Ala,2.0\n",
        Some(ErrorKind::MissingPrimaryIdentifier)
    )]
    #[case::null_secondary("hgvs_nt,hgvs_pro,score\nc.1A>G,NA,1.0\n", None)]
    #[case::duplicate(
        "hgvs_nt,score\nc.1A>G,1.0\nc.1A>G,2.0\n",
        Some(ErrorKind::DuplicateIdentifier)
    )]
    #[case::duplicate_pro(
        "hgvs_pro,score\np.Met1Val,1.0\np.Met1Val,2.0\n",
        Some(ErrorKind::DuplicateIdentifier)
    )]
    fn check_table_cases(
        #[case] content: &str,
        #[case] expected: Option<ErrorKind>,
    ) -> Result<(), anyhow::Error> {
        let result = check_table(parsed(Table::Scores, content)?);

        assert_eq!(result.err().map(|e| e.kind()), expected);
        Ok(())
    }

    #[test]
    fn duplicate_rows_reported() -> Result<(), anyhow::Error> {
        let content = "hgvs_nt,score\nc.1A>G,1.0\nc.2A>G,2.0\nc.1A>G,3.0\n";

        let err = check_table(parsed(Table::Scores, content)?).unwrap_err();

        match err {
            IngestError::DuplicateIdentifier {
                identifier, rows, ..
            } => {
                assert_eq!(identifier, "c.1A>G");
                assert_eq!(rows, vec![2, 4]);
            }
            _ => panic!("unexpected error: {err}"),
        }
        Ok(())
    }

    #[test]
    fn keyed_by_protein() -> Result<(), anyhow::Error> {
        let content = "hgvs_pro,score\np.Met1Val,1.0\np.Met1Ala,2.0\n";

        let keyed = check_table(parsed(Table::Scores, content)?)?;

        assert_eq!(keyed.primary, IdentifierRole::Protein);
        assert_eq!(
            keyed.rows.keys().collect::<Vec<_>>(),
            vec!["p.Met1Val", "p.Met1Ala"]
        );
        assert_eq!(keyed.columns, vec!["score"]);
        Ok(())
    }

    #[test]
    fn cross_union() -> Result<(), anyhow::Error> {
        let scores = check_table(parsed(
            Table::Scores,
            "hgvs_nt,score\nc.1A>G,1.0\nc.2A>G,2.0\n",
        )?)?;
        let counts = check_table(parsed(
            Table::Counts,
            "hgvs_nt,count\nc.2A>G,10\nc.3A>G,20\n",
        )?)?;

        let union = check_cross(&scores, Some(&counts))?;

        assert_eq!(
            union.into_iter().collect::<Vec<_>>(),
            vec!["c.1A>G", "c.2A>G", "c.3A>G"]
        );
        Ok(())
    }

    #[test]
    fn cross_primary_mismatch() -> Result<(), anyhow::Error> {
        let scores = check_table(parsed(Table::Scores, "hgvs_nt,score\nc.1A>G,1.0\n")?)?;
        let counts = check_table(parsed(Table::Counts, "hgvs_pro,count\np.Met1Val,10\n")?)?;

        let err = check_cross(&scores, Some(&counts)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.table(), Some(Table::Counts));
        Ok(())
    }
}
