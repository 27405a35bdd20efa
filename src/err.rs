//! Error types of the ingestion pipeline.

use crate::variants::{hgvs, IdentifierRole, Table};

/// Fieldless category of an `IngestError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum ErrorKind {
    Schema,
    RowShape,
    NonNumericValue,
    InvalidHgvs,
    MixedPrefix,
    MissingTranscriptColumn,
    MissingNucleotideColumn,
    MissingPrimaryIdentifier,
    DuplicateIdentifier,
    EmptyDataset,
    AssemblerReused,
    Io,
    Csv,
}

/// Failure of a single `ingest` call.
///
/// All errors are fatal to the ingestion; the `Display` messages are meant to
/// be shown verbatim to the uploading user.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("{table} data: {message}")]
    Schema { table: Table, message: String },
    #[error(
        "The number of columns in row {row} of the {table} data ({found}) does not match \
         those in the header ({expected})"
    )]
    RowShape {
        table: Table,
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("Row {row} of the {table} data contains the non-numeric value {value:?} in column '{column}'")]
    NonNumericValue {
        table: Table,
        row: usize,
        column: String,
        value: String,
    },
    #[error("Row {row} of the {table} data: {source}")]
    InvalidHgvs {
        table: Table,
        row: usize,
        column: String,
        source: hgvs::Error,
    },
    #[error(
        "{table} data: genomic variants (prefix 'g.') cannot be mixed with transcript \
         variants (prefix 'c.' or 'n.') in column '{column}'"
    )]
    MixedPrefix { table: Table, column: String },
    #[error(
        "{table} data: transcript variants ('{column_tx}' column) are required when \
         specifying genomic variants (prefix 'g.' in the '{column_nt}' column)"
    )]
    MissingTranscriptColumn {
        table: Table,
        column_nt: String,
        column_tx: String,
    },
    #[error(
        "{table} data: genomic variants ('{column_nt}' column) must be defined when \
         specifying transcript variants ('{column_tx}' column)"
    )]
    MissingNucleotideColumn {
        table: Table,
        column_nt: String,
        column_tx: String,
    },
    #[error("Row {row} of the {table} data: primary column (inferred as '{column}') cannot contain null values")]
    MissingPrimaryIdentifier {
        table: Table,
        row: usize,
        column: String,
    },
    #[error(
        "{table} data: HGVS identifier '{identifier}' in column '{column}' appears more than \
         once (rows {})",
        itertools::join(.rows, ", ")
    )]
    DuplicateIdentifier {
        table: Table,
        column: String,
        identifier: String,
        rows: Vec<usize>,
    },
    #[error("{table} data: no variants could be parsed, please upload a non-empty file")]
    EmptyDataset { table: Table },
    #[error("dataset assembler has already handled an ingestion request")]
    AssemblerReused,
    #[error("problem reading input: {0}")]
    Io(#[from] std::io::Error),
    #[error("problem parsing CSV input: {0}")]
    Csv(#[from] csv::Error),
}

impl IngestError {
    /// Return the category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Schema { .. } => ErrorKind::Schema,
            IngestError::RowShape { .. } => ErrorKind::RowShape,
            IngestError::NonNumericValue { .. } => ErrorKind::NonNumericValue,
            IngestError::InvalidHgvs { .. } => ErrorKind::InvalidHgvs,
            IngestError::MixedPrefix { .. } => ErrorKind::MixedPrefix,
            IngestError::MissingTranscriptColumn { .. } => ErrorKind::MissingTranscriptColumn,
            IngestError::MissingNucleotideColumn { .. } => ErrorKind::MissingNucleotideColumn,
            IngestError::MissingPrimaryIdentifier { .. } => ErrorKind::MissingPrimaryIdentifier,
            IngestError::DuplicateIdentifier { .. } => ErrorKind::DuplicateIdentifier,
            IngestError::EmptyDataset { .. } => ErrorKind::EmptyDataset,
            IngestError::AssemblerReused => ErrorKind::AssemblerReused,
            IngestError::Io(_) => ErrorKind::Io,
            IngestError::Csv(_) => ErrorKind::Csv,
        }
    }

    /// The table the error refers to, if any.
    pub fn table(&self) -> Option<Table> {
        match self {
            IngestError::Schema { table, .. }
            | IngestError::RowShape { table, .. }
            | IngestError::NonNumericValue { table, .. }
            | IngestError::InvalidHgvs { table, .. }
            | IngestError::MixedPrefix { table, .. }
            | IngestError::MissingTranscriptColumn { table, .. }
            | IngestError::MissingNucleotideColumn { table, .. }
            | IngestError::MissingPrimaryIdentifier { table, .. }
            | IngestError::DuplicateIdentifier { table, .. }
            | IngestError::EmptyDataset { table } => Some(*table),
            IngestError::AssemblerReused | IngestError::Io(_) | IngestError::Csv(_) => None,
        }
    }

    /// Build a `Schema` error.
    pub(crate) fn schema<S: Into<String>>(table: Table, message: S) -> Self {
        IngestError::Schema {
            table,
            message: message.into(),
        }
    }

    /// Build an `InvalidHgvs` error for the identifier `role` column of `row`.
    pub(crate) fn invalid_hgvs(
        table: Table,
        row: usize,
        column: &str,
        role: IdentifierRole,
        value: &str,
        reason: &str,
    ) -> Self {
        IngestError::InvalidHgvs {
            table,
            row,
            column: column.to_owned(),
            source: hgvs::Error::new(value, role, reason),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{ErrorKind, IngestError};
    use crate::variants::Table;

    #[test]
    fn duplicate_identifier_message() {
        let err = IngestError::DuplicateIdentifier {
            table: Table::Scores,
            column: "hgvs_nt".into(),
            identifier: "c.1A>G".into(),
            rows: vec![2, 3],
        };

        insta::assert_snapshot!(
            err.to_string(),
            @"Score data: HGVS identifier 'c.1A>G' in column 'hgvs_nt' appears more than once (rows 2, 3)"
        );
        assert_eq!(err.kind(), ErrorKind::DuplicateIdentifier);
        assert_eq!(err.table(), Some(Table::Scores));
    }

    #[test]
    fn row_shape_message() {
        let err = IngestError::RowShape {
            table: Table::Counts,
            row: 4,
            found: 3,
            expected: 2,
        };

        insta::assert_snapshot!(
            err.to_string(),
            @"The number of columns in row 4 of the Count data (3) does not match those in the header (2)"
        );
    }

    #[test]
    fn io_has_no_table() {
        let err: IngestError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.table(), None);
        assert_eq!(err.kind().to_string(), "Io");
    }
}
