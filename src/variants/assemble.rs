//! The dataset assembler orchestrating one ingestion request.

use std::io::{BufRead, Seek};

use thousands::Separable;

use crate::err::IngestError;

use super::checks::{check_cross, check_table};
use super::conf::IngestConfig;
use super::header::read_header;
use super::merge::{merge, validate_record_columns};
use super::rows::{drop_empty_rows, parse_rows, ParsedTable};
use super::schema::{
    reject_blank_columns, reject_duplicate_columns, require_additional_column,
    require_identifier_column, require_numeric_columns, require_score_column, HeaderLayout,
};
use super::{DatasetColumns, IngestOutput, Table};

/// An uploaded table as consumed by the assembler.
///
/// The header extractor rewinds the stream, so it must be seekable.
pub trait TableSource: BufRead + Seek {}

impl<T: BufRead + Seek + ?Sized> TableSource for T {}

/// Progress of a `DatasetAssembler`.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
pub enum AssemblerState {
    Idle,
    HeaderRead,
    RowsParsed,
    CrossValidated,
    Merged,
    Done,
    /// Terminal failure with the message of the first error.
    #[strum(serialize = "Failed")]
    Failed(String),
}

/// State machine turning one scores table and optional counts table into an
/// `IngestOutput`.
///
/// An assembler serves exactly one request; any error aborts the ingestion as
/// a whole and leaves it in `Failed`.
#[derive(Debug)]
pub struct DatasetAssembler<'a> {
    config: &'a IngestConfig,
    state: AssemblerState,
}

impl<'a> DatasetAssembler<'a> {
    pub fn new(config: &'a IngestConfig) -> Self {
        Self {
            config,
            state: AssemblerState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> &AssemblerState {
        &self.state
    }

    /// Run the ingestion of `scores` and optionally `counts`.
    ///
    /// Fails with `AssemblerReused` unless the assembler is still idle.
    pub fn ingest(
        &mut self,
        scores: &mut dyn TableSource,
        counts: Option<&mut dyn TableSource>,
    ) -> Result<IngestOutput, IngestError> {
        if self.state != AssemblerState::Idle {
            return Err(IngestError::AssemblerReused);
        }

        match self.run(scores, counts) {
            Ok(output) => {
                self.transition(AssemblerState::Done);
                Ok(output)
            }
            Err(err) => {
                tracing::debug!("ingestion failed in state {}: {}", self.state, err);
                self.state = AssemblerState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: AssemblerState) {
        tracing::debug!("assembler state {} -> {}", self.state, next);
        self.state = next;
    }

    fn run(
        &mut self,
        scores: &mut dyn TableSource,
        mut counts: Option<&mut dyn TableSource>,
    ) -> Result<IngestOutput, IngestError> {
        let score_layout = self.read_layout(Table::Scores, scores)?;
        let count_layout = match counts.as_deref_mut() {
            Some(stream) => Some(self.read_layout(Table::Counts, stream)?),
            None => None,
        };
        self.transition(AssemblerState::HeaderRead);

        let score_rows = self.read_rows(score_layout, scores)?;
        let count_rows = match (count_layout, counts) {
            (Some(layout), Some(stream)) => Some(self.read_rows(layout, stream)?),
            _ => None,
        };
        self.transition(AssemblerState::RowsParsed);

        let scores = check_table(score_rows)?;
        let counts = count_rows.map(check_table).transpose()?;
        let union = check_cross(&scores, counts.as_ref())?;
        self.transition(AssemblerState::CrossValidated);

        let dataset_columns = DatasetColumns {
            score_columns: scores.columns.clone(),
            count_columns: counts
                .as_ref()
                .map(|counts| counts.columns.clone())
                .unwrap_or_default(),
        };
        let variants = merge(&scores, counts.as_ref(), &union);
        self.transition(AssemblerState::Merged);

        for (identifier, record) in &variants {
            validate_record_columns(identifier, record, &dataset_columns)?;
        }

        tracing::info!(
            "ingested {} variants keyed by {} identifiers",
            variants.len().separate_with_commas(),
            scores.primary
        );
        Ok(IngestOutput {
            primary: Some(scores.primary),
            dataset_columns,
            variants,
        })
    }

    /// Read the header of `stream` and apply the header level checks.
    fn read_layout(
        &self,
        table: Table,
        stream: &mut dyn TableSource,
    ) -> Result<HeaderLayout, IngestError> {
        let columns = &self.config.columns;
        let header = read_header(stream)?;
        reject_blank_columns(table, &header)?;
        reject_duplicate_columns(table, &header)?;
        require_identifier_column(table, &header, columns)?;
        require_additional_column(table, &header, columns)?;

        let layout = HeaderLayout::resolve(table, header, columns);
        if table == Table::Scores {
            require_score_column(&layout, self.config.required_score_column())?;
        }
        Ok(layout)
    }

    /// Parse the rows of `stream` into numeric values.
    fn read_rows(
        &self,
        layout: HeaderLayout,
        stream: &mut dyn TableSource,
    ) -> Result<ParsedTable, IngestError> {
        let table = layout.table;
        let coerced = parse_rows(stream, layout, &self.config.null_tokens)?;
        let mut parsed = require_numeric_columns(coerced)?;
        drop_empty_rows(&mut parsed);

        if parsed.rows.is_empty() {
            return Err(IngestError::EmptyDataset { table });
        }
        tracing::debug!(
            "{} data: {} rows with values",
            table,
            parsed.rows.len().separate_with_commas()
        );
        Ok(parsed)
    }
}

/// Ingest `scores` and optionally `counts` with a fresh assembler.
pub fn ingest(
    config: &IngestConfig,
    scores: &mut dyn TableSource,
    counts: Option<&mut dyn TableSource>,
) -> Result<IngestOutput, IngestError> {
    DatasetAssembler::new(config).ingest(scores, counts)
}
