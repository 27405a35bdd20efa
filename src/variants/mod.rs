//! Ingestion of uploaded variant score and count tables.
//!
//! The pipeline turns one scores CSV file and an optional counts CSV file into
//! `DatasetColumns` and a set of `VariantRecord`s keyed by the primary HGVS
//! identifier.  See `assemble::DatasetAssembler` for the entry point.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod assemble;
pub mod checks;
pub mod cli;
pub mod conf;
pub mod header;
pub mod hgvs;
pub mod merge;
pub mod rows;
pub mod schema;

pub use assemble::{ingest, AssemblerState, DatasetAssembler, TableSource};
pub use conf::{ColumnNames, IngestConfig, NullTokens};

/// The uploaded table a value or error belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// The score data file.
    #[strum(serialize = "Score")]
    Scores,
    /// The count data file.
    #[strum(serialize = "Count")]
    Counts,
}

/// Role of an identifier column, also the kind of HGVS string it holds.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    enum_map::Enum,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IdentifierRole {
    /// Nucleotide level variant (`g.`, `c.` or `n.`).
    Nucleotide,
    /// Transcript level variant (`c.` or `n.`).
    Transcript,
    /// Protein level variant (`p.`).
    Protein,
}

/// Values of one table side of a variant, column name to optional number.
pub type VariantData = IndexMap<String, Option<f64>>;

/// The finalized data columns of a dataset, identifier columns excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetColumns {
    /// Columns of the score data, in header order.
    pub score_columns: Vec<String>,
    /// Columns of the count data, in header order; empty without counts.
    pub count_columns: Vec<String>,
}

/// One merged variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Nucleotide HGVS identifier.
    pub hgvs_nt: Option<String>,
    /// Transcript HGVS identifier.
    pub hgvs_tx: Option<String>,
    /// Protein HGVS identifier.
    pub hgvs_pro: Option<String>,
    /// Values from the score data.
    pub score_data: VariantData,
    /// Values from the count data.
    pub count_data: VariantData,
}

impl VariantRecord {
    /// Return the identifier for `role`.
    pub fn identifier(&self, role: IdentifierRole) -> Option<&str> {
        match role {
            IdentifierRole::Nucleotide => self.hgvs_nt.as_deref(),
            IdentifierRole::Transcript => self.hgvs_tx.as_deref(),
            IdentifierRole::Protein => self.hgvs_pro.as_deref(),
        }
    }
}

/// Result of a successful ingestion, handed to the storage layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestOutput {
    /// The identifier role that keys `variants`.
    pub primary: Option<IdentifierRole>,
    /// Finalized data columns.
    pub dataset_columns: DatasetColumns,
    /// Variants keyed by primary identifier; score data order first.
    pub variants: IndexMap<String, VariantRecord>,
}
