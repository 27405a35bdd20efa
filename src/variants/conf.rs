//! Configuration of the ingestion, loaded once at startup.

use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::IdentifierRole;

/// Null tokens recognized when no configuration overrides them.
pub const DEFAULT_NULL_TOKENS: &[&str] = &[
    "", "na", "n/a", "nan", "none", "null", "undefined", "-", "?",
];

/// Names of the recognized identifier columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Nucleotide HGVS column.
    pub nucleotide: String,
    /// Transcript HGVS column.
    pub transcript: String,
    /// Protein HGVS column.
    pub protein: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            nucleotide: String::from("hgvs_nt"),
            transcript: String::from("hgvs_tx"),
            protein: String::from("hgvs_pro"),
        }
    }
}

impl ColumnNames {
    /// Column name used for `role`.
    pub fn name(&self, role: IdentifierRole) -> &str {
        match role {
            IdentifierRole::Nucleotide => &self.nucleotide,
            IdentifierRole::Transcript => &self.transcript,
            IdentifierRole::Protein => &self.protein,
        }
    }

    /// Role of the (already normalized) column `name`, if it is an identifier column.
    pub fn role(&self, name: &str) -> Option<IdentifierRole> {
        [
            IdentifierRole::Nucleotide,
            IdentifierRole::Transcript,
            IdentifierRole::Protein,
        ]
        .into_iter()
        .find(|role| self.name(*role).eq_ignore_ascii_case(name))
    }

    /// All identifier column names, in role order.
    pub fn all(&self) -> [&str; 3] {
        [
            self.nucleotide.as_str(),
            self.transcript.as_str(),
            self.protein.as_str(),
        ]
    }
}

/// Case-insensitive set of strings meaning "no value".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct NullTokens(IndexSet<String>);

impl Default for NullTokens {
    fn default() -> Self {
        DEFAULT_NULL_TOKENS.iter().copied().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for NullTokens {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .collect(),
        )
    }
}

impl From<Vec<String>> for NullTokens {
    fn from(value: Vec<String>) -> Self {
        value.into_iter().collect()
    }
}

impl From<NullTokens> for Vec<String> {
    fn from(value: NullTokens) -> Self {
        value.0.into_iter().collect()
    }
}

impl NullTokens {
    /// Whether the (untrimmed) cell `value` is a null token.
    pub fn is_null(&self, value: &str) -> bool {
        self.0.contains(&value.trim().to_lowercase())
    }

    /// Iterate over the normalized tokens.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Top-level ingestion configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Identifier column names.
    pub columns: ColumnNames,
    /// Tokens treated as null in data and identifier cells.
    pub null_tokens: NullTokens,
    /// Column that the score data must provide; empty to disable.
    pub required_score_column: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            columns: Default::default(),
            null_tokens: Default::default(),
            required_score_column: String::from("score"),
        }
    }
}

impl IngestConfig {
    /// The required score column, `None` if disabled.
    pub fn required_score_column(&self) -> Option<&str> {
        let column = self.required_score_column.trim();
        (!column.is_empty()).then_some(column)
    }

    /// Load configuration from the TOML file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        tracing::debug!("loading configuration from {:?}", path.as_ref());
        let toml_str = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("could not read configuration {:?}: {}", path.as_ref(), e)
        })?;
        Ok(toml::from_str(&toml_str)?)
    }
}
