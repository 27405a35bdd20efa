//! MaveDB variant dataset ingestion worker.
//!
//! Parses, validates and merges uploaded score and count tables into variant
//! records, see the `variants` module.

pub mod common;
pub mod err;
pub mod variants;
